//! Response sinks handed to preload handlers.
//!
//! # Responsibilities
//! - Define the capability set every response sink exposes
//! - Record handler output in memory instead of transmitting it
//!
//! # Design Decisions
//! - Headers are only "committed" when the caller reads them back, so header
//!   mutation and body writes may interleave freely
//! - `write_header` keeps the last status written
//! - Body writes never fail and are unbounded

use axum::http::{HeaderMap, StatusCode};

/// The operations a handler may perform on a response.
///
/// Implemented by [`CapturedResponse`] for preloading and API dispatch, and by
/// [`crate::http::response::ResponseBuffer`] for the real outgoing response.
pub trait ResponseWriter: Send {
    /// Mutable access to the response headers.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Set the status code. Later calls replace earlier ones.
    fn write_header(&mut self, status: StatusCode);

    /// Append bytes to the body, returning how many were accepted.
    fn write(&mut self, bytes: &[u8]) -> usize;

    /// Append UTF-8 text to the body.
    fn write_str(&mut self, text: &str) -> usize {
        self.write(text.as_bytes())
    }
}

/// In-memory stand-in for the network response sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedResponse {
    headers: HeaderMap,
    status: StatusCode,
    body: Vec<u8>,
}

impl CapturedResponse {
    /// An empty capture: no headers, status 200, empty body.
    pub fn new() -> Self {
        Self {
            headers: HeaderMap::new(),
            status: StatusCode::OK,
            body: Vec::new(),
        }
    }

    /// Rebuild a capture from its parts.
    pub fn from_parts(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self { headers, status, body }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_parts(self) -> (StatusCode, HeaderMap, Vec<u8>) {
        (self.status, self.headers, self.body)
    }
}

impl Default for CapturedResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter for CapturedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        self.body.extend_from_slice(bytes);
        bytes.len()
    }
}
