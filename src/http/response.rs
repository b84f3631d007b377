//! Outgoing response assembly.
//!
//! # Responsibilities
//! - Implement the handler-facing `ResponseWriter` for the real response
//! - Turn a captured API response into the client response
//!
//! # Design Decisions
//! - Responses are buffered, then converted with `IntoResponse`
//! - Status defaults to 200 until a handler or the pipeline sets it

use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::preload::capture::{CapturedResponse, ResponseWriter};

/// The real outgoing response, buffered until it is returned to axum.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    headers: HeaderMap,
    status: Option<StatusCode>,
    body: Vec<u8>,
}

impl ResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn status(&self) -> StatusCode {
        self.status.unwrap_or(StatusCode::OK)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl ResponseWriter for ResponseBuffer {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_header(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    fn write(&mut self, bytes: &[u8]) -> usize {
        self.body.extend_from_slice(bytes);
        bytes.len()
    }
}

impl From<CapturedResponse> for ResponseBuffer {
    fn from(capture: CapturedResponse) -> Self {
        let (status, headers, body) = capture.into_parts();
        Self {
            headers,
            status: Some(status),
            body,
        }
    }
}

impl IntoResponse for ResponseBuffer {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status.unwrap_or(StatusCode::OK);
        *response.headers_mut() = self.headers;
        response
    }
}
