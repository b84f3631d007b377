//! The preload bundle and its wire format.
//!
//! # Wire Format
//! ```text
//! {
//!   "/":             {"headers": {...}, "statusCode": 200, "body": "..."},
//!   "/item?id=goat": {"headers": {"Content-Type": ["application/json"]},
//!                     "statusCode": 200, "body": "{\"id\":\"goat\"}"}
//! }
//! ```
//!
//! # Design Decisions
//! - Keys are sorted (BTreeMap) so output is deterministic
//! - Header names use canonical MIME casing (`Content-Type`)
//! - UTF-8 bodies are plain strings; other bodies are base64 with
//!   `"bodyEncoding": "base64"`
//! - `<`, `>`, `&`, U+2028 and U+2029 are `\u` escaped so the JSON can sit
//!   inside a `<script>` element

use std::collections::BTreeMap;

use axum::http::header::{CONNECTION, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, TRANSFER_ENCODING};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::preload::capture::{CapturedResponse, ResponseWriter};

/// Errors decoding a serialized bundle.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("bundle is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid header `{0}` in bundle entry")]
    Header(String),

    #[error("invalid status code {0} in bundle entry")]
    Status(u16),

    #[error("invalid base64 body: {0}")]
    Body(#[from] base64::DecodeError),
}

/// How a body is represented in the serialized bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    Base64,
}

/// Serialized form of one captured response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    pub headers: BTreeMap<String, Vec<String>>,
    pub status_code: u16,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_encoding: Option<BodyEncoding>,
}

impl From<&CapturedResponse> for BundleEntry {
    fn from(capture: &CapturedResponse) -> Self {
        let mut headers = BTreeMap::new();
        for name in capture.headers().keys() {
            let values = capture
                .headers()
                .get_all(name)
                .iter()
                .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
                .collect();
            headers.insert(canonical_header_name(name.as_str()), values);
        }

        let (body, body_encoding) = match std::str::from_utf8(capture.body()) {
            Ok(text) => (text.to_string(), None),
            Err(_) => (BASE64.encode(capture.body()), Some(BodyEncoding::Base64)),
        };

        Self {
            headers,
            status_code: capture.status().as_u16(),
            body,
            body_encoding,
        }
    }
}

impl TryFrom<BundleEntry> for CapturedResponse {
    type Error = BundleError;

    fn try_from(entry: BundleEntry) -> Result<Self, Self::Error> {
        let mut headers = HeaderMap::new();
        for (name, values) in &entry.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| BundleError::Header(name.clone()))?;
            for value in values {
                let header_value = HeaderValue::from_str(value)
                    .map_err(|_| BundleError::Header(name.clone()))?;
                headers.append(header_name.clone(), header_value);
            }
        }

        let status = StatusCode::from_u16(entry.status_code)
            .map_err(|_| BundleError::Status(entry.status_code))?;

        let body = match entry.body_encoding {
            Some(BodyEncoding::Base64) => BASE64.decode(entry.body.as_bytes())?,
            None => entry.body.into_bytes(),
        };

        Ok(CapturedResponse::from_parts(status, headers, body))
    }
}

/// Captured responses of one document request, keyed by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreloadBundle {
    entries: BTreeMap<String, CapturedResponse>,
}

impl PreloadBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a capture.
    ///
    /// An authoritative (terminal) capture replaces whatever is stored under
    /// `key`; a non-authoritative one never replaces an existing entry.
    pub fn merge(&mut self, key: String, capture: CapturedResponse, authoritative: bool) {
        if authoritative {
            self.entries.insert(key, capture);
        } else {
            self.entries.entry(key).or_insert(capture);
        }
    }

    pub fn get(&self, key: &str) -> Option<&CapturedResponse> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to script-safe JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let wire: BTreeMap<&str, BundleEntry> = self
            .entries
            .iter()
            .map(|(key, capture)| (key.as_str(), BundleEntry::from(capture)))
            .collect();
        serde_json::to_string(&wire).map(|json| escape_for_script(&json))
    }

    /// Decode a bundle previously produced by [`PreloadBundle::to_json`].
    pub fn from_json(json: &str) -> Result<Self, BundleError> {
        let wire: BTreeMap<String, BundleEntry> = serde_json::from_str(json)?;
        let entries = wire
            .into_iter()
            .map(|(key, entry)| CapturedResponse::try_from(entry).map(|capture| (key, capture)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(Self { entries })
    }

    /// Copy the headers of the capture stored under `request_target` onto
    /// `out`, unless that capture is a 404.
    ///
    /// Headers describing the body are skipped: the outgoing body is the
    /// rendered document, not the captured one. Returns whether headers were
    /// copied.
    pub fn promote_headers(&self, request_target: &str, out: &mut dyn ResponseWriter) -> bool {
        let Some(capture) = self.entries.get(request_target) else {
            return false;
        };
        if capture.status() == StatusCode::NOT_FOUND {
            return false;
        }

        let headers = out.headers_mut();
        for (name, value) in capture.headers() {
            if describes_body(name) {
                continue;
            }
            headers.append(name.clone(), value.clone());
        }
        true
    }
}

fn describes_body(name: &HeaderName) -> bool {
    [CONTENT_LENGTH, CONTENT_TYPE, CONTENT_ENCODING, TRANSFER_ENCODING, CONNECTION].contains(name)
}

/// `content-type` → `Content-Type`, `x-request-id` → `X-Request-Id`.
pub fn canonical_header_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c.to_ascii_lowercase());
        }
        upper = c == '-';
    }
    out
}

/// Escape characters that could end a `<script>` element or break JS
/// parsing. Only valid inside JSON string literals, which is the only place
/// these characters can occur in serialized JSON.
fn escape_for_script(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            _ => out.push(c),
        }
    }
    out
}
