//! Request classification.
//!
//! # Responsibilities
//! - Separate API requests from document routes by path prefix
//! - Recognize static asset requests inside the document namespace
//! - Compute the registry lookup path for API requests
//!
//! # Design Decisions
//! - Prefix match is a raw, case-sensitive string prefix
//! - Asset detection is case-insensitive and looks only at the last segment
//! - No regex in the hot path

/// What kind of request a path names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind<'a> {
    /// Inside the API namespace; `lookup_path` has the prefix trimmed.
    Api { lookup_path: &'a str },
    /// A page route of the single-page app.
    Document,
    /// A static build asset (script, stylesheet, image, ...).
    Asset,
}

/// Classifies request paths against the configured API prefix.
#[derive(Debug, Clone)]
pub struct RequestClassifier {
    api_prefix: String,
}

impl RequestClassifier {
    pub fn new(api_prefix: impl Into<String>) -> Self {
        Self {
            api_prefix: api_prefix.into(),
        }
    }

    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    pub fn classify<'a>(&self, path: &'a str) -> RequestKind<'a> {
        if let Some(rest) = path.strip_prefix(self.api_prefix.as_str()) {
            let lookup_path = if rest.is_empty() { "/" } else { rest };
            return RequestKind::Api { lookup_path };
        }

        if is_document_path(path) {
            RequestKind::Document
        } else {
            RequestKind::Asset
        }
    }
}

/// Whether a non-API path should be answered with the document shell.
///
/// True for directory-like paths, explicit `index.html` / `index.htm`, and
/// any last segment without a `.`.
pub fn is_document_path(path: &str) -> bool {
    let last = path.rsplit('/').next().unwrap_or_default().to_lowercase();
    last.is_empty() || last == "index.html" || last == "index.htm" || !last.contains('.')
}
