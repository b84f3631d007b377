//! Splicing the preload bundle into the document shell.
//!
//! The marker text is a contract with the client library and must stay
//! byte-for-byte stable:
//!
//! ```text
//! <script>window.httpPreload={...}</script>
//! ```

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;

use crate::http::response::ResponseBuffer;
use crate::preload::bundle::{BundleError, PreloadBundle};
use crate::preload::capture::ResponseWriter;
use crate::shell::DocumentShell;

pub const MARKER_OPEN: &str = "<script>window.httpPreload=";
pub const MARKER_CLOSE: &str = "</script>";

const EMPTY_BUNDLE: &str = "{}";
const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// The `<script>` element assigning `bundle` to `window.httpPreload`.
///
/// Degrades to an empty object if serialization fails.
pub fn script_marker(bundle: &PreloadBundle) -> String {
    let json = bundle.to_json().unwrap_or_else(|e| {
        tracing::warn!(error = %e, entries = bundle.len(), "Failed to serialize preload bundle");
        EMPTY_BUNDLE.to_string()
    });
    format!("{MARKER_OPEN}{json}{MARKER_CLOSE}")
}

/// The shell with the bundle marker inserted at its anchor.
pub fn render_document(shell: &DocumentShell, bundle: &PreloadBundle) -> String {
    shell.render_with(&script_marker(bundle))
}

/// Build the outgoing document response.
///
/// Headers of the capture stored under `request_target` are promoted unless
/// it is a 404. The status is always the default 200 and the content type is
/// always HTML.
pub fn document_response(shell: &DocumentShell, bundle: &PreloadBundle, request_target: &str) -> ResponseBuffer {
    let mut out = ResponseBuffer::new();
    let promoted = bundle.promote_headers(request_target, &mut out);
    out.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE));

    tracing::debug!(
        request_target = %request_target,
        entries = bundle.len(),
        promoted,
        "Rendering preloaded document"
    );
    out.write_str(&render_document(shell, bundle));
    out
}

/// The shell without any marker, for staggered mode.
pub fn plain_document_response(shell: &DocumentShell) -> ResponseBuffer {
    let mut out = ResponseBuffer::new();
    out.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE));
    out.write_str(&shell.render_plain());
    out
}

/// Find and decode the bundle embedded in a rendered document.
pub fn extract_bundle(html: &str) -> Option<Result<PreloadBundle, BundleError>> {
    let start = html.find(MARKER_OPEN)? + MARKER_OPEN.len();
    let len = html[start..].find(MARKER_CLOSE)?;
    Some(PreloadBundle::from_json(&html[start..start + len]))
}
