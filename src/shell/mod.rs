//! Document shell subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     ShellSource::resolve(config)   (build root or dev server)
//!     → loader.rs fetches index.html once
//!     → DocumentShell::from_html splits at </body>
//!     → Arc<DocumentShell> shared with every request
//! ```
//!
//! # Design Decisions
//! - Loaded once; on-disk changes need a restart
//! - Failure to load is fatal at startup
//! - Split point is the first `</body>`, matched case-insensitively

pub mod loader;

pub use loader::{load_shell, ShellError, ShellSource};

/// Anchor before which preload data is inserted.
pub const BODY_CLOSE_TAG: &str = "</body>";

/// The HTML template, pre-split around the insertion point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentShell {
    head: String,
    tail: String,
}

impl DocumentShell {
    /// Split `html` before the first `</body>` (any case). Without one, the
    /// whole document is the head and insertions are appended.
    pub fn from_html(html: impl Into<String>) -> Self {
        let mut head = html.into();
        // ASCII lowercasing keeps byte offsets intact.
        let tail = match head.to_ascii_lowercase().find(BODY_CLOSE_TAG) {
            Some(idx) => head.split_off(idx),
            None => String::new(),
        };
        Self { head, tail }
    }

    pub fn head(&self) -> &str {
        &self.head
    }

    pub fn tail(&self) -> &str {
        &self.tail
    }

    /// The shell with `fragment` spliced in at the anchor.
    pub fn render_with(&self, fragment: &str) -> String {
        let mut out = String::with_capacity(self.head.len() + fragment.len() + self.tail.len());
        out.push_str(&self.head);
        out.push_str(fragment);
        out.push_str(&self.tail);
        out
    }

    /// The shell exactly as loaded.
    pub fn render_plain(&self) -> String {
        self.render_with("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_before_body_close() {
        let shell = DocumentShell::from_html("<html><body><div id=root></div></body></html>");
        assert_eq!(shell.head(), "<html><body><div id=root></div>");
        assert_eq!(shell.tail(), "</body></html>");
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let shell = DocumentShell::from_html("<HTML><BODY>x</BODY></HTML>");
        assert_eq!(shell.head(), "<HTML><BODY>x");
        assert_eq!(shell.tail(), "</BODY></HTML>");
    }

    #[test]
    fn test_first_occurrence_is_used() {
        let shell = DocumentShell::from_html("<body>a</body><!-- </body> -->");
        assert_eq!(shell.head(), "<body>a");
        assert_eq!(shell.tail(), "</body><!-- </body> -->");
    }

    #[test]
    fn test_missing_anchor_appends() {
        let shell = DocumentShell::from_html("<p>fragment</p>");
        assert_eq!(shell.tail(), "");
        assert_eq!(shell.render_with("<script></script>"), "<p>fragment</p><script></script>");
    }

    #[test]
    fn test_render_plain_reassembles_input() {
        let html = "<html><body>é</body></html>";
        assert_eq!(DocumentShell::from_html(html).render_plain(), html);
    }
}
