//! Request-target decomposition into ancestor prefixes.
//!
//! For `/a/b/c` the prefixes are `/`, `/a`, `/a/b`, `/a/b/c`: one per
//! `/`-delimited segment. The last equals the path itself unless the path has
//! empty inner segments: `//x` yields `/`, `/`, `/x`, since a separator is
//! never doubled. The terminal capture is still keyed by the full target.

use std::collections::HashSet;

/// Split a request-target on the first `?`.
pub fn split_target(target: &str) -> (&str, Option<&str>) {
    match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    }
}

/// Every ancestor prefix of `path`, root first, one per segment.
///
/// Duplicates are kept: `/` yields `["/", "/"]` because it has two (empty)
/// segments.
pub fn ancestor_prefixes(path: &str) -> Vec<String> {
    let mut prefixes = Vec::new();
    let mut current = String::with_capacity(path.len() + 1);

    for segment in path.split('/') {
        if !current.ends_with('/') {
            current.push('/');
        }
        current.push_str(segment);
        prefixes.push(current.clone());
    }

    prefixes
}

/// One handler invocation the dispatch engine should attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTarget {
    /// Registry lookup key.
    pub prefix: String,
    /// Whether this is the full requested path.
    pub terminal: bool,
}

/// Unique prefixes to dispatch for `path`, ancestors first.
///
/// A prefix that repeats is attempted once. When an ancestor coincides with
/// the full path (`/`, `//`), only the terminal dispatch is kept.
pub fn dispatch_plan(path: &str) -> Vec<DispatchTarget> {
    let prefixes = ancestor_prefixes(path);
    let last = prefixes.len().saturating_sub(1);
    let mut seen = HashSet::new();
    let mut plan = Vec::with_capacity(prefixes.len());

    for (i, prefix) in prefixes.iter().enumerate() {
        let terminal = i == last;
        if !terminal && (*prefix == prefixes[last] || !seen.insert(prefix.as_str())) {
            continue;
        }
        plan.push(DispatchTarget {
            prefix: prefix.clone(),
            terminal,
        });
    }

    plan
}
