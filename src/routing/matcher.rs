//! Route matching logic.
//!
//! # Responsibilities
//! - Match path prefix (case-sensitive, literal)
//! - Strip the matched prefix exactly once to produce the upstream path
//!
//! # Design Decisions
//! - A prefix matches only on a segment boundary: `/api/users` matches
//!   `/api/users` and `/api/users/1`, never `/api/usersx`
//! - Only the leading occurrence is removed; the query string is never touched
//! - No regex to guarantee O(n) matching

/// Matches the request path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns what follows the prefix, or `None` if the path does not match.
    pub fn remainder<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        (rest.is_empty() || rest.starts_with('/')).then_some(rest)
    }

    /// Returns true if the path falls under this prefix.
    pub fn matches(&self, path: &str) -> bool {
        self.remainder(path).is_some()
    }

    /// Rewrite `path` for the upstream by removing the prefix once.
    pub fn rewrite<'a>(&self, path: &'a str) -> Option<&'a str> {
        self.remainder(path)
            .map(|rest| if rest.is_empty() { "/" } else { rest })
    }
}
