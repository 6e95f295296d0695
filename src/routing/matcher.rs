//! Path matching logic.
//!
//! # Responsibilities
//! - Match a path exactly (case-sensitive, slash-sensitive)
//! - Match a path prefix (case-sensitive)
//!
//! # Design Decisions
//! - No normalization: the path is compared as it arrives
//! - No regex

/// Trait for matching request paths against a whitelist entry.
pub trait PathMatcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this entry.
    fn matches(&self, path: &str) -> bool;
}

/// Matches one literal path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactPath {
    path: String,
}

impl ExactPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }
}

impl PathMatcher for ExactPath {
    fn matches(&self, path: &str) -> bool {
        path == self.path
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefix {
    prefix: String,
}

impl PathPrefix {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl PathMatcher for PathPrefix {
    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_path() {
        let matcher = ExactPath::new("/cube/info");
        assert!(matcher.matches("/cube/info"));
        assert!(!matcher.matches("/cube/info/")); // slash-sensitive
        assert!(!matcher.matches("/Cube/Info")); // case-sensitive
        assert!(!matcher.matches("/cube/infos"));
        assert!(!matcher.matches("/cube"));
    }

    #[test]
    fn test_path_prefix() {
        let matcher = PathPrefix::new("/inc/");
        assert!(matcher.matches("/inc/"));
        assert!(matcher.matches("/inc/anything/here"));
        assert!(!matcher.matches("/inc"));
        assert!(!matcher.matches("/INC/x"));
        assert!(!matcher.matches("/include"));
    }
}
