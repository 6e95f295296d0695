//! Route policy: forward or block per path.
//!
//! # Responsibilities
//! - Store the compiled whitelist
//! - Resolve a path to a [`Disposition`]
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan over ~35 entries, first match wins
//! - Write mode is all-or-nothing: the whitelist is bypassed entirely
//! - Paths are not normalized, so any `.` or `..` segment blocks in
//!   read-only mode; `/inc/../cell/replace` must not ride the `/inc/` prefix

use crate::routing::matcher::{ExactPath, PathMatcher, PathPrefix};
use crate::routing::whitelist::{FORWARD_PATHS, FORWARD_PREFIXES};

/// Routing decision for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Pass through to the backend.
    Forward,
    /// Reject with the fixed 1009 message.
    Block,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Forward => "forward",
            Disposition::Block => "block",
        }
    }
}

/// Immutable path whitelist plus the fallback disposition.
#[derive(Debug)]
pub struct RoutePolicy {
    entries: Vec<Box<dyn PathMatcher>>,
    fallback: Disposition,
}

impl RoutePolicy {
    /// Build the policy for the built-in OLAP whitelist.
    pub fn new(enable_write: bool) -> Self {
        let mut entries: Vec<Box<dyn PathMatcher>> = Vec::new();
        for path in FORWARD_PATHS {
            entries.push(Box::new(ExactPath::new(*path)));
        }
        for prefix in FORWARD_PREFIXES {
            entries.push(Box::new(PathPrefix::new(*prefix)));
        }
        Self::with_entries(entries, enable_write)
    }

    /// Build a policy from arbitrary matchers.
    pub fn with_entries(entries: Vec<Box<dyn PathMatcher>>, enable_write: bool) -> Self {
        let fallback = if enable_write {
            Disposition::Forward
        } else {
            Disposition::Block
        };
        Self { entries, fallback }
    }

    /// Resolve the disposition for a request path.
    pub fn resolve(&self, path: &str) -> Disposition {
        if self.fallback == Disposition::Forward {
            return Disposition::Forward;
        }
        if has_dot_segment(path) {
            return Disposition::Block;
        }
        if self.entries.iter().any(|m| m.matches(path)) {
            Disposition::Forward
        } else {
            self.fallback
        }
    }

    /// Number of whitelist entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// True when a `/`-separated segment is `.` or `..`.
fn has_dot_segment(path: &str) -> bool {
    path.split('/').any(|segment| segment == "." || segment == "..")
}
