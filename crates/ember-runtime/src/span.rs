//! Source spans
//!
//! Byte ranges into the original source text. Tokens carry one so parse
//! errors can point back at the offending text.

use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)` in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Placeholder span for tokens that did not come from source text
    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True if the span covers no bytes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dummy_is_empty() {
        assert!(Span::dummy().is_empty());
        assert_eq!(Span::new(3, 7).len(), 4);
    }
}
