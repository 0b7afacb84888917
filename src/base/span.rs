//! Source spans — a byte range within one file.

use text_size::{TextRange, TextSize};

use super::FileId;

/// A byte range within a single source file.
///
/// Every tag, attribute, text run, and constructed node carries one of
/// these. Spans for implicit nodes (e.g. synthesized imports) are
/// copied from the construct that caused them to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceSpan {
    pub file: FileId,
    pub range: TextRange,
}

impl SourceSpan {
    pub fn new(file: FileId, range: TextRange) -> Self {
        Self { file, range }
    }

    /// A zero-width span at the given offset.
    pub fn empty(file: FileId, offset: TextSize) -> Self {
        Self {
            file,
            range: TextRange::empty(offset),
        }
    }

    /// A span covering both `self` and `other`.
    ///
    /// Both spans must come from the same file.
    pub fn cover(&self, other: SourceSpan) -> SourceSpan {
        debug_assert_eq!(self.file, other.file);
        SourceSpan {
            file: self.file,
            range: self.range.cover(other.range),
        }
    }

    pub fn start(&self) -> TextSize {
        self.range.start()
    }

    pub fn end(&self) -> TextSize {
        self.range.end()
    }
}
