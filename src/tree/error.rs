//! Structural-invariant violations.
//!
//! These are NOT user-input diagnostics. They indicate that an
//! upstream component handed the tree layer a malformed structure, so
//! they unwind instead of being appended to the problem sink.

use thiserror::Error;

use crate::base::SourceSpan;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    /// A design layer child that is neither a specifier, a nested
    /// design layer, nor an instance.
    #[error("design layer contains an unexpected {found} child")]
    UnexpectedDesignLayerChild {
        found: &'static str,
        span: SourceSpan,
    },

    /// A factory node whose shape is not exactly one class reference.
    #[error("factory node must wrap exactly one class reference, found {child_count} children")]
    MalformedFactory {
        child_count: usize,
        span: SourceSpan,
    },
}
