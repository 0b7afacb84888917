//! Foundation types for the arbor toolchain.
//!
//! This module provides fundamental types used throughout the compiler:
//! - [`FileId`] - Interned file identifiers
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`SourceSpan`] - A byte range within one file
//!
//! This module has NO dependencies on other arbor modules.

mod file_id;
mod span;

pub use file_id::FileId;
pub use span::SourceSpan;

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
