//! Interned file identifiers.

/// A compact identifier for a source file.
///
/// Documents are registered with the caller's file table; the tree
/// builder only ever copies the id around, so equality and hashing are
/// cheap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u32);

impl FileId {
    /// Create a file id from a raw index.
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw index.
    pub fn raw(&self) -> u32 {
        self.0
    }
}
