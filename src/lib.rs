//! # arbor-base
//!
//! Core library for UIML document parsing, typed AST construction, and
//! dependency tracking.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! tree        → node hierarchy, construction protocol, specializations
//!   ↓
//! expr        → expression sub-trees, literals, data-binding scanner
//!   ↓
//! project     → tag manifest, qualified names, dependency registry
//!   ↓
//! diagnostics → compiler problem records and the problem sink
//!   ↓
//! tagmodel    → read-only tag/unit/attribute model, XML reader
//!   ↓
//! base        → primitives (FileId, SourceSpan, TextRange)
//! ```

// ============================================================================
// MODULES (dependency order: base → tagmodel → diagnostics → project → expr → tree)
// ============================================================================

/// Foundation types: FileId, SourceSpan, TextRange
pub mod base;

/// Tag model: immutable document/tag/attribute/text units, XML reader
pub mod tagmodel;

/// Diagnostics: problem kinds, problem records, the appendable sink
pub mod diagnostics;

/// Project: tag manifest, class properties, well-known runtime classes,
/// expression-dependency registry
pub mod project;

/// Expressions: literal values, expression trees, lexer/parser,
/// data-binding detection
pub mod expr;

/// Tree: node hierarchy and the tag-to-node construction protocol
pub mod tree;

// Re-export foundation types
pub use base::{FileId, SourceSpan, TextRange, TextSize};

// Re-export the most commonly needed surface
pub use diagnostics::{Diagnostics, Problem, ProblemKind};
pub use project::{Project, QName};
pub use tree::{BuiltDocument, Node, NodeKind, StructuralError, TreeBuilder, build_documents};
