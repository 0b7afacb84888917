//! Tree construction — the typed AST and the builder that produces it
//! from the tag model.
//!
//! [`TreeBuilder`] walks a [`crate::tagmodel::TagDocument`] and builds
//! one [`Node`] tree, resolving tags and properties against a shared
//! [`crate::project::Project`], reporting recoverable problems into a
//! [`crate::diagnostics::Diagnostics`] sink, and registering
//! code-generation dependencies as it goes. Construction always
//! finishes; only structural-invariant violations
//! ([`StructuralError`]) unwind, and those indicate a malformed tree,
//! not bad input.

mod builder;
mod containers;
mod directive;
mod document;
mod error;
mod instance;
mod node;
mod protocol;
mod service;
mod value;

pub use builder::{BuiltDocument, TreeBuilder, build_documents};
pub use error::StructuralError;
pub use node::{DocumentPayload, ExprType, ExprValue, Node, NodeKind, NodePayload};

/// Prefix shared by every revision of the language namespace, used to
/// spot declarations of a mismatched language version.
pub(crate) const LANGUAGE_NAMESPACE_FAMILY: &str = "http://ns.arbor.dev/uiml/";
