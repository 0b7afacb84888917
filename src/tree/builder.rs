//! The per-document tree builder.
//!
//! One [`TreeBuilder`] builds one document against a shared
//! [`Project`]; [`build_documents`] fans a batch out across threads.
//! Resolution against the project is read-only and dependency
//! registration is an atomic append, so builders never observe each
//! other.

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::debug;

use crate::base::SourceSpan;
use crate::diagnostics::{Diagnostics, Problem, ProblemKind};
use crate::project::{Project, QName};
use crate::tagmodel::TagDocument;

use super::node::{Node, NodePayload};
use super::protocol::{self, ConstructKind, TagClass};

/// The result of building one document.
#[derive(Debug)]
pub struct BuiltDocument {
    pub root: Node,
    /// One synthesized import per distinct class the document
    /// instantiates, in first-use order. These are NOT children of the
    /// root; child counts and child order reflect source tags only.
    pub implicit_imports: Vec<Node>,
}

/// Builds the typed tree for one document.
pub struct TreeBuilder<'a> {
    project: &'a Project,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(project: &'a Project, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            project,
            diagnostics,
        }
    }

    /// Build the tree for `document`.
    ///
    /// Recoverable problems land in the diagnostics sink and mark the
    /// offending nodes invalid for code generation; the walk always
    /// finishes and always yields a root node.
    pub fn build(self, document: &TagDocument) -> BuiltDocument {
        debug!(file = ?document.file, root = %document.root.name, "building document tree");
        let mut cx = BuildCtx {
            project: self.project,
            diagnostics: self.diagnostics,
            doc: document,
            implicit_imports: Vec::new(),
            imported: FxHashSet::default(),
        };

        let root_tag = &document.root;
        let class = match protocol::classify_tag(&cx, root_tag) {
            TagClass::Instance(class) => Some(class),
            TagClass::Language(_) | TagClass::Unresolved => {
                cx.problem(
                    ProblemKind::UnresolvedTag,
                    root_tag.span,
                    format!(
                        "root tag <{}> does not resolve to a component class",
                        root_tag.name
                    ),
                );
                None
            }
            TagClass::UnknownNamespace => {
                cx.problem(
                    ProblemKind::UnknownNamespace,
                    root_tag.span,
                    format!("prefix of <{}> is not bound to a namespace", root_tag.name),
                );
                None
            }
        };

        let root = protocol::construct(&mut cx, root_tag, ConstructKind::Document { class });
        debug!(
            problems = cx.diagnostics.len(),
            imports = cx.implicit_imports.len(),
            "document tree complete"
        );
        BuiltDocument {
            root,
            implicit_imports: cx.implicit_imports,
        }
    }
}

/// Build a batch of documents in parallel against one shared project.
///
/// Output order matches input order regardless of scheduling.
pub fn build_documents(
    project: &Project,
    documents: &[TagDocument],
) -> Vec<(BuiltDocument, Diagnostics)> {
    documents
        .par_iter()
        .map(|document| {
            let mut diagnostics = Diagnostics::new();
            let built = TreeBuilder::new(project, &mut diagnostics).build(document);
            (built, diagnostics)
        })
        .collect()
}

// ============================================================================
// BUILD CONTEXT
// ============================================================================

/// Everything the construction hooks share for one document build.
pub(crate) struct BuildCtx<'a> {
    pub project: &'a Project,
    pub diagnostics: &'a mut Diagnostics,
    pub doc: &'a TagDocument,
    pub implicit_imports: Vec<Node>,
    imported: FxHashSet<QName>,
}

impl BuildCtx<'_> {
    pub fn problem(&mut self, kind: ProblemKind, span: SourceSpan, message: String) {
        self.diagnostics.report(Problem::new(kind, span, message));
    }

    /// Record that the document references `class`: registers the
    /// code-generation dependency on the project and synthesizes the
    /// implicit import node the first time the class is seen.
    pub fn note_instance_class(&mut self, class: &QName, span: SourceSpan) {
        self.project.add_expression_dependency(class.clone());
        if self.imported.insert(class.clone()) {
            self.implicit_imports.push(Node::new(
                span,
                Some(class.clone()),
                true,
                Vec::new(),
                NodePayload::ImplicitImport {
                    name: SmolStr::new(class.as_str()),
                },
            ));
        }
    }
}
