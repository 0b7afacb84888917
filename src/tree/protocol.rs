//! The staged construction protocol.
//!
//! Every node built from a tag passes through the same four states:
//! `Created`, `AttributesProcessed`, `ChildrenProcessed`, `Complete`.
//! [`construct`] drives the walk; the per-kind behavior for each hook
//! lives in one exhaustive match here and dispatches into the
//! kind-specific modules.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::trace;

use crate::base::SourceSpan;
use crate::diagnostics::ProblemKind;
use crate::expr::SourceFragment;
use crate::project::QName;
use crate::tagmodel::{AttributeClass, AttributeData, TagData, TextData, TextKind, UnitData};

use super::builder::BuildCtx;
use super::node::{ExprType, Node, NodePayload};
use super::{containers, document, instance, service, value};

// ============================================================================
// CONSTRUCTION STATE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BuildState {
    Created,
    AttributesProcessed,
    ChildrenProcessed,
    Complete,
}

/// Mutable state for one node while it is being built. Consumed by
/// [`NodeConstruction::complete`]; nothing can mutate a node after
/// that.
pub(crate) struct NodeConstruction {
    state: BuildState,
    pub span: SourceSpan,
    pub class_reference: Option<QName>,
    pub valid: bool,
    pub children: Vec<Node>,
    /// Logical text accumulated for value resolution.
    pub fragments: Vec<SourceFragment>,
    /// Specifier names seen so far, for duplicate detection.
    pub specifier_names: FxHashSet<SmolStr>,
    pub id: Option<SmolStr>,
    /// `name` attribute, for definitions and operations.
    pub name: Option<SmolStr>,
    pub saw_name_attribute: bool,
    /// `type` attribute, for vectors.
    pub element_type: Option<QName>,
    pub saw_type_attribute: bool,
    pub root_attrs: RootAttrs,
}

/// Reserved root-tag attributes, gathered before finalization.
#[derive(Default)]
pub(crate) struct RootAttrs {
    pub frame_rate: Option<u32>,
    pub page_title: Option<String>,
    pub script_recursion_limit: Option<u32>,
    pub script_time_limit: Option<u32>,
}

impl NodeConstruction {
    pub fn new(span: SourceSpan) -> Self {
        Self {
            state: BuildState::Created,
            span,
            class_reference: None,
            valid: true,
            children: Vec::new(),
            fragments: Vec::new(),
            specifier_names: FxHashSet::default(),
            id: None,
            name: None,
            saw_name_attribute: false,
            element_type: None,
            saw_type_attribute: false,
            root_attrs: RootAttrs::default(),
        }
    }

    pub fn mark_invalid(&mut self) {
        self.valid = false;
    }

    pub fn add_child(&mut self, child: Node) {
        debug_assert!(self.state != BuildState::Complete);
        self.children.push(child);
    }

    /// Advance to the next protocol state. States only ever move
    /// forward, one step at a time.
    pub fn advance(&mut self, next: BuildState) {
        debug_assert!(matches!(
            (self.state, next),
            (BuildState::Created, BuildState::AttributesProcessed)
                | (BuildState::AttributesProcessed, BuildState::ChildrenProcessed)
                | (BuildState::ChildrenProcessed, BuildState::Complete)
        ));
        self.state = next;
    }

    /// Freeze this construction into an immutable node.
    pub fn complete(mut self, payload: NodePayload) -> Node {
        self.advance(BuildState::Complete);
        Node::new(
            self.span,
            self.class_reference,
            self.valid,
            self.children,
            payload,
        )
    }
}

// ============================================================================
// TAG CLASSIFICATION
// ============================================================================

/// What a tag's namespace-qualified name resolves to.
pub(crate) enum TagClass {
    Language(LanguageTag),
    Instance(QName),
    Unresolved,
    UnknownNamespace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LanguageTag {
    Boolean,
    Int,
    Uint,
    Number,
    String,
    RegExp,
    Function,
    Array,
    Vector,
    Object,
    Library,
    Definition,
    Private,
    DesignLayer,
}

pub(crate) fn classify_tag(cx: &BuildCtx<'_>, tag: &TagData) -> TagClass {
    let Some(ns) = tag.namespace.as_deref() else {
        return TagClass::UnknownNamespace;
    };
    if ns == cx.doc.language_namespace {
        match tag.name.as_str() {
            "Boolean" => TagClass::Language(LanguageTag::Boolean),
            "Int" => TagClass::Language(LanguageTag::Int),
            "UInt" => TagClass::Language(LanguageTag::Uint),
            "Number" => TagClass::Language(LanguageTag::Number),
            "String" => TagClass::Language(LanguageTag::String),
            "RegExp" => TagClass::Language(LanguageTag::RegExp),
            "Function" => TagClass::Language(LanguageTag::Function),
            "Array" => TagClass::Language(LanguageTag::Array),
            "Vector" => TagClass::Language(LanguageTag::Vector),
            "Object" => TagClass::Language(LanguageTag::Object),
            "Library" => TagClass::Language(LanguageTag::Library),
            "Definition" => TagClass::Language(LanguageTag::Definition),
            "Private" => TagClass::Language(LanguageTag::Private),
            "DesignLayer" => TagClass::Language(LanguageTag::DesignLayer),
            _ => TagClass::Unresolved,
        }
    } else {
        match cx.project.resolve_tag(ns, &tag.name) {
            Some(class) => TagClass::Instance(class.clone()),
            None => TagClass::Unresolved,
        }
    }
}

/// Which node a tag builds.
#[derive(Debug, Clone)]
pub(crate) enum ConstructKind {
    Document { class: Option<QName> },
    Instance { class: QName },
    /// A scalar language tag (`<Boolean>`, `<String>`, ...).
    Value { ty: ExprType },
    Array,
    Vector,
    Object,
    Library,
    Definition,
    Private,
    DesignLayer,
    /// The `request` child of a network-request service.
    Request,
    Operation { class: QName },
}

fn language_construct_kind(tag: LanguageTag) -> Option<ConstructKind> {
    let kind = match tag {
        LanguageTag::Boolean => ConstructKind::Value {
            ty: ExprType::Boolean,
        },
        LanguageTag::Int => ConstructKind::Value { ty: ExprType::Int },
        LanguageTag::Uint => ConstructKind::Value { ty: ExprType::Uint },
        LanguageTag::Number => ConstructKind::Value {
            ty: ExprType::Number,
        },
        LanguageTag::String => ConstructKind::Value {
            ty: ExprType::String,
        },
        LanguageTag::RegExp => ConstructKind::Value {
            ty: ExprType::RegExp,
        },
        LanguageTag::Function => ConstructKind::Value {
            ty: ExprType::Function,
        },
        LanguageTag::Array => ConstructKind::Array,
        LanguageTag::Vector => ConstructKind::Vector,
        LanguageTag::Object => ConstructKind::Object,
        LanguageTag::DesignLayer => ConstructKind::DesignLayer,
        LanguageTag::Library | LanguageTag::Definition | LanguageTag::Private => return None,
    };
    Some(kind)
}

/// Build a node from a tag in value position (a collection element, an
/// instance child, a definition body). Reports and returns `None` when
/// the tag resolves to nothing usable here.
pub(crate) fn build_unit_tag(cx: &mut BuildCtx<'_>, tag: &TagData) -> Option<Node> {
    match classify_tag(cx, tag) {
        TagClass::Instance(class) => Some(construct(cx, tag, ConstructKind::Instance { class })),
        TagClass::Language(lt) => match language_construct_kind(lt) {
            Some(kind) => Some(construct(cx, tag, kind)),
            None => {
                cx.problem(
                    ProblemKind::UnexpectedTag,
                    tag.span,
                    format!("tag <{}> is not allowed here", tag.name),
                );
                None
            }
        },
        TagClass::Unresolved => {
            cx.problem(
                ProblemKind::UnresolvedTag,
                tag.span,
                format!("tag <{}> does not resolve to a known class", tag.name),
            );
            None
        }
        TagClass::UnknownNamespace => {
            cx.problem(
                ProblemKind::UnknownNamespace,
                tag.span,
                format!("prefix of <{}> is not bound to a namespace", tag.name),
            );
            None
        }
    }
}

// ============================================================================
// THE DRIVER
// ============================================================================

/// Build one node from a tag, running the full protocol.
pub(crate) fn construct(cx: &mut BuildCtx<'_>, tag: &TagData, kind: ConstructKind) -> Node {
    trace!(tag = %tag.name, kind = ?kind, "constructing node");
    let mut ctx = NodeConstruction::new(tag.span);
    initialize(cx, &mut ctx, tag, &kind);

    for attr in &tag.attributes {
        match attr.classify(tag, &cx.doc.language_namespace) {
            AttributeClass::Namespace => namespace_attribute(cx, &mut ctx, attr),
            AttributeClass::Private => {
                cx.problem(
                    ProblemKind::PrivateAttribute,
                    attr.span,
                    format!("ignoring attribute '{}' in a foreign namespace", attr.name),
                );
            }
            AttributeClass::Ordinary => tag_attribute(cx, &mut ctx, tag, attr, &kind),
        }
    }
    ctx.advance(BuildState::AttributesProcessed);

    let accumulates_text = matches!(kind, ConstructKind::Value { .. });
    for unit in &tag.units {
        match unit {
            UnitData::Tag(child) => child_tag(cx, &mut ctx, tag, child, &kind),
            UnitData::Text(text) => {
                if text.kind == TextKind::Comment {
                    continue;
                }
                if text.is_whitespace() && !accumulates_text {
                    continue;
                }
                text_unit(cx, &mut ctx, text, &kind);
            }
        }
    }
    ctx.advance(BuildState::ChildrenProcessed);

    finalize(cx, ctx, tag, kind)
}

fn initialize(cx: &mut BuildCtx<'_>, ctx: &mut NodeConstruction, tag: &TagData, kind: &ConstructKind) {
    match kind {
        ConstructKind::Document { class } => {
            ctx.class_reference = class.clone();
            if class.is_none() {
                ctx.mark_invalid();
            }
        }
        ConstructKind::Instance { class } | ConstructKind::Operation { class } => {
            cx.note_instance_class(class, tag.span);
            ctx.class_reference = Some(class.clone());
        }
        ConstructKind::Value { ty } => {
            if *ty != ExprType::Other {
                ctx.class_reference = Some(QName::new(ty.display()));
            }
        }
        ConstructKind::Array => ctx.class_reference = Some(QName::new("Array")),
        ConstructKind::Vector => ctx.class_reference = Some(QName::new("Vector")),
        ConstructKind::Object => ctx.class_reference = Some(QName::new("Object")),
        ConstructKind::Library
        | ConstructKind::Definition
        | ConstructKind::Private
        | ConstructKind::DesignLayer
        | ConstructKind::Request => {}
    }
}

// ============================================================================
// ATTRIBUTE HOOKS
// ============================================================================

fn namespace_attribute(cx: &mut BuildCtx<'_>, ctx: &mut NodeConstruction, attr: &AttributeData) {
    // Binding a different revision of the language namespace than the
    // document declared is a versioning mistake worth flagging.
    let uri = attr.trimmed_value();
    if uri != cx.doc.language_namespace
        && uri.starts_with(super::LANGUAGE_NAMESPACE_FAMILY)
    {
        cx.problem(
            ProblemKind::OtherLanguageNamespace,
            attr.span,
            format!(
                "namespace '{uri}' is a different language version than '{}'",
                cx.doc.language_namespace
            ),
        );
        ctx.mark_invalid();
    }
}

pub(crate) fn unexpected_attribute(
    cx: &mut BuildCtx<'_>,
    tag: &TagData,
    attr: &AttributeData,
) {
    cx.problem(
        ProblemKind::UnexpectedAttribute,
        attr.span,
        format!("attribute '{}' is not allowed on <{}>", attr.name, tag.name),
    );
}

fn tag_attribute(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    tag: &TagData,
    attr: &AttributeData,
    kind: &ConstructKind,
) {
    match kind {
        ConstructKind::Document { class } => {
            document::attribute(cx, ctx, class.as_ref(), tag, attr);
        }
        ConstructKind::Instance { class } => {
            instance::attribute(cx, ctx, class, tag, attr);
        }
        ConstructKind::Value { .. } | ConstructKind::Array | ConstructKind::Object => {
            if attr.prefix.is_none() && attr.name == "id" {
                instance::id_attribute(cx, ctx, attr);
            } else {
                unexpected_attribute(cx, tag, attr);
            }
        }
        // A design layer is an instance of the well-known layer class;
        // its declared properties are settable as attributes.
        ConstructKind::DesignLayer => {
            let class = cx.project.well_known().design_layer.clone();
            instance::attribute(cx, ctx, &class, tag, attr);
        }
        ConstructKind::Vector => containers::vector_attribute(cx, ctx, tag, attr),
        ConstructKind::Library | ConstructKind::Private | ConstructKind::Request => {
            unexpected_attribute(cx, tag, attr);
        }
        ConstructKind::Definition => containers::definition_attribute(cx, ctx, tag, attr),
        ConstructKind::Operation { class } => {
            service::operation_attribute(cx, ctx, class, tag, attr);
        }
    }
}

// ============================================================================
// CHILD HOOKS
// ============================================================================

fn child_tag(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    tag: &TagData,
    child: &TagData,
    kind: &ConstructKind,
) {
    match kind {
        // Private content is carried in the document but never built.
        ConstructKind::Private => {}
        // Request children become members of the implicit object,
        // built in one pass at finalization.
        ConstructKind::Request => {}
        ConstructKind::Library => containers::library_child(cx, ctx, child),
        ConstructKind::Definition => containers::definition_child(cx, ctx, child),
        ConstructKind::DesignLayer => containers::design_layer_child(cx, ctx, child),
        ConstructKind::Array | ConstructKind::Vector => {
            containers::collection_child(cx, ctx, child);
        }
        ConstructKind::Object => containers::object_member(cx, ctx, child),
        ConstructKind::Value { .. } => {
            cx.problem(
                ProblemKind::UnexpectedTag,
                child.span,
                format!("tag <{}> is not allowed inside <{}>", child.name, tag.name),
            );
            ctx.mark_invalid();
        }
        ConstructKind::Document { class } => {
            if let TagClass::Language(lt) = classify_tag(cx, child) {
                match lt {
                    LanguageTag::Library => {
                        ctx.add_child(construct(cx, child, ConstructKind::Library));
                        return;
                    }
                    LanguageTag::Private => {
                        ctx.add_child(construct(cx, child, ConstructKind::Private));
                        return;
                    }
                    LanguageTag::Definition => {
                        cx.problem(
                            ProblemKind::UnexpectedTag,
                            child.span,
                            format!("<{}> must appear inside <Library>", child.name),
                        );
                        return;
                    }
                    _ => {}
                }
            }
            instance::child_tag(cx, ctx, class.as_ref(), tag, child);
        }
        ConstructKind::Instance { class } | ConstructKind::Operation { class } => {
            if let TagClass::Language(
                LanguageTag::Library | LanguageTag::Private | LanguageTag::Definition,
            ) = classify_tag(cx, child)
            {
                cx.problem(
                    ProblemKind::UnexpectedTag,
                    child.span,
                    format!("tag <{}> is only allowed on the document root", child.name),
                );
                return;
            }
            instance::child_tag(cx, ctx, Some(class), tag, child);
        }
    }
}

fn text_unit(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    text: &TextData,
    kind: &ConstructKind,
) {
    match kind {
        ConstructKind::Value { .. } => {
            ctx.fragments
                .push(SourceFragment::new(text.text.clone(), text.span));
        }
        ConstructKind::Private | ConstructKind::Request => {}
        _ => {
            cx.problem(
                ProblemKind::UnexpectedText,
                text.span,
                "text is not allowed here".to_string(),
            );
        }
    }
}

// ============================================================================
// FINALIZATION
// ============================================================================

fn finalize(
    cx: &mut BuildCtx<'_>,
    mut ctx: NodeConstruction,
    tag: &TagData,
    kind: ConstructKind,
) -> Node {
    match kind {
        ConstructKind::Document { .. } => document::finalize(ctx),
        ConstructKind::Instance { .. } => {
            let id = ctx.id.take();
            ctx.complete(NodePayload::Instance { id })
        }
        ConstructKind::Value { ty } => {
            let fragments = std::mem::take(&mut ctx.fragments);
            let resolved = value::resolve_value(cx, &mut ctx, ty, &fragments, tag.span);
            let id = ctx.id.take();
            ctx.complete(NodePayload::Expression {
                type_tag: ty,
                id,
                value: resolved,
            })
        }
        ConstructKind::Array => {
            let id = ctx.id.take();
            ctx.complete(NodePayload::Array { id })
        }
        ConstructKind::Vector => containers::finalize_vector(cx, ctx, tag),
        ConstructKind::Object => {
            let id = ctx.id.take();
            ctx.complete(NodePayload::Object { id })
        }
        ConstructKind::Library => ctx.complete(NodePayload::Library),
        ConstructKind::Definition => containers::finalize_definition(cx, ctx, tag),
        ConstructKind::Private => ctx.complete(NodePayload::Private),
        ConstructKind::DesignLayer => {
            let id = ctx.id.take();
            ctx.complete(NodePayload::DesignLayer { id })
        }
        ConstructKind::Request => service::finalize_request(cx, ctx, tag),
        ConstructKind::Operation { .. } => service::finalize_operation(cx, ctx, tag),
    }
}
