//! Container tags: collections, libraries, definitions, design
//! layers, factories, and implicit objects.

use smol_str::SmolStr;

use crate::base::SourceSpan;
use crate::diagnostics::ProblemKind;
use crate::expr::SourceFragment;
use crate::project::QName;
use crate::tagmodel::{AttributeClass, AttributeData, TagData, TextKind, UnitData};

use super::builder::BuildCtx;
use super::error::StructuralError;
use super::node::{ExprType, Node, NodeKind, NodePayload};
use super::protocol::{
    self, BuildState, ConstructKind, LanguageTag, NodeConstruction, TagClass,
};
use super::{instance, value};

// ============================================================================
// COLLECTIONS
// ============================================================================

pub(crate) fn collection_child(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    child: &TagData,
) {
    match protocol::build_unit_tag(cx, child) {
        Some(node) => ctx.add_child(node),
        None => ctx.mark_invalid(),
    }
}

pub(crate) fn vector_attribute(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    tag: &TagData,
    attr: &AttributeData,
) {
    if attr.prefix.is_some() {
        protocol::unexpected_attribute(cx, tag, attr);
        return;
    }
    match attr.name.as_str() {
        "id" => instance::id_attribute(cx, ctx, attr),
        "type" => {
            ctx.saw_type_attribute = true;
            let name = attr.trimmed_value();
            if name.is_empty() {
                cx.problem(
                    ProblemKind::EmptyAttribute,
                    attr.span,
                    "attribute 'type' is empty".to_string(),
                );
                ctx.mark_invalid();
            } else {
                let element_type = QName::new(name);
                cx.note_instance_class(&element_type, attr.span);
                ctx.element_type = Some(element_type);
            }
        }
        _ => protocol::unexpected_attribute(cx, tag, attr),
    }
}

pub(crate) fn finalize_vector(
    cx: &mut BuildCtx<'_>,
    mut ctx: NodeConstruction,
    tag: &TagData,
) -> Node {
    if !ctx.saw_type_attribute {
        cx.problem(
            ProblemKind::RequiredAttributeMissing,
            tag.span,
            format!("<{}> requires a 'type' attribute", tag.name),
        );
        ctx.mark_invalid();
    }
    let id = ctx.id.take();
    let element_type = ctx.element_type.take();
    ctx.complete(NodePayload::Vector { id, element_type })
}

// ============================================================================
// LIBRARY / DEFINITION / PRIVATE
// ============================================================================

pub(crate) fn library_child(cx: &mut BuildCtx<'_>, ctx: &mut NodeConstruction, child: &TagData) {
    match protocol::classify_tag(cx, child) {
        TagClass::Language(LanguageTag::Definition) => {
            ctx.add_child(protocol::construct(cx, child, ConstructKind::Definition));
        }
        _ => {
            cx.problem(
                ProblemKind::UnexpectedTag,
                child.span,
                format!("<Library> only holds <Definition> tags, found <{}>", child.name),
            );
            ctx.mark_invalid();
        }
    }
}

pub(crate) fn definition_attribute(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    tag: &TagData,
    attr: &AttributeData,
) {
    if attr.prefix.is_none() && attr.name == "name" {
        ctx.saw_name_attribute = true;
        let name = attr.trimmed_value();
        if name.is_empty() {
            cx.problem(
                ProblemKind::EmptyAttribute,
                attr.span,
                "attribute 'name' is empty".to_string(),
            );
            ctx.mark_invalid();
        } else if !crate::expr::is_valid_identifier(name) {
            cx.problem(
                ProblemKind::InvalidIdentifierName,
                attr.span,
                format!("'{name}' is not a valid definition name"),
            );
            ctx.mark_invalid();
        } else {
            ctx.name = Some(SmolStr::new(name));
        }
        return;
    }
    protocol::unexpected_attribute(cx, tag, attr);
}

pub(crate) fn definition_child(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    child: &TagData,
) {
    // One definition, one root tag.
    if !ctx.children.is_empty() {
        cx.problem(
            ProblemKind::UnexpectedTag,
            child.span,
            "a definition holds a single root tag".to_string(),
        );
        ctx.mark_invalid();
        return;
    }
    match protocol::build_unit_tag(cx, child) {
        Some(node) => ctx.add_child(node),
        None => ctx.mark_invalid(),
    }
}

pub(crate) fn finalize_definition(
    cx: &mut BuildCtx<'_>,
    mut ctx: NodeConstruction,
    tag: &TagData,
) -> Node {
    if !ctx.saw_name_attribute {
        cx.problem(
            ProblemKind::RequiredAttributeMissing,
            tag.span,
            format!("<{}> requires a 'name' attribute", tag.name),
        );
        ctx.mark_invalid();
    }
    let name = ctx.name.take();
    ctx.complete(NodePayload::Definition { name })
}

// ============================================================================
// DESIGN LAYERS
// ============================================================================

pub(crate) fn design_layer_child(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    child: &TagData,
) {
    if let TagClass::Language(LanguageTag::DesignLayer) = protocol::classify_tag(cx, child) {
        ctx.add_child(protocol::construct(cx, child, ConstructKind::DesignLayer));
        return;
    }
    match protocol::build_unit_tag(cx, child) {
        Some(node) => ctx.add_child(node),
        None => ctx.mark_invalid(),
    }
}

impl Node {
    /// The number of children this design layer contributes to its
    /// parent's hoisted view: instances count one each, nested layers
    /// flatten to their own hoisted counts, and property specifiers
    /// configure the layer without being hoisted.
    pub fn hoisted_child_count(&self) -> Result<u32, StructuralError> {
        let mut count = 0u32;
        for child in self.children() {
            match child.kind() {
                NodeKind::PropertySpecifier => {}
                NodeKind::DesignLayer => count += child.hoisted_child_count()?,
                NodeKind::Instance
                | NodeKind::Boolean
                | NodeKind::Int
                | NodeKind::Uint
                | NodeKind::Number
                | NodeKind::String
                | NodeKind::RegExp
                | NodeKind::Function
                | NodeKind::Array
                | NodeKind::Vector
                | NodeKind::Object
                | NodeKind::Expression => count += 1,
                other => {
                    return Err(StructuralError::UnexpectedDesignLayerChild {
                        found: other.display(),
                        span: child.span(),
                    });
                }
            }
        }
        Ok(count)
    }

    /// Whether code generation can skip materializing this design
    /// layer. A layer nobody can address (no `id`) and that sets no
    /// properties exists only to group its children.
    pub fn skips_codegen(&self) -> bool {
        self.kind() == NodeKind::DesignLayer
            && self.id().is_none()
            && !self
                .children()
                .iter()
                .any(|c| c.kind() == NodeKind::PropertySpecifier)
    }

    /// The class a factory node instantiates, read from its single
    /// class-reference child.
    pub fn factory_generator(&self) -> Result<&QName, StructuralError> {
        if self.child_count() != 1 {
            return Err(StructuralError::MalformedFactory {
                child_count: self.child_count(),
                span: self.span(),
            });
        }
        let child = self.child(0);
        match (child.kind(), child.class_reference()) {
            (NodeKind::ClassReference, Some(class)) => Ok(class),
            _ => Err(StructuralError::MalformedFactory {
                child_count: 1,
                span: self.span(),
            }),
        }
    }
}

// ============================================================================
// FACTORIES
// ============================================================================

/// Build a factory node for a factory-typed property value naming
/// `generator` as the class to instantiate.
pub(crate) fn build_factory(cx: &mut BuildCtx<'_>, generator: &str, span: SourceSpan) -> Node {
    let factory_class = cx.project.well_known().factory_class.clone();
    let generator_class = QName::new(generator);
    cx.note_instance_class(&factory_class, span);
    cx.note_instance_class(&generator_class, span);

    let class_reference = Node::new(
        span,
        Some(generator_class),
        true,
        Vec::new(),
        NodePayload::ClassReference,
    );
    Node::new(
        span,
        Some(factory_class),
        true,
        vec![class_reference],
        NodePayload::Factory,
    )
}

// ============================================================================
// IMPLICIT OBJECTS
// ============================================================================

/// Build an object node from an externally supplied unit list (the
/// body of a request tag or of an Object-typed property). Each child
/// tag becomes a named member.
pub(crate) fn build_object(
    cx: &mut BuildCtx<'_>,
    units: &[UnitData],
    span: SourceSpan,
) -> Node {
    let mut ctx = NodeConstruction::new(span);
    ctx.class_reference = Some(QName::new("Object"));
    // Externally supplied units carry no attributes of their own.
    ctx.advance(BuildState::AttributesProcessed);
    for unit in units {
        match unit {
            UnitData::Tag(tag) => object_member(cx, &mut ctx, tag),
            UnitData::Text(text) => {
                if text.kind != TextKind::Comment && !text.is_whitespace() {
                    cx.problem(
                        ProblemKind::UnexpectedText,
                        text.span,
                        "text is not allowed between object members".to_string(),
                    );
                }
            }
        }
    }
    ctx.advance(BuildState::ChildrenProcessed);
    ctx.complete(NodePayload::Object { id: None })
}

/// One member of an implicit object: a specifier named after the tag,
/// holding either a nested object or a string-typed value.
pub(crate) fn object_member(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    tag: &TagData,
) {
    if !ctx.specifier_names.insert(tag.name.clone()) {
        cx.problem(
            ProblemKind::DuplicateSpecifier,
            tag.span,
            format!("member '{}' is specified more than once", tag.name),
        );
        ctx.mark_invalid();
        return;
    }

    let mut member = NodeConstruction::new(tag.span);
    for attr in &tag.attributes {
        if attr.classify(tag, &cx.doc.language_namespace) == AttributeClass::Ordinary {
            protocol::unexpected_attribute(cx, tag, attr);
        }
    }
    member.advance(BuildState::AttributesProcessed);

    if tag.child_tags().next().is_some() {
        member.add_child(build_object(cx, &tag.units, tag.span));
    } else {
        let fragments: Vec<SourceFragment> = tag
            .units
            .iter()
            .filter_map(|unit| match unit {
                UnitData::Text(text) if text.kind != TextKind::Comment => {
                    Some(SourceFragment::new(text.text.clone(), text.span))
                }
                _ => None,
            })
            .collect();
        let node = value::build_value_node(cx, ExprType::String, &fragments, tag.span, None);
        if !node.is_valid_for_codegen() {
            member.mark_invalid();
        }
        member.add_child(node);
    }
    member.advance(BuildState::ChildrenProcessed);

    let node = member.complete(NodePayload::PropertySpecifier {
        name: tag.name.clone(),
    });
    if !node.is_valid_for_codegen() {
        ctx.mark_invalid();
    }
    ctx.add_child(node);
}
