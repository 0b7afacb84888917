//! Instance tags and their property specifiers.
//!
//! An instance tag's attributes and child tags that name declared
//! properties of its class become property-specifier children, each
//! wrapping the node for the supplied value. Everything else falls
//! through to nested instances or problems.

use crate::base::SourceSpan;
use crate::diagnostics::ProblemKind;
use crate::expr::{SourceFragment, is_valid_identifier};
use crate::project::QName;
use crate::tagmodel::{AttributeClass, AttributeData, TagData, TextKind, UnitData, is_whitespace, trim};

use super::builder::BuildCtx;
use super::node::{ExprType, NodePayload};
use super::protocol::{self, BuildState, NodeConstruction};
use super::{containers, service, value};

// ============================================================================
// ATTRIBUTES
// ============================================================================

/// Validate and record an `id` attribute.
pub(crate) fn id_attribute(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    attr: &AttributeData,
) {
    let id = attr.trimmed_value();
    if id.is_empty() {
        cx.problem(
            ProblemKind::EmptyAttribute,
            attr.span,
            "attribute 'id' is empty".to_string(),
        );
        ctx.mark_invalid();
    } else if !is_valid_identifier(id) {
        cx.problem(
            ProblemKind::InvalidIdentifierName,
            attr.span,
            format!("'{id}' is not a valid identifier"),
        );
        ctx.mark_invalid();
    } else {
        ctx.id = Some(id.into());
    }
}

pub(crate) fn attribute(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    class: &QName,
    tag: &TagData,
    attr: &AttributeData,
) {
    if attr.prefix.is_none() && attr.name == "id" {
        id_attribute(cx, ctx, attr);
        return;
    }
    if cx.project.class_has_property(class, &attr.name) {
        specifier_from_attribute(cx, ctx, class, attr);
        return;
    }
    protocol::unexpected_attribute(cx, tag, attr);
}

fn specifier_from_attribute(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    class: &QName,
    attr: &AttributeData,
) {
    if !ctx.specifier_names.insert(attr.name.clone()) {
        cx.problem(
            ProblemKind::DuplicateSpecifier,
            attr.span,
            format!("property '{}' is specified more than once", attr.name),
        );
        ctx.mark_invalid();
        return;
    }

    let project = cx.project;
    let property_type = project.property_type(class, &attr.name).cloned();

    let mut spec = NodeConstruction::new(attr.span);
    spec.advance(BuildState::AttributesProcessed);

    if property_type.as_ref() == Some(&project.well_known().factory_interface) {
        factory_child(cx, &mut spec, attr.trimmed_value(), attr.span);
    } else {
        let ty = property_type
            .as_ref()
            .map(|q| ExprType::from_type_name(q.local_name()))
            .unwrap_or(ExprType::Other);
        let fragments = [SourceFragment::new(attr.raw_value.clone(), attr.span)];
        let child = value::build_value_node(cx, ty, &fragments, attr.span, property_type);
        if !child.is_valid_for_codegen() {
            spec.mark_invalid();
        }
        spec.add_child(child);
    }

    spec.advance(BuildState::ChildrenProcessed);
    let node = spec.complete(NodePayload::PropertySpecifier {
        name: attr.name.clone(),
    });
    if !node.is_valid_for_codegen() {
        ctx.mark_invalid();
    }
    ctx.add_child(node);
}

// ============================================================================
// CHILD TAGS
// ============================================================================

pub(crate) fn child_tag(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    class: Option<&QName>,
    tag: &TagData,
    child: &TagData,
) {
    if let Some(class) = class {
        if service::try_specialize(cx, ctx, class, tag, child) {
            return;
        }
        if child.namespace == tag.namespace && cx.project.class_has_property(class, &child.name) {
            specifier_from_tag(cx, ctx, class, child);
            return;
        }
    }
    match protocol::build_unit_tag(cx, child) {
        Some(node) => ctx.add_child(node),
        None => ctx.mark_invalid(),
    }
}

pub(crate) fn specifier_from_tag(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    class: &QName,
    child: &TagData,
) {
    if !ctx.specifier_names.insert(child.name.clone()) {
        cx.problem(
            ProblemKind::DuplicateSpecifier,
            child.span,
            format!("property '{}' is specified more than once", child.name),
        );
        ctx.mark_invalid();
        return;
    }

    let project = cx.project;
    let property_type = project.property_type(class, &child.name).cloned();

    let mut spec = NodeConstruction::new(child.span);
    // A property tag names a property; its own attributes carry
    // nothing.
    for attr in &child.attributes {
        match attr.classify(child, &cx.doc.language_namespace) {
            AttributeClass::Namespace => {}
            AttributeClass::Private => {
                cx.problem(
                    ProblemKind::PrivateAttribute,
                    attr.span,
                    format!("ignoring attribute '{}' in a foreign namespace", attr.name),
                );
            }
            AttributeClass::Ordinary => {
                protocol::unexpected_attribute(cx, child, attr);
            }
        }
    }
    spec.advance(BuildState::AttributesProcessed);

    specifier_value(cx, &mut spec, &property_type, child);
    spec.advance(BuildState::ChildrenProcessed);

    let node = spec.complete(NodePayload::PropertySpecifier {
        name: child.name.clone(),
    });
    if !node.is_valid_for_codegen() {
        ctx.mark_invalid();
    }
    ctx.add_child(node);
}

/// Fill in the value child(ren) of a property specifier from the
/// property tag's content.
fn specifier_value(
    cx: &mut BuildCtx<'_>,
    spec: &mut NodeConstruction,
    property_type: &Option<QName>,
    child: &TagData,
) {
    let project = cx.project;

    if property_type.as_ref() == Some(&project.well_known().factory_interface) {
        let text: String = text_fragments(child)
            .iter()
            .map(|f| f.text.as_str())
            .collect();
        factory_child(cx, spec, trim(&text), child.span);
        return;
    }

    let has_child_tags = child.child_tags().next().is_some();

    // An Object-typed property whose child tags are bare member names
    // (no namespace) takes them as members of one implicit object.
    // Namespaced children resolve as ordinary value tags instead.
    if has_child_tags
        && property_type
            .as_ref()
            .is_some_and(|q| q.local_name() == "Object")
        && child.child_tags().all(|t| t.namespace.is_none())
    {
        spec.add_child(containers::build_object(cx, &child.units, child.span));
        return;
    }

    if has_child_tags {
        for unit in &child.units {
            match unit {
                UnitData::Tag(tag) => match protocol::build_unit_tag(cx, tag) {
                    Some(node) => spec.add_child(node),
                    None => spec.mark_invalid(),
                },
                UnitData::Text(text) => {
                    if text.kind != TextKind::Comment && !text.is_whitespace() {
                        cx.problem(
                            ProblemKind::UnexpectedText,
                            text.span,
                            "text is not allowed next to value tags".to_string(),
                        );
                    }
                }
            }
        }
        return;
    }

    let fragments = text_fragments(child);
    let ty = property_type
        .as_ref()
        .map(|q| ExprType::from_type_name(q.local_name()))
        .unwrap_or(ExprType::Other);
    let node = value::build_value_node(cx, ty, &fragments, child.span, property_type.clone());
    if !node.is_valid_for_codegen() {
        spec.mark_invalid();
    }
    spec.add_child(node);
}

/// Non-comment text content of a tag, as resolution fragments. A tag
/// holding only whitespace counts as holding nothing.
fn text_fragments(tag: &TagData) -> Vec<SourceFragment> {
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
    if fragments.iter().all(|f| is_whitespace(&f.text)) {
        return Vec::new();
    }
    fragments
}

/// Build a factory child for a factory-typed property value.
fn factory_child(
    cx: &mut BuildCtx<'_>,
    spec: &mut NodeConstruction,
    generator: &str,
    span: SourceSpan,
) {
    if generator.is_empty() {
        cx.problem(
            ProblemKind::InvalidExpression,
            span,
            "a factory value must name a class".to_string(),
        );
        spec.mark_invalid();
        return;
    }
    spec.add_child(containers::build_factory(cx, generator, span));
}
