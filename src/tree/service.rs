//! Service-class child specializations.
//!
//! Two shapes of child tag are claimed before ordinary property and
//! instance handling: the `request` child of a network-request
//! service, which wraps its body in an implicit object, and operation
//! children of remoting and SOAP services, whose qualified tag name
//! resolves to the service's well-known operation class.

use crate::diagnostics::ProblemKind;
use crate::project::QName;
use crate::tagmodel::{AttributeData, TagData};

use super::builder::BuildCtx;
use super::node::{Node, NodePayload};
use super::protocol::{self, ConstructKind, NodeConstruction};
use super::{containers, instance};

/// Claim `child` when it takes a service specialization. Returns
/// `false` when the child is not special for `class` and ordinary
/// handling should proceed.
pub(crate) fn try_specialize(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    class: &QName,
    tag: &TagData,
    child: &TagData,
) -> bool {
    let project = cx.project;

    if project.is_request_style(class)
        && child.name == "request"
        && child.namespace == tag.namespace
        && project.class_has_property(class, "request")
    {
        if !ctx.specifier_names.insert(child.name.clone()) {
            cx.problem(
                ProblemKind::DuplicateSpecifier,
                child.span,
                "property 'request' is specified more than once".to_string(),
            );
            ctx.mark_invalid();
            return true;
        }
        let node = protocol::construct(cx, child, ConstructKind::Request);
        ctx.add_child(node);
        return true;
    }

    if let Some(kind) = project.service_kind(class)
        && let Some(ns) = child.namespace.as_deref()
        && project.resolve_tag(ns, &child.name) == Some(project.operation_class(kind))
    {
        let operation = project.operation_class(kind).clone();
        let node = protocol::construct(cx, child, ConstructKind::Operation { class: operation });
        ctx.add_child(node);
        return true;
    }

    false
}

pub(crate) fn operation_attribute(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    class: &QName,
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
        } else {
            ctx.name = Some(name.into());
        }
        return;
    }
    instance::attribute(cx, ctx, class, tag, attr);
}

pub(crate) fn finalize_operation(
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
    ctx.complete(NodePayload::Operation { name })
}

pub(crate) fn finalize_request(
    cx: &mut BuildCtx<'_>,
    mut ctx: NodeConstruction,
    tag: &TagData,
) -> Node {
    // The request body becomes one implicit object child.
    let object = containers::build_object(cx, &tag.units, tag.span);
    ctx.add_child(object);
    ctx.complete(NodePayload::RequestProperty {
        name: tag.name.clone(),
    })
}
