//! The document root node.
//!
//! The root tag is an instance of its component class plus a handful
//! of reserved document-level attributes. Reserved names are claimed
//! here; everything else falls through to ordinary instance handling.

use crate::project::QName;
use crate::tagmodel::{AttributeData, TagData};

use super::builder::BuildCtx;
use super::instance;
use super::node::{DocumentPayload, Node, NodePayload};
use super::protocol::{self, NodeConstruction};

pub(crate) fn attribute(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    class: Option<&QName>,
    tag: &TagData,
    attr: &AttributeData,
) {
    if attr.prefix.is_none() {
        match attr.name.as_str() {
            "frameRate" => {
                ctx.root_attrs.frame_rate = parse_count(attr);
                return;
            }
            "pageTitle" => {
                ctx.root_attrs.page_title = Some(attr.raw_value.clone());
                return;
            }
            "scriptRecursionLimit" => {
                ctx.root_attrs.script_recursion_limit = parse_count(attr);
                return;
            }
            "scriptTimeLimit" => {
                ctx.root_attrs.script_time_limit = parse_count(attr);
                return;
            }
            _ => {}
        }
    }
    match class {
        Some(class) => instance::attribute(cx, ctx, class, tag, attr),
        None => {
            if attr.prefix.is_none() && attr.name == "id" {
                instance::id_attribute(cx, ctx, attr);
            } else {
                protocol::unexpected_attribute(cx, tag, attr);
            }
        }
    }
}

/// Parse a numeric document attribute. A value that fails to parse
/// leaves the field unset and the downstream default in force, with no
/// problem record.
fn parse_count(attr: &AttributeData) -> Option<u32> {
    attr.trimmed_value().parse().ok()
}

pub(crate) fn finalize(mut ctx: NodeConstruction) -> Node {
    let id = ctx.id.take();
    let root_attrs = std::mem::take(&mut ctx.root_attrs);
    ctx.complete(NodePayload::Document(DocumentPayload {
        frame_rate: root_attrs.frame_rate,
        page_title: root_attrs.page_title,
        script_recursion_limit: root_attrs.script_recursion_limit,
        script_time_limit: root_attrs.script_time_limit,
        id,
    }))
}
