//! Value resolution for expression-typed nodes.
//!
//! Resolution order for the text of an attribute or scalar tag body:
//! absent text takes the typed default, `@Directive(...)` text builds
//! a directive node, text containing `{...}` builds a data-binding
//! node, and anything left is coerced per the declared type with a
//! general expression parse as the fallback.

use text_size::TextRange;

use crate::base::SourceSpan;
use crate::diagnostics::ProblemKind;
use crate::expr::{
    BindingPiece, BindingSplit, ExprNode, LiteralValue, PieceKind, SourceFragment, parse_expression,
    scan_bindings,
};
use crate::project::QName;
use crate::tagmodel::trim;

use super::builder::BuildCtx;
use super::directive::{self, DirectiveParse};
use super::node::{ExprType, ExprValue, Node, NodePayload};
use super::protocol::{BuildState, NodeConstruction};

/// Resolve accumulated source text into a value.
///
/// Problems are reported against `cx` and mark `ctx` invalid; the
/// return value is always usable.
pub(crate) fn resolve_value(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    ty: ExprType,
    fragments: &[SourceFragment],
    span: SourceSpan,
) -> ExprValue {
    if fragments.is_empty() {
        return ExprValue::Default;
    }

    let combined: String = fragments.iter().map(|f| f.text.as_str()).collect();
    if let Some(parse) = directive::parse(&combined) {
        return directive_value(cx, ctx, parse, span);
    }

    match scan_bindings(fragments) {
        BindingSplit::Pieces(pieces) => {
            ExprValue::Node(Box::new(binding_node(cx, ctx, pieces, span)))
        }
        BindingSplit::None(text) => coerce_literal(cx, ctx, ty, text, span),
    }
}

/// Synthesize an expression-typed node around a resolved value.
///
/// Used for values that have no tag of their own: attribute-derived
/// specifiers, property-tag text, object members.
pub(crate) fn build_value_node(
    cx: &mut BuildCtx<'_>,
    ty: ExprType,
    fragments: &[SourceFragment],
    span: SourceSpan,
    class_reference: Option<QName>,
) -> Node {
    let mut ctx = NodeConstruction::new(span);
    ctx.class_reference = class_reference;
    ctx.advance(BuildState::AttributesProcessed);
    ctx.advance(BuildState::ChildrenProcessed);
    let value = resolve_value(cx, &mut ctx, ty, fragments, span);
    ctx.complete(NodePayload::Expression {
        type_tag: ty,
        id: None,
        value,
    })
}

// ============================================================================
// DATA BINDINGS
// ============================================================================

fn binding_node(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    pieces: Vec<BindingPiece>,
    span: SourceSpan,
) -> Node {
    // A value that is exactly one binding IS that binding node, with
    // no concatenation wrapper.
    if let [piece] = pieces.as_slice()
        && piece.kind == PieceKind::Binding
    {
        return single_binding_node(cx, ctx, piece);
    }

    let children: Vec<Node> = pieces
        .iter()
        .map(|piece| match piece.kind {
            PieceKind::Literal => Node::new(
                piece.span,
                None,
                true,
                Vec::new(),
                NodePayload::Literal {
                    value: LiteralValue::String(piece.text.clone()),
                },
            ),
            PieceKind::Binding => single_binding_node(cx, ctx, piece),
        })
        .collect();

    Node::new(
        span,
        None,
        true,
        children,
        NodePayload::ConcatenatedBinding,
    )
}

fn single_binding_node(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    piece: &BindingPiece,
) -> Node {
    let trimmed = trim(&piece.text);
    let mut valid = true;
    let expression = if trimmed.is_empty() {
        // `{}` binds to the empty string constant.
        ExprNode::Literal {
            value: LiteralValue::String(String::new()),
            range: TextRange::empty(0.into()),
        }
    } else {
        match parse_expression(trimmed) {
            Ok(expression) => expression,
            Err(err) => {
                cx.problem(
                    ProblemKind::InvalidExpression,
                    piece.span,
                    format!("invalid binding expression: {err}"),
                );
                ctx.mark_invalid();
                valid = false;
                ExprNode::Literal {
                    value: LiteralValue::Null,
                    range: TextRange::empty(0.into()),
                }
            }
        }
    };
    Node::new(
        piece.span,
        None,
        valid,
        Vec::new(),
        NodePayload::SingleBinding { expression },
    )
}

// ============================================================================
// LITERAL COERCION
// ============================================================================

fn coerce_literal(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    ty: ExprType,
    text: String,
    span: SourceSpan,
) -> ExprValue {
    match ty {
        // Strings take the text verbatim, whitespace included.
        ExprType::String => ExprValue::Literal(LiteralValue::String(text)),
        ExprType::Boolean => {
            let trimmed = trim(&text);
            if trimmed.eq_ignore_ascii_case("true") {
                ExprValue::Literal(LiteralValue::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                ExprValue::Literal(LiteralValue::Bool(false))
            } else {
                parse_as_expression(cx, ctx, &text, span)
            }
        }
        ExprType::Int => match trim(&text).parse::<i32>() {
            Ok(value) => ExprValue::Literal(LiteralValue::Int(value)),
            Err(_) => parse_as_expression(cx, ctx, &text, span),
        },
        ExprType::Uint => {
            let trimmed = trim(&text);
            match trimmed.parse::<u32>() {
                Ok(value) => ExprValue::Literal(LiteralValue::Uint(value)),
                // Out-of-range integers narrow with two's-complement
                // wrapping, matching the runtime's coercion.
                Err(_) => match trimmed.parse::<i64>() {
                    Ok(wide) => ExprValue::Literal(LiteralValue::Uint(wide as u32)),
                    Err(_) => parse_as_expression(cx, ctx, &text, span),
                },
            }
        }
        ExprType::Number => match trim(&text).parse::<f64>() {
            Ok(value) => ExprValue::Literal(LiteralValue::Number(value)),
            Err(_) => parse_as_expression(cx, ctx, &text, span),
        },
        ExprType::RegExp
        | ExprType::Function
        | ExprType::Array
        | ExprType::Vector
        | ExprType::Other => parse_as_expression(cx, ctx, &text, span),
    }
}

fn parse_as_expression(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    text: &str,
    span: SourceSpan,
) -> ExprValue {
    let trimmed = trim(text);
    if trimmed.is_empty() {
        return ExprValue::Default;
    }
    match parse_expression(trimmed) {
        Ok(expression) => ExprValue::Expression(expression),
        Err(err) => {
            cx.problem(
                ProblemKind::InvalidExpression,
                span,
                format!("invalid expression '{trimmed}': {err}"),
            );
            ctx.mark_invalid();
            ExprValue::Default
        }
    }
}

// ============================================================================
// DIRECTIVES
// ============================================================================

fn directive_value(
    cx: &mut BuildCtx<'_>,
    ctx: &mut NodeConstruction,
    parse: DirectiveParse,
    span: SourceSpan,
) -> ExprValue {
    match parse {
        DirectiveParse::Clear => {
            ExprValue::Node(Box::new(Node::new(
                span,
                None,
                true,
                Vec::new(),
                NodePayload::Clear,
            )))
        }
        DirectiveParse::Embed { source } => {
            let embed_class = cx.project.well_known().embed_asset.clone();
            cx.note_instance_class(&embed_class, span);
            let mut valid = true;
            if source.is_none() {
                cx.problem(
                    ProblemKind::RequiredArgumentMissing,
                    span,
                    "@Embed requires a source argument".to_string(),
                );
                ctx.mark_invalid();
                valid = false;
            }
            ExprValue::Node(Box::new(Node::new(
                span,
                Some(embed_class),
                valid,
                Vec::new(),
                NodePayload::Embed { source },
            )))
        }
        DirectiveParse::Resource { bundle, key } => {
            let bundle_class = cx.project.well_known().resource_bundle.clone();
            cx.note_instance_class(&bundle_class, span);
            let mut valid = true;
            if bundle.is_none() {
                cx.problem(
                    ProblemKind::RequiredArgumentMissing,
                    span,
                    "@Resource requires a bundle argument".to_string(),
                );
                ctx.mark_invalid();
                valid = false;
            }
            if key.is_none() {
                cx.problem(
                    ProblemKind::RequiredArgumentMissing,
                    span,
                    "@Resource requires a key argument".to_string(),
                );
                ctx.mark_invalid();
                valid = false;
            }
            ExprValue::Node(Box::new(Node::new(
                span,
                Some(bundle_class),
                valid,
                Vec::new(),
                NodePayload::Resource { bundle, key },
            )))
        }
        DirectiveParse::Malformed(message) => {
            cx.problem(ProblemKind::InvalidDirectiveSyntax, span, message);
            ctx.mark_invalid();
            ExprValue::Default
        }
    }
}
