//! Data-binding detection inside attribute and tag values.

mod helpers;

use arbor::diagnostics::ProblemKind;
use arbor::expr::LiteralValue;
use arbor::tree::{ExprValue, Node, NodeKind};
use helpers::{build, specifier_value};

fn label_value(value: &str) -> (Node, arbor::diagnostics::Diagnostics) {
    let source = format!(
        r#"<ui:Application xmlns:ui="library://ui.arbor.dev/components"
                           xmlns:x="http://ns.arbor.dev/uiml/2009">
            <ui:Button label="{value}"/>
        </ui:Application>"#
    );
    let (built, diagnostics) = build(&source);
    let node = specifier_value(built.root.child(0), "label").clone();
    (node, diagnostics)
}

fn binding_child(node: &Node) -> &Node {
    match node.value() {
        Some(ExprValue::Node(inner)) => inner,
        other => panic!("expected a nested value node, got {other:?}:\n{node}"),
    }
}

#[test]
fn test_lone_binding_is_a_single_binding_node() {
    let (node, diagnostics) = label_value("{user.name}");
    assert!(diagnostics.is_empty());
    let binding = binding_child(&node);
    assert_eq!(binding.kind(), NodeKind::SingleDataBinding);
    assert_eq!(binding.child_count(), 0);
    assert!(binding.binding_expression().is_some());
}

#[test]
fn test_whitespace_around_a_lone_binding_is_ignored() {
    let (node, _) = label_value("  {user.name}  ");
    assert_eq!(binding_child(&node).kind(), NodeKind::SingleDataBinding);
}

#[test]
fn test_mixed_text_concatenates() {
    let (node, diagnostics) = label_value("Hello {first} {last}!");
    assert!(diagnostics.is_empty());
    let binding = binding_child(&node);
    assert_eq!(binding.kind(), NodeKind::ConcatenatedDataBinding);
    let kinds: Vec<_> = binding.children().iter().map(Node::kind).collect();
    assert_eq!(
        kinds,
        [
            NodeKind::Literal,
            NodeKind::SingleDataBinding,
            NodeKind::Literal,
            NodeKind::SingleDataBinding,
            NodeKind::Literal,
        ]
    );
    assert_eq!(
        binding.child(0).effective_value(),
        Some(LiteralValue::String("Hello ".to_string()))
    );
    assert_eq!(
        binding.child(4).effective_value(),
        Some(LiteralValue::String("!".to_string()))
    );
}

#[test]
fn test_escaped_brace_stays_literal() {
    let (node, diagnostics) = label_value(r"\{not bound}");
    assert!(diagnostics.is_empty());
    assert_eq!(
        node.effective_value(),
        Some(LiteralValue::String("{not bound}".to_string()))
    );
}

#[test]
fn test_trailing_backslash_round_trips() {
    let (node, diagnostics) = label_value(r"C:\data\");
    assert!(diagnostics.is_empty());
    assert_eq!(
        node.effective_value(),
        Some(LiteralValue::String(r"C:\data\".to_string()))
    );
}

#[test]
fn test_unterminated_brace_stays_literal() {
    let (node, diagnostics) = label_value("start {oops");
    assert!(diagnostics.is_empty());
    assert_eq!(
        node.effective_value(),
        Some(LiteralValue::String("start {oops".to_string()))
    );
}

#[test]
fn test_empty_binding_is_the_empty_string() {
    let (node, diagnostics) = label_value("{}");
    assert!(diagnostics.is_empty(), "no problem for an empty binding");
    let binding = binding_child(&node);
    assert_eq!(binding.kind(), NodeKind::SingleDataBinding);
    let expression = binding.binding_expression().expect("expression");
    assert_eq!(
        expression.as_literal().and_then(LiteralValue::as_str),
        Some("")
    );
}

#[test]
fn test_invalid_binding_expression_reports() {
    let (node, diagnostics) = label_value("{user..name}");
    assert_eq!(diagnostics.of_kind(ProblemKind::InvalidExpression).count(), 1);
    let binding = binding_child(&node);
    assert!(!binding.is_valid_for_codegen());
}

#[test]
fn test_binding_in_scalar_tag_body() {
    let source = r#"<ui:Application xmlns:ui="library://ui.arbor.dev/components"
                                    xmlns:x="http://ns.arbor.dev/uiml/2009">
        <x:String id="greeting">{model.greeting}</x:String>
    </ui:Application>"#;
    let (built, diagnostics) = build(source);
    assert!(diagnostics.is_empty());
    let node = built.root.child(0);
    assert_eq!(node.kind(), NodeKind::String);
    assert_eq!(binding_child(node).kind(), NodeKind::SingleDataBinding);
}

#[test]
fn test_boolean_binding_keeps_its_type_tag() {
    let source = r#"<ui:Application xmlns:ui="library://ui.arbor.dev/components"
                                    xmlns:x="http://ns.arbor.dev/uiml/2009">
        <ui:Button enabled="{model.isReady}"/>
    </ui:Application>"#;
    let (built, diagnostics) = build(source);
    assert!(diagnostics.is_empty());
    let node = specifier_value(built.root.child(0), "enabled");
    assert_eq!(node.kind(), NodeKind::Boolean);
    assert_eq!(binding_child(node).kind(), NodeKind::SingleDataBinding);
}
