//! Literal coercion, typed defaults, and expression fallbacks.

mod helpers;

use arbor::diagnostics::ProblemKind;
use arbor::expr::LiteralValue;
use arbor::project::Project;
use arbor::tree::{ExprValue, NodeKind};
use once_cell::sync::Lazy;
use rstest::rstest;

use helpers::{build_with, specifier_value};

static PROJECT: Lazy<Project> = Lazy::new(helpers::test_project);

fn button_with(attrs: &str) -> String {
    format!(
        r#"<ui:Application xmlns:ui="library://ui.arbor.dev/components"
                           xmlns:x="http://ns.arbor.dev/uiml/2009">
            <ui:Button {attrs}/>
        </ui:Application>"#
    )
}

fn attribute_value(attrs: &str, property: &str) -> (LiteralValue, bool) {
    let (built, _) = build_with(&PROJECT, &button_with(attrs));
    let node = specifier_value(built.root.child(0), property);
    (
        node.effective_value()
            .unwrap_or_else(|| panic!("no constant value:\n{node}")),
        node.is_valid_for_codegen(),
    )
}

#[rstest]
#[case("enabled=\"true\"", LiteralValue::Bool(true))]
#[case("enabled=\"FALSE\"", LiteralValue::Bool(false))]
#[case("enabled=\" true \"", LiteralValue::Bool(true))]
#[case("count=\"42\"", LiteralValue::Int(42))]
#[case("count=\"-7\"", LiteralValue::Int(-7))]
#[case("retries=\"4294967295\"", LiteralValue::Uint(u32::MAX))]
#[case("scale=\"1.5\"", LiteralValue::Number(1.5))]
#[case("label=\"plain\"", LiteralValue::String("plain".to_string()))]
fn test_literal_coercion(#[case] attr: &str, #[case] expected: LiteralValue) {
    let (value, valid) = attribute_value(attr, attr.split('=').next().unwrap());
    assert_eq!(value, expected);
    assert!(valid);
}

#[test]
fn test_uint_narrows_with_wrapping() {
    let (value, _) = attribute_value("retries=\"-1\"", "retries");
    assert_eq!(value, LiteralValue::Uint(u32::MAX));
    let (value, _) = attribute_value("retries=\"5000000000\"", "retries");
    assert_eq!(value, LiteralValue::Uint(5_000_000_000i64 as u32));
}

#[test]
fn test_string_values_round_trip_verbatim() {
    let (value, _) = attribute_value("label=\"  two  spaces  \"", "label");
    assert_eq!(value, LiteralValue::String("  two  spaces  ".to_string()));
}

#[test]
fn test_non_literal_text_parses_as_expression() {
    let (built, diagnostics) = build_with(&PROJECT, &button_with("count=\"limit + 1\""));
    assert!(diagnostics.is_empty());
    let node = specifier_value(built.root.child(0), "count");
    let Some(ExprValue::Expression(_)) = node.value() else {
        panic!("expected a computed value:\n{node}");
    };
    assert!(node.effective_value().is_none());
}

#[test]
fn test_invalid_expression_reports_and_defaults() {
    let (built, diagnostics) = build_with(&PROJECT, &button_with("count=\"1 +\""));
    assert_eq!(diagnostics.of_kind(ProblemKind::InvalidExpression).count(), 1);
    let node = specifier_value(built.root.child(0), "count");
    assert!(!node.is_valid_for_codegen());
    // Construction continues with the typed default in place.
    assert_eq!(node.effective_value(), Some(LiteralValue::Int(0)));
}

#[test]
fn test_scalar_tag_defaults() {
    let source = r#"<ui:Application xmlns:ui="library://ui.arbor.dev/components"
                                    xmlns:x="http://ns.arbor.dev/uiml/2009">
        <x:Boolean id="flag"/>
        <x:Int id="zero"/>
        <x:UInt id="uzero"/>
        <x:Number id="nan"/>
        <x:String id="absent"/>
    </ui:Application>"#;
    let (built, diagnostics) = build_with(&PROJECT, source);
    assert!(diagnostics.is_empty(), "problems: {:?}", diagnostics.problems());
    let root = &built.root;
    assert_eq!(root.child(0).effective_value(), Some(LiteralValue::Bool(false)));
    assert_eq!(root.child(1).effective_value(), Some(LiteralValue::Int(0)));
    assert_eq!(root.child(2).effective_value(), Some(LiteralValue::Uint(0)));
    match root.child(3).effective_value() {
        Some(LiteralValue::Number(n)) => assert!(n.is_nan()),
        other => panic!("expected NaN default, got {other:?}"),
    }
    assert_eq!(root.child(4).effective_value(), Some(LiteralValue::Null));
    // Scalar value tags never have children.
    assert!(root.children().iter().all(|c| c.child_count() == 0));
}

#[test]
fn test_scalar_tag_bodies_coerce() {
    let source = r#"<ui:Application xmlns:ui="library://ui.arbor.dev/components"
                                    xmlns:x="http://ns.arbor.dev/uiml/2009">
        <x:Int>  -12  </x:Int>
        <x:UInt>5000000000</x:UInt>
        <x:String>hello</x:String>
    </ui:Application>"#;
    let (built, diagnostics) = build_with(&PROJECT, source);
    assert!(diagnostics.is_empty());
    let root = &built.root;
    assert_eq!(root.child(0).kind(), NodeKind::Int);
    assert_eq!(root.child(0).effective_value(), Some(LiteralValue::Int(-12)));
    assert_eq!(
        root.child(1).effective_value(),
        Some(LiteralValue::Uint(5_000_000_000i64 as u32))
    );
    assert_eq!(
        root.child(2).effective_value(),
        Some(LiteralValue::String("hello".to_string()))
    );
}

#[test]
fn test_cdata_joins_scalar_text() {
    let source = r#"<ui:Application xmlns:ui="library://ui.arbor.dev/components"
                                    xmlns:x="http://ns.arbor.dev/uiml/2009">
        <x:String>one<![CDATA[ two]]></x:String>
    </ui:Application>"#;
    let (built, _) = build_with(&PROJECT, source);
    assert_eq!(
        built.root.child(0).effective_value(),
        Some(LiteralValue::String("one two".to_string()))
    );
}

#[test]
fn test_untyped_property_falls_back_to_expression() {
    // `url` is declared String on HttpService; `config` on Button is
    // Object, so its text value goes through the expression parser.
    let (built, diagnostics) = build_with(&PROJECT, &button_with("config=\"settings.default\""));
    assert!(diagnostics.is_empty());
    let node = specifier_value(built.root.child(0), "config");
    assert_eq!(node.kind(), NodeKind::Expression);
    assert!(matches!(node.value(), Some(ExprValue::Expression(_))));
}
