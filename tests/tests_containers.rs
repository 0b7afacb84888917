//! Libraries, definitions, private blocks, design layers, and
//! collections.

mod helpers;

use arbor::diagnostics::ProblemKind;
use arbor::expr::LiteralValue;
use arbor::project::QName;
use arbor::tree::{Node, NodeKind};
use helpers::{build, build_with, specifier_value, test_project};

fn app(body: &str) -> String {
    format!(
        r#"<ui:Application xmlns:ui="library://ui.arbor.dev/components"
                           xmlns:x="http://ns.arbor.dev/uiml/2009">
            {body}
        </ui:Application>"#
    )
}

#[test]
fn test_library_holds_definitions() {
    let (built, diagnostics) = build(&app(
        r#"<x:Library>
            <x:Definition name="Chip"><ui:Button/></x:Definition>
            <x:Definition name="Card"><ui:Label/></x:Definition>
        </x:Library>"#,
    ));
    assert!(diagnostics.is_empty(), "problems: {:?}", diagnostics.problems());
    let library = built.root.child(0);
    assert_eq!(library.kind(), NodeKind::Library);
    let names: Vec<_> = built
        .root
        .child(0)
        .children()
        .iter()
        .map(|d| d.definition_name())
        .collect();
    assert_eq!(names, [Some("Chip"), Some("Card")]);
    assert_eq!(library.child(0).child(0).kind(), NodeKind::Instance);
}

#[test]
fn test_definition_name_missing_vs_empty() {
    let (_, diagnostics) = build(&app(
        r#"<x:Library>
            <x:Definition><ui:Button/></x:Definition>
            <x:Definition name=""><ui:Button/></x:Definition>
        </x:Library>"#,
    ));
    // Absent and empty are distinct problems; neither doubles up.
    assert_eq!(
        diagnostics
            .of_kind(ProblemKind::RequiredAttributeMissing)
            .count(),
        1
    );
    assert_eq!(diagnostics.of_kind(ProblemKind::EmptyAttribute).count(), 1);
}

#[test]
fn test_library_rejects_other_children() {
    let (built, diagnostics) = build(&app(
        r#"<x:Library>
            <ui:Button/>
        </x:Library>"#,
    ));
    assert_eq!(diagnostics.of_kind(ProblemKind::UnexpectedTag).count(), 1);
    assert_eq!(built.root.child(0).child_count(), 0);
}

#[test]
fn test_definition_outside_library_is_rejected() {
    let (_, diagnostics) = build(&app(r#"<x:Definition name="Chip"><ui:Button/></x:Definition>"#));
    assert_eq!(diagnostics.of_kind(ProblemKind::UnexpectedTag).count(), 1);
}

#[test]
fn test_private_content_is_discarded_without_problems() {
    let (built, diagnostics) = build(&app(
        r#"<ui:Button/>
        <x:Private>
            anything goes here
            <unchecked:Tag with="attributes"/>
        </x:Private>"#,
    ));
    assert!(diagnostics.is_empty(), "problems: {:?}", diagnostics.problems());
    assert_eq!(built.root.child_count(), 2);
    let private = built.root.child(1);
    assert_eq!(private.kind(), NodeKind::Private);
    assert_eq!(private.child_count(), 0);
}

#[test]
fn test_design_layers_hoist_through_nesting() {
    let (built, diagnostics) = build(&app(
        r#"<x:DesignLayer>
            <x:DesignLayer>
                <ui:Button/>
                <ui:Button/>
            </x:DesignLayer>
            <ui:Label/>
        </x:DesignLayer>"#,
    ));
    assert!(diagnostics.is_empty(), "problems: {:?}", diagnostics.problems());
    let layer = built.root.child(0);
    assert_eq!(layer.kind(), NodeKind::DesignLayer);
    // Two tags directly under the layer, three hoisted leaves.
    assert_eq!(layer.child_count(), 2);
    assert_eq!(layer.hoisted_child_count(), Ok(3));
}

#[test]
fn test_design_layer_property_attributes_become_specifiers() {
    let (built, diagnostics) = build(&app(
        r#"<x:DesignLayer alpha="0.5">
            <ui:Button/>
        </x:DesignLayer>"#,
    ));
    assert!(diagnostics.is_empty(), "problems: {:?}", diagnostics.problems());
    let layer = built.root.child(0);
    assert_eq!(
        specifier_value(layer, "alpha").effective_value(),
        Some(LiteralValue::Number(0.5))
    );
    // Specifiers configure the layer; only the button is hoisted, and
    // a configured layer is never skipped.
    assert_eq!(layer.hoisted_child_count(), Ok(1));
    assert!(!layer.skips_codegen());
}

#[test]
fn test_anonymous_layers_skip_codegen() {
    let (built, _) = build(&app(
        r#"<x:DesignLayer>
            <x:DesignLayer id="chrome"><ui:Button/></x:DesignLayer>
        </x:DesignLayer>"#,
    ));
    let outer = built.root.child(0);
    assert!(outer.skips_codegen());
    assert!(!outer.child(0).skips_codegen());
}

#[test]
fn test_array_keeps_element_order() {
    let (built, diagnostics) = build(&app(
        r#"<x:Array id="mixed">
            <x:String>a</x:String>
            <x:Int>1</x:Int>
            <ui:Button/>
        </x:Array>"#,
    ));
    assert!(diagnostics.is_empty(), "problems: {:?}", diagnostics.problems());
    let array = built.root.child(0);
    assert_eq!(array.kind(), NodeKind::Array);
    assert_eq!(array.id(), Some("mixed"));
    let kinds: Vec<_> = array.children().iter().map(Node::kind).collect();
    assert_eq!(kinds, [NodeKind::String, NodeKind::Int, NodeKind::Instance]);
}

#[test]
fn test_vector_requires_an_element_type() {
    let project = test_project();
    let (built, diagnostics) = build_with(
        &project,
        &app(
            r#"<x:Vector type="ui.controls.Button">
                <ui:Button/>
            </x:Vector>
            <x:Vector/>"#,
        ),
    );
    assert_eq!(
        diagnostics
            .of_kind(ProblemKind::RequiredAttributeMissing)
            .count(),
        1
    );

    let typed = built.root.child(0);
    assert_eq!(typed.kind(), NodeKind::Vector);
    assert!(typed.is_valid_for_codegen());
    let untyped = built.root.child(1);
    assert!(!untyped.is_valid_for_codegen());

    // The element type is a code-generation dependency.
    assert!(
        project
            .expression_dependencies()
            .contains(&QName::new("ui.controls.Button"))
    );
}

#[test]
fn test_text_inside_containers_is_rejected() {
    let (_, diagnostics) = build(&app(
        r#"<x:Array>stray</x:Array>"#,
    ));
    assert_eq!(diagnostics.of_kind(ProblemKind::UnexpectedText).count(), 1);
}
