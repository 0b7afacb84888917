//! Service-class specializations: request bodies and operations.

mod helpers;

use arbor::diagnostics::ProblemKind;
use arbor::expr::LiteralValue;
use arbor::tree::{ExprValue, NodeKind};
use helpers::{build, specifier_value};

fn app(body: &str) -> String {
    format!(
        r#"<ui:Application xmlns:ui="library://ui.arbor.dev/components"
                           xmlns:x="http://ns.arbor.dev/uiml/2009">
            {body}
        </ui:Application>"#
    )
}

#[test]
fn test_request_body_becomes_an_object() {
    let (built, diagnostics) = build(&app(
        r#"<ui:HttpService id="svc" url="/search">
            <ui:request>
                <region>west</region>
                <limit>10</limit>
            </ui:request>
        </ui:HttpService>"#,
    ));
    assert!(diagnostics.is_empty(), "problems: {:?}", diagnostics.problems());
    let service = built.root.child(0);
    let request = service
        .children()
        .iter()
        .find(|c| c.kind() == NodeKind::RequestProperty)
        .unwrap_or_else(|| panic!("no request property:\n{service}"));
    assert_eq!(request.specifier_name(), Some("request"));
    assert_eq!(request.child_count(), 1);

    let object = request.child(0);
    assert_eq!(object.kind(), NodeKind::Object);
    let members: Vec<_> = object
        .children()
        .iter()
        .map(|m| m.specifier_name().unwrap())
        .collect();
    assert_eq!(members, ["region", "limit"]);
    // Request parameters are string-valued.
    assert_eq!(
        specifier_value(object, "limit").effective_value(),
        Some(LiteralValue::String("10".to_string()))
    );
}

#[test]
fn test_request_members_can_bind() {
    let (built, diagnostics) = build(&app(
        r#"<ui:HttpService>
            <ui:request>
                <q>{search.text}</q>
            </ui:request>
        </ui:HttpService>"#,
    ));
    assert!(diagnostics.is_empty());
    let request = built.root.child(0).child(0);
    let value = specifier_value(request.child(0), "q");
    let Some(ExprValue::Node(binding)) = value.value() else {
        panic!("expected a binding value:\n{value}");
    };
    assert_eq!(binding.kind(), NodeKind::SingleDataBinding);
}

#[test]
fn test_nested_request_members() {
    let (built, diagnostics) = build(&app(
        r#"<ui:HttpService>
            <ui:request>
                <filter>
                    <field>price</field>
                    <max>100</max>
                </filter>
            </ui:request>
        </ui:HttpService>"#,
    ));
    assert!(diagnostics.is_empty());
    let object = built.root.child(0).child(0).child(0);
    let filter = specifier_value(object, "filter");
    assert_eq!(filter.kind(), NodeKind::Object);
    assert_eq!(filter.child_count(), 2);
}

#[test]
fn test_remoting_operations() {
    let (built, diagnostics) = build(&app(
        r#"<ui:RemoteService id="backend">
            <ui:method name="getUser"/>
            <ui:method name="saveUser">
                <ui:arguments>
                    <user>current</user>
                </ui:arguments>
            </ui:method>
        </ui:RemoteService>"#,
    ));
    assert!(diagnostics.is_empty(), "problems: {:?}", diagnostics.problems());
    let service = built.root.child(0);
    assert_eq!(service.child_count(), 2);
    let first = service.child(0);
    assert_eq!(first.kind(), NodeKind::Operation);
    assert_eq!(first.method_name(), Some("getUser"));
    assert_eq!(
        first.class_reference().map(|q| q.as_str()),
        Some("ui.rpc.remoting.Operation")
    );
    // The second operation carries its arguments property.
    let second = service.child(1);
    assert_eq!(second.method_name(), Some("saveUser"));
    assert_eq!(second.child(0).kind(), NodeKind::PropertySpecifier);
}

#[test]
fn test_soap_operations_use_their_own_tag() {
    let (built, diagnostics) = build(&app(
        r#"<ui:WebService>
            <ui:operation name="convert"/>
        </ui:WebService>"#,
    ));
    assert!(diagnostics.is_empty());
    let operation = built.root.child(0).child(0);
    assert_eq!(operation.kind(), NodeKind::Operation);
    assert_eq!(
        operation.class_reference().map(|q| q.as_str()),
        Some("ui.rpc.soap.Operation")
    );
}

#[test]
fn test_operation_name_missing_vs_empty() {
    let (built, diagnostics) = build(&app(
        r#"<ui:RemoteService>
            <ui:method/>
            <ui:method name=""/>
        </ui:RemoteService>"#,
    ));
    assert_eq!(
        diagnostics
            .of_kind(ProblemKind::RequiredAttributeMissing)
            .count(),
        1
    );
    assert_eq!(diagnostics.of_kind(ProblemKind::EmptyAttribute).count(), 1);
    let service = built.root.child(0);
    assert_eq!(service.child(0).method_name(), None);
    assert_eq!(service.child(1).method_name(), None);
    assert!(!service.child(0).is_valid_for_codegen());
}

#[test]
fn test_foreign_operation_class_falls_back_to_an_instance() {
    // `operation` maps to the SOAP class, so under a remoting service
    // it takes no specialization and resolves like any other tag.
    let (built, diagnostics) = build(&app(
        r#"<ui:RemoteService>
            <ui:operation/>
        </ui:RemoteService>"#,
    ));
    assert!(diagnostics.is_empty(), "problems: {:?}", diagnostics.problems());
    let child = built.root.child(0).child(0);
    assert_eq!(child.kind(), NodeKind::Instance);
    assert_eq!(
        child.class_reference().map(|q| q.as_str()),
        Some("ui.rpc.soap.Operation")
    );
}

#[test]
fn test_unknown_service_child_is_reported() {
    let (built, diagnostics) = build(&app(
        r#"<ui:RemoteService>
            <ui:bogus name="x"/>
        </ui:RemoteService>"#,
    ));
    assert_eq!(diagnostics.of_kind(ProblemKind::UnresolvedTag).count(), 1);
    assert_eq!(built.root.child(0).child_count(), 0);
}

#[test]
fn test_operations_register_their_class_dependency() {
    let project = helpers::test_project();
    let (_, _) = helpers::build_with(
        &project,
        &app(r#"<ui:RemoteService><ui:method name="ping"/></ui:RemoteService>"#),
    );
    assert!(
        project
            .expression_dependencies()
            .iter()
            .any(|q| q.as_str() == "ui.rpc.remoting.Operation")
    );
}
