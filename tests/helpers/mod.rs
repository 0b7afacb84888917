#![allow(dead_code)]

//! Shared fixtures for the tree-construction tests: a project with a
//! small component manifest and a parse-then-build helper.

use arbor::diagnostics::Diagnostics;
use arbor::project::{Project, QName};
use arbor::tagmodel::parse_document;
use arbor::tree::{BuiltDocument, Node, TreeBuilder};
use arbor::FileId;

/// Component namespace used by the fixtures.
pub const UI: &str = "library://ui.arbor.dev/components";

pub fn test_project() -> Project {
    let mut project = Project::new();
    for (tag, class) in [
        ("Application", "ui.core.Application"),
        ("Button", "ui.controls.Button"),
        ("Label", "ui.controls.Label"),
        ("RemoteService", "ui.rpc.remoting.RemoteService"),
        ("WebService", "ui.rpc.soap.WebService"),
        ("HttpService", "ui.rpc.http.HttpService"),
        ("method", "ui.rpc.remoting.Operation"),
        ("operation", "ui.rpc.soap.Operation"),
    ] {
        project.register_tag(UI, tag, QName::new(class));
    }

    let button = QName::new("ui.controls.Button");
    for (name, ty) in [
        ("label", "String"),
        ("enabled", "Boolean"),
        ("count", "Int"),
        ("retries", "UInt"),
        ("scale", "Number"),
        ("skin", "ui.core.IFactory"),
        ("config", "Object"),
    ] {
        project.register_property(button.clone(), name, Some(QName::new(ty)));
    }

    let app = QName::new("ui.core.Application");
    project.register_property(app, "title", Some(QName::new("String")));

    let http = QName::new("ui.rpc.http.HttpService");
    project.register_property(http.clone(), "request", Some(QName::new("Object")));
    project.register_property(http, "url", Some(QName::new("String")));

    let remoting_op = QName::new("ui.rpc.remoting.Operation");
    project.register_property(remoting_op, "arguments", Some(QName::new("Object")));

    let layer = QName::new("ui.core.DesignLayer");
    project.register_property(layer.clone(), "alpha", Some(QName::new("Number")));
    project.register_property(layer, "visible", Some(QName::new("Boolean")));

    project
}

pub fn build_with(project: &Project, source: &str) -> (BuiltDocument, Diagnostics) {
    let document = parse_document(FileId::new(0), source).expect("fixture parses");
    let mut diagnostics = Diagnostics::new();
    let built = TreeBuilder::new(project, &mut diagnostics).build(&document);
    (built, diagnostics)
}

pub fn build(source: &str) -> (BuiltDocument, Diagnostics) {
    build_with(&test_project(), source)
}

/// The child specifier with the given name, panicking with the tree
/// dump when it is missing.
pub fn specifier<'a>(node: &'a Node, name: &str) -> &'a Node {
    node.children()
        .iter()
        .find(|c| c.specifier_name() == Some(name))
        .unwrap_or_else(|| panic!("no specifier '{name}' in:\n{node}"))
}

/// The single value node under a specifier.
pub fn specifier_value<'a>(node: &'a Node, name: &str) -> &'a Node {
    let spec = specifier(node, name);
    assert_eq!(spec.child_count(), 1, "one value under '{name}':\n{spec}");
    spec.child(0)
}
