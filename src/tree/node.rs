//! The typed AST produced by tree construction.
//!
//! One closed [`Node`] type carries the shared facts every node has
//! (span, class reference, validity, children) and a [`NodePayload`]
//! for the kind-specific ones. The tree is immutable once built;
//! every accessor is read-only.

use std::fmt;

use smol_str::SmolStr;

use crate::base::SourceSpan;
use crate::expr::{ExprNode, LiteralValue};
use crate::project::QName;

// ============================================================================
// EXPRESSION TYPES
// ============================================================================

/// The declared type of an expression-valued node, which fixes both
/// the literal coercion rules and the default value used when the
/// source supplies none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprType {
    Boolean,
    Int,
    Uint,
    Number,
    String,
    RegExp,
    Function,
    Array,
    Vector,
    /// Any other declared type, including untyped properties.
    Other,
}

impl ExprType {
    /// The value an absent or cleared expression resolves to.
    pub fn default_value(self) -> LiteralValue {
        match self {
            Self::Boolean => LiteralValue::Bool(false),
            Self::Int => LiteralValue::Int(0),
            Self::Uint => LiteralValue::Uint(0),
            Self::Number => LiteralValue::Number(f64::NAN),
            Self::String
            | Self::RegExp
            | Self::Function
            | Self::Array
            | Self::Vector
            | Self::Other => LiteralValue::Null,
        }
    }

    pub fn display(self) -> &'static str {
        match self {
            Self::Boolean => "Boolean",
            Self::Int => "Int",
            Self::Uint => "UInt",
            Self::Number => "Number",
            Self::String => "String",
            Self::RegExp => "RegExp",
            Self::Function => "Function",
            Self::Array => "Array",
            Self::Vector => "Vector",
            Self::Other => "Other",
        }
    }

    /// Map a declared type name onto the coercion catalog.
    pub(crate) fn from_type_name(name: &str) -> Self {
        match name {
            "Boolean" => Self::Boolean,
            "Int" => Self::Int,
            "UInt" => Self::Uint,
            "Number" => Self::Number,
            "String" => Self::String,
            "RegExp" => Self::RegExp,
            "Function" => Self::Function,
            "Array" => Self::Array,
            "Vector" => Self::Vector,
            _ => Self::Other,
        }
    }
}

/// The resolved value of an expression-typed node.
#[derive(Debug, Clone)]
pub enum ExprValue {
    /// No source value; the node's type supplies the default.
    Default,
    /// A compile-time constant coerced from source text.
    Literal(LiteralValue),
    /// A parsed expression to be evaluated at runtime.
    Expression(ExprNode),
    /// A nested node (a data binding or a compiler directive).
    Node(Box<Node>),
}

impl ExprValue {
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    pub fn as_literal(&self) -> Option<&LiteralValue> {
        match self {
            Self::Literal(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_expression(&self) -> Option<&ExprNode> {
        match self {
            Self::Expression(expr) => Some(expr),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }
}

// ============================================================================
// NODE KINDS
// ============================================================================

/// Discriminant of every node the builder can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Instance,
    Boolean,
    Int,
    Uint,
    Number,
    String,
    RegExp,
    Function,
    Array,
    Vector,
    Object,
    /// An expression value with no more specific type.
    Expression,
    Literal,
    SingleDataBinding,
    ConcatenatedDataBinding,
    Clear,
    Embed,
    Resource,
    Library,
    Definition,
    Private,
    DesignLayer,
    Factory,
    ClassReference,
    PropertySpecifier,
    RequestProperty,
    Operation,
    ImplicitImport,
}

impl NodeKind {
    pub fn display(self) -> &'static str {
        match self {
            Self::Document => "Document",
            Self::Instance => "Instance",
            Self::Boolean => "Boolean",
            Self::Int => "Int",
            Self::Uint => "UInt",
            Self::Number => "Number",
            Self::String => "String",
            Self::RegExp => "RegExp",
            Self::Function => "Function",
            Self::Array => "Array",
            Self::Vector => "Vector",
            Self::Object => "Object",
            Self::Expression => "Expression",
            Self::Literal => "Literal",
            Self::SingleDataBinding => "SingleDataBinding",
            Self::ConcatenatedDataBinding => "ConcatenatedDataBinding",
            Self::Clear => "Clear",
            Self::Embed => "Embed",
            Self::Resource => "Resource",
            Self::Library => "Library",
            Self::Definition => "Definition",
            Self::Private => "Private",
            Self::DesignLayer => "DesignLayer",
            Self::Factory => "Factory",
            Self::ClassReference => "ClassReference",
            Self::PropertySpecifier => "PropertySpecifier",
            Self::RequestProperty => "RequestProperty",
            Self::Operation => "Operation",
            Self::ImplicitImport => "ImplicitImport",
        }
    }
}

// ============================================================================
// PAYLOADS
// ============================================================================

/// Document-level facts gathered from the root tag's reserved
/// attributes.
#[derive(Debug, Clone, Default)]
pub struct DocumentPayload {
    pub frame_rate: Option<u32>,
    pub page_title: Option<String>,
    pub script_recursion_limit: Option<u32>,
    pub script_time_limit: Option<u32>,
    pub id: Option<SmolStr>,
}

/// Kind-specific node content.
#[derive(Debug, Clone)]
pub enum NodePayload {
    Document(DocumentPayload),
    Instance {
        id: Option<SmolStr>,
    },
    /// A scalar or otherwise expression-typed value.
    Expression {
        type_tag: ExprType,
        id: Option<SmolStr>,
        value: ExprValue,
    },
    Array {
        id: Option<SmolStr>,
    },
    Vector {
        id: Option<SmolStr>,
        element_type: Option<QName>,
    },
    Object {
        id: Option<SmolStr>,
    },
    /// A constant fragment of a concatenated binding.
    Literal {
        value: LiteralValue,
    },
    SingleBinding {
        expression: ExprNode,
    },
    ConcatenatedBinding,
    Clear,
    Embed {
        source: Option<String>,
    },
    Resource {
        bundle: Option<String>,
        key: Option<String>,
    },
    Library,
    Definition {
        name: Option<SmolStr>,
    },
    Private,
    DesignLayer {
        id: Option<SmolStr>,
    },
    Factory,
    ClassReference,
    PropertySpecifier {
        name: SmolStr,
    },
    RequestProperty {
        name: SmolStr,
    },
    Operation {
        name: Option<SmolStr>,
    },
    ImplicitImport {
        name: SmolStr,
    },
}

// ============================================================================
// NODES
// ============================================================================

/// One node of the built tree.
#[derive(Debug, Clone)]
pub struct Node {
    span: SourceSpan,
    class_reference: Option<QName>,
    valid_for_codegen: bool,
    children: Vec<Node>,
    payload: NodePayload,
}

impl Node {
    pub(crate) fn new(
        span: SourceSpan,
        class_reference: Option<QName>,
        valid_for_codegen: bool,
        children: Vec<Node>,
        payload: NodePayload,
    ) -> Self {
        Self {
            span,
            class_reference,
            valid_for_codegen,
            children,
            payload,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match &self.payload {
            NodePayload::Document(_) => NodeKind::Document,
            NodePayload::Instance { .. } => NodeKind::Instance,
            NodePayload::Expression { type_tag, .. } => match type_tag {
                ExprType::Boolean => NodeKind::Boolean,
                ExprType::Int => NodeKind::Int,
                ExprType::Uint => NodeKind::Uint,
                ExprType::Number => NodeKind::Number,
                ExprType::String => NodeKind::String,
                ExprType::RegExp => NodeKind::RegExp,
                ExprType::Function => NodeKind::Function,
                ExprType::Array => NodeKind::Array,
                ExprType::Vector => NodeKind::Vector,
                ExprType::Other => NodeKind::Expression,
            },
            NodePayload::Array { .. } => NodeKind::Array,
            NodePayload::Vector { .. } => NodeKind::Vector,
            NodePayload::Object { .. } => NodeKind::Object,
            NodePayload::Literal { .. } => NodeKind::Literal,
            NodePayload::SingleBinding { .. } => NodeKind::SingleDataBinding,
            NodePayload::ConcatenatedBinding => NodeKind::ConcatenatedDataBinding,
            NodePayload::Clear => NodeKind::Clear,
            NodePayload::Embed { .. } => NodeKind::Embed,
            NodePayload::Resource { .. } => NodeKind::Resource,
            NodePayload::Library => NodeKind::Library,
            NodePayload::Definition { .. } => NodeKind::Definition,
            NodePayload::Private => NodeKind::Private,
            NodePayload::DesignLayer { .. } => NodeKind::DesignLayer,
            NodePayload::Factory => NodeKind::Factory,
            NodePayload::ClassReference => NodeKind::ClassReference,
            NodePayload::PropertySpecifier { .. } => NodeKind::PropertySpecifier,
            NodePayload::RequestProperty { .. } => NodeKind::RequestProperty,
            NodePayload::Operation { .. } => NodeKind::Operation,
            NodePayload::ImplicitImport { .. } => NodeKind::ImplicitImport,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind().display()
    }

    pub fn span(&self) -> SourceSpan {
        self.span
    }

    /// The runtime class this node references, when it has one.
    pub fn class_reference(&self) -> Option<&QName> {
        self.class_reference.as_ref()
    }

    /// Whether later phases may generate code from this node.
    pub fn is_valid_for_codegen(&self) -> bool {
        self.valid_for_codegen
    }

    pub fn payload(&self) -> &NodePayload {
        &self.payload
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// The child at `index`.
    ///
    /// # Panics
    ///
    /// Panics when `index` is out of range; callers index within
    /// `child_count()`.
    pub fn child(&self, index: usize) -> &Node {
        match self.children.get(index) {
            Some(child) => child,
            None => panic!(
                "child index {index} out of range for {} node with {} children",
                self.kind_name(),
                self.children.len()
            ),
        }
    }

    /// The declared `id`, for node kinds that can carry one.
    pub fn id(&self) -> Option<&str> {
        match &self.payload {
            NodePayload::Document(doc) => doc.id.as_deref(),
            NodePayload::Instance { id }
            | NodePayload::Expression { id, .. }
            | NodePayload::Array { id }
            | NodePayload::Vector { id, .. }
            | NodePayload::Object { id }
            | NodePayload::DesignLayer { id } => id.as_deref(),
            _ => None,
        }
    }

    /// The resolved value, for expression-typed nodes.
    pub fn value(&self) -> Option<&ExprValue> {
        match &self.payload {
            NodePayload::Expression { value, .. } => Some(value),
            _ => None,
        }
    }

    /// The compile-time constant this node resolves to, substituting
    /// the typed default when the source supplied no value. `None` for
    /// computed values and non-expression nodes.
    pub fn effective_value(&self) -> Option<LiteralValue> {
        match &self.payload {
            NodePayload::Expression {
                type_tag,
                value: ExprValue::Default,
                ..
            } => Some(type_tag.default_value()),
            NodePayload::Expression {
                value: ExprValue::Literal(value),
                ..
            } => Some(value.clone()),
            NodePayload::Literal { value } => Some(value.clone()),
            _ => None,
        }
    }

    /// The binding expression, for single-binding nodes.
    pub fn binding_expression(&self) -> Option<&ExprNode> {
        match &self.payload {
            NodePayload::SingleBinding { expression } => Some(expression),
            _ => None,
        }
    }

    /// The specifier name, for property and request-property nodes.
    pub fn specifier_name(&self) -> Option<&str> {
        match &self.payload {
            NodePayload::PropertySpecifier { name } | NodePayload::RequestProperty { name } => {
                Some(name)
            }
            _ => None,
        }
    }

    /// The operation name, for operation nodes that declared one.
    pub fn method_name(&self) -> Option<&str> {
        match &self.payload {
            NodePayload::Operation { name } => name.as_deref(),
            _ => None,
        }
    }

    pub fn definition_name(&self) -> Option<&str> {
        match &self.payload {
            NodePayload::Definition { name } => name.as_deref(),
            _ => None,
        }
    }

    /// The imported qualified name, for implicit import nodes.
    pub fn import_name(&self) -> Option<&str> {
        match &self.payload {
            NodePayload::ImplicitImport { name } => Some(name),
            _ => None,
        }
    }

    /// Document-level facts, for the root node.
    pub fn document(&self) -> Option<&DocumentPayload> {
        match &self.payload {
            NodePayload::Document(doc) => Some(doc),
            _ => None,
        }
    }

    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind_name())?;
        if let Some(class) = &self.class_reference {
            write!(f, "({class})")?;
        }
        if let Some(id) = self.id() {
            write!(f, " id={id}")?;
        }
        if let NodePayload::PropertySpecifier { name }
        | NodePayload::RequestProperty { name }
        | NodePayload::ImplicitImport { name } = &self.payload
        {
            write!(f, " {name}")?;
        }
        if !self.valid_for_codegen {
            f.write_str(" (invalid)")?;
        }
        Ok(())
    }

    fn dump(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for _ in 0..depth {
            f.write_str("  ")?;
        }
        self.describe(f)?;
        writeln!(f)?;
        for child in &self.children {
            child.dump(f, depth + 1)?;
        }
        Ok(())
    }
}

/// Indented tree dump, one node per line.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.dump(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FileId;
    use text_size::TextSize;

    fn span() -> SourceSpan {
        SourceSpan::empty(FileId::new(0), TextSize::from(0))
    }

    #[test]
    fn typed_defaults() {
        assert_eq!(ExprType::Boolean.default_value(), LiteralValue::Bool(false));
        assert_eq!(ExprType::Int.default_value(), LiteralValue::Int(0));
        assert_eq!(ExprType::Uint.default_value(), LiteralValue::Uint(0));
        let LiteralValue::Number(n) = ExprType::Number.default_value() else {
            panic!("expected a Number default");
        };
        assert!(n.is_nan());
        assert_eq!(ExprType::String.default_value(), LiteralValue::Null);
        assert_eq!(ExprType::RegExp.default_value(), LiteralValue::Null);
        assert_eq!(ExprType::Function.default_value(), LiteralValue::Null);
    }

    #[test]
    fn expression_kind_follows_type_tag() {
        let node = Node::new(
            span(),
            None,
            true,
            Vec::new(),
            NodePayload::Expression {
                type_tag: ExprType::Uint,
                id: None,
                value: ExprValue::Default,
            },
        );
        assert_eq!(node.kind(), NodeKind::Uint);
        assert_eq!(node.effective_value(), Some(LiteralValue::Uint(0)));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn child_access_panics_out_of_range() {
        let node = Node::new(span(), None, true, Vec::new(), NodePayload::Library);
        node.child(0);
    }
}
