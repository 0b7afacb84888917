//! Expressions — literal values, expression sub-trees, and the
//! data-binding scanner.
//!
//! The tree builder embeds these sub-trees wherever attribute text or
//! body text turns out to be computed rather than constant. Full
//! expression semantics (evaluation, type inference) are out of scope;
//! this module covers exactly the surface needed to parse an embedded
//! expression and hold it in the AST.

mod binding;
mod lexer;
mod parser;

pub use binding::{BindingPiece, BindingSplit, PieceKind, SourceFragment, scan_bindings};
pub use parser::{ExprError, parse_expression};

use std::fmt;

use smol_str::SmolStr;
use text_size::TextRange;

// ============================================================================
// LITERAL VALUES
// ============================================================================

/// A compile-time scalar value.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Bool(bool),
    Int(i32),
    Uint(u32),
    Number(f64),
    String(String),
    Null,
}

impl LiteralValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Boolean",
            Self::Int(_) => "Int",
            Self::Uint(_) => "UInt",
            Self::Number(_) => "Number",
            Self::String(_) => "String",
            Self::Null => "null",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Uint(u) => write!(f, "{u}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Null => f.write_str("null"),
        }
    }
}

// ============================================================================
// EXPRESSION TREES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

/// A parsed expression sub-tree.
///
/// Ranges are byte offsets within the text the expression was parsed
/// from, not document offsets; the embedding node's span locates the
/// text in the document.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprNode {
    Literal {
        value: LiteralValue,
        range: TextRange,
    },
    Identifier {
        name: SmolStr,
        range: TextRange,
    },
    Member {
        object: Box<ExprNode>,
        property: SmolStr,
        range: TextRange,
    },
    Call {
        callee: Box<ExprNode>,
        arguments: Vec<ExprNode>,
        range: TextRange,
    },
    Unary {
        op: UnaryOp,
        operand: Box<ExprNode>,
        range: TextRange,
    },
    Binary {
        op: BinaryOp,
        left: Box<ExprNode>,
        right: Box<ExprNode>,
        range: TextRange,
    },
}

impl ExprNode {
    pub fn range(&self) -> TextRange {
        match self {
            Self::Literal { range, .. }
            | Self::Identifier { range, .. }
            | Self::Member { range, .. }
            | Self::Call { range, .. }
            | Self::Unary { range, .. }
            | Self::Binary { range, .. } => *range,
        }
    }

    /// The literal value, when this is a literal leaf.
    pub fn as_literal(&self) -> Option<&LiteralValue> {
        match self {
            Self::Literal { value, .. } => Some(value),
            _ => None,
        }
    }
}

// ============================================================================
// IDENTIFIER VALIDATION
// ============================================================================

/// Whether `text` is a single valid identifier (usable as an `id`).
pub fn is_valid_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(unicode_ident::is_xid_start(first) || first == '_' || first == '$') {
        return false;
    }
    chars.all(|c| unicode_ident::is_xid_continue(c) || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_validation() {
        assert!(is_valid_identifier("myButton"));
        assert!(is_valid_identifier("_private"));
        assert!(is_valid_identifier("$dollar"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("2fast"));
        assert!(!is_valid_identifier("a b"));
        assert!(!is_valid_identifier("a.b"));
    }
}
