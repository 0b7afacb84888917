//! Recursive-descent parser for the embedded expression language.
//!
//! Produces an [`ExprNode`] tree from expression text found in
//! attribute values, body text, and data bindings. Precedence follows
//! the usual ladder: `||` < `&&` < equality < relational < additive <
//! multiplicative < unary < member/call.

use logos::Logos;
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};
use thiserror::Error;

use super::lexer::TokenKind;
use super::{BinaryOp, ExprNode, LiteralValue, UnaryOp};

/// A failed expression parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ExprError {
    pub message: String,
    /// Byte range within the parsed text.
    pub range: TextRange,
}

impl ExprError {
    fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }
}

/// Parse expression text into a sub-tree.
pub fn parse_expression(text: &str) -> Result<ExprNode, ExprError> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(text);
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let range = TextRange::new(
            TextSize::from(span.start as u32),
            TextSize::from(span.end as u32),
        );
        match result {
            Ok(kind) => tokens.push(Token {
                kind,
                range,
                text: &text[span],
            }),
            Err(()) => return Err(ExprError::new("unrecognized token", range)),
        }
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        end: TextSize::from(text.len() as u32),
    };
    let expr = parser.expression(0)?;
    match parser.peek() {
        None => Ok(expr),
        Some(t) => Err(ExprError::new(
            format!("unexpected token `{}`", t.text),
            t.range,
        )),
    }
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: TokenKind,
    range: TextRange,
    text: &'a str,
}

struct Parser<'a> {
    tokens: &'a [Token<'a>],
    pos: usize,
    end: TextSize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        let token = self.tokens.get(self.pos).copied();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token<'a>, ExprError> {
        match self.bump() {
            Some(t) if t.kind == kind => Ok(t),
            Some(t) => Err(ExprError::new(
                format!("expected {what}, found `{}`", t.text),
                t.range,
            )),
            None => Err(ExprError::new(
                format!("expected {what}, found end of expression"),
                TextRange::empty(self.end),
            )),
        }
    }

    /// Pratt loop over binary operators at or above `min_power`.
    fn expression(&mut self, min_power: u8) -> Result<ExprNode, ExprError> {
        let mut left = self.unary()?;

        while let Some(token) = self.peek() {
            let Some((op, power)) = binary_op(token.kind) else {
                break;
            };
            if power < min_power {
                break;
            }
            self.bump();
            // Left-associative: the right side binds one level tighter.
            let right = self.expression(power + 1)?;
            let range = left.range().cover(right.range());
            left = ExprNode::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                range,
            };
        }

        Ok(left)
    }

    fn unary(&mut self) -> Result<ExprNode, ExprError> {
        if let Some(token) = self.peek() {
            let op = match token.kind {
                TokenKind::Bang => Some(UnaryOp::Not),
                TokenKind::Minus => Some(UnaryOp::Neg),
                _ => None,
            };
            if let Some(op) = op {
                let start = token.range;
                self.bump();
                let operand = self.unary()?;
                let range = start.cover(operand.range());
                return Ok(ExprNode::Unary {
                    op,
                    operand: Box::new(operand),
                    range,
                });
            }
        }
        self.postfix()
    }

    /// Member access and call chains: `a.b.c(d)(e).f`.
    fn postfix(&mut self) -> Result<ExprNode, ExprError> {
        let mut expr = self.primary()?;

        loop {
            match self.peek().map(|t| t.kind) {
                Some(TokenKind::Dot) => {
                    self.bump();
                    let name = self.expect(TokenKind::Identifier, "property name")?;
                    let range = expr.range().cover(name.range);
                    expr = ExprNode::Member {
                        object: Box::new(expr),
                        property: SmolStr::new(name.text),
                        range,
                    };
                }
                Some(TokenKind::LParen) => {
                    self.bump();
                    let mut arguments = Vec::new();
                    if self.peek().is_some_and(|t| t.kind != TokenKind::RParen) {
                        loop {
                            arguments.push(self.expression(0)?);
                            match self.peek().map(|t| t.kind) {
                                Some(TokenKind::Comma) => {
                                    self.bump();
                                }
                                _ => break,
                            }
                        }
                    }
                    let close = self.expect(TokenKind::RParen, "`)`")?;
                    let range = expr.range().cover(close.range);
                    expr = ExprNode::Call {
                        callee: Box::new(expr),
                        arguments,
                        range,
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn primary(&mut self) -> Result<ExprNode, ExprError> {
        let Some(token) = self.bump() else {
            return Err(ExprError::new(
                "expected expression, found end of input",
                TextRange::empty(self.end),
            ));
        };

        let range = token.range;
        match token.kind {
            TokenKind::True => Ok(ExprNode::Literal {
                value: LiteralValue::Bool(true),
                range,
            }),
            TokenKind::False => Ok(ExprNode::Literal {
                value: LiteralValue::Bool(false),
                range,
            }),
            TokenKind::Null => Ok(ExprNode::Literal {
                value: LiteralValue::Null,
                range,
            }),
            TokenKind::Integer => {
                // Out-of-range integer literals widen to Number.
                let value = match token.text.parse::<i32>() {
                    Ok(i) => LiteralValue::Int(i),
                    Err(_) => match token.text.parse::<f64>() {
                        Ok(n) => LiteralValue::Number(n),
                        Err(_) => {
                            return Err(ExprError::new("invalid numeric literal", range));
                        }
                    },
                };
                Ok(ExprNode::Literal { value, range })
            }
            TokenKind::HexInteger => {
                let digits = &token.text[2..];
                let value = u32::from_str_radix(digits, 16)
                    .map(LiteralValue::Uint)
                    .map_err(|_| ExprError::new("invalid hexadecimal literal", range))?;
                Ok(ExprNode::Literal { value, range })
            }
            TokenKind::Number => {
                let value = token
                    .text
                    .parse::<f64>()
                    .map(LiteralValue::Number)
                    .map_err(|_| ExprError::new("invalid numeric literal", range))?;
                Ok(ExprNode::Literal { value, range })
            }
            TokenKind::String => Ok(ExprNode::Literal {
                value: LiteralValue::String(unquote(token.text)),
                range,
            }),
            TokenKind::Identifier => Ok(ExprNode::Identifier {
                name: SmolStr::new(token.text),
                range,
            }),
            TokenKind::LParen => {
                let inner = self.expression(0)?;
                self.expect(TokenKind::RParen, "`)`")?;
                Ok(inner)
            }
            _ => Err(ExprError::new(
                format!("expected expression, found `{}`", token.text),
                range,
            )),
        }
    }
}

/// Binding power table for binary operators.
fn binary_op(kind: TokenKind) -> Option<(BinaryOp, u8)> {
    match kind {
        TokenKind::OrOr => Some((BinaryOp::Or, 1)),
        TokenKind::AndAnd => Some((BinaryOp::And, 2)),
        TokenKind::EqEq => Some((BinaryOp::Eq, 3)),
        TokenKind::NotEq => Some((BinaryOp::NotEq, 3)),
        TokenKind::Lt => Some((BinaryOp::Lt, 4)),
        TokenKind::LtEq => Some((BinaryOp::LtEq, 4)),
        TokenKind::Gt => Some((BinaryOp::Gt, 4)),
        TokenKind::GtEq => Some((BinaryOp::GtEq, 4)),
        TokenKind::Plus => Some((BinaryOp::Add, 5)),
        TokenKind::Minus => Some((BinaryOp::Sub, 5)),
        TokenKind::Star => Some((BinaryOp::Mul, 6)),
        TokenKind::Slash => Some((BinaryOp::Div, 6)),
        TokenKind::Percent => Some((BinaryOp::Rem, 6)),
        _ => None,
    }
}

/// Strip quotes and process escapes in a string literal token.
fn unquote(text: &str) -> String {
    let inner = &text[1..text.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}
