//! Data-binding detection — brace scanning over source fragments.
//!
//! Attribute values and body text arrive as one or more source
//! fragments (entities, CDATA blocks, and comments break the physical
//! text apart while the logical text flows through). This scanner
//! walks the logical text looking for `{...}` binding expressions,
//! honoring `\{` escapes and nested braces, and splits the input into
//! ordered literal/binding pieces.

use text_size::{TextRange, TextSize};

use crate::base::SourceSpan;
use crate::tagmodel::is_whitespace;

/// A run of logical text plus the physical span it came from.
#[derive(Debug, Clone)]
pub struct SourceFragment {
    pub text: String,
    pub span: SourceSpan,
}

impl SourceFragment {
    pub fn new(text: impl Into<String>, span: SourceSpan) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

/// What the scanner found.
#[derive(Debug, Clone)]
pub enum BindingSplit {
    /// No complete binding: the concatenated logical text.
    None(String),
    /// At least one binding: ordered literal/binding pieces, with
    /// leading and trailing whitespace-only literals trimmed.
    Pieces(Vec<BindingPiece>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    Literal,
    /// Text between a balanced `{` / `}` pair, braces excluded from
    /// the text but included in the span.
    Binding,
}

#[derive(Debug, Clone)]
pub struct BindingPiece {
    pub kind: PieceKind,
    pub text: String,
    pub span: SourceSpan,
}

/// Scan fragments for data bindings.
///
/// `\{` always produces a literal `{` (the backslash is dropped and
/// the brace never opens a binding). An unterminated `{...` is not a
/// binding; its text stays literal, brace included.
pub fn scan_bindings(fragments: &[SourceFragment]) -> BindingSplit {
    let mut scanner = Scanner::default();
    for fragment in fragments {
        scanner.fragment(fragment);
    }
    scanner.finish()
}

#[derive(Default)]
struct Scanner {
    pieces: Vec<BindingPiece>,
    text: String,
    span: Option<SourceSpan>,
    /// Brace depth; zero means literal mode.
    nesting: u32,
    /// Span of a pending `\` that may escape the next character.
    escape: Option<SourceSpan>,
    /// Where the outermost `{` of the current binding sits.
    open_brace: Option<SourceSpan>,
    /// Literal text pending when the current binding opened, restored
    /// if the binding never closes.
    pending: Option<(String, Option<SourceSpan>)>,
}

impl Scanner {
    fn fragment(&mut self, fragment: &SourceFragment) {
        let base = fragment.span.range.start();
        let file = fragment.span.file;
        for (idx, c) in fragment.text.char_indices() {
            let start = base + TextSize::from(idx as u32);
            let end = start + TextSize::from(c.len_utf8() as u32);
            let char_span = SourceSpan::new(file, TextRange::new(start, end));

            match c {
                '\\' if self.nesting == 0 && self.escape.is_none() => {
                    self.escape = Some(char_span);
                }
                '{' if self.nesting == 0 => {
                    if self.escape.take().is_some() {
                        self.push('{', char_span);
                    } else {
                        self.open_binding(char_span);
                    }
                }
                '{' => {
                    self.nesting += 1;
                    self.push('{', char_span);
                }
                '}' if self.nesting > 1 => {
                    self.nesting -= 1;
                    self.push('}', char_span);
                }
                '}' if self.nesting == 1 => {
                    self.close_binding(char_span);
                }
                _ => {
                    // A backslash only escapes '{'; otherwise it is
                    // ordinary text.
                    if let Some(span) = self.escape.take() {
                        self.push('\\', span);
                    }
                    self.push(c, char_span);
                }
            }
        }
    }

    fn push(&mut self, c: char, span: SourceSpan) {
        self.text.push(c);
        self.span = Some(match self.span {
            Some(s) => s.cover(span),
            None => span,
        });
    }

    fn open_binding(&mut self, brace: SourceSpan) {
        let text = std::mem::take(&mut self.text);
        let span = self.span.take();
        self.flush_piece(PieceKind::Literal, text.clone(), span);
        self.pending = Some((text, span));
        self.open_brace = Some(brace);
        self.nesting = 1;
    }

    fn close_binding(&mut self, brace: SourceSpan) {
        let text = std::mem::take(&mut self.text);
        let inner = self.span.take();
        let open = self.open_brace.take().unwrap_or(brace);
        // The binding span includes both braces.
        let mut span = open.cover(brace);
        if let Some(inner) = inner {
            span = span.cover(inner);
        }
        self.pieces.push(BindingPiece {
            kind: PieceKind::Binding,
            text,
            span,
        });
        self.pending = None;
        self.nesting = 0;
    }

    fn flush_piece(&mut self, kind: PieceKind, text: String, span: Option<SourceSpan>) {
        if text.is_empty() {
            return;
        }
        let Some(span) = span else {
            return;
        };
        self.pieces.push(BindingPiece { kind, text, span });
    }

    fn finish(mut self) -> BindingSplit {
        // A backslash at the very end of the input escapes nothing; it
        // stays in the text.
        if let Some(span) = self.escape.take() {
            self.push('\\', span);
        }

        if self.nesting > 0 {
            // Unterminated binding: restore the literal run and fold
            // the brace plus scanned text back into it.
            let (mut text, mut span) = self.pending.take().unwrap_or_default();
            if let Some(last) = self.pieces.last()
                && last.kind == PieceKind::Literal
                && last.text == text
            {
                self.pieces.pop();
            }
            text.push('{');
            text.push_str(&self.text);
            span = match (span, self.open_brace.take()) {
                (Some(s), Some(b)) => Some(s.cover(b)),
                (None, b) => b,
                (s, None) => s,
            };
            if let (Some(s), Some(inner)) = (span, self.span) {
                span = Some(s.cover(inner));
            }
            self.text = text;
            self.span = span;
        }

        let text = std::mem::take(&mut self.text);
        let span = self.span.take();
        self.flush_piece(PieceKind::Literal, text, span);

        if !self.pieces.iter().any(|p| p.kind == PieceKind::Binding) {
            let combined = self
                .pieces
                .into_iter()
                .map(|p| p.text)
                .collect::<String>();
            return BindingSplit::None(combined);
        }

        // Leading/trailing whitespace-only literals are presentation
        // artifacts of the markup, not part of the value.
        let mut pieces = self.pieces;
        if let Some(first) = pieces.first()
            && first.kind == PieceKind::Literal
            && is_whitespace(&first.text)
        {
            pieces.remove(0);
        }
        if let Some(last) = pieces.last()
            && last.kind == PieceKind::Literal
            && is_whitespace(&last.text)
        {
            pieces.pop();
        }

        BindingSplit::Pieces(pieces)
    }
}
