//! Tag model — the immutable view of a parsed UIML document.
//!
//! The tree builder consumes this model read-only: tag identity
//! (prefix, local name, resolved namespace), ordered attributes,
//! ordered child units (child tags and text runs), and a source span
//! per unit. [`reader`] produces the model from UIML source text.
//!
//! Problems at the level of malformed XML (unbalanced tags, bad
//! entities) are caught by the reader, before tree construction.

mod reader;

pub use reader::{ReadError, parse_document};

use smol_str::SmolStr;

use crate::base::{FileId, SourceSpan};

/// The reserved namespace for built-in language tags
/// (`Library`, `Definition`, `Private`, `DesignLayer`, `Object`, ...).
pub const LANGUAGE_NAMESPACE: &str = "http://ns.arbor.dev/uiml/2009";

/// One parsed UIML document: a root tag plus document-level facts.
#[derive(Debug, Clone)]
pub struct TagDocument {
    pub file: FileId,
    /// The language namespace this document declares. Always present;
    /// the reader defaults it when the document never binds one.
    pub language_namespace: SmolStr,
    pub root: TagData,
}

/// One markup element: identity, attributes, child units, span.
#[derive(Debug, Clone)]
pub struct TagData {
    /// Local name, without prefix.
    pub name: SmolStr,
    /// The prefix as written (`ui` in `<ui:Button>`), if any.
    pub prefix: Option<SmolStr>,
    /// The resolved namespace URI. `None` when the prefix is unbound,
    /// which the construction protocol reports as a problem.
    pub namespace: Option<SmolStr>,
    /// Attributes in document order.
    pub attributes: Vec<AttributeData>,
    /// Child units (tags and text runs) in document order.
    pub units: Vec<UnitData>,
    /// Span of the whole element, open tag through matching close tag.
    pub span: SourceSpan,
}

impl TagData {
    /// Look up an attribute by local name.
    pub fn attribute(&self, name: &str) -> Option<&AttributeData> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Whether this tag lives in the document's language namespace.
    pub fn is_language_tag(&self, language_namespace: &str) -> bool {
        self.namespace.as_deref() == Some(language_namespace)
    }

    /// Child tags only, skipping text runs.
    pub fn child_tags(&self) -> impl Iterator<Item = &TagData> {
        self.units.iter().filter_map(|u| match u {
            UnitData::Tag(t) => Some(t),
            UnitData::Text(_) => None,
        })
    }
}

/// One child unit of a tag: either a nested tag or a text run.
#[derive(Debug, Clone)]
pub enum UnitData {
    Tag(TagData),
    Text(TextData),
}

impl UnitData {
    pub fn span(&self) -> SourceSpan {
        match self {
            UnitData::Tag(t) => t.span,
            UnitData::Text(t) => t.span,
        }
    }
}

/// A run of character data: plain text, a CDATA block, or a comment.
#[derive(Debug, Clone)]
pub struct TextData {
    pub kind: TextKind,
    /// The logical (entity-decoded) text.
    pub text: String,
    pub span: SourceSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Text,
    Cdata,
    Comment,
}

impl TextData {
    /// Whether this run is pure whitespace after dialect trimming.
    pub fn is_whitespace(&self) -> bool {
        is_whitespace(&self.text)
    }
}

/// One attribute: identity plus raw (undecoded-by-the-core) value.
#[derive(Debug, Clone)]
pub struct AttributeData {
    pub name: SmolStr,
    pub prefix: Option<SmolStr>,
    /// Resolved namespace URI of the attribute itself. Unprefixed
    /// attributes have no namespace.
    pub namespace: Option<SmolStr>,
    pub raw_value: String,
    /// Span of the whole `name="value"` construct.
    pub span: SourceSpan,
}

/// Classification of an attribute, checked before tag-specific handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeClass {
    /// `xmlns` / `xmlns:foo` namespace declaration.
    Namespace,
    /// Foreign-namespace attribute: its URI is neither the language
    /// namespace nor the tag's own namespace.
    Private,
    /// Anything else — handed to the tag-specific handler.
    Ordinary,
}

impl AttributeData {
    /// Classify this attribute relative to its owning tag.
    pub fn classify(&self, tag: &TagData, language_namespace: &str) -> AttributeClass {
        if self.prefix.as_deref() == Some("xmlns") || (self.prefix.is_none() && self.name == "xmlns")
        {
            return AttributeClass::Namespace;
        }
        match self.namespace.as_deref() {
            Some(uri) if uri != language_namespace && Some(uri) != tag.namespace.as_deref() => {
                AttributeClass::Private
            }
            _ => AttributeClass::Ordinary,
        }
    }

    /// The raw value with surrounding dialect whitespace removed.
    pub fn trimmed_value(&self) -> &str {
        trim(&self.raw_value)
    }
}

/// Characters the dialect treats as whitespace in text runs and
/// attribute values.
fn is_dialect_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{000C}')
}

/// Whether the text is entirely dialect whitespace.
pub fn is_whitespace(text: &str) -> bool {
    text.chars().all(is_dialect_space)
}

/// Trim dialect whitespace from both ends.
pub fn trim(text: &str) -> &str {
    text.trim_matches(is_dialect_space)
}
