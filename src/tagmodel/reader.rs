//! XML reader — builds a [`TagDocument`] from UIML source text.
//!
//! Uses `quick-xml` with namespace resolution. Only well-formedness is
//! enforced here; everything about which tags/attributes are *allowed*
//! is the tree builder's job.

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};
use thiserror::Error;

use crate::base::{FileId, SourceSpan};

use super::{
    AttributeData, LANGUAGE_NAMESPACE, TagData, TagDocument, TextData, TextKind, UnitData,
};

/// Errors produced while reading a document.
///
/// These are all fatal for the document: without a well-formed tag
/// tree there is nothing for the tree builder to walk.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),
    #[error("document has no root element")]
    NoRootElement,
    #[error("document has more than one root element")]
    MultipleRootElements,
}

/// Parse UIML source text into a tag document.
pub fn parse_document(file: FileId, source: &str) -> Result<TagDocument, ReadError> {
    let mut reader = NsReader::from_str(source);
    let mut stack: Vec<TagData> = Vec::new();
    let mut root: Option<TagData> = None;

    let mut last_pos = 0u64;
    loop {
        let event = reader.read_event()?;
        let pos = reader.buffer_position();
        let span = span_between(file, last_pos, pos);

        match event {
            Event::Start(start) => {
                if root.is_some() && stack.is_empty() {
                    return Err(ReadError::MultipleRootElements);
                }
                let tag = open_tag(&reader, &start, file, last_pos)?;
                stack.push(tag);
            }
            Event::Empty(start) => {
                if root.is_some() && stack.is_empty() {
                    return Err(ReadError::MultipleRootElements);
                }
                let mut tag = open_tag(&reader, &start, file, last_pos)?;
                tag.span = span;
                attach(&mut stack, &mut root, tag);
            }
            Event::End(_) => {
                // quick-xml validates tag balance, so the stack is
                // never empty here.
                let mut tag = stack.pop().expect("balanced tags");
                tag.span = SourceSpan::new(file, TextRange::new(tag.span.start(), span.end()));
                attach(&mut stack, &mut root, tag);
            }
            Event::Text(text) => {
                let logical = text.unescape()?.into_owned();
                push_text(&mut stack, TextKind::Text, logical, span);
            }
            Event::CData(data) => {
                let logical = String::from_utf8_lossy(data.as_ref()).into_owned();
                push_text(&mut stack, TextKind::Cdata, logical, span);
            }
            Event::Comment(text) => {
                let logical = text.unescape()?.into_owned();
                push_text(&mut stack, TextKind::Comment, logical, span);
            }
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }

        last_pos = pos;
    }

    let root = root.ok_or(ReadError::NoRootElement)?;
    Ok(TagDocument {
        file,
        language_namespace: SmolStr::new_static(LANGUAGE_NAMESPACE),
        root,
    })
}

/// Build a TagData (without children yet) from an open or empty tag.
fn open_tag(
    reader: &NsReader<&[u8]>,
    start: &BytesStart<'_>,
    file: FileId,
    start_pos: u64,
) -> Result<TagData, ReadError> {
    let (resolution, local) = reader.resolve_element(start.name());
    let name = SmolStr::new(String::from_utf8_lossy(local.as_ref()));
    let prefix = start
        .name()
        .prefix()
        .map(|p| SmolStr::new(String::from_utf8_lossy(p.as_ref())));
    let namespace = resolved_uri(resolution);

    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = attribute.key;
        let attr_local = SmolStr::new(String::from_utf8_lossy(key.local_name().as_ref()));
        let attr_prefix = key
            .prefix()
            .map(|p| SmolStr::new(String::from_utf8_lossy(p.as_ref())));
        let (attr_resolution, _) = reader.resolve_attribute(key);
        let raw_value = attribute.unescape_value()?.into_owned();
        attributes.push(AttributeData {
            name: attr_local,
            prefix: attr_prefix,
            namespace: resolved_uri(attr_resolution),
            raw_value,
            // Byte-accurate attribute spans are not available from the
            // event stream; the owning tag's span stands in.
            span: SourceSpan::empty(file, TextSize::from(start_pos as u32)),
        });
    }

    Ok(TagData {
        name,
        prefix,
        namespace,
        attributes,
        units: Vec::new(),
        span: SourceSpan::empty(file, TextSize::from(start_pos as u32)),
    })
}

fn resolved_uri(resolution: ResolveResult<'_>) -> Option<SmolStr> {
    match resolution {
        ResolveResult::Bound(ns) => Some(SmolStr::new(String::from_utf8_lossy(ns.as_ref()))),
        ResolveResult::Unbound | ResolveResult::Unknown(_) => None,
    }
}

fn span_between(file: FileId, start: u64, end: u64) -> SourceSpan {
    SourceSpan::new(
        file,
        TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32)),
    )
}

fn attach(stack: &mut Vec<TagData>, root: &mut Option<TagData>, tag: TagData) {
    match stack.last_mut() {
        Some(parent) => parent.units.push(UnitData::Tag(tag)),
        None => *root = Some(tag),
    }
}

fn push_text(stack: &mut [TagData], kind: TextKind, text: String, span: SourceSpan) {
    // Character data outside the root element is not part of the model.
    if let Some(parent) = stack.last_mut() {
        parent.units.push(UnitData::Text(TextData { kind, text, span }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagmodel::AttributeClass;

    fn parse(source: &str) -> TagDocument {
        parse_document(FileId::new(0), source).expect("well-formed fixture")
    }

    #[test]
    fn parses_root_identity() {
        let doc = parse(r#"<ui:App xmlns:ui="lib://ui" xmlns:fx="http://ns.arbor.dev/uiml/2009"/>"#);
        assert_eq!(doc.root.name, "App");
        assert_eq!(doc.root.prefix.as_deref(), Some("ui"));
        assert_eq!(doc.root.namespace.as_deref(), Some("lib://ui"));
    }

    #[test]
    fn preserves_unit_order() {
        let doc = parse("<a>one<b/>two<c/></a>");
        let kinds: Vec<_> = doc
            .root
            .units
            .iter()
            .map(|u| match u {
                UnitData::Tag(t) => t.name.to_string(),
                UnitData::Text(t) => t.text.clone(),
            })
            .collect();
        assert_eq!(kinds, ["one", "b", "two", "c"]);
    }

    #[test]
    fn classifies_namespace_and_private_attributes() {
        let doc = parse(
            r#"<a xmlns:p="lib://private" xmlns:fx="http://ns.arbor.dev/uiml/2009" p:note="x" plain="y"/>"#,
        );
        let tag = &doc.root;
        let classes: Vec<_> = tag
            .attributes
            .iter()
            .map(|a| a.classify(tag, LANGUAGE_NAMESPACE))
            .collect();
        assert_eq!(
            classes,
            [
                AttributeClass::Namespace,
                AttributeClass::Namespace,
                AttributeClass::Private,
                AttributeClass::Ordinary,
            ]
        );
    }

    #[test]
    fn cdata_is_a_text_unit() {
        let doc = parse("<a><![CDATA[{x}]]></a>");
        match &doc.root.units[0] {
            UnitData::Text(t) => {
                assert_eq!(t.kind, TextKind::Cdata);
                assert_eq!(t.text, "{x}");
            }
            UnitData::Tag(_) => panic!("expected text unit"),
        }
    }

    #[test]
    fn rejects_unbalanced_documents() {
        assert!(parse_document(FileId::new(0), "<a><b></a>").is_err());
        assert!(parse_document(FileId::new(0), "").is_err());
    }
}
