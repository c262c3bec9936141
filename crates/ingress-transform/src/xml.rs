//! Typed element tree built from an XML document.
//!
//! SDMX messages are small enough to hold in memory, and every transform
//! step wants random access (header first, then series, then observations),
//! so the whole document is read into [`XmlElement`]s up front. Names are kept
//! exactly as written, prefix included; [`XmlElement::local_name`] drops it.

use std::borrow::Cow;
use std::path::Path;

use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event};

use crate::error::{Result, TransformError};

/// One element with its attributes, child elements and text content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Qualified name, e.g. `message:Header`.
    pub name: String,
    /// Attributes in document order, keyed by qualified name.
    pub attributes: IndexMap<String, String>,
    pub children: Vec<XmlElement>,
    /// Concatenated character data, trimmed.
    pub text: String,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Name without its namespace prefix.
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Namespace prefix, if the name has one.
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// First direct child with the given local name.
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.local_name() == local)
    }

    /// Direct children with the given local name.
    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.local_name() == local)
    }

    /// Attribute value by qualified name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// This element and all its descendants in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// True when the element has neither attributes nor children.
    pub fn is_leaf(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty()
    }
}

/// Pre-order iterator over an element subtree.
pub struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

/// Strip a namespace prefix from a qualified name.
pub fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// The top-level elements of a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    pub roots: Vec<XmlElement>,
}

impl XmlDocument {
    /// The root element when the document has exactly one.
    pub fn single_root(&self) -> Option<&XmlElement> {
        match self.roots.as_slice() {
            [root] => Some(root),
            _ => None,
        }
    }

    pub fn root_names(&self) -> Vec<String> {
        self.roots.iter().map(|r| r.name.clone()).collect()
    }
}

fn syntax_error(path: &Path, message: impl Into<String>) -> TransformError {
    TransformError::XmlSyntax {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn decode<'a>(bytes: &'a [u8], path: &Path) -> Result<Cow<'a, str>> {
    let raw = std::str::from_utf8(bytes).map_err(|e| syntax_error(path, e.to_string()))?;
    unescape(raw).map_err(|e| syntax_error(path, e.to_string()))
}

fn element_from_start(start: &BytesStart<'_>, path: &Path) -> Result<XmlElement> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| syntax_error(path, e.to_string()))?
        .to_string();
    let mut element = XmlElement::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| syntax_error(path, e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| syntax_error(path, e.to_string()))?
            .to_string();
        let value = decode(&attr.value, path)?.into_owned();
        element.attributes.insert(key, value);
    }
    Ok(element)
}

fn resolve_reference(name: &str, path: &Path) -> Result<String> {
    if let Some(code) = name.strip_prefix('#') {
        let parsed = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => code.parse::<u32>(),
        };
        return parsed
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| syntax_error(path, format!("invalid character reference '&{name};'")));
    }
    resolve_predefined_entity(name)
        .map(str::to_string)
        .ok_or_else(|| syntax_error(path, format!("unknown entity '&{name};'")))
}

fn attach(stack: &mut [XmlElement], roots: &mut Vec<XmlElement>, element: XmlElement) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => roots.push(element),
    }
}

/// Deepest element nesting accepted by [`parse_document`].
pub const MAX_XML_DEPTH: usize = 256;

/// Parse `text` into an element tree. `path` is used in error messages only.
///
/// Documents nested deeper than [`MAX_XML_DEPTH`] are rejected.
pub fn parse_document(text: &str, path: &Path) -> Result<XmlDocument> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut roots = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            syntax_error(
                path,
                format!("{e} at byte {}", reader.buffer_position()),
            )
        })?;
        match event {
            Event::Start(start) => {
                if stack.len() >= MAX_XML_DEPTH {
                    return Err(syntax_error(
                        path,
                        format!(
                            "elements nested deeper than {MAX_XML_DEPTH} levels at byte {}",
                            reader.buffer_position()
                        ),
                    ));
                }
                stack.push(element_from_start(&start, path)?);
            }
            Event::Empty(start) => {
                let element = element_from_start(&start, path)?;
                attach(&mut stack, &mut roots, element);
            }
            Event::End(_) => {
                let Some(mut element) = stack.pop() else {
                    return Err(syntax_error(path, "unbalanced end tag"));
                };
                element.text = element.text.trim().to_string();
                attach(&mut stack, &mut roots, element);
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&decode(&text, path)?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    let raw =
                        std::str::from_utf8(&data).map_err(|e| syntax_error(path, e.to_string()))?;
                    current.text.push_str(raw);
                }
            }
            Event::GeneralRef(reference) => {
                if let Some(current) = stack.last_mut() {
                    let name = std::str::from_utf8(&reference)
                        .map_err(|e| syntax_error(path, e.to_string()))?;
                    current.text.push_str(&resolve_reference(name, path)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(syntax_error(path, format!("unclosed element '{}'", open.name)));
    }
    Ok(XmlDocument { roots })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> XmlDocument {
        parse_document(text, Path::new("test.xml")).unwrap()
    }

    #[test]
    fn builds_nested_tree_with_attributes() {
        let doc = parse(
            r#"<?xml version="1.0"?>
<message:Root xmlns:message="urn:x">
  <message:Header><ID>IREF1</ID><Sender id="ONS"/></message:Header>
</message:Root>"#,
        );
        let root = doc.single_root().unwrap();
        assert_eq!(root.local_name(), "Root");
        assert_eq!(root.prefix(), Some("message"));
        assert_eq!(root.attr("xmlns:message"), Some("urn:x"));

        let header = root.child("Header").unwrap();
        assert_eq!(header.child("ID").unwrap().text, "IREF1");
        assert_eq!(header.child("Sender").unwrap().attr("id"), Some("ONS"));
    }

    #[test]
    fn resolves_entities_in_text_and_attributes() {
        let doc = parse(r#"<a t="x &amp; y">Fish &amp; Chips &#x41;&#66;</a>"#);
        let root = doc.single_root().unwrap();
        assert_eq!(root.attr("t"), Some("x & y"));
        assert_eq!(root.text, "Fish & Chips AB");
    }

    #[test]
    fn descendants_are_in_document_order() {
        let doc = parse("<a><b><c/></b><d/></a>");
        let names: Vec<&str> = doc
            .single_root()
            .unwrap()
            .descendants()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn reports_unclosed_elements() {
        let err = parse_document("<a><b></b>", Path::new("broken.xml")).unwrap_err();
        assert!(matches!(err, TransformError::XmlSyntax { .. }));
    }

    #[test]
    fn rejects_excessive_nesting() {
        let depth = 300_000;
        let text = format!("<?xml version=\"1.0\"?><CompactData>{}", "<a>".repeat(depth));
        let err = parse_document(&text, Path::new("deep.xml")).unwrap_err();
        match err {
            TransformError::XmlSyntax { message, .. } => {
                assert!(message.contains("nested deeper than 256"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn accepts_nesting_at_the_limit() {
        let text = format!(
            "{}{}",
            "<a>".repeat(MAX_XML_DEPTH),
            "</a>".repeat(MAX_XML_DEPTH)
        );
        let doc = parse(&text);
        assert_eq!(doc.single_root().unwrap().descendants().count(), MAX_XML_DEPTH);
    }
}
