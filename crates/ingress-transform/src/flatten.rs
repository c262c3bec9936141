//! Recursive-descent flattening of SDMX header elements.
//!
//! Every leaf of the header becomes one scalar field. Keys are the path of
//! local names from the header down to the leaf, joined by a single space:
//!
//! | element                                   | key(s)                          |
//! |-------------------------------------------|---------------------------------|
//! | `<ID>IREF1</ID>`                          | `ID`                            |
//! | `<Sender id="ONS"><Name>x</Name></Sender>` | `Sender @id`, `Sender Name`     |
//! | `<Name xml:lang="en">Title</Name>`        | `Name @xml:lang`, `Name #text`  |
//! | `<Test/>`                                 | `Test` (empty string)           |
//!
//! Repeated siblings get a 1-based ` N` suffix so neither is lost. The
//! `message:`, `common:` and `na_:` prefixes are stripped from element names.

use indexmap::IndexMap;

use crate::error::FlattenError;
use crate::xml::XmlElement;

/// Ordered header field name to scalar value.
pub type FlatMap = IndexMap<String, String>;

/// Namespace prefixes removed from header keys.
pub const STRIPPED_PREFIXES: &[&str] = &["message:", "common:", "na_:"];

const MAX_DEPTH: usize = 32;

/// Remove a known namespace prefix from an element name.
pub fn strip_namespace(name: &str) -> &str {
    STRIPPED_PREFIXES
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
}

/// Flatten the children of `header` into scalar fields.
pub fn flatten_header(header: &XmlElement) -> Result<FlatMap, FlattenError> {
    let mut out = FlatMap::new();
    flatten_children(header, "", 0, &mut out)?;
    Ok(out)
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent} {key}")
    }
}

fn insert(out: &mut FlatMap, key: String, value: String) -> Result<(), FlattenError> {
    if out.contains_key(&key) {
        return Err(FlattenError::DuplicateKey { key });
    }
    out.insert(key, value);
    Ok(())
}

fn flatten_children(
    element: &XmlElement,
    prefix: &str,
    depth: usize,
    out: &mut FlatMap,
) -> Result<(), FlattenError> {
    let mut totals: IndexMap<&str, usize> = IndexMap::new();
    for child in &element.children {
        *totals.entry(strip_namespace(&child.name)).or_default() += 1;
    }

    let mut seen: IndexMap<&str, usize> = IndexMap::new();
    for child in &element.children {
        let name = strip_namespace(&child.name);
        let index = seen.entry(name).or_default();
        *index += 1;
        let key = if totals[name] > 1 {
            join(prefix, &format!("{name} {index}"))
        } else {
            join(prefix, name)
        };
        flatten_element(child, key, depth + 1, out)?;
    }
    Ok(())
}

fn flatten_element(
    element: &XmlElement,
    key: String,
    depth: usize,
    out: &mut FlatMap,
) -> Result<(), FlattenError> {
    if depth > MAX_DEPTH {
        return Err(FlattenError::TooDeep {
            key,
            limit: MAX_DEPTH,
        });
    }
    if element.is_leaf() {
        return insert(out, key, element.text.clone());
    }

    for (name, value) in &element.attributes {
        insert(out, join(&key, &format!("@{name}")), value.clone())?;
    }
    if !element.text.is_empty() {
        insert(out, join(&key, "#text"), element.text.clone())?;
    }
    flatten_children(element, &key, depth, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;
    use std::path::Path;

    fn header(xml: &str) -> XmlElement {
        let doc = parse_document(xml, Path::new("header.xml")).unwrap();
        doc.roots.into_iter().next().unwrap()
    }

    #[test]
    fn flattens_nested_elements_and_attributes() {
        let flat = flatten_header(&header(
            r#"<message:Header>
                 <message:ID>IREF1</message:ID>
                 <message:Test>false</message:Test>
                 <message:Sender id="ONS"><common:Name>Office</common:Name></message:Sender>
                 <message:Name xml:lang="en">Consumer prices</message:Name>
               </message:Header>"#,
        ))
        .unwrap();

        let pairs: Vec<(&str, &str)> = flat.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        assert_eq!(
            pairs,
            vec![
                ("ID", "IREF1"),
                ("Test", "false"),
                ("Sender @id", "ONS"),
                ("Sender Name", "Office"),
                ("Name @xml:lang", "en"),
                ("Name #text", "Consumer prices"),
            ]
        );
    }

    #[test]
    fn empty_elements_become_empty_strings() {
        let flat = flatten_header(&header("<Header><Source/><Extracted></Extracted></Header>")).unwrap();
        assert_eq!(flat["Source"], "");
        assert_eq!(flat["Extracted"], "");
    }

    #[test]
    fn repeated_siblings_are_numbered() {
        let flat = flatten_header(&header(
            "<Header><Receiver><Name>a</Name><Name>b</Name></Receiver></Header>",
        ))
        .unwrap();
        assert_eq!(flat["Receiver Name 1"], "a");
        assert_eq!(flat["Receiver Name 2"], "b");
    }

    #[test]
    fn names_equal_after_stripping_are_numbered() {
        let flat = flatten_header(&header(
            "<Header><message:ID>1</message:ID><common:ID>2</common:ID></Header>",
        ))
        .unwrap();
        assert_eq!(flat["ID 1"], "1");
        assert_eq!(flat["ID 2"], "2");
    }

    #[test]
    fn excessive_nesting_is_rejected() {
        let depth = MAX_DEPTH + 2;
        let xml = format!("<Header>{}{}</Header>", "<a x=\"1\">".repeat(depth), "</a>".repeat(depth));
        let err = flatten_header(&header(&xml)).unwrap_err();
        assert!(matches!(err, FlattenError::TooDeep { limit: MAX_DEPTH, .. }));
    }
}
