//! SDMX structure-definition messages used to enrich metadata.

use std::path::Path;

use indexmap::IndexMap;

use crate::checks::{check_xml_type, read_xml_text};
use crate::error::Result;
use crate::xml::parse_document;

/// Concepts and dimension formats read from a structure message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureDefinition {
    /// `Header/Prepared` text, if present.
    pub prepared: Option<String>,
    /// Concept id to its `Name` text.
    pub concepts: IndexMap<String, String>,
    /// Dimension concept reference to its `TextFormat@textType`.
    pub dimensions: IndexMap<String, String>,
}

impl StructureDefinition {
    /// Display title for a column, if the structure names it.
    pub fn title(&self, column: &str) -> Option<&str> {
        self.concepts
            .get(column)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    /// Datatype for a column, if the structure declares one.
    pub fn datatype(&self, column: &str) -> Option<&str> {
        self.dimensions.get(column).map(String::as_str)
    }
}

/// Read a structure message from `path`.
pub fn read_structure(path: &Path) -> Result<StructureDefinition> {
    let text = read_xml_text(path)?;
    let doc = parse_document(&text, path)?;
    let root = check_xml_type(&doc, "Structure", path)?;

    let prepared = root
        .child("Header")
        .and_then(|header| header.child("Prepared"))
        .map(|prepared| prepared.text.clone());

    let mut structure = StructureDefinition {
        prepared,
        ..StructureDefinition::default()
    };
    for element in root.descendants() {
        match element.local_name() {
            "Concept" => {
                if let Some(id) = element.attr("id") {
                    let name = element
                        .child("Name")
                        .map(|name| name.text.clone())
                        .unwrap_or_default();
                    structure.concepts.insert(id.to_string(), name);
                }
            }
            "Dimension" => {
                if let Some(concept) = element.attr("conceptRef") {
                    let text_type = element
                        .child("TextFormat")
                        .and_then(|format| format.attr("textType"))
                        .unwrap_or("string");
                    structure
                        .dimensions
                        .insert(concept.to_string(), text_type.to_string());
                }
            }
            _ => {}
        }
    }
    Ok(structure)
}
