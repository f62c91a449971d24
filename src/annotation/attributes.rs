use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::ExportError;

// @module: Attribute dictionary embedded in the export header

/// Marker that introduces the attribute dictionary line
pub const ATTRIBUTE_PREFIX: &str = "# ATTRIBUTE = ";

// @struct: One annotation dimension and its selectable options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    // @field: Attribute name, e.g. "G:HandShape"
    #[serde(rename = "aname")]
    pub name: String,

    // @field: Option id -> human-readable label
    #[serde(default)]
    pub options: BTreeMap<String, String>,

    // @field: Remaining fields (anchor_id, type, desc, ...) kept verbatim
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Attribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: BTreeMap::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Builder-style helper to add an option
    pub fn with_option(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.insert(id.into(), label.into());
        self
    }

    /// Label for an option id, if the id is known
    pub fn option_label(&self, option_id: &str) -> Option<&str> {
        self.options.get(option_id).map(String::as_str)
    }
}

/// Attribute id -> attribute definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeDictionary {
    attributes: BTreeMap<String, Attribute>,
}

impl AttributeDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, attribute: Attribute) {
        self.attributes.insert(id.into(), attribute);
    }

    pub fn get(&self, id: &str) -> Option<&Attribute> {
        self.attributes.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Attribute)> {
        self.attributes.iter()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Decode the attribute header line.
    ///
    /// `line_number` is the 1-based line in the export and only feeds diagnostics.
    pub fn parse_header_line(line: &str, line_number: usize) -> Result<Self, ExportError> {
        let trimmed = line.trim();
        let payload = trimmed.strip_prefix(ATTRIBUTE_PREFIX.trim_end()).ok_or_else(|| {
            ExportError::MalformedHeader {
                line: line_number,
                reason: format!("expected line to start with '{}'", ATTRIBUTE_PREFIX.trim_end()),
            }
        })?;

        serde_json::from_str(payload.trim()).map_err(|e| ExportError::MalformedHeader {
            line: line_number,
            reason: format!("invalid attribute dictionary: {}", e),
        })
    }

    /// Locate and decode the attribute dictionary at a fixed line of the export
    pub fn from_export(content: &str, attribute_line: usize) -> Result<Self, ExportError> {
        let line = content.lines().nth(attribute_line).ok_or_else(|| ExportError::MalformedHeader {
            line: attribute_line + 1,
            reason: format!(
                "export has only {} lines, attribute dictionary expected on line {}",
                content.lines().count(),
                attribute_line + 1
            ),
        })?;
        Self::parse_header_line(line, attribute_line + 1)
    }

    /// Encode back to the JSON payload shape used in the header line
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl<'a> IntoIterator for &'a AttributeDictionary {
    type Item = (&'a String, &'a Attribute);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.iter()
    }
}

impl FromIterator<(String, Attribute)> for AttributeDictionary {
    fn from_iter<I: IntoIterator<Item = (String, Attribute)>>(iter: I) -> Self {
        Self {
            attributes: iter.into_iter().collect(),
        }
    }
}
