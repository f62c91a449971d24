/*!
 * Annotation export decoding.
 *
 * An export is a row-oriented text file:
 * - lines 0-7: informational comments
 * - line 8: `# ATTRIBUTE = {...}` carrying the attribute dictionary as JSON
 * - line 9: CSV header comment
 * - line 10 onward: one CSV row per annotated time interval
 *
 * `ExportDocument` owns the raw text and hands out the attribute dictionary and
 * a lazy iterator over the segment rows.
 */

pub mod attributes;
pub mod segments;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::ExportError;
use crate::file_utils::FileManager;

pub use attributes::{Attribute, AttributeDictionary, ATTRIBUTE_PREFIX};
pub use segments::{Annotation, Segment, SegmentRows};

/// Line offsets of the export format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportLayout {
    /// Zero-indexed line carrying the attribute dictionary
    #[serde(default = "default_attribute_line")]
    pub attribute_line: usize,

    /// Zero-indexed line where data rows begin
    #[serde(default = "default_data_start_line")]
    pub data_start_line: usize,
}

impl Default for ExportLayout {
    fn default() -> Self {
        Self {
            attribute_line: default_attribute_line(),
            data_start_line: default_data_start_line(),
        }
    }
}

fn default_attribute_line() -> usize {
    8
}

fn default_data_start_line() -> usize {
    10
}

/// Raw export text plus its format layout
#[derive(Debug, Clone)]
pub struct ExportDocument {
    content: String,
    layout: ExportLayout,
}

impl ExportDocument {
    pub fn new(content: impl Into<String>, layout: ExportLayout) -> Self {
        Self {
            content: content.into(),
            layout,
        }
    }

    /// Read an export file from disk
    pub fn open<P: AsRef<Path>>(path: P, layout: ExportLayout) -> Result<Self, ExportError> {
        let path = path.as_ref();
        let content = FileManager::read_to_string(path).map_err(|e| ExportError::Read {
            path: path.to_path_buf(),
            reason: format!("{:#}", e),
        })?;
        Ok(Self::new(content, layout))
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn layout(&self) -> ExportLayout {
        self.layout
    }

    /// Decode the attribute dictionary header
    pub fn attributes(&self) -> Result<AttributeDictionary, ExportError> {
        AttributeDictionary::from_export(&self.content, self.layout.attribute_line)
    }

    /// Fresh iterator over the data rows, in file order
    pub fn segments(&self) -> SegmentRows<'_> {
        SegmentRows::new(&self.content, self.layout.data_start_line)
    }

    /// Decode every data row, failing on the first malformed one
    pub fn collect_segments(&self) -> Result<Vec<Segment>, ExportError> {
        self.segments().collect()
    }
}
