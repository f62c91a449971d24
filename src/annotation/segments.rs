use std::fmt;
use std::str::Lines;

use crate::errors::ExportError;
use crate::literal::{parse_literal, Literal};

// @module: Segment rows of an annotation export

/// CSV field holding the one-element file list
const FIELD_FILE_LIST: usize = 1;
/// CSV field holding the `(start, end)` pair
const FIELD_TEMPORAL: usize = 3;
/// CSV field holding the attribute -> option mapping
const FIELD_METADATA: usize = 5;

// @struct: One selected option for one attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub attribute_id: String,
    pub option_id: String,
}

impl Annotation {
    pub fn new(attribute_id: impl Into<String>, option_id: impl Into<String>) -> Self {
        Self {
            attribute_id: attribute_id.into(),
            option_id: option_id.into(),
        }
    }
}

// @struct: One annotated time interval on a source video
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    // @field: 1-based position among the data rows
    pub row: usize,

    // @field: 1-based line number in the export file
    pub line: usize,

    // @field: Source video reference as written in the export
    pub video_file: String,

    // @field: Interval start in seconds
    pub start_sec: f64,

    // @field: Interval end in seconds, always > start_sec
    pub end_sec: f64,

    // @field: Selections in the order they appear in the row
    pub annotations: Vec<Annotation>,
}

impl Segment {
    pub fn duration_sec(&self) -> f64 {
        self.end_sec - self.start_sec
    }

    /// Decode one CSV data row
    pub fn parse_row(record_line: &str, row: usize, line: usize) -> Result<Self, ExportError> {
        let fail = |reason: String| ExportError::RowDecode { row, line, reason };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(record_line.as_bytes());
        let record = reader
            .records()
            .next()
            .ok_or_else(|| fail("row contains no CSV record".to_string()))?
            .map_err(|e| fail(format!("invalid CSV: {}", e)))?;

        if record.len() <= FIELD_METADATA {
            return Err(fail(format!(
                "expected at least {} fields, found {}",
                FIELD_METADATA + 1,
                record.len()
            )));
        }

        let field = |index: usize, name: &str| -> Result<Literal, ExportError> {
            let text = record.get(index).unwrap_or_default();
            parse_literal(text).map_err(|e| fail(format!("field {} ({}): {}", index, name, e)))
        };

        let video_file = Self::decode_video_file(&field(FIELD_FILE_LIST, "file list")?).map_err(fail)?;
        let (start_sec, end_sec) = Self::decode_interval(&field(FIELD_TEMPORAL, "temporal coordinates")?).map_err(fail)?;
        let annotations = Self::decode_annotations(&field(FIELD_METADATA, "metadata")?).map_err(fail)?;

        Ok(Segment {
            row,
            line,
            video_file,
            start_sec,
            end_sec,
            annotations,
        })
    }

    fn decode_video_file(value: &Literal) -> Result<String, String> {
        let items = value
            .items()
            .ok_or_else(|| format!("file list must be a list, found {}", value.kind()))?;
        let first = items.first().ok_or_else(|| "file list is empty".to_string())?;
        first
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| format!("file list entry must be a string, found {}", first.kind()))
    }

    fn decode_interval(value: &Literal) -> Result<(f64, f64), String> {
        let items = value
            .items()
            .ok_or_else(|| format!("temporal coordinates must be a list or tuple, found {}", value.kind()))?;
        if items.len() != 2 {
            return Err(format!("expected (start, end), found {} values", items.len()));
        }
        let start = items[0]
            .as_f64()
            .ok_or_else(|| format!("start time must be a number, found {}", items[0].kind()))?;
        let end = items[1]
            .as_f64()
            .ok_or_else(|| format!("end time must be a number, found {}", items[1].kind()))?;

        if !start.is_finite() || !end.is_finite() || start < 0.0 {
            return Err(format!("invalid time range [{}, {}]", start, end));
        }
        if end <= start {
            return Err(format!("end time {} is not after start time {}", end, start));
        }
        Ok((start, end))
    }

    /// A repeated attribute id keeps its first position and takes the last option
    fn decode_annotations(value: &Literal) -> Result<Vec<Annotation>, String> {
        let entries = value
            .entries()
            .ok_or_else(|| format!("metadata must be a mapping, found {}", value.kind()))?;

        let mut annotations: Vec<Annotation> = Vec::with_capacity(entries.len());
        for (key, option) in entries {
            let attribute_id = key
                .as_id()
                .ok_or_else(|| format!("attribute id must be a scalar, found {}", key.kind()))?;
            let option_id = option.as_id().ok_or_else(|| {
                format!("option for attribute {} must be a scalar, found {}", attribute_id, option.kind())
            })?;

            match annotations.iter_mut().find(|a| a.attribute_id == attribute_id) {
                Some(existing) => existing.option_id = option_id,
                None => annotations.push(Annotation { attribute_id, option_id }),
            }
        }
        Ok(annotations)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "segment {} ({} [{:.3}s, {:.3}s))",
            self.row, self.video_file, self.start_sec, self.end_sec
        )
    }
}

/// Whether a line carries no data (blank or comment)
pub fn is_skippable_line(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with('#')
}

/// Lazy iterator over the data rows of an export.
///
/// Yields segments in file order. A clone continues from the same position;
/// call `ExportDocument::segments` again for a fresh pass.
#[derive(Clone)]
pub struct SegmentRows<'a> {
    lines: std::iter::Skip<std::iter::Enumerate<Lines<'a>>>,
    next_row: usize,
}

impl<'a> SegmentRows<'a> {
    pub fn new(content: &'a str, data_start_line: usize) -> Self {
        Self {
            lines: content.lines().enumerate().skip(data_start_line),
            next_row: 1,
        }
    }
}

impl Iterator for SegmentRows<'_> {
    type Item = Result<Segment, ExportError>;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, line) in self.lines.by_ref() {
            if is_skippable_line(line) {
                continue;
            }
            let row = self.next_row;
            self.next_row += 1;
            return Some(Segment::parse_row(line.trim(), row, index + 1));
        }
        None
    }
}
