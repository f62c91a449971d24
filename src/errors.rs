/*!
 * Error types for the annoclip application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 *
 * Errors fall into two groups:
 * - `ExportError` is fatal for a run: nothing useful can be derived from an
 *   export whose header or rows cannot be decoded.
 * - `SegmentError` is recoverable: it is caught at the segment boundary, logged
 *   and recorded in the run report.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while decoding a structured literal field
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid literal at offset {offset}: {message}")]
pub struct LiteralError {
    /// Byte offset into the literal text where decoding failed
    pub offset: usize,

    /// What the parser expected or found
    pub message: String,
}

impl LiteralError {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self {
            offset,
            message: message.into(),
        }
    }
}

/// Fatal errors that abort a run before any clip is exported
#[derive(Error, Debug)]
pub enum ExportError {
    /// The export file could not be read
    #[error("Failed to read export file {path:?}: {reason}")]
    Read {
        path: PathBuf,
        reason: String,
    },

    /// The attribute dictionary line is missing or undecodable
    #[error("Malformed attribute header at line {line}: {reason}")]
    MalformedHeader {
        /// 1-based line number in the export file
        line: usize,
        reason: String,
    },

    /// A data row's literal fields are undecodable
    #[error("Failed to decode data row {row} (line {line}): {reason}")]
    RowDecode {
        /// 1-based index of the data row
        row: usize,
        /// 1-based line number in the export file
        line: usize,
        reason: String,
    },

    /// An output category folder could not be created
    #[error("Failed to create output folder {path:?}: {reason}")]
    OutputFolder {
        path: PathBuf,
        reason: String,
    },
}

/// Errors reported by a video engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VideoError {
    /// The source video could not be opened or probed
    #[error("Failed to open source video {path:?}: {reason}")]
    Open {
        path: PathBuf,
        reason: String,
    },

    /// The requested sub-range could not be extracted
    #[error("Failed to extract [{start_sec:.3}s, {end_sec:.3}s): {reason}")]
    Extract {
        start_sec: f64,
        end_sec: f64,
        reason: String,
    },

    /// The clip could not be encoded or written
    #[error("Failed to write clip {path:?}: {reason}")]
    Write {
        path: PathBuf,
        reason: String,
    },

    /// An external process did not finish in time
    #[error("{command} timed out after {secs} seconds")]
    Timeout {
        command: String,
        secs: u64,
    },
}

/// Recoverable per-segment errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SegmentError {
    /// The segment carries no gesture or motion primitive annotation
    #[error("No gesture or motion primitive annotation found")]
    UnresolvedCategory,

    /// Opening, extracting or writing the clip failed
    #[error("Video extraction failed: {0}")]
    VideoExtraction(#[from] VideoError),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Fatal export decoding error
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Per-segment error
    #[error("Segment error: {0}")]
    Segment(#[from] SegmentError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
