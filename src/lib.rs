/*!
 * # annoclip - Annotation export to labeled clip corpus
 *
 * A Rust library that turns a video annotation export into individual clips,
 * sorted into a gesture / motion primitive taxonomy.
 *
 * ## Features
 *
 * - Decode the attribute dictionary embedded in the export header
 * - Decode segment rows whose CSV fields carry structured literals
 * - Classify attributes by name prefix (`G:` gestures, `MP:` motion primitives)
 * - Deterministic, collision-free clip names per export
 * - Failure-isolated clip export through ffmpeg
 * - Structured run report (JSON)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `literal`: Structured literal parser for CSV fields
 * - `annotation`: Export decoding:
 *   - `annotation::attributes`: Attribute dictionary
 *   - `annotation::segments`: Segment rows
 * - `taxonomy`: Category classification and output folders
 * - `naming`: Clip filenames and destination folders
 * - `video`: Video engine trait with ffmpeg and mock implementations
 * - `exporter`: Export of a single segment
 * - `pipeline`: End-to-end run over one export
 * - `report`: Run report
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod annotation;
pub mod app_controller;
pub mod errors;
pub mod exporter;
pub mod file_utils;
pub mod literal;
pub mod naming;
pub mod pipeline;
pub mod report;
pub mod taxonomy;
pub mod video;

// Re-export main types for easier usage
pub use app_config::Config;
pub use annotation::{Attribute, AttributeDictionary, ExportDocument, ExportLayout, Segment};
pub use errors::{AppError, ExportError, LiteralError, SegmentError, VideoError};
pub use naming::{FolderPrecedence, ResolvedOutput, SegmentNamer};
pub use pipeline::{Pipeline, PipelineOptions};
pub use report::{RunReport, RunStatus, SegmentStatus};
pub use taxonomy::{Category, CategoryIndex};
pub use video::{EncodingSettings, FfmpegEngine, MockEngine, VideoEngine};
