/*!
 * Pipeline driver.
 *
 * Runs one export end to end:
 * 1. decode the attribute dictionary (fatal on failure)
 * 2. decode every segment row (fatal on failure)
 * 3. classify attributes and create the category folders
 * 4. resolve and export each segment in row order
 *
 * Steps 1-2 complete before anything touches the output directory, so a broken
 * export never leaves partial output behind. Per-segment failures in step 4
 * are logged, recorded in the report, and do not stop the run.
 */

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use log::{debug, info, warn};

use crate::annotation::{ExportDocument, ExportLayout};
use crate::errors::{ExportError, SegmentError};
use crate::exporter::{ExportOutcome, SegmentExporter};
use crate::naming::{FolderPrecedence, SegmentNamer};
use crate::report::{RunReport, SegmentOutcome, SegmentStatus, SkipReason};
use crate::taxonomy::CategoryIndex;
use crate::video::{EncodingSettings, VideoEngine};

/// Knobs of a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub layout: ExportLayout,
    pub encoding: EncodingSettings,
    pub folder_precedence: FolderPrecedence,
    /// Directory relative video references resolve against; defaults to the
    /// directory holding the export file
    pub video_root: Option<PathBuf>,
    /// Keep clips left by an earlier run instead of re-cutting them
    pub skip_existing: bool,
    /// Resolve outputs without creating folders or writing clips
    pub dry_run: bool,
    pub show_progress: bool,
}

/// Sequences decoding, naming and export over one export file
pub struct Pipeline<E: VideoEngine> {
    engine: E,
    options: PipelineOptions,
}

impl<E: VideoEngine + Clone> Pipeline<E> {
    pub fn new(engine: E, options: PipelineOptions) -> Self {
        Self { engine, options }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Run the pipeline over an export file on disk
    pub async fn run<P1: AsRef<Path>, P2: AsRef<Path>>(&self, export_path: P1, output_dir: P2) -> Result<RunReport, ExportError> {
        let export_path = export_path.as_ref();
        let document = ExportDocument::open(export_path, self.options.layout)?;
        let video_root = self.options.video_root.clone().unwrap_or_else(|| {
            export_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        });
        self.run_document(&document, export_path, output_dir.as_ref(), video_root).await
    }

    /// Run the pipeline over an already loaded export
    pub async fn run_document(
        &self,
        document: &ExportDocument,
        export_path: &Path,
        output_dir: &Path,
        video_root: PathBuf,
    ) -> Result<RunReport, ExportError> {
        let attributes = document.attributes()?;
        debug!("Decoded {} attributes from {:?}", attributes.len(), export_path);

        let segments = document.collect_segments()?;
        info!("Parsed {} segments from {:?}", segments.len(), export_path);

        let index = CategoryIndex::build(&attributes, output_dir);
        if index.is_empty() {
            warn!("No gesture or motion primitive attributes in {:?}", export_path);
        }
        if !self.options.dry_run {
            index.prepare_folders()?;
        }

        let namer = SegmentNamer::new(&attributes, &index, self.options.folder_precedence);
        let exporter = SegmentExporter::new(
            self.engine.clone(),
            self.options.encoding.clone(),
            video_root,
            self.options.skip_existing,
        );

        let mut report = RunReport::new(export_path.to_path_buf(), output_dir.to_path_buf(), self.options.dry_run);
        let progress = self.progress_bar(segments.len() as u64);

        for segment in &segments {
            progress.set_message(format!("segment {}", segment.row));

            let status = match namer.resolve(segment) {
                Err(SegmentError::UnresolvedCategory) => {
                    warn!("Skipping segment {}: no valid annotation category found.", segment.row);
                    SegmentStatus::Skipped {
                        reason: SkipReason::UnresolvedCategory,
                    }
                }
                Err(other) => {
                    warn!("Skipping segment {}: {}", segment.row, other);
                    SegmentStatus::Failed { error: other.to_string() }
                }
                Ok(output) if self.options.dry_run => {
                    debug!("Segment {} -> {:?}", segment.row, output.relative_to(output_dir));
                    SegmentStatus::Planned { path: output.path() }
                }
                Ok(output) => match exporter.export(segment, &output).await {
                    Ok(ExportOutcome::Written(path)) => SegmentStatus::Exported { path },
                    Ok(ExportOutcome::AlreadyPresent(path)) => SegmentStatus::AlreadyPresent { path },
                    Err(e) => {
                        warn!("Error exporting segment {} ({}): {}", segment.row, segment.video_file, e);
                        SegmentStatus::Failed { error: e.to_string() }
                    }
                },
            };

            report.push(SegmentOutcome::new(segment, status));
            progress.inc(1);
        }

        progress.finish_and_clear();
        info!("{:?}: {}", export_path, report);
        Ok(report)
    }

    fn progress_bar(&self, total: u64) -> ProgressBar {
        if !self.options.show_progress {
            return ProgressBar::hidden();
        }
        let progress = ProgressBar::new(total);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(template_result.progress_chars("█▓▒░"));
        progress.enable_steady_tick(Duration::from_millis(120));
        progress
    }
}
