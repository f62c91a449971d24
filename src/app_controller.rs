use anyhow::{anyhow, Context, Result};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::report::{RunReport, RunStatus};
use crate::video::{FfmpegEngine, VideoEngine};

// @module: Application controller for export processing

/// Extension of annotation export files
pub const EXPORT_EXTENSION: &str = "csv";

/// Per-invocation switches that are not part of the config file
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// Keep clips left by an earlier run instead of re-cutting them
    pub skip_existing: bool,
    /// Resolve outputs without writing anything
    pub dry_run: bool,
    /// Directory relative video references resolve against
    pub video_root: Option<PathBuf>,
    /// Where to write the JSON run report(s)
    pub report_path: Option<PathBuf>,
    /// Draw a progress bar
    pub show_progress: bool,
}

/// Results of processing a folder of exports
#[derive(Debug, Default)]
pub struct FolderSummary {
    pub reports: Vec<RunReport>,
    /// Exports that aborted, with the reason
    pub aborted: Vec<(PathBuf, String)>,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn pipeline_options(&self, request: &RunRequest) -> PipelineOptions {
        PipelineOptions {
            layout: self.config.layout,
            encoding: self.config.encoding.clone(),
            folder_precedence: self.config.folder_precedence,
            video_root: request.video_root.clone(),
            skip_existing: request.skip_existing,
            dry_run: request.dry_run,
            show_progress: request.show_progress,
        }
    }

    /// Process one export file with the ffmpeg engine
    pub async fn run(&self, export_file: &Path, output_dir: &Path, request: &RunRequest) -> Result<RunReport> {
        let engine = FfmpegEngine::new(self.config.ffmpeg.clone());
        self.run_with_engine(engine, export_file, output_dir, request).await
    }

    /// Process one export file with the given engine
    pub async fn run_with_engine<E: VideoEngine + Clone>(
        &self,
        engine: E,
        export_file: &Path,
        output_dir: &Path,
        request: &RunRequest,
    ) -> Result<RunReport> {
        let start_time = std::time::Instant::now();

        if !FileManager::file_exists(export_file) {
            return Err(anyhow!("Export file does not exist: {:?}", export_file));
        }

        let pipeline = Pipeline::new(engine, self.pipeline_options(request));
        let report = pipeline
            .run(export_file, output_dir)
            .await
            .with_context(|| format!("Aborted processing of {:?}", export_file))?;

        match report.status() {
            RunStatus::Complete => info!(
                "Finished {:?} in {}: all {} segments done",
                export_file,
                Self::format_duration(start_time.elapsed()),
                report.outcomes.len()
            ),
            RunStatus::Partial { done, skipped, failed } => warn!(
                "Finished {:?} in {}: {} done, {} skipped, {} failed",
                export_file,
                Self::format_duration(start_time.elapsed()),
                done,
                skipped,
                failed
            ),
        }

        if let Some(report_path) = &request.report_path {
            Self::write_report(report_path, &report)?;
        }

        Ok(report)
    }

    /// Process every export under a directory with the ffmpeg engine
    pub async fn run_folder(&self, input_dir: &Path, output_dir: &Path, request: &RunRequest) -> Result<FolderSummary> {
        let engine = FfmpegEngine::new(self.config.ffmpeg.clone());
        self.run_folder_with_engine(engine, input_dir, output_dir, request).await
    }

    /// Process every export under a directory; each export gets its own
    /// subfolder named after the export file, and an aborted export does not
    /// stop the others
    pub async fn run_folder_with_engine<E: VideoEngine + Clone>(
        &self,
        engine: E,
        input_dir: &Path,
        output_dir: &Path,
        request: &RunRequest,
    ) -> Result<FolderSummary> {
        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let exports = FileManager::find_files(input_dir, EXPORT_EXTENSION)?;
        if exports.is_empty() {
            return Err(anyhow!("No export files found in directory: {:?}", input_dir));
        }
        info!("Found {} export files in {:?}", exports.len(), input_dir);

        // Per-export reports go next to the requested report path
        let per_export_request = |export: &Path| RunRequest {
            report_path: request.report_path.as_ref().map(|path| {
                let stem = Self::export_stem(export);
                path.with_file_name(format!("{}.{}", stem, path.file_name().unwrap_or_default().to_string_lossy()))
            }),
            ..request.clone()
        };

        let mut summary = FolderSummary::default();
        for export in &exports {
            let export_output = output_dir.join(Self::export_stem(export));
            match self
                .run_with_engine(engine.clone(), export, &export_output, &per_export_request(export))
                .await
            {
                Ok(report) => summary.reports.push(report),
                Err(e) => {
                    error!("{:#}", e);
                    summary.aborted.push((export.clone(), format!("{:#}", e)));
                }
            }
        }

        info!(
            "Processed {} exports: {} completed, {} aborted",
            exports.len(),
            summary.reports.len(),
            summary.aborted.len()
        );
        Ok(summary)
    }

    fn export_stem(export: &Path) -> String {
        export
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "export".to_string())
    }

    /// Write a run report as JSON
    pub fn write_report(path: &Path, report: &RunReport) -> Result<()> {
        let json = report.to_json().context("Failed to serialize run report")?;
        FileManager::write_to_file(path, &json)?;
        info!("Report written to {:?}", path);
        Ok(())
    }

    /// Format a duration for display
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;

        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
