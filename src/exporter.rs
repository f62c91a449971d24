use std::path::{Path, PathBuf};
use log::{debug, info};

use crate::annotation::Segment;
use crate::errors::SegmentError;
use crate::file_utils::FileManager;
use crate::naming::ResolvedOutput;
use crate::video::{EncodingSettings, VideoEngine};

// @module: Export of one segment through a video engine

/// What happened to a segment handed to the exporter
#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    /// Clip was written to this path
    Written(PathBuf),
    /// Clip already existed and skipping existing clips was requested
    AlreadyPresent(PathBuf),
}

/// Cuts one segment out of its source video and writes the clip
#[derive(Debug)]
pub struct SegmentExporter<E: VideoEngine> {
    engine: E,
    settings: EncodingSettings,
    video_root: PathBuf,
    skip_existing: bool,
}

impl<E: VideoEngine> SegmentExporter<E> {
    /// `video_root` is the directory relative video references are resolved against.
    /// Existing clips are overwritten unless `skip_existing` is set.
    pub fn new(engine: E, settings: EncodingSettings, video_root: PathBuf, skip_existing: bool) -> Self {
        Self {
            engine,
            settings,
            video_root,
            skip_existing,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn settings(&self) -> &EncodingSettings {
        &self.settings
    }

    /// Location of a segment's source video on disk
    pub fn source_path(&self, segment: &Segment) -> PathBuf {
        FileManager::resolve_against(&segment.video_file, &self.video_root)
    }

    /// Export one segment; handles are released before returning, on every path
    pub async fn export(&self, segment: &Segment, output: &ResolvedOutput) -> Result<ExportOutcome, SegmentError> {
        let target = output.path();
        if self.skip_existing && FileManager::file_exists(&target) {
            debug!("Segment {}: {:?} already exists, keeping it", segment.row, target);
            return Ok(ExportOutcome::AlreadyPresent(target));
        }

        let source_path = self.source_path(segment);
        let source = self.engine.open(&source_path).await?;
        let written = self.cut_and_write(&source, segment, &target).await;
        self.engine.close_source(source).await;
        written?;

        info!("Saved: {:?}", target);
        Ok(ExportOutcome::Written(target))
    }

    async fn cut_and_write(&self, source: &E::Source, segment: &Segment, target: &Path) -> Result<(), SegmentError> {
        let clip = self
            .engine
            .extract(source, segment.start_sec, segment.end_sec)
            .await?;
        let written = self.engine.write(&clip, target, &self.settings).await;
        self.engine.close_clip(clip).await;
        written.map_err(SegmentError::from)
    }
}
