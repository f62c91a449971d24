use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::annotation::Segment;

// @module: Structured per-run report

/// Why a segment was not exported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No gesture or motion primitive annotation on the segment
    UnresolvedCategory,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnresolvedCategory => write!(f, "no valid annotation category found"),
        }
    }
}

/// Result of processing one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SegmentStatus {
    /// Clip written
    Exported { path: PathBuf },
    /// Clip existed from an earlier run and was kept
    AlreadyPresent { path: PathBuf },
    /// Dry run: clip would be written here
    Planned { path: PathBuf },
    /// Segment skipped by policy
    Skipped { reason: SkipReason },
    /// Extraction or writing failed
    Failed { error: String },
}

/// Outcome of one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentOutcome {
    /// 1-based position in the export
    pub row: usize,
    pub video_file: String,
    pub start_sec: f64,
    pub end_sec: f64,
    #[serde(flatten)]
    pub status: SegmentStatus,
}

impl SegmentOutcome {
    pub fn new(segment: &Segment, status: SegmentStatus) -> Self {
        Self {
            row: segment.row,
            video_file: segment.video_file.clone(),
            start_sec: segment.start_sec,
            end_sec: segment.end_sec,
            status,
        }
    }
}

/// Tallies over a run's outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    pub exported: usize,
    pub already_present: usize,
    pub planned: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Overall verdict of a run that was not aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every segment was exported, kept or planned
    Complete,
    /// Some segments were skipped or failed
    Partial { done: usize, skipped: usize, failed: usize },
}

/// Report of one pipeline run over one export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub export_file: PathBuf,
    pub output_dir: PathBuf,
    pub dry_run: bool,
    pub outcomes: Vec<SegmentOutcome>,
}

impl RunReport {
    pub fn new(export_file: PathBuf, output_dir: PathBuf, dry_run: bool) -> Self {
        Self {
            export_file,
            output_dir,
            dry_run,
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: SegmentOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn counts(&self) -> RunCounts {
        let mut counts = RunCounts::default();
        for outcome in &self.outcomes {
            match outcome.status {
                SegmentStatus::Exported { .. } => counts.exported += 1,
                SegmentStatus::AlreadyPresent { .. } => counts.already_present += 1,
                SegmentStatus::Planned { .. } => counts.planned += 1,
                SegmentStatus::Skipped { .. } => counts.skipped += 1,
                SegmentStatus::Failed { .. } => counts.failed += 1,
            }
        }
        counts
    }

    pub fn status(&self) -> RunStatus {
        let counts = self.counts();
        if counts.skipped == 0 && counts.failed == 0 {
            RunStatus::Complete
        } else {
            RunStatus::Partial {
                done: counts.exported + counts.already_present + counts.planned,
                skipped: counts.skipped,
                failed: counts.failed,
            }
        }
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let counts = self.counts();
        write!(
            f,
            "{} segments: {} exported, {} already present, {} planned, {} skipped, {} failed",
            self.outcomes.len(),
            counts.exported,
            counts.already_present,
            counts.planned,
            counts.skipped,
            counts.failed
        )
    }
}
