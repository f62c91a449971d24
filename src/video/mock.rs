/*!
 * Mock video engine for testing.
 *
 * The engine records every call and can be told to fail at a given stage for
 * specific source videos:
 * - `MockEngine::working()` - every call succeeds and writes a small file
 * - `MockEngine::failing_open(..)` - opening the named videos fails
 * - `MockEngine::failing_write(..)` - writing clips cut from the named videos fails
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::errors::VideoError;
use crate::video::{EncodingSettings, VideoEngine};

/// One recorded engine call
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Open(PathBuf),
    Extract { source: PathBuf, start_sec: f64, end_sec: f64 },
    Write { source: PathBuf, path: PathBuf, fps: u32 },
    CloseClip(PathBuf),
    CloseSource(PathBuf),
}

/// Handle returned by `MockEngine::open`
#[derive(Debug)]
pub struct MockSource {
    pub path: PathBuf,
}

/// Handle returned by `MockEngine::extract`
#[derive(Debug)]
pub struct MockClip {
    pub source: PathBuf,
    pub start_sec: f64,
    pub end_sec: f64,
}

/// Recording video engine
#[derive(Debug, Clone, Default)]
pub struct MockEngine {
    calls: Arc<Mutex<Vec<EngineCall>>>,
    fail_open: HashSet<String>,
    fail_extract: HashSet<String>,
    fail_write: HashSet<String>,
}

impl MockEngine {
    /// Engine where every call succeeds
    pub fn working() -> Self {
        Self::default()
    }

    /// Opening any source whose file name is listed fails
    pub fn failing_open(names: &[&str]) -> Self {
        Self {
            fail_open: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Extracting from any source whose file name is listed fails
    pub fn failing_extract(names: &[&str]) -> Self {
        Self {
            fail_extract: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Writing clips cut from any source whose file name is listed fails
    pub fn failing_write(names: &[&str]) -> Self {
        Self {
            fail_write: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Snapshot of the recorded calls
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().clone()
    }

    /// Number of handles opened but not closed
    pub fn open_handles(&self) -> isize {
        self.calls
            .lock()
            .iter()
            .map(|call| match call {
                EngineCall::Open(_) | EngineCall::Extract { .. } => 1,
                EngineCall::CloseClip(_) | EngineCall::CloseSource(_) => -1,
                EngineCall::Write { .. } => 0,
            })
            .sum()
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().push(call);
    }

    fn matches(set: &HashSet<String>, path: &Path) -> bool {
        path.file_name()
            .map(|name| set.contains(name.to_string_lossy().as_ref()))
            .unwrap_or(false)
    }
}

#[async_trait]
impl VideoEngine for MockEngine {
    type Source = MockSource;
    type Clip = MockClip;

    async fn open(&self, path: &Path) -> Result<MockSource, VideoError> {
        if Self::matches(&self.fail_open, path) {
            return Err(VideoError::Open {
                path: path.to_path_buf(),
                reason: "mock open failure".to_string(),
            });
        }
        self.record(EngineCall::Open(path.to_path_buf()));
        Ok(MockSource {
            path: path.to_path_buf(),
        })
    }

    async fn extract(&self, source: &MockSource, start_sec: f64, end_sec: f64) -> Result<MockClip, VideoError> {
        if Self::matches(&self.fail_extract, &source.path) {
            return Err(VideoError::Extract {
                start_sec,
                end_sec,
                reason: "mock extract failure".to_string(),
            });
        }
        self.record(EngineCall::Extract {
            source: source.path.clone(),
            start_sec,
            end_sec,
        });
        Ok(MockClip {
            source: source.path.clone(),
            start_sec,
            end_sec,
        })
    }

    async fn write(&self, clip: &MockClip, path: &Path, settings: &EncodingSettings) -> Result<(), VideoError> {
        self.record(EngineCall::Write {
            source: clip.source.clone(),
            path: path.to_path_buf(),
            fps: settings.fps,
        });
        if Self::matches(&self.fail_write, &clip.source) {
            return Err(VideoError::Write {
                path: path.to_path_buf(),
                reason: "mock write failure".to_string(),
            });
        }
        let body = format!(
            "{} [{:.3}, {:.3}) {} {}\n",
            clip.source.display(),
            clip.start_sec,
            clip.end_sec,
            settings.video_codec,
            settings.audio_codec
        );
        std::fs::write(path, body).map_err(|e| VideoError::Write {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    async fn close_clip(&self, clip: MockClip) {
        self.record(EngineCall::CloseClip(clip.source));
    }

    async fn close_source(&self, source: MockSource) {
        self.record(EngineCall::CloseSource(source.path));
    }
}
