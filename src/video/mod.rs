/*!
 * Video engine abstraction.
 *
 * Clip extraction is delegated to an external engine behind the `VideoEngine`
 * trait:
 * - `ffmpeg`: runs ffprobe/ffmpeg processes
 * - `mock`: in-memory engine that records calls, used by tests
 */

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::Path;

use crate::errors::VideoError;

pub mod ffmpeg;
pub mod mock;

pub use ffmpeg::FfmpegEngine;
pub use mock::MockEngine;

/// Frame rate and codecs used for every written clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingSettings {
    /// Output frame rate
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Video codec passed to the engine
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Audio codec passed to the engine
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
        }
    }
}

fn default_fps() -> u32 {
    30
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

/// Capability contract of an external video engine
///
/// Handles returned by `open` and `extract` must be passed back to
/// `close_source` / `close_clip`; the exporter does so on every exit path.
#[async_trait]
pub trait VideoEngine: Send + Sync + Debug {
    /// Opened source video
    type Source: Send + Sync;

    /// Extracted sub-range, ready to be written
    type Clip: Send + Sync;

    /// Open a source video
    async fn open(&self, path: &Path) -> Result<Self::Source, VideoError>;

    /// Select the `[start_sec, end_sec)` sub-range of an opened source
    async fn extract(&self, source: &Self::Source, start_sec: f64, end_sec: f64) -> Result<Self::Clip, VideoError>;

    /// Encode a clip to `path`
    async fn write(&self, clip: &Self::Clip, path: &Path, settings: &EncodingSettings) -> Result<(), VideoError>;

    /// Release a clip handle
    async fn close_clip(&self, clip: Self::Clip);

    /// Release a source handle
    async fn close_source(&self, source: Self::Source);
}
