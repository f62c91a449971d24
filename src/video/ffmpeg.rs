use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use log::{debug, error, warn};
use tokio::process::Command;

use crate::errors::VideoError;
use crate::file_utils::FileManager;
use crate::video::{EncodingSettings, VideoEngine};

// @module: ffmpeg/ffprobe backed video engine

/// Suffix of the scratch file a clip is encoded into before the final rename
const PARTIAL_SUFFIX: &str = "part";

/// Locations of the ffmpeg tools and process limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FfmpegConfig {
    /// ffmpeg executable
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// ffprobe executable
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,

    /// Per-process timeout in seconds; unset means wait indefinitely
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            timeout_secs: None,
        }
    }
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

// @struct: Probed source video
#[derive(Debug, Clone)]
pub struct FfmpegSource {
    pub path: PathBuf,
    // @field: Container duration, when ffprobe reports one
    pub duration_sec: Option<f64>,
}

// @struct: Sub-range of a probed source
#[derive(Debug, Clone)]
pub struct FfmpegClip {
    pub source: PathBuf,
    pub start_sec: f64,
    pub end_sec: f64,
}

/// Video engine that shells out to ffprobe and ffmpeg
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    config: FfmpegConfig,
}

impl FfmpegEngine {
    pub fn new(config: FfmpegConfig) -> Self {
        Self { config }
    }

    fn timeout(&self) -> Option<Duration> {
        self.config.timeout_secs.map(Duration::from_secs)
    }

    /// Run a command to completion, honouring the optional timeout
    async fn run(&self, mut command: Command, name: &str) -> Result<Output, String> {
        command.kill_on_drop(true);
        let output = command.output();
        let result = match self.timeout() {
            Some(limit) => match tokio::time::timeout(limit, output).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(VideoError::Timeout {
                        command: name.to_string(),
                        secs: limit.as_secs(),
                    }
                    .to_string());
                }
            },
            None => output.await,
        };
        result.map_err(|e| format!("Failed to execute {}: {}", name, e))
    }

    /// Scratch path a clip is encoded into
    pub fn partial_path(path: &Path) -> PathBuf {
        let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".");
        name.push(PARTIAL_SUFFIX);
        path.with_file_name(name)
    }

    /// Build the ffmpeg argument list for one clip
    pub fn encode_args(clip: &FfmpegClip, output: &Path, settings: &EncodingSettings) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-nostdin".to_string(),
            "-y".to_string(),
            "-ss".to_string(),
            format!("{:.3}", clip.start_sec),
            "-i".to_string(),
            clip.source.to_string_lossy().into_owned(),
            "-t".to_string(),
            format!("{:.3}", clip.end_sec - clip.start_sec),
            "-r".to_string(),
            settings.fps.to_string(),
            "-c:v".to_string(),
            settings.video_codec.clone(),
            "-c:a".to_string(),
            settings.audio_codec.clone(),
            "-f".to_string(),
            "mp4".to_string(),
            output.to_string_lossy().into_owned(),
        ]
    }

    /// Filter ffmpeg stderr to only show meaningful error lines, stripping the
    /// version banner, build configuration, and stream metadata noise.
    pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
        let noise_prefixes = [
            "ffmpeg version",
            "  built with",
            "  configuration:",
            "  lib",
            "Input #",
            "  Metadata:",
            "  Duration:",
            "  Stream #",
            "    Stream #",
            "Output #",
            "Stream mapping:",
            "Press [q]",
            "frame=",
            "size=",
        ];

        let meaningful: Vec<&str> = stderr
            .lines()
            .filter(|line| {
                !line.trim().is_empty()
                    && !line.starts_with("      ")
                    && !noise_prefixes.iter().any(|p| line.starts_with(p))
            })
            .map(str::trim)
            .collect();

        if meaningful.is_empty() {
            "unknown ffmpeg error (stderr was empty after filtering)".to_string()
        } else {
            meaningful.join("\n")
        }
    }

    fn parse_duration(stdout: &str) -> Option<f64> {
        stdout
            .lines()
            .map(str::trim)
            .find_map(|line| line.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d > 0.0)
    }
}

#[async_trait]
impl VideoEngine for FfmpegEngine {
    type Source = FfmpegSource;
    type Clip = FfmpegClip;

    async fn open(&self, path: &Path) -> Result<FfmpegSource, VideoError> {
        let fail = |reason: String| VideoError::Open {
            path: path.to_path_buf(),
            reason,
        };

        if !FileManager::file_exists(path) {
            return Err(fail("file does not exist".to_string()));
        }

        let mut command = Command::new(&self.config.ffprobe_path);
        command
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "default=noprint_wrappers=1:nokey=1"])
            .arg(path);
        let output = self.run(command, "ffprobe").await.map_err(fail)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(fail(format!("ffprobe failed: {}", stderr.trim())));
        }

        let duration_sec = Self::parse_duration(&String::from_utf8_lossy(&output.stdout));
        if duration_sec.is_none() {
            warn!("ffprobe reported no duration for {:?}, range checks disabled", path);
        }
        debug!("Opened {:?} (duration {:?})", path, duration_sec);

        Ok(FfmpegSource {
            path: path.to_path_buf(),
            duration_sec,
        })
    }

    async fn extract(&self, source: &FfmpegSource, start_sec: f64, end_sec: f64) -> Result<FfmpegClip, VideoError> {
        let fail = |reason: String| VideoError::Extract {
            start_sec,
            end_sec,
            reason,
        };

        if start_sec < 0.0 || end_sec <= start_sec {
            return Err(fail("empty or negative range".to_string()));
        }

        let mut end = end_sec;
        if let Some(duration) = source.duration_sec {
            if start_sec >= duration {
                return Err(fail(format!("starts after the end of the video ({:.3}s)", duration)));
            }
            if end_sec > duration {
                warn!(
                    "Range end {:.3}s exceeds video duration {:.3}s, clamping",
                    end_sec, duration
                );
                end = duration;
            }
        }

        Ok(FfmpegClip {
            source: source.path.clone(),
            start_sec,
            end_sec: end,
        })
    }

    async fn write(&self, clip: &FfmpegClip, path: &Path, settings: &EncodingSettings) -> Result<(), VideoError> {
        let fail = |reason: String| VideoError::Write {
            path: path.to_path_buf(),
            reason,
        };

        let partial = Self::partial_path(path);
        let mut command = Command::new(&self.config.ffmpeg_path);
        command.args(Self::encode_args(clip, &partial, settings));

        let result = match self.run(command, "ffmpeg").await {
            Ok(output) if output.status.success() => {
                std::fs::rename(&partial, path).map_err(|e| format!("Failed to move clip into place: {}", e))
            }
            Ok(output) => {
                let filtered = Self::filter_ffmpeg_stderr(&String::from_utf8_lossy(&output.stderr));
                error!("Clip encoding failed: {}", filtered);
                Err(format!("ffmpeg failed: {}", filtered))
            }
            Err(reason) => Err(reason),
        };

        if result.is_err() {
            if let Err(e) = FileManager::remove_if_exists(&partial) {
                warn!("Could not remove partial clip: {:#}", e);
            }
        }
        result.map_err(fail)
    }

    async fn close_clip(&self, clip: FfmpegClip) {
        debug!("Released clip [{:.3}s, {:.3}s) of {:?}", clip.start_sec, clip.end_sec, clip.source);
    }

    async fn close_source(&self, source: FfmpegSource) {
        debug!("Released source {:?}", source.path);
    }
}
