use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::annotation::ExportLayout;
use crate::naming::FolderPrecedence;
use crate::video::EncodingSettings;
use crate::video::ffmpeg::FfmpegConfig;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Base folder clips are sorted into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Line offsets of the export format
    #[serde(default)]
    pub layout: ExportLayout,

    /// Frame rate and codecs of written clips
    #[serde(default)]
    pub encoding: EncodingSettings,

    /// ffmpeg tool locations and limits
    #[serde(default)]
    pub ffmpeg: FfmpegConfig,

    /// Which annotation picks a segment's folder
    #[serde(default)]
    pub folder_precedence: FolderPrecedence,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output_segments")
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        crate::file_utils::FileManager::write_to_file(path, &config_json)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.as_os_str().is_empty() {
            return Err(anyhow!("Output directory must not be empty"));
        }

        if self.layout.data_start_line <= self.layout.attribute_line {
            return Err(anyhow!(
                "Data rows must start after the attribute line (data_start_line {} <= attribute_line {})",
                self.layout.data_start_line,
                self.layout.attribute_line
            ));
        }

        if self.encoding.fps == 0 {
            return Err(anyhow!("Frame rate must be greater than zero"));
        }
        if self.encoding.video_codec.trim().is_empty() {
            return Err(anyhow!("Video codec must not be empty"));
        }
        if self.encoding.audio_codec.trim().is_empty() {
            return Err(anyhow!("Audio codec must not be empty"));
        }

        if self.ffmpeg.ffmpeg_path.trim().is_empty() || self.ffmpeg.ffprobe_path.trim().is_empty() {
            return Err(anyhow!("ffmpeg and ffprobe paths must not be empty"));
        }
        if self.ffmpeg.timeout_secs == Some(0) {
            return Err(anyhow!("ffmpeg timeout must be greater than zero when set"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            output_dir: default_output_dir(),
            layout: ExportLayout::default(),
            encoding: EncodingSettings::default(),
            ffmpeg: FfmpegConfig::default(),
            folder_precedence: FolderPrecedence::default(),
            log_level: LogLevel::default(),
        }
    }
}
