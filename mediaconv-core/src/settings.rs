//! Conversion settings as plain data.
//!
//! A settings value represents what the user intends to run, not what will
//! actually run: it carries both the audio and the video branch, and only the
//! branch matching the requested format is read when the command is built.
//! Nothing here validates or touches the filesystem, so a settings value can
//! be edited freely between builds.

use std::path::PathBuf;

/// Codec and bitrate used when the target format is an audio format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSettings {
    pub codec: String,
    pub bitrate: String,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            codec: "mp3".to_string(),
            bitrate: "128k".to_string(),
        }
    }
}

/// Codec and output resolution used when the target format is a video format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSettings {
    pub codec: String,
    pub resolution: String,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            codec: "h264".to_string(),
            resolution: "1920x1080".to_string(),
        }
    }
}

/// Everything needed to describe one conversion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSettings {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    /// Target container/format name, e.g. "mp4" or "mp3".
    pub format: String,
    pub audio: AudioSettings,
    pub video: VideoSettings,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            input_path: PathBuf::new(),
            output_path: PathBuf::new(),
            format: "mp4".to_string(),
            audio: AudioSettings::default(),
            video: VideoSettings::default(),
        }
    }
}
