//! Builds the transcoder invocation from a settings value.
//!
//! The builder is a pure function: it validates the settings, classifies the
//! requested format as audio or video, and emits the argument tokens in a
//! fixed order. It never touches the filesystem and never spawns anything,
//! which keeps it exhaustively unit-testable.

use std::fmt;

use crate::error::ValidationError;
use crate::settings::ConversionSettings;

/// Formats treated as audio targets. Anything else is a video target.
pub const AUDIO_FORMATS: &[&str] = &["mp3", "wav", "aac"];

/// Classification of a conversion target, derived from the output format.
///
/// The classification decides which settings branch is read when the command
/// is built. It is total: unrecognized and empty formats classify as video.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

impl MediaKind {
    /// Classifies a format name, matching the audio set case-insensitively.
    pub fn from_format(format: &str) -> Self {
        if AUDIO_FORMATS.iter().any(|f| f.eq_ignore_ascii_case(format)) {
            MediaKind::Audio
        } else {
            MediaKind::Video
        }
    }
}

/// The ordered argument tokens for one transcoder invocation.
///
/// A spec is produced once per job and is immutable afterwards; the token
/// order is part of the contract with the external tool and is never
/// reordered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    tokens: Vec<String>,
}

impl CommandSpec {
    /// Wraps a complete token sequence that was assembled elsewhere.
    ///
    /// Most callers should go through [`build_command`]; this exists for
    /// callers that already hold a full invocation for the tool.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// The argument tokens, in invocation order.
    pub fn args(&self) -> &[String] {
        &self.tokens
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

/// Validates the settings and produces the argument tokens for the tool.
///
/// Token order: input flag and path, the codec/quality flags for the
/// classified kind, the output format flag, then the output path. Validation
/// covers well-formedness only (empty fields, input equal to output); whether
/// the input actually exists is the caller's concern.
pub fn build_command(settings: &ConversionSettings) -> Result<CommandSpec, ValidationError> {
    if settings.input_path.as_os_str().is_empty() {
        return Err(ValidationError::EmptyInputPath);
    }
    if settings.output_path.as_os_str().is_empty() {
        return Err(ValidationError::EmptyOutputPath);
    }
    if settings.format.is_empty() {
        return Err(ValidationError::EmptyFormat);
    }
    if settings.input_path == settings.output_path {
        return Err(ValidationError::SamePath(settings.input_path.clone()));
    }

    let mut tokens = vec![
        "-i".to_string(),
        settings.input_path.to_string_lossy().into_owned(),
    ];

    match MediaKind::from_format(&settings.format) {
        MediaKind::Audio => {
            tokens.push("-codec:a".to_string());
            tokens.push(settings.audio.codec.clone());
            tokens.push("-b:a".to_string());
            tokens.push(settings.audio.bitrate.clone());
        }
        MediaKind::Video => {
            tokens.push("-codec:v".to_string());
            tokens.push(settings.video.codec.clone());
            tokens.push("-s".to_string());
            tokens.push(settings.video.resolution.clone());
        }
    }

    tokens.push("-f".to_string());
    tokens.push(settings.format.clone());
    tokens.push(settings.output_path.to_string_lossy().into_owned());

    Ok(CommandSpec { tokens })
}
