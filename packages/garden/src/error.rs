//! Error types.

/// Why an audio candidate could not be played.
///
/// None of these are fatal: the garden keeps rendering without music.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AudioError {
    #[error("audio file not found: {0}")]
    NotFound(String),

    #[error("playback rejected for {path}: {reason}")]
    PlaybackRejected { path: String, reason: String },

    #[error("could not decode {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("audio device unavailable: {0}")]
    Device(String),
}

// `MediaError.code` values reported by HTML media elements.
const MEDIA_ERR_DECODE: u16 = 3;
const MEDIA_ERR_SRC_NOT_SUPPORTED: u16 = 4;

impl AudioError {
    /// Classify a media element `error` event. Undecodable or unsupported
    /// sources are decode failures; anything else is treated as missing.
    pub fn from_media_code(path: &str, code: Option<u16>) -> Self {
        match code {
            Some(MEDIA_ERR_DECODE) => AudioError::Decode {
                path: path.to_string(),
                reason: "media decode error".to_string(),
            },
            Some(MEDIA_ERR_SRC_NOT_SUPPORTED) => AudioError::Decode {
                path: path.to_string(),
                reason: "source not supported".to_string(),
            },
            _ => AudioError::NotFound(path.to_string()),
        }
    }

    /// True when trying the next candidate may succeed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, AudioError::Device(_))
    }
}
