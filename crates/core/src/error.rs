/// Result alias that carries the custom [`BeatVizError`] type.
pub type Result<T> = std::result::Result<T, BeatVizError>;

/// Reason an audio input could not be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioUnavailable {
    /// The user (or the platform) refused access to the microphone.
    PermissionDenied,
    /// No capture device exists or it could not be opened.
    DeviceUnavailable,
}

impl std::fmt::Display for AudioUnavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => f.write_str("microphone access denied"),
            Self::DeviceUnavailable => f.write_str("no audio input device available"),
        }
    }
}

/// Common error type for the core crate.
///
/// Nothing on the per-frame path returns this type; it is only produced while
/// acquiring audio, planning the analyser, parsing settings and persisting
/// state.
#[derive(Debug, thiserror::Error)]
pub enum BeatVizError {
    /// Free-form message for conditions without a dedicated variant.
    #[error("{0}")]
    Message(String),
    /// Audio input could not be acquired.
    #[error("audio input unavailable: {0}")]
    AudioUnavailable(AudioUnavailable),
    /// A caller handed the analysis pipeline unusable parameters.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// The settings boundary received a key it does not recognise.
    #[error("unknown setting `{0}`")]
    UnknownSetting(String),
    /// The settings boundary could not convert a value for a known key.
    #[error("invalid value `{value}` for setting `{key}`")]
    InvalidSetting { key: String, value: String },
    /// A preset name could not be resolved or saved.
    #[error("preset `{0}` is not available")]
    UnknownPreset(String),
    /// Wrapper around FFT planning/processing failures.
    #[error("{0}")]
    Fft(#[from] realfft::FftError),
    /// Wrapper around JSON (de)serialisation failures.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl BeatVizError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }
}

impl From<&str> for BeatVizError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for BeatVizError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}

impl From<AudioUnavailable> for BeatVizError {
    fn from(value: AudioUnavailable) -> Self {
        Self::AudioUnavailable(value)
    }
}
