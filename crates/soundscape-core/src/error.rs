use thiserror::Error;

pub type Result<T, E = SoundscapeError> = std::result::Result<T, E>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SoundscapeError {
    #[error("unknown sound kit `{0}`")]
    UnknownKit(String),

    #[error("unknown theme `{0}`")]
    UnknownTheme(String),

    /// The live output has not been created yet (browsers need a user gesture first).
    #[error("audio output is not initialized")]
    AudioUnavailable,

    #[error("malformed share token: {0}")]
    Decode(String),

    #[error("export failed: {0}")]
    Encode(String),
}
