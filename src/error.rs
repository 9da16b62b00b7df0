//! Error types for Orion

use thiserror::Error;

/// Result type alias for Orion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Orion
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A credential or identifier was not configured
    #[error("{0} is missing, please check your environment or .env file")]
    MissingCredential(&'static str),

    /// Audio device or stream error
    #[error("audio error: {0}")]
    Audio(String),

    /// Speech-to-text error
    #[error("STT error: {0}")]
    Stt(String),

    /// Text-to-speech error
    #[error("TTS error: {0}")]
    Tts(String),

    /// Response provider returned something unusable
    #[error("provider error: {0}")]
    Provider(String),

    /// External program could not be launched
    #[error("launch error: {0}")]
    Launch(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
