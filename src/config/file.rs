//! TOML configuration file loading
//!
//! Supports `~/.config/orion/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct OrionConfigFile {
    /// Assistant name used in the greeting and transcript
    pub name: Option<String>,

    /// Maximum turns kept in conversation memory
    pub history_limit: Option<usize>,

    /// Break reminder period in seconds (0 disables)
    pub reminder_interval_secs: Option<u64>,

    /// Pause between loop iterations in milliseconds
    pub loop_interval_ms: Option<u64>,

    /// Chat completion model (e.g. "gpt-4o")
    pub chat_model: Option<String>,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Extra sites for "open <name>", merged over the built-in ones
    #[serde(default)]
    pub sites: BTreeMap<String, String>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// Seconds to wait for speech to start
    pub listen_timeout_secs: Option<u64>,

    /// Maximum phrase length in seconds
    pub phrase_limit_secs: Option<u64>,

    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// `ElevenLabs` model (e.g. "`eleven_monolingual_v1`")
    pub tts_model: Option<String>,

    /// `ElevenLabs` voice identifier
    pub elevenlabs_voice_id: Option<String>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub weather: Option<String>,
    pub elevenlabs: Option<String>,
}

/// Parse config file contents
///
/// # Errors
///
/// Returns error if the contents are not valid TOML for this schema
pub fn parse_config_file(content: &str) -> Result<OrionConfigFile> {
    Ok(toml::from_str(content)?)
}

/// Load the TOML config file from the standard path
///
/// Returns `OrionConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> OrionConfigFile {
    config_file_path().map_or_else(OrionConfigFile::default, |path| load_config_file_from(&path))
}

/// Load a TOML config file from `path`, falling back to defaults
pub fn load_config_file_from(path: &Path) -> OrionConfigFile {
    if !path.exists() {
        return OrionConfigFile::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => match parse_config_file(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                OrionConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            OrionConfigFile::default()
        }
    }
}

/// Return the config file path: `~/.config/orion/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("orion").join("config.toml"))
}
