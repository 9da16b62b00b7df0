//! Configuration management for Orion

pub mod file;

use std::collections::BTreeMap;
use std::time::Duration;

use secrecy::SecretString;

use crate::conversation::DEFAULT_HISTORY_LIMIT;
use crate::voice::DEFAULT_TTS_MODEL;
use crate::{Error, Result};

use file::OrionConfigFile;

/// Default assistant name
pub const DEFAULT_NAME: &str = "Orion";

/// Default chat completion model
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o";

/// Default Whisper model
pub const DEFAULT_STT_MODEL: &str = "whisper-1";

/// Default break reminder period
pub const DEFAULT_REMINDER_INTERVAL: Duration = Duration::from_secs(3600);

/// Default pause between loop iterations
pub const DEFAULT_LOOP_INTERVAL: Duration = Duration::from_secs(1);

/// Orion configuration
#[derive(Debug)]
pub struct Config {
    /// Assistant name used in the greeting and transcript
    pub name: String,

    /// Maximum turns kept in conversation memory
    pub history_limit: usize,

    /// Break reminder period; `None` disables the reminder
    pub reminder_interval: Option<Duration>,

    /// Pause between loop iterations
    pub loop_interval: Duration,

    /// Chat completion model
    pub chat_model: String,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// API keys
    pub api_keys: ApiKeys,

    /// Sites added to the built-in directory
    pub sites: BTreeMap<String, String>,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Time to wait for speech to start
    pub listen_timeout: Duration,

    /// Maximum phrase length
    pub phrase_limit: Duration,

    /// Whisper model
    pub stt_model: String,

    /// `ElevenLabs` model
    pub tts_model: String,

    /// `ElevenLabs` voice identifier
    pub elevenlabs_voice_id: Option<String>,
}

/// API keys for external services
#[derive(Debug, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (chat and Whisper)
    pub openai: Option<SecretString>,

    /// `WeatherAPI` key
    pub weather: Option<SecretString>,

    /// `ElevenLabs` API key
    pub elevenlabs: Option<SecretString>,
}

impl Config {
    /// Load configuration from `.env`, the environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if a setting is out of range
    pub fn load() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "failed to load .env"),
        }

        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Merge settings with priority env > config file > default
    ///
    /// Empty environment values count as unset.
    ///
    /// # Errors
    ///
    /// Returns error if a setting is out of range
    pub fn from_sources(fc: OrionConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        // Load API keys (env > toml > None)
        let api_keys = ApiKeys {
            openai: var("OPENAI_API_KEY")
                .or(fc.api_keys.openai)
                .map(SecretString::from),
            weather: var("WEATHER_API_KEY")
                .or(fc.api_keys.weather)
                .map(SecretString::from),
            elevenlabs: var("ELEVENLABS_API_KEY")
                .or(fc.api_keys.elevenlabs)
                .map(SecretString::from),
        };

        let default_endpoint = crate::voice::EndpointConfig::default();
        let voice = VoiceConfig {
            listen_timeout: fc
                .voice
                .listen_timeout_secs
                .map_or(default_endpoint.listen_timeout, Duration::from_secs),
            phrase_limit: fc
                .voice
                .phrase_limit_secs
                .map_or(default_endpoint.phrase_limit, Duration::from_secs),
            stt_model: var("ORION_STT_MODEL")
                .or(fc.voice.stt_model)
                .unwrap_or_else(|| DEFAULT_STT_MODEL.to_string()),
            tts_model: fc
                .voice
                .tts_model
                .unwrap_or_else(|| DEFAULT_TTS_MODEL.to_string()),
            elevenlabs_voice_id: var("ELEVENLABS_VOICE_ID").or(fc.voice.elevenlabs_voice_id),
        };

        let history_limit = var("ORION_HISTORY_LIMIT")
            .and_then(|s| s.parse().ok())
            .or(fc.history_limit)
            .unwrap_or(DEFAULT_HISTORY_LIMIT);
        if history_limit == 0 {
            return Err(Error::Config("history_limit must be at least 1".to_string()));
        }

        let reminder_secs = var("ORION_REMINDER_INTERVAL")
            .and_then(|s| s.parse().ok())
            .or(fc.reminder_interval_secs);
        let reminder_interval = match reminder_secs {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => Some(DEFAULT_REMINDER_INTERVAL),
        };

        let config = Self {
            name: var("ORION_NAME")
                .or(fc.name)
                .unwrap_or_else(|| DEFAULT_NAME.to_string()),
            history_limit,
            reminder_interval,
            loop_interval: fc
                .loop_interval_ms
                .map_or(DEFAULT_LOOP_INTERVAL, Duration::from_millis),
            chat_model: var("ORION_CHAT_MODEL")
                .or(fc.chat_model)
                .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
            voice,
            api_keys,
            sites: fc.sites,
        };

        config.warn_missing_credentials();
        Ok(config)
    }

    fn warn_missing_credentials(&self) {
        let missing = [
            ("OPENAI_API_KEY", self.api_keys.openai.is_none()),
            ("WEATHER_API_KEY", self.api_keys.weather.is_none()),
            ("ELEVENLABS_API_KEY", self.api_keys.elevenlabs.is_none()),
            ("ELEVENLABS_VOICE_ID", self.voice.elevenlabs_voice_id.is_none()),
        ];

        for (key, is_missing) in missing {
            if is_missing {
                tracing::warn!(key, "credential not configured, dependent features will degrade");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(fc: OrionConfigFile, env: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_sources(fc, |key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(OrionConfigFile::default(), &[]).unwrap();

        assert_eq!(config.name, "Orion");
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.reminder_interval, Some(Duration::from_secs(3600)));
        assert_eq!(config.loop_interval, Duration::from_secs(1));
        assert_eq!(config.chat_model, "gpt-4o");
        assert_eq!(config.voice.stt_model, "whisper-1");
        assert_eq!(config.voice.tts_model, "eleven_monolingual_v1");
        assert_eq!(config.voice.listen_timeout, Duration::from_secs(5));
        assert!(config.api_keys.openai.is_none());
        assert!(config.voice.elevenlabs_voice_id.is_none());
    }

    #[test]
    fn test_env_overrides_file() {
        let fc = file::parse_config_file(
            r#"
            name = "Jarvis"
            history_limit = 8

            [api_keys]
            weather = "from-file"
            openai = "file-openai"
            "#,
        )
        .unwrap();

        let config = load(
            fc,
            &[("ORION_NAME", "Friday"), ("WEATHER_API_KEY", "from-env"), ("OPENAI_API_KEY", "")],
        )
        .unwrap();

        assert_eq!(config.name, "Friday");
        assert_eq!(config.history_limit, 8);
        assert_eq!(
            config.api_keys.weather.as_ref().map(ExposeSecret::expose_secret),
            Some("from-env")
        );
        // Empty env value falls through to the file
        assert_eq!(
            config.api_keys.openai.as_ref().map(ExposeSecret::expose_secret),
            Some("file-openai")
        );
    }

    #[test]
    fn test_reminder_zero_disables() {
        let config = load(OrionConfigFile::default(), &[("ORION_REMINDER_INTERVAL", "0")]).unwrap();
        assert_eq!(config.reminder_interval, None);

        let config = load(OrionConfigFile::default(), &[("ORION_REMINDER_INTERVAL", "60")]).unwrap();
        assert_eq!(config.reminder_interval, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_zero_history_limit_rejected() {
        let err = load(OrionConfigFile::default(), &[("ORION_HISTORY_LIMIT", "0")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_sites_from_file() {
        let fc = file::parse_config_file("[sites]\ndocs = \"https://docs.rs\"").unwrap();
        let config = load(fc, &[]).unwrap();
        assert_eq!(config.sites["docs"], "https://docs.rs");
    }
}
