//! Text-to-speech via `ElevenLabs`

use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use super::playback::AudioPlayback;
use super::speaker::Voice;
use crate::{Error, Result};

const ELEVENLABS_URL: &str = "https://api.elevenlabs.io/v1/text-to-speech";

/// Default `ElevenLabs` model
pub const DEFAULT_TTS_MODEL: &str = "eleven_monolingual_v1";

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

/// Primary voice: `ElevenLabs` synthesis played on the default speaker
pub struct ElevenLabsVoice {
    client: Client,
    api_key: Option<SecretString>,
    voice_id: Option<String>,
    model: String,
    playback: Option<AudioPlayback>,
}

impl ElevenLabsVoice {
    /// Create the voice; missing credentials are reported on each call
    #[must_use]
    pub fn new(
        client: Client,
        api_key: Option<SecretString>,
        voice_id: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key,
            voice_id: voice_id.filter(|id| !id.is_empty()),
            model: model.into(),
            playback: None,
        }
    }

    /// Synthesize `text` to MP3 bytes
    ///
    /// # Errors
    ///
    /// Returns error if a credential is missing, the request fails or the
    /// API answers with a non-success status
    pub fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(Error::MissingCredential("ELEVENLABS_API_KEY"))?;
        let voice_id = self
            .voice_id
            .as_deref()
            .ok_or(Error::MissingCredential("ELEVENLABS_VOICE_ID"))?;

        let request = SpeechRequest {
            text,
            model_id: &self.model,
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.75,
            },
        };

        let response = self
            .client
            .post(format!("{ELEVENLABS_URL}/{voice_id}"))
            .header("xi-api-key", api_key.expose_secret())
            .header("Accept", "audio/mpeg")
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(Error::Tts(format!("ElevenLabs TTS error {status}: {body}")));
        }

        let audio = response.bytes()?;
        tracing::debug!(bytes = audio.len(), "speech synthesized");
        Ok(audio.to_vec())
    }

    fn playback(&mut self) -> Result<&AudioPlayback> {
        if self.playback.is_none() {
            self.playback = Some(AudioPlayback::new()?);
        }
        self.playback
            .as_ref()
            .ok_or_else(|| Error::Audio("playback unavailable".to_string()))
    }
}

impl Voice for ElevenLabsVoice {
    fn name(&self) -> &'static str {
        "elevenlabs"
    }

    fn say(&mut self, text: &str) -> Result<()> {
        let audio = self.synthesize(text)?;
        self.playback()?.play_mp3(&audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voice(api_key: Option<&str>, voice_id: Option<&str>) -> ElevenLabsVoice {
        ElevenLabsVoice::new(
            crate::providers::http_client().unwrap(),
            api_key.map(|k| SecretString::from(k.to_string())),
            voice_id.map(ToString::to_string),
            DEFAULT_TTS_MODEL,
        )
    }

    #[test]
    fn test_missing_api_key() {
        let err = voice(None, Some("voice")).synthesize("hi").unwrap_err();
        assert!(matches!(err, Error::MissingCredential("ELEVENLABS_API_KEY")));
    }

    #[test]
    fn test_missing_voice_id() {
        let err = voice(Some("key"), None).synthesize("hi").unwrap_err();
        assert!(matches!(err, Error::MissingCredential("ELEVENLABS_VOICE_ID")));

        // Empty counts as missing
        let err = voice(Some("key"), Some("")).synthesize("hi").unwrap_err();
        assert!(matches!(err, Error::MissingCredential("ELEVENLABS_VOICE_ID")));
    }

    #[test]
    fn test_request_body() {
        let request = SpeechRequest {
            text: "hello",
            model_id: DEFAULT_TTS_MODEL,
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.75,
            },
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model_id"], "eleven_monolingual_v1");
        assert_eq!(json["voice_settings"]["similarity_boost"], 0.75);
    }
}
