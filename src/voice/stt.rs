//! Speech-to-text via `OpenAI` Whisper

use reqwest::blocking::Client;
use reqwest::blocking::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};

use crate::{Error, Result};

const TRANSCRIPTIONS_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Transcribes recorded phrases
pub struct SpeechToText {
    client: Client,
    api_key: Option<SecretString>,
    model: String,
}

impl SpeechToText {
    /// Create a transcriber; a missing key is reported on each call
    #[must_use]
    pub fn new(client: Client, api_key: Option<SecretString>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            model: model.into(),
        }
    }

    /// Transcribe WAV audio to text
    ///
    /// # Errors
    ///
    /// Returns error if the key is missing or the API call fails
    pub fn transcribe(&self, wav: Vec<u8>) -> Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(Error::MissingCredential("OPENAI_API_KEY"))?;

        tracing::debug!(audio_bytes = wav.len(), model = %self.model, "starting transcription");

        let part = Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| Error::Stt(e.to_string()))?;
        let form = Form::new().part("file", part).text("model", self.model.clone());

        let response = self
            .client
            .post(TRANSCRIPTIONS_URL)
            .header("Authorization", format!("Bearer {}", api_key.expose_secret()))
            .multipart(form)
            .send()
            .map_err(|e| {
                tracing::error!(error = %e, "transcription request failed");
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Whisper API error");
            return Err(Error::Stt(format!("Whisper API error {status}")));
        }

        let result: WhisperResponse = response.json()?;
        tracing::info!(transcript = %result.text, "transcription complete");
        Ok(result.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_a_failure() {
        let client = crate::providers::http_client().unwrap();
        let stt = SpeechToText::new(client, None, "whisper-1");

        let err = stt.transcribe(b"RIFF".to_vec()).unwrap_err();
        assert!(matches!(err, Error::MissingCredential("OPENAI_API_KEY")));
    }

    #[test]
    fn test_response_parsing() {
        let parsed: WhisperResponse = serde_json::from_str(r#"{"text":"open github"}"#).unwrap();
        assert_eq!(parsed.text, "open github");
    }
}
