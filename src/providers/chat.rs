//! Conversational replies via `OpenAI` chat completions

use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::ConversationProvider;
use crate::conversation::Turn;
use crate::{Error, Result};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Prepended to every request, never stored in the conversation
pub const SYSTEM_PROMPT: &str =
    "You are an intelligent AI assistant, similar to TARS and J.A.R.V.I.S";

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Chat completion client
pub struct OpenAiChat {
    client: Client,
    api_key: Option<SecretString>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    url: String,
}

impl OpenAiChat {
    /// Create a client; a missing key is reported on each reply
    #[must_use]
    pub fn new(client: Client, api_key: Option<SecretString>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            model: model.into(),
            temperature: 0.7,
            max_tokens: 512,
            url: CHAT_COMPLETIONS_URL.to_string(),
        }
    }

    /// Point the client at a compatible endpoint
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// System prompt, then history, then the new message
fn build_messages<'a>(message: &'a str, history: &'a [Turn]) -> Vec<Message<'a>> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(Message {
        role: "system",
        content: SYSTEM_PROMPT,
    });
    messages.extend(history.iter().map(|turn| Message {
        role: turn.role().as_str(),
        content: turn.content(),
    }));
    messages.push(Message {
        role: "user",
        content: message,
    });
    messages
}

impl ConversationProvider for OpenAiChat {
    fn name(&self) -> &'static str {
        "openai-chat"
    }

    fn reply(&mut self, message: &str, history: &[Turn]) -> Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(Error::MissingCredential("OPENAI_API_KEY"))?;

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: build_messages(message, history),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(
            model = %self.model,
            history = history.len(),
            "requesting chat completion"
        );

        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", api_key.expose_secret()))
            .json(&request)
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            tracing::error!(status = %status, body = %body, "chat completion error");
            return Err(Error::Provider(format!("OpenAI API error {status}")));
        }

        let result: ChatCompletionResponse = response.json()?;
        result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| Error::Provider("empty chat completion".to_string()))
    }
}
