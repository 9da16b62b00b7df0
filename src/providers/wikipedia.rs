//! Encyclopedia lookup via the Wikipedia REST API

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::ResponseProvider;
use crate::{Error, Result};

const SUMMARY_URL: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";

/// Reply when the page does not exist
pub const NO_RESULTS: &str = "No results found on Wikipedia.";

/// Maximum characters of the summary that are read out
const MAX_SUMMARY_CHARS: usize = 300;

#[derive(Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    extract: String,
}

/// Looks up page summaries on English Wikipedia
pub struct Wikipedia {
    client: Client,
    base_url: String,
}

impl Wikipedia {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, SUMMARY_URL)
    }

    /// Point the provider at a different summary endpoint
    #[must_use]
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

impl ResponseProvider for Wikipedia {
    fn name(&self) -> &'static str {
        "wikipedia"
    }

    fn lookup(&mut self, topic: &str) -> Result<String> {
        if topic.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }

        let url = format!("{}/{}", self.base_url, page_title(topic));
        tracing::debug!(topic, %url, "fetching Wikipedia summary");

        let response = self.client.get(&url).send()?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Ok(NO_RESULTS.to_string());
        }

        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Wikipedia API error");
            return Err(Error::Provider(format!("Wikipedia error {status}")));
        }

        let summary: SummaryResponse = response.json()?;
        if summary.extract.trim().is_empty() {
            return Ok(NO_RESULTS.to_string());
        }

        Ok(truncate_chars(&summary.extract, MAX_SUMMARY_CHARS))
    }
}

/// Turn a spoken topic into a URL path segment
fn page_title(topic: &str) -> String {
    urlencoding::encode(&topic.trim().replace(' ', "_")).into_owned()
}

/// Keep at most `max` characters without splitting a code point
fn truncate_chars(text: &str, max: usize) -> String {
    text.char_indices()
        .nth(max)
        .map_or_else(|| text.to_string(), |(end, _)| text[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_title_encoding() {
        assert_eq!(page_title("rust programming language"), "rust_programming_language");
        assert_eq!(page_title(" c++ "), "c%2B%2B");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 300), "short");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        // Multi-byte characters count once
        assert_eq!(truncate_chars("éééé", 2), "éé");
    }

    #[test]
    fn test_empty_topic_skips_request() {
        let client = crate::providers::http_client().unwrap();
        let mut wikipedia = Wikipedia::with_base_url(client, "http://127.0.0.1:9");
        assert_eq!(wikipedia.lookup("").unwrap(), NO_RESULTS);
    }
}
