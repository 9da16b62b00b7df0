//! Current conditions via WeatherAPI

use reqwest::StatusCode;
use reqwest::blocking::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::ResponseProvider;
use crate::{Error, Result};

const WEATHER_API_URL: &str = "http://api.weatherapi.com/v1";

/// Reply when the API answered but without current conditions
pub const UNKNOWN_CITY: &str = "Could not fetch weather data. Please check the city name.";

#[derive(Deserialize)]
struct WeatherResponse {
    current: Option<Current>,
}

#[derive(Deserialize)]
struct Current {
    temp_c: f64,
    condition: Condition,
}

#[derive(Deserialize)]
struct Condition {
    text: String,
}

/// Fetches current weather for a city
pub struct WeatherApi {
    client: Client,
    api_key: Option<SecretString>,
    base_url: String,
}

impl WeatherApi {
    /// Create a provider; a missing key is reported on each lookup
    #[must_use]
    pub fn new(client: Client, api_key: Option<SecretString>) -> Self {
        Self {
            client,
            api_key,
            base_url: WEATHER_API_URL.to_string(),
        }
    }

    /// Point the provider at a different API root
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl ResponseProvider for WeatherApi {
    fn name(&self) -> &'static str {
        "weather"
    }

    fn lookup(&mut self, city: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(Error::MissingCredential("WEATHER_API_KEY"))?;

        tracing::debug!(city, "fetching current weather");

        let response = self
            .client
            .get(format!("{}/current.json", self.base_url))
            .query(&[("key", api_key.expose_secret()), ("q", city)])
            .send()?;

        // Unknown cities come back as JSON error bodies; only key rejections fail
        check_key_accepted(response.status())?;

        let report: WeatherResponse = response.json()?;
        Ok(format_report(city, report))
    }
}

fn check_key_accepted(status: StatusCode) -> Result<()> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(Error::Provider(format!(
            "weather service rejected WEATHER_API_KEY (HTTP {})",
            status.as_u16()
        )));
    }
    Ok(())
}

fn format_report(city: &str, response: WeatherResponse) -> String {
    response.current.map_or_else(
        || UNKNOWN_CITY.to_string(),
        |current| {
            format!(
                "Weather in {city}: {}, {}°C.",
                current.condition.text, current.temp_c
            )
        },
    )
}
