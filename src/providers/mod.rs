//! Response providers
//!
//! Each provider turns the argument of a routed command into reply text.
//! Failures are returned as errors and turned into a spoken message by the
//! router, so providers never need to speak for themselves.

mod chat;
mod sites;
mod weather;
mod wikipedia;

pub use chat::{OpenAiChat, SYSTEM_PROMPT};
pub use sites::{Launcher, NOT_FOUND, SiteDirectory, SystemBrowser, default_sites};
pub use weather::{UNKNOWN_CITY, WeatherApi};
pub use wikipedia::{NO_RESULTS, Wikipedia};

use std::time::Duration;

use crate::Result;
use crate::conversation::Turn;

/// Timeout applied to every provider HTTP request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent to public APIs
pub const USER_AGENT: &str = concat!("orion/", env!("CARGO_PKG_VERSION"));

/// Converts a command argument into reply text
pub trait ResponseProvider {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Look up a reply for the argument
    ///
    /// # Errors
    ///
    /// Returns error if the lookup could not be completed
    fn lookup(&mut self, argument: &str) -> Result<String>;
}

/// Generates open-ended replies using prior turns as context
pub trait ConversationProvider {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    /// Reply to `message` given the recent `history`, oldest first
    ///
    /// # Errors
    ///
    /// Returns error if no reply could be generated
    fn reply(&mut self, message: &str, history: &[Turn]) -> Result<String>;
}

/// Build the blocking HTTP client shared by the providers
///
/// # Errors
///
/// Returns error if the TLS backend cannot be initialized
pub fn http_client() -> Result<reqwest::blocking::Client> {
    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}
