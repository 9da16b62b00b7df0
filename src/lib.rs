//! Orion - Voice command assistant
//!
//! This library provides the pieces of the Orion assistant:
//! - Command routing (Wikipedia, weather, sites, reminders, conversation)
//! - Bounded conversation memory
//! - Voice input (capture, endpointing, Whisper) and output (`ElevenLabs`
//!   with a local fallback voice)
//! - Periodic jobs run between turns
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                     Assistant                        │
//! │   listen  →  exit?  →  route  →  speak  →  jobs      │
//! └──────┬──────────────────┬─────────────────┬──────────┘
//!        │                  │                 │
//! ┌──────▼──────┐  ┌────────▼────────┐  ┌─────▼─────────┐
//! │ SpeechInput │  │  CommandRouter  │  │ SpeechOutput  │
//! │ mic / keys  │  │  + Conversation │  │ primary/local │
//! └─────────────┘  └────────┬────────┘  └───────────────┘
//!                           │
//!          ┌────────────────▼─────────────────┐
//!          │ Wikipedia │ Weather │ Sites │ Chat │
//!          └──────────────────────────────────┘
//! ```

pub mod assistant;
pub mod config;
pub mod conversation;
pub mod error;
pub mod providers;
pub mod router;
pub mod scheduler;
pub mod voice;

pub use assistant::{Assistant, Step};
pub use config::Config;
pub use conversation::{Conversation, Role, Turn};
pub use error::{Error, Result};
pub use router::{CommandRouter, Intent, Reply};
pub use scheduler::Scheduler;
