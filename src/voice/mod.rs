//! Voice processing module
//!
//! Handles microphone capture and phrase endpointing, Whisper transcription,
//! `ElevenLabs` synthesis with a local fallback voice, and playback.

mod capture;
mod endpoint;
mod listener;
mod local;
mod playback;
mod speaker;
mod stt;
mod tts;

pub use capture::{Microphone, SAMPLE_RATE, rms, samples_to_wav};
pub use endpoint::{EndpointConfig, EndpointState, Endpointer, MIN_ENERGY_THRESHOLD};
pub use listener::{
    DegradingInput, KeyboardListener, LineListener, ListenSettings, MicrophoneListener,
    NO_MICROPHONE, NOT_UNDERSTOOD, RECOGNIZER_TROUBLE, SpeechInput, SpeechResult, TimedLines,
    Unavailable,
};
pub use local::LocalVoice;
pub use playback::{AudioPlayback, DecodedAudio, decode_mp3};
pub use speaker::{Delivery, Muted, SpeechOutput, Speaker, Voice};
pub use stt::SpeechToText;
pub use tts::{DEFAULT_TTS_MODEL, ElevenLabsVoice};
