//! Phrase endpointing
//!
//! Energy-based voice activity detection that decides when a spoken phrase
//! has started and ended. Fed with successive blocks of microphone samples.

use std::time::Duration;

use super::capture::rms;

/// Floor for the speech energy threshold
pub const MIN_ENERGY_THRESHOLD: f32 = 0.02;

/// Ambient level is multiplied by this to get the threshold
const AMBIENT_MULTIPLIER: f32 = 1.5;

/// Timing limits for one phrase
#[derive(Debug, Clone, Copy)]
pub struct EndpointConfig {
    /// Give up if no speech starts within this time
    pub listen_timeout: Duration,
    /// Cut the phrase off after this much audio
    pub phrase_limit: Duration,
    /// Silence that ends a phrase
    pub pause: Duration,
    /// Shorter bursts are treated as noise
    pub min_speech: Duration,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            listen_timeout: Duration::from_secs(5),
            phrase_limit: Duration::from_secs(5),
            pause: Duration::from_millis(800),
            min_speech: Duration::from_millis(300),
        }
    }
}

/// Where the endpointer is in the current phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointState {
    /// No speech yet
    Waiting,
    /// Speech started, accumulating
    Speaking,
    /// Phrase finished (pause after speech or phrase limit)
    Complete,
    /// Listen timeout passed with no speech
    TimedOut,
}

/// Tracks speech and silence for a single phrase
pub struct Endpointer {
    threshold: f32,
    state: EndpointState,
    phrase: Vec<f32>,
    waited: usize,
    silence: usize,
    timeout_samples: usize,
    limit_samples: usize,
    pause_samples: usize,
    min_speech_samples: usize,
}

impl Endpointer {
    #[must_use]
    pub fn new(sample_rate: u32, config: EndpointConfig) -> Self {
        Self {
            threshold: MIN_ENERGY_THRESHOLD,
            state: EndpointState::Waiting,
            phrase: Vec::new(),
            waited: 0,
            silence: 0,
            timeout_samples: samples_for(config.listen_timeout, sample_rate),
            limit_samples: samples_for(config.phrase_limit, sample_rate),
            pause_samples: samples_for(config.pause, sample_rate),
            min_speech_samples: samples_for(config.min_speech, sample_rate),
        }
    }

    /// Raise the speech threshold above the measured background noise
    pub fn calibrate(&mut self, ambient: &[f32]) {
        let level = rms(ambient);
        self.threshold = (level * AMBIENT_MULTIPLIER).max(MIN_ENERGY_THRESHOLD);
        tracing::debug!(ambient = level, threshold = self.threshold, "calibrated for ambient noise");
    }

    /// Feed the next block of samples
    pub fn push(&mut self, samples: &[f32]) -> EndpointState {
        if samples.is_empty() {
            return self.state;
        }

        let energy = rms(samples);
        let is_speech = energy > self.threshold;

        match self.state {
            EndpointState::Waiting => {
                if is_speech {
                    tracing::trace!(energy, "phrase started");
                    self.state = EndpointState::Speaking;
                    self.phrase.extend_from_slice(samples);
                    self.silence = 0;
                } else {
                    self.waited += samples.len();
                    if self.waited >= self.timeout_samples {
                        self.state = EndpointState::TimedOut;
                    }
                }
            }
            EndpointState::Speaking => {
                self.phrase.extend_from_slice(samples);

                if is_speech {
                    self.silence = 0;
                } else {
                    self.silence += samples.len();
                }

                if self.phrase.len() >= self.limit_samples {
                    tracing::debug!(samples = self.phrase.len(), "phrase limit reached");
                    self.state = EndpointState::Complete;
                } else if self.silence >= self.pause_samples {
                    if self.phrase.len() - self.silence >= self.min_speech_samples {
                        tracing::debug!(samples = self.phrase.len(), "phrase complete");
                        self.state = EndpointState::Complete;
                    } else {
                        // A click or a cough, keep waiting
                        self.waited += self.phrase.len();
                        self.phrase.clear();
                        self.silence = 0;
                        self.state = if self.waited >= self.timeout_samples {
                            EndpointState::TimedOut
                        } else {
                            EndpointState::Waiting
                        };
                    }
                }
            }
            EndpointState::Complete | EndpointState::TimedOut => {}
        }

        self.state
    }

    #[must_use]
    pub const fn state(&self) -> EndpointState {
        self.state
    }

    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Audio captured for the current phrase
    #[must_use]
    pub fn phrase(&self) -> &[f32] {
        &self.phrase
    }

    /// Take the phrase audio and start over
    pub fn take_phrase(&mut self) -> Vec<f32> {
        self.state = EndpointState::Waiting;
        self.waited = 0;
        self.silence = 0;
        std::mem::take(&mut self.phrase)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn samples_for(duration: Duration, sample_rate: u32) -> usize {
    (duration.as_secs_f64() * f64::from(sample_rate)) as usize
}
