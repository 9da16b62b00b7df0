//! Speech output with a fallback voice
//!
//! Every call tries the primary voice once. On any failure the fallback voice
//! is tried once; if that fails too the text is only logged. Callers never see
//! an error.

use crate::Result;

/// A way of turning text into audible speech
pub trait Voice {
    /// Voice name for logging
    fn name(&self) -> &'static str;

    /// Speak `text`, blocking until done
    ///
    /// # Errors
    ///
    /// Returns error if the text could not be spoken
    fn say(&mut self, text: &str) -> Result<()>;
}

/// Anything that can speak a reply; never fails
pub trait SpeechOutput {
    fn speak(&mut self, text: &str);
}

impl<T: SpeechOutput + ?Sized> SpeechOutput for Box<T> {
    fn speak(&mut self, text: &str) {
        (**self).speak(text);
    }
}

/// Which path ended up speaking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Primary voice succeeded
    Primary,
    /// Primary failed, fallback succeeded
    Fallback,
    /// Both failed
    Lost,
}

/// Primary voice with a single fallback attempt
pub struct Speaker<P, F> {
    primary: P,
    fallback: F,
}

impl<P: Voice, F: Voice> Speaker<P, F> {
    #[must_use]
    pub const fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }

    /// Speak `text` and report which path delivered it
    pub fn deliver(&mut self, text: &str) -> Delivery {
        tracing::debug!(text, voice = self.primary.name(), "speaking");

        let Err(e) = self.primary.say(text) else {
            return Delivery::Primary;
        };

        tracing::warn!(
            voice = self.primary.name(),
            fallback = self.fallback.name(),
            error = %e,
            "primary voice failed, falling back"
        );

        match self.fallback.say(text) {
            Ok(()) => Delivery::Fallback,
            Err(e) => {
                tracing::error!(voice = self.fallback.name(), error = %e, "fallback voice failed");
                Delivery::Lost
            }
        }
    }

    #[must_use]
    pub const fn primary(&self) -> &P {
        &self.primary
    }

    #[must_use]
    pub const fn fallback(&self) -> &F {
        &self.fallback
    }
}

impl<P: Voice, F: Voice> SpeechOutput for Speaker<P, F> {
    fn speak(&mut self, text: &str) {
        self.deliver(text);
    }
}

/// Output that only logs, for running without audio
#[derive(Debug, Default)]
pub struct Muted;

impl SpeechOutput for Muted {
    fn speak(&mut self, text: &str) {
        tracing::debug!(text, "muted, not speaking");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[derive(Default)]
    struct Scripted {
        fail: bool,
        said: Vec<String>,
    }

    impl Voice for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn say(&mut self, text: &str) -> Result<()> {
            self.said.push(text.to_string());
            if self.fail {
                Err(Error::Tts("HTTP 401".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn failing() -> Scripted {
        Scripted {
            fail: true,
            ..Scripted::default()
        }
    }

    #[test]
    fn test_primary_success_skips_fallback() {
        let mut speaker = Speaker::new(Scripted::default(), Scripted::default());

        assert_eq!(speaker.deliver("hello"), Delivery::Primary);
        assert_eq!(speaker.primary().said, ["hello"]);
        assert!(speaker.fallback().said.is_empty());
    }

    #[test]
    fn test_primary_failure_uses_fallback_once() {
        let mut speaker = Speaker::new(failing(), Scripted::default());

        assert_eq!(speaker.deliver("hello"), Delivery::Fallback);
        assert_eq!(speaker.primary().said.len(), 1);
        assert_eq!(speaker.fallback().said, ["hello"]);
    }

    #[test]
    fn test_both_failing_still_returns() {
        let mut speaker = Speaker::new(failing(), failing());

        speaker.speak("hello");
        assert_eq!(speaker.deliver("again"), Delivery::Lost);
        assert_eq!(speaker.primary().said.len(), 2);
        assert_eq!(speaker.fallback().said.len(), 2);
    }
}
