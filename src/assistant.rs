//! The assistant session and its main loop
//!
//! One [`Assistant`] owns the router, the conversation window, the input and
//! output ends and the scheduler. Each step listens once, handles the result,
//! speaks exactly once and then runs due jobs. Nothing but an exit phrase or
//! closed input ends the loop.

use std::time::Duration;

use crate::conversation::Conversation;
use crate::router::CommandRouter;
use crate::scheduler::Scheduler;
use crate::voice::{SpeechInput, SpeechOutput, SpeechResult};

/// Spoken when the session ends
pub const GOODBYE: &str = "Goodbye!";

/// Spoken by the periodic break reminder
pub const BREAK_REMINDER: &str = "Reminder: Time to take a break!";

/// Spoken when the session starts
#[must_use]
pub fn greeting(name: &str) -> String {
    format!("Hello! This is {name}, how can I help?")
}

/// Whether an utterance asks to end the session
#[must_use]
pub fn is_exit(utterance: &str) -> bool {
    let lowered = utterance.to_lowercase();
    lowered.contains("exit") || lowered.contains("quit")
}

/// Whether the loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Exit,
}

/// Jobs registered on the assistant receive its speech output
pub type AssistantScheduler = Scheduler<dyn SpeechOutput>;

/// A running assistant session
pub struct Assistant<I, O> {
    name: String,
    router: CommandRouter,
    conversation: Conversation,
    input: I,
    output: O,
    scheduler: AssistantScheduler,
    loop_interval: Duration,
    transcript: bool,
}

impl<I: SpeechInput, O: SpeechOutput + 'static> Assistant<I, O> {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        router: CommandRouter,
        conversation: Conversation,
        input: I,
        output: O,
    ) -> Self {
        Self {
            name: name.into(),
            router,
            conversation,
            input,
            output,
            scheduler: Scheduler::new(),
            loop_interval: Duration::from_secs(1),
            transcript: true,
        }
    }

    /// Pause between loop iterations
    #[must_use]
    pub const fn with_loop_interval(mut self, interval: Duration) -> Self {
        self.loop_interval = interval;
        self
    }

    /// Print `You:` and reply lines to stdout
    #[must_use]
    pub const fn with_transcript(mut self, enabled: bool) -> Self {
        self.transcript = enabled;
        self
    }

    /// Register periodic jobs here
    pub fn scheduler_mut(&mut self) -> &mut AssistantScheduler {
        &mut self.scheduler
    }

    #[must_use]
    pub const fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    #[must_use]
    pub const fn output(&self) -> &O {
        &self.output
    }

    #[must_use]
    pub const fn input(&self) -> &I {
        &self.input
    }

    /// Greet, then step until the user leaves
    pub fn run(&mut self) {
        self.greet();

        while self.step() == Step::Continue {
            std::thread::sleep(self.loop_interval);
        }

        tracing::info!("session ended");
    }

    pub fn greet(&mut self) {
        let text = greeting(&self.name);
        self.say(&text);
    }

    /// Listen once, respond, then run due jobs
    pub fn step(&mut self) -> Step {
        let result = self.input.listen();

        let step = match result {
            SpeechResult::Heard(text) => self.handle(&text),
            SpeechResult::Silence => Step::Continue,
            SpeechResult::Closed => {
                tracing::info!("input closed");
                self.say(GOODBYE);
                Step::Exit
            }
            other @ (SpeechResult::Unrecognized | SpeechResult::Unavailable(_)) => {
                tracing::debug!(outcome = ?other, "no usable utterance");
                if let Some(message) = other.message() {
                    self.say(message);
                }
                Step::Continue
            }
        };

        if step == Step::Continue {
            let ran = self.scheduler.run_pending(&mut self.output);
            if ran > 0 {
                tracing::debug!(jobs = ran, "ran scheduled jobs");
            }
        }

        step
    }

    /// Respond to one utterance
    ///
    /// Exit phrases are answered with [`GOODBYE`] and never reach the router.
    pub fn handle(&mut self, utterance: &str) -> Step {
        if self.transcript {
            println!("You: {utterance}");
        }
        tracing::info!(utterance, "heard");

        if is_exit(utterance) {
            self.say(GOODBYE);
            return Step::Exit;
        }

        let reply = self.router.route(utterance, &mut self.conversation);
        tracing::info!(intent = %reply.intent, failed = reply.failed, "replying");
        self.say(&reply.text);

        Step::Continue
    }

    fn say(&mut self, text: &str) {
        if self.transcript {
            println!("{}: {text}", self.name);
        }
        self.output.speak(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting() {
        assert_eq!(greeting("Orion"), "Hello! This is Orion, how can I help?");
    }

    #[test]
    fn test_exit_phrases() {
        assert!(is_exit("please exit now"));
        assert!(is_exit("QUIT"));
        assert!(is_exit("I want to quit"));
        assert!(!is_exit("open github"));
        assert!(!is_exit(""));
    }
}
