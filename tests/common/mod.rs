//! Shared test utilities
//!
//! Scripted stand-ins for the providers and the speech ends, so the router
//! and the assistant loop run without network or audio hardware.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use orion::providers::{
    ConversationProvider, Launcher, ResponseProvider, SiteDirectory, default_sites,
};
use orion::voice::{SpeechInput, SpeechOutput, SpeechResult};
use orion::{CommandRouter, Error, Result, Turn};

/// Shared record of calls, readable after the fake is boxed away
pub type Log = Rc<RefCell<Vec<String>>>;

/// Provider that answers `"<name>: <argument>"`, or fails
pub struct EchoProvider {
    name: &'static str,
    calls: Log,
    fail: bool,
}

impl ResponseProvider for EchoProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn lookup(&mut self, argument: &str) -> Result<String> {
        self.calls.borrow_mut().push(argument.to_string());
        if self.fail {
            return Err(Error::Provider(format!("{} is down", self.name)));
        }
        Ok(format!("{}: {argument}", self.name))
    }
}

/// Chat provider that numbers its replies and records the history it saw
pub struct FakeChat {
    calls: Log,
    histories: Rc<RefCell<Vec<Vec<Turn>>>>,
    fail: bool,
}

impl ConversationProvider for FakeChat {
    fn name(&self) -> &'static str {
        "fake-chat"
    }

    fn reply(&mut self, message: &str, history: &[Turn]) -> Result<String> {
        self.calls.borrow_mut().push(message.to_string());
        self.histories.borrow_mut().push(history.to_vec());
        if self.fail {
            return Err(Error::Provider("HTTP 500".to_string()));
        }
        Ok(format!("reply {}", self.calls.borrow().len()))
    }
}

/// Launcher that only records URLs
pub struct RecordingLauncher {
    opened: Log,
}

impl Launcher for RecordingLauncher {
    fn open(&mut self, url: &str) -> Result<()> {
        self.opened.borrow_mut().push(url.to_string());
        Ok(())
    }
}

/// Handles into a router built by [`router`]
#[derive(Default)]
pub struct Calls {
    pub knowledge: Log,
    pub weather: Log,
    pub opened: Log,
    pub chat: Log,
    pub histories: Rc<RefCell<Vec<Vec<Turn>>>>,
}

/// Which fakes should fail
#[derive(Debug, Clone, Copy, Default)]
pub struct Failures {
    pub lookups: bool,
    pub chat: bool,
}

/// Router over fakes plus handles to inspect what they were asked
pub fn router(failures: Failures) -> (CommandRouter, Calls) {
    let calls = Calls::default();

    let router = CommandRouter::new(
        Box::new(EchoProvider {
            name: "wikipedia",
            calls: Rc::clone(&calls.knowledge),
            fail: failures.lookups,
        }),
        Box::new(EchoProvider {
            name: "weather",
            calls: Rc::clone(&calls.weather),
            fail: failures.lookups,
        }),
        Box::new(SiteDirectory::with_launcher(
            default_sites(),
            RecordingLauncher {
                opened: Rc::clone(&calls.opened),
            },
        )),
        Box::new(FakeChat {
            calls: Rc::clone(&calls.chat),
            histories: Rc::clone(&calls.histories),
            fail: failures.chat,
        }),
    );

    (router, calls)
}

/// Input that replays a script, then reports closed input
pub struct ScriptedInput {
    script: VecDeque<SpeechResult>,
}

impl ScriptedInput {
    pub fn new(script: impl IntoIterator<Item = SpeechResult>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Script of heard utterances
    pub fn heard(lines: &[&str]) -> Self {
        Self::new(lines.iter().map(|l| SpeechResult::Heard((*l).to_string())))
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl SpeechInput for ScriptedInput {
    fn listen(&mut self) -> SpeechResult {
        self.script.pop_front().unwrap_or(SpeechResult::Closed)
    }
}

/// Output that records everything spoken
#[derive(Default)]
pub struct RecordingOutput {
    pub spoken: Log,
}

impl SpeechOutput for RecordingOutput {
    fn speak(&mut self, text: &str) {
        self.spoken.borrow_mut().push(text.to_string());
    }
}
