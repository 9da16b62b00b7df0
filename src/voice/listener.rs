//! Speech input sources
//!
//! A listen never fails: capture and recognition problems come back as a
//! [`SpeechResult`] the main loop can speak to the user.

use std::io::{BufRead, IsTerminal};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use super::capture::{Microphone, samples_to_wav};
use super::endpoint::{EndpointConfig, EndpointState, Endpointer};
use super::stt::SpeechToText;

/// Spoken when a phrase was heard but not understood
pub const NOT_UNDERSTOOD: &str = "I couldn't understand what you said.";

/// Spoken when the recognizer could not be reached
pub const RECOGNIZER_TROUBLE: &str = "Sorry, I'm having trouble processing your speech right now.";

/// Spoken when there is no microphone
pub const NO_MICROPHONE: &str = "No microphone found. Please type your command.";

/// Why speech input is unavailable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unavailable {
    /// No usable input device
    NoMicrophone,
    /// Recognition service failed
    Recognizer(String),
}

/// Outcome of one listen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechResult {
    /// Recognized text
    Heard(String),
    /// Nothing was said before the listen timeout
    Silence,
    /// Something was said but could not be recognized
    Unrecognized,
    /// Input could not be captured or recognized
    Unavailable(Unavailable),
    /// The input source is gone for good (end of typed input)
    Closed,
}

impl SpeechResult {
    /// User-facing phrase for outcomes that should be spoken
    #[must_use]
    pub const fn message(&self) -> Option<&'static str> {
        match self {
            Self::Unrecognized => Some(NOT_UNDERSTOOD),
            Self::Unavailable(Unavailable::NoMicrophone) => Some(NO_MICROPHONE),
            Self::Unavailable(Unavailable::Recognizer(_)) => Some(RECOGNIZER_TROUBLE),
            Self::Heard(_) | Self::Silence | Self::Closed => None,
        }
    }
}

/// Source of user utterances
pub trait SpeechInput {
    /// Block until an utterance, a timeout or a failure
    fn listen(&mut self) -> SpeechResult;
}

impl<T: SpeechInput + ?Sized> SpeechInput for Box<T> {
    fn listen(&mut self) -> SpeechResult {
        (**self).listen()
    }
}

/// Listener timing
#[derive(Debug, Clone, Copy)]
pub struct ListenSettings {
    pub endpoint: EndpointConfig,
    /// Ambient noise measurement before each listen
    pub calibration: Duration,
    /// How often the capture buffer is drained
    pub poll_interval: Duration,
}

impl Default for ListenSettings {
    fn default() -> Self {
        Self {
            endpoint: EndpointConfig::default(),
            calibration: Duration::from_secs(1),
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Records a phrase from the microphone and transcribes it
pub struct MicrophoneListener {
    stt: SpeechToText,
    settings: ListenSettings,
    microphone: Option<Microphone>,
}

impl MicrophoneListener {
    #[must_use]
    pub const fn new(stt: SpeechToText, settings: ListenSettings) -> Self {
        Self {
            stt,
            settings,
            microphone: None,
        }
    }

    fn transcribe(&self, phrase: &[f32], sample_rate: u32) -> SpeechResult {
        let wav = match samples_to_wav(phrase, sample_rate) {
            Ok(wav) => wav,
            Err(e) => return SpeechResult::Unavailable(Unavailable::Recognizer(e.to_string())),
        };

        match self.stt.transcribe(wav) {
            Ok(text) if text.trim().is_empty() => SpeechResult::Unrecognized,
            Ok(text) => SpeechResult::Heard(text.trim().to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "speech recognition failed");
                SpeechResult::Unavailable(Unavailable::Recognizer(e.to_string()))
            }
        }
    }
}

impl SpeechInput for MicrophoneListener {
    fn listen(&mut self) -> SpeechResult {
        if self.microphone.is_none() {
            match Microphone::open() {
                Ok(microphone) => self.microphone = Some(microphone),
                Err(e) => {
                    tracing::warn!(error = %e, "no microphone detected");
                    return SpeechResult::Unavailable(Unavailable::NoMicrophone);
                }
            }
        }

        let Some(microphone) = self.microphone.as_mut() else {
            return SpeechResult::Unavailable(Unavailable::NoMicrophone);
        };

        if let Err(e) = microphone.start() {
            tracing::warn!(error = %e, "failed to start microphone");
            self.microphone = None;
            return SpeechResult::Unavailable(Unavailable::NoMicrophone);
        }

        let phrase = record(microphone, &self.settings);
        let sample_rate = microphone.sample_rate();
        microphone.stop();

        match phrase {
            Some(phrase) => self.transcribe(&phrase, sample_rate),
            None => SpeechResult::Silence,
        }
    }
}

/// Calibrate, then poll the microphone until the phrase ends or times out
fn record(microphone: &Microphone, settings: &ListenSettings) -> Option<Vec<f32>> {
    let mut endpointer = Endpointer::new(microphone.sample_rate(), settings.endpoint);

    std::thread::sleep(settings.calibration);
    endpointer.calibrate(&microphone.take_samples());

    // Guards against a stream that stops delivering samples
    let deadline = listen_deadline(Instant::now(), &settings.endpoint);

    tracing::info!("listening for your request");
    while deadline.is_none_or(|deadline| Instant::now() < deadline) {
        std::thread::sleep(settings.poll_interval);

        match endpointer.push(&microphone.take_samples()) {
            EndpointState::Waiting | EndpointState::Speaking => {}
            EndpointState::Complete => return Some(endpointer.take_phrase()),
            EndpointState::TimedOut => return None,
        }
    }

    tracing::debug!("listen deadline passed");
    match endpointer.state() {
        EndpointState::Speaking => Some(endpointer.take_phrase()),
        _ => None,
    }
}

/// Latest time a listen may still be running, `None` if past the end of the clock
fn listen_deadline(start: Instant, endpoint: &EndpointConfig) -> Option<Instant> {
    let budget = endpoint
        .listen_timeout
        .saturating_add(endpoint.phrase_limit)
        .saturating_add(Duration::from_secs(1));

    start.checked_add(budget)
}

/// Reads utterances as lines of text
pub struct LineListener<R> {
    reader: R,
}

impl<R: BufRead> LineListener<R> {
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> SpeechInput for LineListener<R> {
    fn listen(&mut self) -> SpeechResult {
        read_line(&mut self.reader).map_or(SpeechResult::Closed, |line| typed(&line))
    }
}

fn read_line(reader: &mut impl BufRead) -> Option<String> {
    let mut line = String::new();
    match reader.read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read input");
            None
        }
    }
}

/// Lines produced on a reader thread, waited for with a timeout
///
/// A listen that sees no line within the timeout is [`SpeechResult::Silence`],
/// so the loop keeps running jobs while the user is idle. A line typed after
/// the timeout is kept for the next listen.
#[derive(Debug)]
pub struct TimedLines {
    lines: Receiver<String>,
    timeout: Duration,
}

impl TimedLines {
    /// Run `next` on its own thread until it returns `None`
    ///
    /// # Errors
    ///
    /// Returns error if the thread cannot be spawned
    pub fn spawn(
        mut next: impl FnMut() -> Option<String> + Send + 'static,
        timeout: Duration,
    ) -> std::io::Result<Self> {
        let (tx, lines) = mpsc::channel();

        std::thread::Builder::new()
            .name("orion-input".to_string())
            .spawn(move || {
                while let Some(line) = next() {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            })?;

        Ok(Self { lines, timeout })
    }

    /// Read lines from `reader` on its own thread
    ///
    /// # Errors
    ///
    /// Returns error if the thread cannot be spawned
    pub fn from_reader(
        mut reader: impl BufRead + Send + 'static,
        timeout: Duration,
    ) -> std::io::Result<Self> {
        Self::spawn(move || read_line(&mut reader), timeout)
    }
}

impl SpeechInput for TimedLines {
    fn listen(&mut self) -> SpeechResult {
        match self.lines.recv_timeout(self.timeout) {
            Ok(line) => typed(&line),
            Err(RecvTimeoutError::Timeout) => SpeechResult::Silence,
            Err(RecvTimeoutError::Disconnected) => SpeechResult::Closed,
        }
    }
}

/// Typed input from the terminal, or from piped stdin
///
/// Stdin is read on a background thread that starts with the first listen.
#[derive(Debug)]
pub struct KeyboardListener {
    prompt: String,
    timeout: Duration,
    lines: Option<TimedLines>,
}

impl KeyboardListener {
    /// Wait at most `timeout` for each typed line
    #[must_use]
    pub fn new(prompt: impl Into<String>, timeout: Duration) -> Self {
        Self {
            prompt: prompt.into(),
            timeout,
            lines: None,
        }
    }

    fn start(&self) -> std::io::Result<TimedLines> {
        if std::io::stdin().is_terminal() {
            let prompt = self.prompt.clone();
            TimedLines::spawn(move || prompt_line(&prompt), self.timeout)
        } else {
            let stdin = std::io::stdin();
            TimedLines::spawn(move || read_line(&mut stdin.lock()), self.timeout)
        }
    }
}

impl Default for KeyboardListener {
    fn default() -> Self {
        Self::new("You", EndpointConfig::default().listen_timeout)
    }
}

impl SpeechInput for KeyboardListener {
    fn listen(&mut self) -> SpeechResult {
        if self.lines.is_none() {
            match self.start() {
                Ok(lines) => self.lines = Some(lines),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to start keyboard input");
                    return SpeechResult::Closed;
                }
            }
        }

        self.lines
            .as_mut()
            .map_or(SpeechResult::Closed, SpeechInput::listen)
    }
}

fn prompt_line(prompt: &str) -> Option<String> {
    match dialoguer::Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
    {
        Ok(line) => Some(line),
        Err(e) => {
            tracing::debug!(error = %e, "keyboard input closed");
            None
        }
    }
}

fn typed(line: &str) -> SpeechResult {
    let text = line.trim();
    if text.is_empty() {
        SpeechResult::Silence
    } else {
        SpeechResult::Heard(text.to_string())
    }
}

/// Switches to a fallback source once the primary reports no microphone
pub struct DegradingInput<P, F> {
    primary: P,
    fallback: F,
    degraded: bool,
}

impl<P: SpeechInput, F: SpeechInput> DegradingInput<P, F> {
    #[must_use]
    pub const fn new(primary: P, fallback: F) -> Self {
        Self {
            primary,
            fallback,
            degraded: false,
        }
    }

    /// Whether the fallback source is in use
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.degraded
    }
}

impl<P: SpeechInput, F: SpeechInput> SpeechInput for DegradingInput<P, F> {
    fn listen(&mut self) -> SpeechResult {
        if self.degraded {
            return self.fallback.listen();
        }

        let result = self.primary.listen();
        if result == SpeechResult::Unavailable(Unavailable::NoMicrophone) {
            tracing::warn!("switching to typed input");
            self.degraded = true;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(SpeechResult::Unrecognized.message(), Some(NOT_UNDERSTOOD));
        assert_eq!(
            SpeechResult::Unavailable(Unavailable::Recognizer("timeout".to_string())).message(),
            Some(RECOGNIZER_TROUBLE)
        );
        assert_eq!(
            SpeechResult::Unavailable(Unavailable::NoMicrophone).message(),
            Some(NO_MICROPHONE)
        );
        assert_eq!(SpeechResult::Heard("hi".to_string()).message(), None);
        assert_eq!(SpeechResult::Silence.message(), None);
    }

    #[test]
    fn test_line_listener() {
        let mut listener = LineListener::new("  open github \n\nquit\n".as_bytes());

        assert_eq!(listener.listen(), SpeechResult::Heard("open github".to_string()));
        assert_eq!(listener.listen(), SpeechResult::Silence);
        assert_eq!(listener.listen(), SpeechResult::Heard("quit".to_string()));
        assert_eq!(listener.listen(), SpeechResult::Closed);
    }

    #[test]
    fn test_timed_lines_read_then_close() {
        let mut lines =
            TimedLines::from_reader("open github\n\n".as_bytes(), Duration::from_secs(5)).unwrap();

        assert_eq!(lines.listen(), SpeechResult::Heard("open github".to_string()));
        assert_eq!(lines.listen(), SpeechResult::Silence);
        assert_eq!(lines.listen(), SpeechResult::Closed);
    }

    #[test]
    fn test_timed_lines_idle_is_silence() {
        let (typist, keys) = mpsc::channel::<String>();
        let mut lines = TimedLines::spawn(move || keys.recv().ok(), Duration::from_millis(20)).unwrap();

        assert_eq!(lines.listen(), SpeechResult::Silence);

        // A line typed after a timeout is picked up by the next listen
        typist.send("weather in oslo\n".to_string()).unwrap();
        assert_eq!(lines.listen(), SpeechResult::Heard("weather in oslo".to_string()));
    }

    #[test]
    fn test_deadline_for_default_limits() {
        let start = Instant::now();
        assert_eq!(
            listen_deadline(start, &EndpointConfig::default()),
            Some(start + Duration::from_secs(11))
        );
    }

    #[test]
    fn test_deadline_with_endless_timeout() {
        let endpoint = EndpointConfig {
            listen_timeout: Duration::from_secs(u64::MAX),
            ..EndpointConfig::default()
        };
        assert_eq!(listen_deadline(Instant::now(), &endpoint), None);
    }

    struct NoMic;

    impl SpeechInput for NoMic {
        fn listen(&mut self) -> SpeechResult {
            SpeechResult::Unavailable(Unavailable::NoMicrophone)
        }
    }

    #[test]
    fn test_degrades_after_missing_microphone() {
        let mut input = DegradingInput::new(NoMic, LineListener::new("hello\n".as_bytes()));

        // The first listen reports the problem so it can be spoken
        assert_eq!(input.listen(), SpeechResult::Unavailable(Unavailable::NoMicrophone));
        assert!(input.is_degraded());
        assert_eq!(input.listen(), SpeechResult::Heard("hello".to_string()));
    }
}
