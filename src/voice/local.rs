//! Local speech synthesis through the platform's speech program

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::speaker::Voice;
use crate::{Error, Result};

/// Programs tried in order on Unix-like systems
const ENGINES: [&str; 4] = ["say", "espeak-ng", "espeak", "spd-say"];

/// Fallback voice that needs no network or credentials
#[derive(Debug, Clone, Default)]
pub struct LocalVoice {
    engine: Option<PathBuf>,
}

impl LocalVoice {
    /// Find a speech program on `PATH`
    #[must_use]
    pub fn detect() -> Self {
        let engine = if cfg!(target_os = "windows") {
            which::which("powershell").ok()
        } else {
            ENGINES.iter().find_map(|name| which::which(name).ok())
        };

        match &engine {
            Some(path) => tracing::debug!(engine = %path.display(), "local speech engine found"),
            None => tracing::warn!("no local speech engine found, fallback speech will be silent"),
        }

        Self { engine }
    }

    /// Use a specific program
    #[must_use]
    pub fn with_engine(engine: impl Into<PathBuf>) -> Self {
        Self {
            engine: Some(engine.into()),
        }
    }

    #[must_use]
    pub fn engine(&self) -> Option<&Path> {
        self.engine.as_deref()
    }

    fn command(engine: &Path, text: &str) -> Command {
        let mut command = Command::new(engine);
        let program = engine
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match program.as_str() {
            "powershell" => {
                let quoted = text.replace('\'', "''");
                command.args([
                    "-NoProfile",
                    "-Command",
                    &format!(
                        "Add-Type -AssemblyName System.Speech; \
                         (New-Object System.Speech.Synthesis.SpeechSynthesizer).Speak('{quoted}')"
                    ),
                ]);
            }
            // Blocks until spoken only with -w
            "spd-say" => {
                command.args(["-w", "--", text]);
            }
            _ => {
                command.args(["--", text]);
            }
        }

        command
    }
}

impl Voice for LocalVoice {
    fn name(&self) -> &'static str {
        "local"
    }

    fn say(&mut self, text: &str) -> Result<()> {
        let engine = self
            .engine
            .as_ref()
            .ok_or_else(|| Error::Tts("no local speech engine available".to_string()))?;

        let status = Self::command(engine, text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status()?;

        if !status.success() {
            return Err(Error::Tts(format!("{} exited with {status}", engine.display())));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(engine: &str, text: &str) -> Vec<String> {
        LocalVoice::command(&PathBuf::from(engine), text)
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_engine_arguments() {
        assert_eq!(args("/usr/bin/espeak-ng", "hello"), ["--", "hello"]);
        assert_eq!(args("/usr/bin/spd-say", "hello"), ["-w", "--", "hello"]);
        assert_eq!(args("/usr/bin/say", "-v"), ["--", "-v"]);
    }

    #[test]
    fn test_powershell_quotes_text() {
        let args = args("powershell.exe", "it's fine");
        assert!(args[2].contains("Speak('it''s fine')"));
    }

    #[test]
    fn test_no_engine_is_an_error() {
        let mut voice = LocalVoice::default();
        assert!(voice.say("hello").is_err());
    }
}
