//! Site navigation
//!
//! Resolves a spoken site name against a small table and opens it in the
//! system browser.

use std::collections::BTreeMap;
use std::process::{Command, Stdio};

use super::ResponseProvider;
use crate::{Error, Result};

/// Reply when the name is not in the table
pub const NOT_FOUND: &str = "Website not found.";

/// Built-in site table
#[must_use]
pub fn default_sites() -> BTreeMap<String, String> {
    [
        ("google", "https://www.google.com"),
        ("youtube", "https://www.youtube.com"),
        ("github", "https://www.github.com"),
        ("stackoverflow", "https://stackoverflow.com"),
    ]
    .into_iter()
    .map(|(name, url)| (name.to_string(), url.to_string()))
    .collect()
}

/// Opens URLs somewhere the user can see them
pub trait Launcher {
    /// Open `url`
    ///
    /// # Errors
    ///
    /// Returns error if no opener could be started
    fn open(&mut self, url: &str) -> Result<()>;
}

/// Opens URLs with the platform's default browser
#[derive(Debug, Default)]
pub struct SystemBrowser;

impl Launcher for SystemBrowser {
    fn open(&mut self, url: &str) -> Result<()> {
        let mut command = opener_command(url)?;
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // Not waited on: the browser outlives the request
        command
            .spawn()
            .map_err(|e| Error::Launch(format!("failed to open {url}: {e}")))?;

        tracing::info!(url, "opened in browser");
        Ok(())
    }
}

fn opener_command(url: &str) -> Result<Command> {
    if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", "", url]);
        return Ok(command);
    }

    let candidates: &[&str] = if cfg!(target_os = "macos") {
        &["open"]
    } else {
        &["xdg-open", "gio", "sensible-browser"]
    };

    let program = candidates
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or_else(|| Error::Launch("no browser opener found on PATH".to_string()))?;

    let mut command = Command::new(&program);
    if program.file_name().is_some_and(|name| name == "gio") {
        command.arg("open");
    }
    command.arg(url);
    Ok(command)
}

/// Site-name resolver backed by a fixed table
pub struct SiteDirectory<L = SystemBrowser> {
    sites: BTreeMap<String, String>,
    launcher: L,
}

impl SiteDirectory {
    /// Directory with the built-in table and the system browser
    #[must_use]
    pub fn new() -> Self {
        Self::with_launcher(default_sites(), SystemBrowser)
    }
}

impl Default for SiteDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Launcher> SiteDirectory<L> {
    #[must_use]
    pub fn with_launcher(sites: BTreeMap<String, String>, launcher: L) -> Self {
        Self { sites, launcher }
    }

    /// Add or replace entries
    pub fn extend(&mut self, sites: impl IntoIterator<Item = (String, String)>) {
        self.sites.extend(sites);
    }

    /// URL for an exact, case-sensitive name
    #[must_use]
    pub fn url(&self, name: &str) -> Option<&str> {
        self.sites.get(name).map(String::as_str)
    }

    #[must_use]
    pub const fn launcher(&self) -> &L {
        &self.launcher
    }
}

impl<L: Launcher> ResponseProvider for SiteDirectory<L> {
    fn name(&self) -> &'static str {
        "sites"
    }

    fn lookup(&mut self, name: &str) -> Result<String> {
        let Some(url) = self.sites.get(name) else {
            tracing::debug!(name, "site not in table");
            return Ok(NOT_FOUND.to_string());
        };

        self.launcher.open(url)?;
        Ok(format!("Opening {name}..."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        opened: Vec<String>,
    }

    impl Launcher for Recorder {
        fn open(&mut self, url: &str) -> Result<()> {
            self.opened.push(url.to_string());
            Ok(())
        }
    }

    struct Broken;

    impl Launcher for Broken {
        fn open(&mut self, _url: &str) -> Result<()> {
            Err(Error::Launch("no display".to_string()))
        }
    }

    #[test]
    fn test_known_site_opens() {
        let mut sites = SiteDirectory::with_launcher(default_sites(), Recorder::default());

        assert_eq!(sites.lookup("github").unwrap(), "Opening github...");
        assert_eq!(sites.launcher().opened, ["https://www.github.com"]);
    }

    #[test]
    fn test_unknown_site() {
        let mut sites = SiteDirectory::with_launcher(default_sites(), Recorder::default());

        assert_eq!(sites.lookup("nonexistentsite").unwrap(), NOT_FOUND);
        assert!(sites.launcher().opened.is_empty());
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let mut sites = SiteDirectory::with_launcher(default_sites(), Recorder::default());
        assert_eq!(sites.lookup("GitHub").unwrap(), NOT_FOUND);
    }

    #[test]
    fn test_extend_overrides() {
        let mut sites = SiteDirectory::with_launcher(default_sites(), Recorder::default());
        sites.extend([("docs".to_string(), "https://docs.rs".to_string())]);

        assert_eq!(sites.url("docs"), Some("https://docs.rs"));
        assert_eq!(sites.url("google"), Some("https://www.google.com"));
    }

    #[test]
    fn test_launch_failure_propagates() {
        let mut sites = SiteDirectory::with_launcher(default_sites(), Broken);
        assert!(matches!(sites.lookup("google"), Err(Error::Launch(_))));
    }
}
