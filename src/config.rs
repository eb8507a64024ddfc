//! Runtime settings: parse/write `bue.conf` and merge command-line overrides.
//!
//! The file uses the same `key = value` format as `theme.conf` and
//! `keybinds.conf`. Command-line flags (and their environment variables)
//! take precedence over the file.

use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::api::DEFAULT_BASE_URL;
use crate::error::{Result, config_error};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_ORIGIN: &str = "http://localhost:5173";

/// Command-line interface of the `bue-admin` binary.
#[derive(Debug, Parser)]
#[command(name = "bue-admin", version, about = "Register, search, edit and delete BUE System users")]
pub struct Cli {
    /// Settings file, created with defaults if missing
    #[arg(short, long, env = "BUE_CONFIG", default_value = "bue.conf")]
    pub config: String,

    /// Base URL of the user resource, e.g. https://localhost:7009/api/User
    #[arg(long, env = "BUE_API_URL")]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "BUE_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Origin announced to the server
    #[arg(long, env = "BUE_ORIGIN")]
    pub origin: Option<String>,

    /// Accept self-signed or otherwise invalid TLS certificates
    #[arg(long, env = "BUE_INSECURE")]
    pub insecure: bool,

    /// Log file (the terminal is used by the UI)
    #[arg(long, default_value = "bue-admin.log")]
    pub log_file: String,

    /// Verbosity: -v info, -vv debug, -vvv trace (default: warn)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub timeout: Duration,
    /// `None` disables the `Origin` header.
    pub origin: Option<String>,
    pub accept_invalid_certs: bool,
    pub theme_path: String,
    pub keymap_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            origin: Some(DEFAULT_ORIGIN.to_string()),
            accept_invalid_certs: false,
            theme_path: "theme.conf".to_string(),
            keymap_path: "keybinds.conf".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings text. Unknown keys and malformed values keep their defaults.
    pub fn parse(contents: &str) -> Self {
        let mut settings = Self::default();
        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else {
                continue;
            };
            let (key, val) = (key.trim(), val.trim());
            match key {
                "base_url" if !val.is_empty() => settings.base_url = val.to_string(),
                "timeout_secs" => {
                    if let Ok(secs) = val.parse::<u64>() {
                        settings.timeout = Duration::from_secs(secs);
                    }
                }
                "origin" => {
                    settings.origin =
                        if val.is_empty() || val.eq_ignore_ascii_case("none") { None } else { Some(val.to_string()) };
                }
                "accept_invalid_certs" => {
                    settings.accept_invalid_certs = matches!(val, "true" | "yes" | "1");
                }
                "theme" if !val.is_empty() => settings.theme_path = val.to_string(),
                "keybinds" if !val.is_empty() => settings.keymap_path = val.to_string(),
                _ => {}
            }
        }
        settings
    }

    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    /// Persist settings in `key = value` format.
    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# bue-admin settings\n");
        buf.push_str("# Command-line flags and BUE_* environment variables override these values\n\n");
        let _ = writeln!(&mut buf, "base_url = {}", self.base_url);
        let _ = writeln!(&mut buf, "timeout_secs = {}", self.timeout.as_secs());
        let _ = writeln!(&mut buf, "origin = {}", self.origin.as_deref().unwrap_or("none"));
        let _ = writeln!(&mut buf, "accept_invalid_certs = {}", self.accept_invalid_certs);
        let _ = writeln!(&mut buf, "theme = {}", self.theme_path);
        let _ = writeln!(&mut buf, "keybinds = {}", self.keymap_path);
        std::fs::write(path, buf)
    }

    /// Load `path`, writing a default file first if it does not exist.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        let settings = Self::default();
        if let Err(err) = settings.write_file(path) {
            tracing::warn!(%path, error = %err, "could not write default settings");
        }
        settings
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.base_url {
            self.base_url = url.clone();
        }
        if let Some(secs) = cli.timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        if let Some(origin) = &cli.origin {
            self.origin = Some(origin.clone());
        }
        if cli.insecure {
            self.accept_invalid_certs = true;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(config_error(format!(
                "base_url must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.timeout.is_zero() {
            return Err(config_error("timeout_secs must be greater than zero"));
        }
        Ok(())
    }
}
