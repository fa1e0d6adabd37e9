//! Configuration handling for the digest pipeline.
//!
//! Every knob has a development default so the binary works with no
//! environment at all. `Config::from_env` layers environment overrides on
//! top and rejects values that do not parse.

use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable names. Public so tests and wrappers can refer to them.
pub const ENV_FETCH_TIMEOUT_SECS: &str = "SITEBRIEF_FETCH_TIMEOUT_SECS";
pub const ENV_ABOUT_TIMEOUT_SECS: &str = "SITEBRIEF_ABOUT_TIMEOUT_SECS";
pub const ENV_RENDER_TIMEOUT_SECS: &str = "SITEBRIEF_RENDER_TIMEOUT_SECS";
pub const ENV_FETCH_ATTEMPTS: &str = "SITEBRIEF_FETCH_ATTEMPTS";
pub const ENV_RETRY_PAUSE_MS: &str = "SITEBRIEF_RETRY_PAUSE_MS";
pub const ENV_RENDER_COMMAND: &str = "SITEBRIEF_RENDER_COMMAND";

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);
const DEFAULT_ABOUT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_FETCH_ATTEMPTS: u32 = 2;
const DEFAULT_RETRY_PAUSE: Duration = Duration::from_secs(2);

/// Runtime configuration, read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    fetch_timeout: Duration,
    about_timeout: Duration,
    render_timeout: Duration,
    fetch_attempts: u32,
    retry_pause: Duration,
    render_command: Option<String>,
}

impl Config {
    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let fetch_timeout = env_parse::<u64>(ENV_FETCH_TIMEOUT_SECS, "fetch_timeout")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.fetch_timeout);
        let about_timeout = env_parse::<u64>(ENV_ABOUT_TIMEOUT_SECS, "about_timeout")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.about_timeout);
        let render_timeout = env_parse::<u64>(ENV_RENDER_TIMEOUT_SECS, "render_timeout")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.render_timeout);
        let fetch_attempts = env_parse::<u32>(ENV_FETCH_ATTEMPTS, "fetch_attempts")?
            .unwrap_or(defaults.fetch_attempts);
        let retry_pause = env_parse::<u64>(ENV_RETRY_PAUSE_MS, "retry_pause")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_pause);
        let render_command = env::var(ENV_RENDER_COMMAND)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        if fetch_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fetch_attempts",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            fetch_timeout,
            about_timeout,
            render_timeout,
            fetch_attempts,
            retry_pause,
            render_command,
        })
    }

    /// Per-attempt timeout for the main page fetch.
    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }
    /// Timeout for each "about" page probe.
    pub fn about_timeout(&self) -> Duration {
        self.about_timeout
    }
    /// Upper bound for one render-capability call.
    pub fn render_timeout(&self) -> Duration {
        self.render_timeout
    }
    /// Number of sequential attempts at the main fetch.
    pub fn fetch_attempts(&self) -> u32 {
        self.fetch_attempts
    }
    /// Pause between fetch attempts.
    pub fn retry_pause(&self) -> Duration {
        self.retry_pause
    }
    /// External headless-browser command line, if rendering is enabled.
    pub fn render_command(&self) -> Option<&str> {
        self.render_command.as_deref()
    }

    pub fn with_retry_pause(mut self, pause: Duration) -> Self {
        self.retry_pause = pause;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_render_command(mut self, command: impl Into<String>) -> Self {
        self.render_command = Some(command.into());
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            about_timeout: DEFAULT_ABOUT_TIMEOUT,
            render_timeout: DEFAULT_RENDER_TIMEOUT,
            fetch_attempts: DEFAULT_FETCH_ATTEMPTS,
            retry_pause: DEFAULT_RETRY_PAUSE,
            render_command: None,
        }
    }
}

fn env_parse<T>(key: &str, field: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                field,
                reason: format!("{raw:?}: {e}"),
            }),
        Err(_) => Ok(None),
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}
