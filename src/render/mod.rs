//! Optional JavaScript rendering.
//!
//! The pipeline never depends on a renderer being present: every caller
//! treats `None` as "rendering unavailable" and moves on to the next step.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, instrument, warn};
use url::Url;

/// Supplies fully rendered HTML for a URL.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Rendered markup, or `None` on any failure.
    async fn render(&self, url: &Url) -> Option<String>;

    /// Whether this renderer can ever return markup.
    fn is_available(&self) -> bool {
        true
    }
}

/// The renderer used when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRenderer;

#[async_trait]
impl PageRenderer for NoRenderer {
    async fn render(&self, _url: &Url) -> Option<String> {
        None
    }

    fn is_available(&self) -> bool {
        false
    }
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("render command is empty")]
    EmptyCommand,
}

/// Renders by running an external headless browser that prints the final
/// DOM to stdout, e.g. `chromium --headless=new --dump-dom`. The URL is
/// appended as the last argument.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Split a whitespace-separated command line into program and arguments.
    pub fn from_command_line(command: &str, timeout: Duration) -> Result<Self, RenderError> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(RenderError::EmptyCommand)?;
        Ok(Self::new(program, parts.collect(), timeout))
    }
}

#[async_trait]
impl PageRenderer for CommandRenderer {
    #[instrument(skip_all, fields(url = %url, program = %self.program))]
    async fn render(&self, url: &Url) -> Option<String> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(url.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                warn!(error = %err, "render command failed to start");
                return None;
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "render command timed out");
                return None;
            }
        };

        if !output.status.success() {
            debug!(status = %output.status, "render command exited unsuccessfully");
            return None;
        }

        let html = String::from_utf8_lossy(&output.stdout).into_owned();
        if html.trim().is_empty() {
            debug!("render command produced no output");
            return None;
        }

        Some(html)
    }
}
