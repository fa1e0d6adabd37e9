use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use sitebrief::{
    Digester,
    config::Config,
    render::{CommandRenderer, NoRenderer, PageRenderer},
};
use tracing_subscriber::EnvFilter;

/// Produce a short textual digest of a web page, suitable as prompt context.
#[derive(Debug, Parser)]
#[command(name = "sitebrief", version)]
struct Cli {
    /// Page to digest. A missing scheme defaults to https://
    url: String,

    /// Print the full digest record as JSON instead of the digest text
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, env = "SITEBRIEF_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let config = Config::from_env()?;

    let renderer: Arc<dyn PageRenderer> = match config.render_command() {
        Some(command) => Arc::new(CommandRenderer::from_command_line(
            command,
            config.render_timeout(),
        )?),
        None => Arc::new(NoRenderer),
    };

    let digester = Digester::new(&config)?.with_renderer(renderer);

    let digest = match digester.digest(&cli.url).await {
        Ok(digest) => digest,
        Err(err) => anyhow::bail!("{err}"),
    };

    let mut stdout = std::io::stdout().lock();
    if cli.json {
        serde_json::to_writer_pretty(&mut stdout, &digest)?;
        writeln!(stdout)?;
    } else {
        writeln!(stdout, "{}", digest.text)?;
    }

    Ok(())
}
