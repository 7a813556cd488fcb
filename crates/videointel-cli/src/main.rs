//! VideoIntel CLI
//!
//! Runs label, face, safe-search and shot-change detection against the
//! Video Intelligence service and prints the results.

mod commands;

use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::prelude::*;
use videointel_lib::core::jobs::AnnotationClient;
use videointel_lib::core::settings::{
    ClientSettings, ENV_ACCESS_TOKEN, ENV_API_KEY, ENV_BASE_URL, ENV_MAX_WAIT_SECS,
    ENV_POLL_INTERVAL_SECS, ENV_REQUEST_TIMEOUT_SECS,
};

use commands::USAGE;

#[derive(Debug, Parser)]
#[command(name = "videointel", version, about)]
struct Cli {
    /// API key for the Video Intelligence service
    #[arg(long, env = ENV_API_KEY, hide_env_values = true)]
    api_key: Option<String>,

    /// OAuth access token (used when no API key is set)
    #[arg(long, env = ENV_ACCESS_TOKEN, hide_env_values = true)]
    access_token: Option<String>,

    /// Service base URL
    #[arg(long, env = ENV_BASE_URL)]
    base_url: Option<String>,

    /// Seconds between operation polls
    #[arg(long, env = ENV_POLL_INTERVAL_SECS)]
    poll_interval_secs: Option<u64>,

    /// Give up waiting after this many seconds (default: wait indefinitely)
    #[arg(long, env = ENV_MAX_WAIT_SECS)]
    max_wait_secs: Option<u64>,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = ENV_REQUEST_TIMEOUT_SECS)]
    request_timeout_secs: Option<u64>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Command and its argument
    #[arg(value_name = "COMMAND")]
    args: Vec<String>,
}

impl Cli {
    fn settings(&self) -> ClientSettings {
        let defaults = ClientSettings::default();
        ClientSettings {
            base_url: self.base_url.clone().unwrap_or(defaults.base_url),
            api_key: self.api_key.clone(),
            access_token: self.access_token.clone(),
            poll_interval_secs: self
                .poll_interval_secs
                .unwrap_or(defaults.poll_interval_secs),
            max_wait_secs: self.max_wait_secs,
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
        }
    }
}

/// Logs go to stderr so stdout carries only results
fn init_logging(verbose: bool) {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    let env_filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer);

    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Help and version requests keep clap's output; any other bad input gets `USAGE`
fn falls_back_to_usage(err: &clap::Error) -> bool {
    !matches!(
        err.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if falls_back_to_usage(&e) => {
            print!("{}", USAGE);
            return Ok(());
        }
        Err(e) => e.exit(),
    };
    init_logging(cli.verbose);

    let settings = cli.settings();
    let mut stdout = std::io::stdout().lock();
    commands::dispatch(
        &cli.args,
        || Ok(AnnotationClient::from_settings(&settings)?),
        &mut stdout,
    )
    .await
}
