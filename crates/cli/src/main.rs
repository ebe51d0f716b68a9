//! Demo client for the Bonsai proving service.
//!
//! Uploads guest input, proves it remotely, writes the receipt to disk and optionally converts
//! it into a Groth16 Snark.
//!
//! ## Usage
//!
//! ```bash
//! BONSAI_API_KEY=... bonsai-demo --input 7 --input 3 --snark
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

use std::{path::PathBuf, time::Duration};

use anyhow::bail;
use bonsai_client::{API_KEY_ENV, API_URL_ENV, BonsaiClient, PollConfig};
use clap::Parser;
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    config::Config,
    prove::{Job, run},
};

mod config;
mod prove;

/// Command-line interface for the demo client.
#[derive(Parser, Debug)]
#[command(name = "bonsai-demo")]
#[command(about = "Prove a guest program on Bonsai and fetch its receipt", long_about = None)]
struct Cli {
    /// Config file path.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the service API.
    #[arg(long, env = API_URL_ENV)]
    api_url: Option<String>,

    /// API key sent with every service request.
    #[arg(long, env = API_KEY_ENV, hide_env_values = true)]
    api_key: String,

    /// zkVM version announced to the service.
    #[arg(long)]
    risc0_version: Option<String>,

    /// Image to prove.
    #[arg(long)]
    image_id: Option<String>,

    /// Upload this image file under the image ID before proving.
    #[arg(long)]
    image_file: Option<PathBuf>,

    /// Guest input word, repeat for each value.
    #[arg(long = "input", default_values_t = vec![7u64, 3])]
    inputs: Vec<u64>,

    /// Where to write the receipt.
    #[arg(long, default_value = "starkReceipt.bin")]
    receipt_out: PathBuf,

    /// Convert the receipt into a Snark.
    #[arg(long)]
    snark: bool,

    /// Where to write the Snark receipt as JSON. Printed when omitted.
    #[arg(long, requires = "snark")]
    snark_out: Option<PathBuf>,

    /// Seconds between two status requests.
    #[arg(long)]
    poll_interval_secs: Option<u64>,

    /// Give up after this many status requests.
    #[arg(long)]
    max_polls: Option<u32>,
}

impl Cli {
    /// Resolves flags against the config file, flags taking precedence.
    fn resolve(self, config: Config) -> (String, String, Job, PollConfig) {
        let mut poll = PollConfig::from(&config.poll);
        if let Some(secs) = self.poll_interval_secs {
            poll.interval = Duration::from_secs(secs);
        }
        if self.max_polls.is_some() {
            poll.max_attempts = self.max_polls;
        }

        let job = Job {
            image_id: self.image_id.unwrap_or(config.image_id).into(),
            image_file: self.image_file,
            inputs: self.inputs,
            receipt_out: self.receipt_out,
            snark: self.snark,
            snark_out: self.snark_out,
        };

        (
            self.api_url.unwrap_or(config.api_url),
            self.risc0_version.unwrap_or(config.risc0_version),
            job,
            poll,
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let api_key = cli.api_key.clone();
    let (api_url, risc0_version, job, poll) = cli.resolve(config);

    info!(%api_url, %risc0_version, image_id = %job.image_id, "Starting proving run");
    let client = BonsaiClient::new(api_url, api_key, risc0_version)?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            match shutdown_signal().await {
                Ok(()) => cancel.cancel(),
                Err(e) => warn!(error = %e, "Failed to install signal handlers"),
            }
        });
    }

    tokio::select! {
        res = run(&client, &job, &poll, &cancel) => res,
        _ = cancel.cancelled() => bail!("Interrupted"),
    }
}

async fn shutdown_signal() -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => info!("Received SIGTERM, stopping"),
        _ = sigint.recv() => info!("Received SIGINT (Ctrl-C), stopping"),
    }
    Ok(())
}
