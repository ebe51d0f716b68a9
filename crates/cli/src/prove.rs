//! The proving run: upload, prove, download, and optionally compress to a Snark.

use std::path::{Path, PathBuf};

use anyhow::Context;
use bonsai_client::{BonsaiClient, PollConfig, encode_inputs, types::ImageId};
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// What to prove and where to put the results.
#[derive(Clone, Debug)]
pub struct Job {
    pub image_id: ImageId,
    /// Image bytes to upload before proving, if the service may not have them yet.
    pub image_file: Option<PathBuf>,
    pub inputs: Vec<u64>,
    pub receipt_out: PathBuf,
    /// Compress the receipt into a Snark after proving.
    pub snark: bool,
    pub snark_out: Option<PathBuf>,
}

pub async fn run(
    client: &BonsaiClient,
    job: &Job,
    poll: &PollConfig,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    // Get the version info of the server, just to verify we can connect.
    let version = client
        .version()
        .await
        .context("Failed to reach the proving service")?;
    println!("Version Info: {:?}", version.risc0_zkvm);

    if let Some(image_file) = &job.image_file {
        let image = fs::read(image_file)
            .await
            .with_context(|| format!("Failed to read image: {image_file:?}"))?;
        let uploaded = client
            .upload_image(&job.image_id, image)
            .await
            .context("Failed to upload image")?;
        info!(image_id = %job.image_id, uploaded, "Image ready");
    }

    let input = encode_inputs(&job.inputs);
    let input_id = client
        .upload_input(input)
        .await
        .context("Failed to upload input")?;
    println!("Input UUID: {input_id}");

    let session_id = client
        .create_session(job.image_id.clone(), input_id)
        .await
        .context("Failed to create session")?;
    println!("Session UUID: {session_id}");

    let receipt = client.wait_for_session(&session_id, poll, cancel).await?;
    write_output(&job.receipt_out, &receipt).await?;
    println!("Receipt written to: {:?}", job.receipt_out);

    if !job.snark {
        return Ok(());
    }

    let snark_id = client
        .create_snark(session_id)
        .await
        .context("Failed to create snark")?;
    println!("Snark UUID: {snark_id}");

    let snark_receipt = client.wait_for_snark(&snark_id, poll, cancel).await?;
    match &job.snark_out {
        Some(path) => {
            write_output(path, &serde_json::to_vec_pretty(&snark_receipt)?).await?;
            println!("Snark receipt written to: {path:?}");
        }
        None => println!("Snark receipt: {snark_receipt:#?}"),
    }

    Ok(())
}

async fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {path:?}"))
}
