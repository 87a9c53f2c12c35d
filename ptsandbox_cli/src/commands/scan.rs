//! The `scan` subcommand: upload a file, create a scan task and optionally
//! wait for the report.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use ptsandbox_api::Client;
use serde_json::Value;
use tokio::time::sleep;

use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct ScanArgs {
    /// File to scan
    pub file: PathBuf,

    /// Name reported to the sandbox (defaults to the file's name)
    #[arg(long)]
    pub name: Option<String>,

    /// Password to try when unpacking archives (repeatable)
    #[arg(long = "password")]
    pub passwords: Vec<String>,

    /// Poll until the task finishes, then print the report
    #[arg(long)]
    pub wait: bool,

    /// Seconds between status checks when waiting
    #[arg(long, default_value = "5")]
    pub poll_interval_secs: u64,

    /// Give up after this many status checks
    #[arg(long, default_value = "120")]
    pub max_polls: u32,
}

pub async fn run(args: &ScanArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let file_name = match &args.name {
        Some(name) => name.clone(),
        None => args
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("{} has no file name", args.file.display()))?,
    };

    let uploaded = client.upload_scan_file(&args.file).await?;
    let file_uri = data_str(&uploaded, "file_uri").context("upload reply has no data.file_uri")?;
    tracing::info!("Uploaded {} as {}", args.file.display(), file_uri);

    let created = client
        .create_scan_task(&file_uri, &file_name, args.passwords.clone())
        .await?;
    if !args.wait {
        print_json(&created, format);
        return Ok(());
    }

    let scan_id = data_str(&created, "scan_id").context("createScanTask reply has no data.scan_id")?;
    tracing::info!("Created scan task {}", scan_id);

    let interval = Duration::from_secs(args.poll_interval_secs);
    let report = wait_for_report(client, &scan_id, interval, args.max_polls).await?;
    print_json(&report, format);
    Ok(())
}

/// Checks the task up to `max_polls` times, `interval` apart, and fetches the
/// report once it has finished.
async fn wait_for_report(
    client: &Client,
    scan_id: &str,
    interval: Duration,
    max_polls: u32,
) -> Result<Value> {
    for attempt in 1..=max_polls {
        let status = client.check_scan_task(scan_id).await?;
        if task_finished(&status) {
            return Ok(client.check_scan_report(scan_id).await?);
        }
        tracing::debug!("Scan {} still running (check {}/{})", scan_id, attempt, max_polls);
        if attempt < max_polls {
            sleep(interval).await;
        }
    }

    bail!(
        "scan {} did not finish after {} status checks",
        scan_id,
        max_polls
    )
}

fn data_str(reply: &Value, field: &str) -> Option<String> {
    reply["data"][field].as_str().map(str::to_string)
}

/// A task is finished once the server attaches a result or reports a
/// terminal state.
fn task_finished(reply: &Value) -> bool {
    let data = &reply["data"];
    if !data["result"].is_null() {
        return true;
    }
    matches!(data["state"].as_str(), Some("FULL") | Some("PARTIAL"))
}
