//! The `check-task` and `report` subcommands: one request each for a known scan id.

use anyhow::Result;
use clap::Args;
use ptsandbox_api::Client;

use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct ScanIdArgs {
    /// Scan id returned when the task was created
    pub scan_id: String,
}

pub async fn check(args: &ScanIdArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let resp = client.check_scan_task(&args.scan_id).await?;
    print_json(&resp, format);
    Ok(())
}

pub async fn report(args: &ScanIdArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let resp = client.check_scan_report(&args.scan_id).await?;
    print_json(&resp, format);
    Ok(())
}
