use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use ptsandbox_api::Client;

use crate::output::{print_json, OutputFormat};

#[derive(Args)]
pub struct UploadArgs {
    /// File to upload
    pub file: PathBuf,
}

pub async fn run(args: &UploadArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let resp = client.upload_scan_file(&args.file).await?;
    print_json(&resp, format);
    Ok(())
}
