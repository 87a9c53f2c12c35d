use anyhow::Result;
use ptsandbox_api::Client;

use crate::output::{print_json, OutputFormat};

pub async fn run(client: &Client, format: &OutputFormat) -> Result<()> {
    let resp = client.check_health().await?;
    print_json(&resp, format);
    Ok(())
}
