use anyhow::Result;
use ptsandbox_api::Client;

use crate::output::{print_json, OutputFormat};

pub async fn run(client: &Client, format: &OutputFormat) -> Result<()> {
    let resp = client.get_images().await?;
    if let Some(images) = resp["data"].as_array() {
        tracing::info!("{} sandbox images available", images.len());
    }
    print_json(&resp, format);
    Ok(())
}
