//! Resolves a [`ClientConfig`] from command-line flags, the environment and
//! an optional TOML file.
//!
//! Precedence, highest first: flag, environment variable (after `.env` is
//! loaded), config file, built-in default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use ptsandbox_api::ClientConfig;
use serde::Deserialize;

pub const ENV_HOST: &str = "PTSANDBOX_HOST";
pub const ENV_API_KEY: &str = "PTSANDBOX_API_KEY";
pub const ENV_BASE_URL: &str = "PTSANDBOX_BASE_URL";

/// Connection flags shared by every subcommand.
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// TOML file with connection and scan defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Sandbox host, e.g. sandbox.example.com or 10.0.0.5:8443
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// API key sent as x-api-key
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Verify the server's TLS certificate (--verify-tls=false overrides the config file)
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub verify_tls: Option<bool>,

    /// Analysis depth for new scan tasks
    #[arg(long, global = true)]
    pub analysis_depth: Option<u32>,

    /// Enable sandbox (dynamic) analysis for new scan tasks (--sandbox=false to disable)
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    pub sandbox: Option<bool>,

    /// Sandbox image to run the sample in
    #[arg(long, global = true)]
    pub sandbox_image_id: Option<String>,

    /// Sandbox analysis duration in seconds
    #[arg(long, global = true)]
    pub sandbox_duration: Option<u32>,

    /// Request timeout in seconds (transport default if omitted)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

/// Shape of the optional TOML config file. Every field is optional.
#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub api_key: Option<String>,
    /// Overrides `https://{host}`; mostly for local test servers.
    pub base_url: Option<String>,
    pub verify_tls: Option<bool>,
    pub analysis_depth: Option<u32>,
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub sandbox: SandboxFileConfig,
}

#[derive(Deserialize, Debug, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SandboxFileConfig {
    pub enabled: Option<bool>,
    pub image_id: Option<String>,
    pub analysis_duration: Option<u32>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}

/// Client settings plus the base URL override, if any.
#[derive(Debug, PartialEq)]
pub struct Resolved {
    pub client: ClientConfig,
    pub base_url: Option<String>,
}

/// Reads the config file named by `args` (if any) and resolves against the
/// process environment.
pub fn load(args: &ConnectionArgs) -> Result<Resolved> {
    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    resolve(args, file, |key| std::env::var(key).ok())
}

/// Merges flags, environment (through `env`) and file values.
pub fn resolve(
    args: &ConnectionArgs,
    file: FileConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Resolved> {
    let host = args.host.clone().or_else(|| env(ENV_HOST)).or(file.host);
    let api_key = args
        .api_key
        .clone()
        .or_else(|| env(ENV_API_KEY))
        .or(file.api_key);
    let base_url = env(ENV_BASE_URL).or(file.base_url);

    let Some(host) = host else {
        bail!("no sandbox host given (use --host, {} or the config file)", ENV_HOST);
    };
    let Some(api_key) = api_key else {
        bail!(
            "no API key given (use --api-key, {} or the config file)",
            ENV_API_KEY
        );
    };

    let mut client = ClientConfig::new(host, api_key)
        .with_verify_tls(args.verify_tls.or(file.verify_tls).unwrap_or(false))
        .with_sandbox_enabled(args.sandbox.or(file.sandbox.enabled).unwrap_or(false));
    if let Some(depth) = args.analysis_depth.or(file.analysis_depth) {
        client = client.with_analysis_depth(depth);
    }
    if let Some(image_id) = args.sandbox_image_id.clone().or(file.sandbox.image_id) {
        client = client.with_sandbox_image_id(image_id);
    }
    if let Some(seconds) = args.sandbox_duration.or(file.sandbox.analysis_duration) {
        client = client.with_sandbox_analysis_duration(seconds);
    }
    if let Some(secs) = args.timeout_secs.or(file.timeout_secs) {
        client = client.with_timeout(Duration::from_secs(secs));
    }

    Ok(Resolved { client, base_url })
}
