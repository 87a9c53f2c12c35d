mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ptsandbox_api::Client;
use tracing_subscriber::EnvFilter;

use crate::config::ConnectionArgs;
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "ptsandbox")]
#[command(about = "Upload files to a PT Sandbox appliance and fetch scan results")]
struct Cli {
    /// Output format: pretty or compact JSON
    #[arg(long, default_value = "pretty", global = true)]
    output: String,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the appliance is up
    Health,
    /// List available sandbox images
    Images,
    /// Upload a file and print its storage URI
    Upload(commands::upload::UploadArgs),
    /// Upload a file and create a scan task for it
    Scan(commands::scan::ScanArgs),
    /// Show the status of a scan task
    CheckTask(commands::task::ScanIdArgs),
    /// Fetch the report of a finished scan task
    Report(commands::task::ScanIdArgs),
}

/// Log levels used when `RUST_LOG` is unset or empty.
const DEFAULT_LOG_FILTER: &str = "ptsandbox=info,ptsandbox_api=warn";

/// `RUST_LOG` when given and valid, otherwise [`DEFAULT_LOG_FILTER`].
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; settings may come from flags or the real environment.
    dotenvy::dotenv().ok();

    let rust_log = std::env::var("RUST_LOG").ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(rust_log.as_deref()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.output);

    let resolved = config::load(&cli.connection)?;
    let client = match &resolved.base_url {
        Some(base_url) => Client::with_base_url(base_url, resolved.client)?,
        None => Client::new(resolved.client)?,
    };

    match &cli.command {
        Commands::Health => commands::health::run(&client, &format).await?,
        Commands::Images => commands::images::run(&client, &format).await?,
        Commands::Upload(args) => commands::upload::run(args, &client, &format).await?,
        Commands::Scan(args) => commands::scan::run(args, &client, &format).await?,
        Commands::CheckTask(args) => commands::task::check(args, &client, &format).await?,
        Commands::Report(args) => commands::task::report(args, &client, &format).await?,
    }

    Ok(())
}
