//! Cloudflare Page Rules Agent
//!
//! Verifies the account API token, lists every zone on the account and
//! prints the page rules attached to each one.
//!
//! # Usage
//! ```bash
//! # Credentials from the environment or a local .env file
//! BASE_URL=https://api.cloudflare.com/client/v4 \
//! ACCOUNT_API_TOKEN=<TOKEN> \
//! check-page-rules
//!
//! # JSON logs on stderr, debug level
//! check-page-rules --log-format json --verbose
//! ```
//!
//! The exit status is 0 whether or not the API calls succeed; failures are
//! logged and reflected in the printed output.

use std::io;
use std::time::Duration;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use cloudflare_pagerules::config::{self, DEFAULT_TIMEOUT_SECS};
use cloudflare_pagerules::{audit, CloudflareClient, Config};

// ============================================================
// CLI Definition
// ============================================================

#[derive(Parser, Debug)]
#[command(name = "check-page-rules")]
#[command(about = "Lornu AI Cloudflare Page Rules Agent", long_about = None)]
#[command(version)]
struct Cli {
    /// Cloudflare API origin
    #[arg(long, env = "BASE_URL")]
    base_url: Option<String>,

    /// Account API token
    #[arg(long, env = "ACCOUNT_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "CF_PAGERULES_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Log output format
    #[arg(long, env = "CF_PAGERULES_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Leave BASE_URL and ACCOUNT_API_TOKEN in the environment after the run
    #[arg(long)]
    keep_env: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

// ============================================================
// Main Entry Point
// ============================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // .env must be loaded before clap reads the environment
    let dotenv_path = config::load_dotenv();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return Ok(());
        }
        Err(e) => {
            // Bad arguments still exit 0 with the usual failure line
            let _ = e.print();
            println!("{}", audit::INVALID_TOKEN_MESSAGE);
            return Ok(());
        }
    };

    if let Err(e) = init_logging(&cli) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Some(path) = dotenv_path {
        info!("📄 Loaded environment from {}", path.display());
    }

    info!("🚀 Cloudflare Page Rules Agent starting...");

    let config = match Config::new(
        cli.base_url,
        cli.api_token,
        Duration::from_secs(cli.timeout),
    ) {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            println!("{}", audit::INVALID_TOKEN_MESSAGE);
            return Ok(());
        }
    };

    let client = match CloudflareClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            error!("{}", e);
            println!("{}", audit::INVALID_TOKEN_MESSAGE);
            return Ok(());
        }
    };

    info!("🔐 Verifying token against {}", client.base_url());

    let mut stdout = io::stdout();
    let completed = match audit::run(&client, &mut stdout).await {
        Ok(Some(registry)) => {
            info!(
                "✅ Reported {} zones with {} page rules",
                registry.len(),
                registry.rule_count()
            );
            true
        }
        Ok(None) => false,
        Err(e) => {
            error!("Failed to write report: {}", e);
            false
        }
    };

    config::clear_after_run(completed, cli.keep_env);

    Ok(())
}

fn init_logging(cli: &Cli) -> Result<()> {
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr);

    match cli.log_format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
    }

    Ok(())
}
