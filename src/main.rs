#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

mod browser;
mod cdp;
mod errors;
mod extract;
mod launcher;
mod locator;
mod poller;
mod sink;
mod types;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const _EXIT_COMMAND_ERROR: i32 = 1;
const _EXIT_NO_BROWSING_CONTEXT: i32 = 2;
const _EXIT_NO_PAGE_FOUND: i32 = 3;
const _EXIT_NAVIGATION: i32 = 4;
const _EXIT_CDP_CONNECTION: i32 = 5;

use crate::launcher::ChromeLauncher;
use crate::locator::LocatorConfig;
use crate::poller::PollerConfig;
use crate::sink::{ConsoleSink, FileSink, Tee};

#[derive(Parser)]
#[command(name = "pairwatch")]
#[command(about = "Continuously capture a page's text from a running Chrome", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate the target page and poll its text into a log
    Watch {
        /// Target page URL; open tabs are matched by substring against it
        #[arg(long, default_value = "https://gmgn.ai/new-pair?chain=sol")]
        url: String,

        /// Remote debugging host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Remote debugging port
        #[arg(long, default_value = "9223")]
        port: u16,

        /// Seconds between snapshots
        #[arg(long, default_value = "5.0")]
        interval: f64,

        /// Seconds to wait for an open page before giving up
        #[arg(long, default_value = "30")]
        discovery_timeout: u64,

        /// CSS selector to extract text from
        #[arg(long, default_value = "body")]
        selector: String,

        /// Append snapshots to this file
        #[arg(long, default_value = "./data/data.txt")]
        log: PathBuf,

        /// Don't echo snapshots to stdout
        #[arg(long)]
        quiet: bool,

        /// Launch a dedicated Chrome instance instead of attaching to a
        /// running one
        #[arg(long)]
        launch: bool,

        /// Path to the Chrome executable (auto-detected when omitted)
        #[arg(long)]
        chrome_path: Option<PathBuf>,

        /// User data directory for the launched instance (temporary when
        /// omitted)
        #[arg(long)]
        user_data_dir: Option<PathBuf>,
    },

    /// Scan an accumulated log and write the fixed-shape records to CSV
    Extract {
        /// Log file produced by watch
        #[arg(long, default_value = "./data/data.txt")]
        input: PathBuf,

        /// Destination CSV file
        #[arg(long, default_value = "./data/extracted_data.csv")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let result = run().await;

    // Handle exit codes based on error type
    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(err) => {
            // Convert to our error type to get proper exit code
            let pairwatch_err: errors::PairwatchError = err.into();

            // Output JSON error to stdout for programmatic consumption
            let error_json = json!({
                "error": true,
                "message": pairwatch_err.to_string(),
                "exit_code": pairwatch_err.exit_code()
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );

            // Also log to stderr for human reading
            eprintln!("Error: {}", pairwatch_err);
            std::process::exit(pairwatch_err.exit_code());
        }
    }
}

async fn run() -> Result<()> {
    // Initialize tracing to stderr (so snapshot output to stdout remains clean)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pairwatch=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr) // Output logs to stderr
                .with_target(false), // Don't show target module in logs
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            url,
            host,
            port,
            interval,
            discovery_timeout,
            selector,
            log,
            quiet,
            launch,
            chrome_path,
            user_data_dir,
        } => {
            handle_watch(
                url,
                host,
                port,
                interval,
                discovery_timeout,
                selector,
                log,
                quiet,
                launch,
                chrome_path,
                user_data_dir,
            )
            .await?
        }

        Commands::Extract { input, output } => {
            let count = extract::extract_to_csv(&input, &output)?;
            println!(
                "{}",
                json!({ "records": count, "output": output.display().to_string() })
            );
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn handle_watch(
    url: String,
    host: String,
    port: u16,
    interval: f64,
    discovery_timeout: u64,
    selector: String,
    log: PathBuf,
    quiet: bool,
    launch: bool,
    chrome_path: Option<PathBuf>,
    user_data_dir: Option<PathBuf>,
) -> Result<()> {
    Url::parse(&url).with_context(|| format!("Invalid target URL: {url}"))?;
    anyhow::ensure!(interval > 0.0, "--interval must be positive");

    if launch {
        let chrome_launcher = ChromeLauncher {
            chrome_path,
            user_data_dir,
        };
        let launched = chrome_launcher.launch(port, &url)?;
        info!(
            "Launched Chrome (pid {}) with profile {}",
            launched.id(),
            launched.user_data_dir.display()
        );
        launcher::wait_for_endpoint(&host, port, Duration::from_secs(20)).await?;
    }

    let connection = cdp::CdpConnection::connect(&host, port).await?;

    let locator_config = LocatorConfig {
        target_url: url,
        discovery_timeout: Duration::from_secs(discovery_timeout),
        discovery_interval: Duration::from_secs(1),
    };
    let located = locator::locate(&connection, &locator_config).await?;
    if !located.matched_target {
        info!("Adopted a non-target page and navigated it to the target URL");
    }

    // Ctrl-C raises the shutdown signal; the poll loop honors it at the
    // next suspension point
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("Interrupt received; finishing the current tick");
        let _ = shutdown_tx.send(true);
    });

    let poller_config = PollerConfig {
        interval: Duration::from_secs_f64(interval),
        selector,
    };

    info!("Starting to scrape from the target page");
    let file_sink = FileSink::open(&log)?;
    if quiet {
        let mut sink = file_sink;
        poller::poll(&located.page, &mut sink, &poller_config, shutdown_rx).await?;
    } else {
        let mut sink = Tee::new(ConsoleSink::new(), file_sink);
        poller::poll(&located.page, &mut sink, &poller_config, shutdown_rx).await?;
    }

    connection.disconnect().await;
    Ok(())
}
