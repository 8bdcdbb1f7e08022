// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spotcheck_application::{render_table, summarize, ReconciliationPipeline};
use spotcheck_catalog::{CatalogClient, CatalogSession, ClientCredentials};
use spotcheck_config::AppConfig;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "spotcheck",
    version,
    about = "Reconcile a local audio library against a remote music catalog"
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Run with verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Run with debug output (implies -v)
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recursively scan a directory, checking each file against the catalog
    Scan {
        /// Directory to scan
        directory: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = spotcheck_config::load(cli.config.as_deref())?;
    init_tracing(log_directive(
        cli.verbose,
        cli.debug,
        &config.telemetry.log_level,
    ));

    match cli.command {
        Command::Scan { directory } => scan(directory, config).await,
    }
}

async fn scan(directory: PathBuf, config: AppConfig) -> Result<()> {
    let credentials = credentials(&config)?;

    let session = Arc::new(CatalogSession::new());
    let mut builder = CatalogClient::builder(credentials)
        .session(session)
        .timeout(Duration::from_secs(config.catalog.request_timeout_secs))
        .rate_limit_interval(Duration::from_millis(config.catalog.min_interval_ms))
        .max_concurrent(config.catalog.max_concurrent)
        .search_limit(config.catalog.search_limit);

    if let Some(url) = &config.catalog.api_base_url {
        builder = builder.api_base_url(url);
    }
    if let Some(url) = &config.catalog.auth_base_url {
        builder = builder.auth_base_url(url);
    }

    let client = builder.build()?;

    // Auth failure before any dispatch is fatal; per-file failures are not.
    client
        .authenticate()
        .await
        .context("catalog authentication failed")?;

    let client = Arc::new(client);
    let pipeline = ReconciliationPipeline::new(client, &config.scan);

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            shutdown_signal().await;
            cancel.cancel();
        }
    });

    let mut rx = pipeline
        .run(&directory, cancel)
        .await
        .with_context(|| format!("cannot scan {}", directory.display()))?;

    let mut outcomes = Vec::new();
    while let Some(outcome) = rx.recv().await {
        debug!(target: "cli", status = outcome.status_label(), "outcome received");
        outcomes.push(outcome);
    }

    println!("{}", render_table(&outcomes));

    let summary = summarize(&outcomes);
    info!(
        target: "cli",
        matched = summary.matched,
        partial = summary.partial_mismatches,
        no_result = summary.no_results,
        no_response = summary.no_responses,
        metadata_errors = summary.metadata_errors,
        discovery_errors = summary.discovery_errors,
        "scan complete"
    );
    println!(
        "{} files: {} matched, {} partial, {} no result, {} no response, {} unreadable",
        summary.total(),
        summary.matched,
        summary.partial_mismatches,
        summary.no_results,
        summary.no_responses,
        summary.metadata_errors + summary.discovery_errors,
    );

    Ok(())
}

fn credentials(config: &AppConfig) -> Result<ClientCredentials> {
    let client_id = config
        .catalog
        .client_id
        .clone()
        .context("missing catalog client id (set SPOTCHECK_CATALOG__CLIENT_ID or [catalog] client_id)")?;
    let client_secret = config
        .catalog
        .client_secret
        .clone()
        .context("missing catalog client secret (set SPOTCHECK_CATALOG__CLIENT_SECRET or [catalog] client_secret)")?;
    Ok(ClientCredentials {
        client_id,
        client_secret,
    })
}

/// Flags beat the configured level; `RUST_LOG` (if set) beats both.
fn log_directive<'a>(verbose: bool, debug: bool, configured: &'a str) -> &'a str {
    if debug {
        "trace"
    } else if verbose {
        "debug"
    } else {
        configured
    }
}

fn init_tracing(default_directive: &str) {
    let fmt_layer = fmt::layer().with_target(true).with_level(true);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

async fn shutdown_signal() {
    #[cfg(unix)]
    let mut interrupt = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
        .expect("install SIGINT handler");

    #[cfg(unix)]
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .expect("install SIGTERM handler");

    #[cfg(not(unix))]
    let interrupt = tokio::signal::ctrl_c();

    #[cfg(unix)]
    tokio::select! {
        _ = interrupt.recv() => {},
        _ = terminate.recv() => {},
    }

    #[cfg(not(unix))]
    {
        interrupt.await.expect("ctrl_c handler");
    }

    info!(target: "cli", "shutdown signal received");
}
