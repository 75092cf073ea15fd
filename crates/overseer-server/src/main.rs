//! Overseer orchestration server.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod executor;
mod guard;
mod http;
mod ledger;
mod metrics;
mod orchestrator;
mod session;

use config::Config;
use executor::LocalExecutor;
use http::AppState;
use metrics::MetricsSink;
use orchestrator::Orchestrator;
use session::SessionStore;

/// Overseer orchestration server.
#[derive(Parser)]
#[command(name = "overseer-server")]
#[command(about = "Sequential task orchestration server", long_about = None)]
struct Args {
    /// HTTP bind address.
    #[arg(long, default_value = "127.0.0.1:8044")]
    bind_addr: String,

    /// Path of the session state file.
    #[arg(long, default_value = "session_state.json")]
    session_file: PathBuf,

    /// Run the in-process stub executor that auto-completes
    /// assignments.
    #[arg(long)]
    local_executor: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing; RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let args = Args::parse();
    let config = Config {
        bind_addr: args.bind_addr,
        session_file: args.session_file,
        local_executor: args.local_executor,
    };

    let metrics = Arc::new(MetricsSink::new());
    let store = SessionStore::new(&config.session_file);

    let (assignment_tx, assignment_rx) = executor::assignment_channel();
    let (report_tx, report_rx) = executor::report_channel();

    let orchestrator = Arc::new(tokio::sync::RwLock::new(
        Orchestrator::new(store, metrics.clone()).with_executor(assignment_tx),
    ));
    let state = AppState::new(orchestrator.clone(), metrics);

    // Drain executor reports into the orchestrator for as long as a
    // sender exists.
    tokio::spawn(orchestrator::ingest_reports(orchestrator, report_rx));

    if config.local_executor {
        info!("Local stub executor enabled");
        tokio::spawn(LocalExecutor::new(assignment_rx, report_tx).run());
    } else {
        // Without an in-process executor, assignments go unclaimed and
        // reports arrive via POST /report instead.
        drop(assignment_rx);
        drop(report_tx);
    }

    let router = http::create_router(state);

    info!(
        bind_addr = %config.bind_addr,
        session_file = %config.session_file.display(),
        "Starting Overseer orchestration server"
    );

    let listener = TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
