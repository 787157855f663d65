//! Analyzer server binary
//!
//! Run with: cargo run -p paper-analyzer --bin paper-analyzer-server

use clap::Parser;
use paper_analyzer::{config::AnalyzerConfig, server::AnalyzerServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "paper-analyzer-server", version, about = "Research paper analysis server")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "ANALYZER_CONFIG")]
    config: Option<PathBuf>,

    /// Host to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paper_analyzer=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    // Load configuration
    let mut config = AnalyzerConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Model: {}", config.summarizer.model);
    tracing::info!("  - Max chunk size: {} chars", config.chunking.max_chunk_chars);
    tracing::info!(
        "  - Retry: {} attempts, {}ms base delay",
        config.retry.max_attempts,
        config.retry.base_delay_ms
    );
    match config.processing.max_concurrent_jobs {
        Some(n) => tracing::info!("  - Max concurrent jobs: {}", n),
        None => tracing::info!("  - Max concurrent jobs: unlimited"),
    }

    // Create and start server
    let server = AnalyzerServer::new(config)?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/upload        - Extraction preview");
    println!("  POST /api/analyze       - Analyze synchronously");
    println!("  POST /api/analyze/async - Queue an analysis job");
    println!("  GET  /api/jobs/:id      - Job status");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
