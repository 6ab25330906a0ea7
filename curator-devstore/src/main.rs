//! Curator development store
//!
//! Serves the admin collection API from memory so the panel and the sync
//! engine can run without the production backend.
//!
//! Usage:
//!   curator-devstore --port 4010 --seed fixtures/site.json
//!
//! Nothing is persisted; restarting the process resets every collection.

use std::{fs, path::PathBuf};
use anyhow::{Context, Result};
use clap::Parser;
use curator_devstore::{build_router, DevStore};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "curator-devstore")]
#[command(about = "In-memory development store for the Curator admin API")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "4010")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// JSON file of initial collections: { "faqs": [ {...}, ... ], ... }
    #[arg(short, long)]
    seed: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let store = match &args.seed {
        Some(path) => load_seed(path)?,
        None => DevStore::new(),
    };
    for name in store.collection_names().await {
        info!("Seeded {} with {} records", name, store.records(&name).await.len());
    }

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Dev store listening on http://{}/api", addr);

    axum::serve(listener, build_router(store))
        .await
        .context("HTTP server failed")
}

fn load_seed(path: &PathBuf) -> Result<DevStore> {
    info!("Loading seed from {:?}", path);
    let bytes = fs::read(path).context("Failed to read seed file")?;
    let seed = serde_json::from_slice(&bytes).context("Seed file is not valid JSON")?;
    DevStore::from_seed(seed).map_err(anyhow::Error::msg)
}
