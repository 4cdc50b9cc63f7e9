//! # olcagraph - LCI Archive Writer
//!
//! The main binary for building and inspecting root-entity archives.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │              apps/olcagraph (THE BINARY)           │
//! │                                                    │
//! │  ┌──────────────┐        ┌─────────────────────┐  │
//! │  │  CLI (clap)  │        │  Catalog fetch       │  │
//! │  │  write/ls/.. │        │  (reqwest, cached)   │  │
//! │  └──────┬───────┘        └──────────┬──────────┘  │
//! │         └──────────────┬────────────┘             │
//! │                        ▼                          │
//! │               ┌─────────────────┐                 │
//! │               │ olcagraph-core  │                 │
//! │               │   (THE LOGIC)   │                 │
//! │               └─────────────────┘                 │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Build a batch of process descriptions into the archive
//! olcagraph write -f processes.json
//!
//! # Inspect the archive
//! olcagraph status
//! olcagraph ls -t Flow
//! olcagraph show -t Process -i <uuid>
//! ```

mod cli;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Initialize tracing — OLCAGRAPH_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("OLCAGRAPH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "olcagraph=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
