//! Deploy webhook dispatcher.
//!
//! Listens for webhook calls, matches them against a routing file that is
//! re-read on every request, authenticates them, and runs a fixed deploy
//! pipeline for the matched target.
//!
//! # Architecture Overview
//!
//! ```text
//!     POST /hook  ┌─────────┐   ┌────────────┐   ┌──────────┐   ┌──────────┐
//!     ───────────▶│  http   │──▶│   config   │──▶│ routing  │──▶│   auth   │
//!                 │ server  │   │   store    │   │ matcher  │   │ secret / │
//!                 └─────────┘   └────────────┘   └──────────┘   │ HMAC     │
//!                                                               └────┬─────┘
//!                                                                    ▼
//!     JSON        ┌─────────┐                                  ┌──────────┐
//!     ◀───────────│response │◀─────────────────────────────────│  deploy  │
//!                 └─────────┘   git fetch → reset → npm → pm2  │ executor │
//!                                                              └──────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use deploy_hook::lifecycle::{self, StartupOptions};

#[derive(Parser, Debug)]
#[command(name = "deploy-hook")]
#[command(about = "Webhook listener that redeploys git-backed Node services", long_about = None)]
struct Args {
    /// Routing file (JSON, or TOML by extension).
    #[arg(short, long, env = "DEPLOY_HOOK_CONFIG", default_value = "hooks.json")]
    config: PathBuf,

    /// Override the listen host from the routing file.
    #[arg(long)]
    host: Option<String>,

    /// Override the listen port from the routing file.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    lifecycle::run(StartupOptions {
        config_path: args.config,
        host: args.host,
        port: args.port,
    })
    .await?;

    Ok(())
}
