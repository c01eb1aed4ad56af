use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::HOST;
use serde_json::Value;

use deploy_hook::auth::{sign, SECRET_HEADER};
use deploy_hook::config::load_config;
use deploy_hook::http::HEALTH_PATH;

#[derive(Parser)]
#[command(name = "hook-cli")]
#[command(about = "Operator CLI for the deploy webhook", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:9000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the listener is up
    Health,
    /// Fire a simple hook
    Trigger {
        #[arg(long)]
        path: String,
        #[arg(long)]
        secret: String,
        /// Host header to send, for routes shared between hosts
        #[arg(long)]
        host: Option<String>,
    },
    /// Print the X-Hub-Signature-256 value for a payload file
    Sign {
        #[arg(long)]
        secret: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Load and validate a routing file
    CheckConfig {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client
                .get(format!("{}{}", cli.url, HEALTH_PATH))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Trigger { path, secret, host } => {
            let mut req = client
                .post(format!("{}{}", cli.url, path))
                .header(SECRET_HEADER, secret);
            if let Some(host) = host {
                req = req.header(HOST, host);
            }
            print_response(req.send().await?).await?;
        }
        Commands::Sign { secret, file } => {
            let body = tokio::fs::read(&file).await?;
            println!("{}", sign(secret.as_bytes(), &body));
        }
        Commands::CheckConfig { config } => {
            let parsed = load_config(&config).await?;
            println!("{}: ok", config.display());
            println!("listen {}", parsed.bind_address());
            for entry in &parsed.hooks {
                println!(
                    "  hook   {:<16} {} host={} dir={} branch={} process={}",
                    entry.id,
                    entry.path,
                    entry.host.as_deref().unwrap_or("*"),
                    entry.working_directory.display(),
                    entry.branch,
                    entry.process_name
                );
            }
            for entry in &parsed.github {
                let repo = if entry.repository_full_name.is_empty() {
                    "*"
                } else {
                    entry.repository_full_name.as_str()
                };
                println!("  github {:<16} {} repo={}", entry.id, entry.path, repo);
                for (git_ref, target) in &entry.ref_to_target {
                    println!(
                        "         {} -> {} ({}, {})",
                        git_ref,
                        target.working_directory.display(),
                        target.branch,
                        target.process_name
                    );
                }
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: webhook returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
