mod batch;
mod cli;
mod commands;
mod error;
mod mcp;
mod pdf;
mod server;

use anyhow::Result;
use batch::RunOptions;
use clap::Parser;
use cli::{Cli, Commands};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Progress lines already go to stdout for the console commands, so only
    // problems are logged there unless RUST_LOG says otherwise.
    let default_directive = match cli.command {
        Commands::Serve(_) => "pdfbatch=info,tower_http=debug",
        _ => "pdfbatch=warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Mcp => {
            mcp::run_server().await?;
        }
        Commands::Process {
            path,
            operation,
            merge,
        } => {
            let options = RunOptions {
                number_pages: !merge.no_page_numbers,
            };
            commands::process::run(&path, &operation, &options)?;
        }
        Commands::Split { path } => {
            commands::process::run(&path, "split", &RunOptions::default())?;
        }
        Commands::Merge { path, merge } => {
            let options = RunOptions {
                number_pages: !merge.no_page_numbers,
            };
            commands::process::run(&path, "merge", &options)?;
        }
        Commands::Serve(args) => {
            server::serve(SocketAddr::new(args.bind, args.port)).await?;
        }
    }

    Ok(())
}
