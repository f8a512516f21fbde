use std::path::PathBuf;

use clap::Parser;
use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

use symnav_lsp::Backend;
use symnav_lsp::config::{Config, FindPackageStrategy};

/// Language server answering goto definition and goto type definition from
/// precomputed analysis snapshots.  Speaks LSP over stdio.
#[derive(Debug, Parser)]
#[command(name = "symnav", version, about)]
struct Cli {
    /// Config file (defaults to symnav/config.toml in the config directory).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory containing analysis snapshots (*.json).
    #[arg(long, value_name = "DIR")]
    index: Option<PathBuf>,

    /// Log filter, e.g. "info" or "symnav_lsp=debug".  Falls back to RUST_LOG.
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Resolve packages through vendor/ directories first.
    #[arg(long)]
    vendored: bool,

    /// Do not attach symbol descriptors to definition results.
    #[arg(long)]
    no_enrich: bool,
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    // stdout carries the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("symnav: {}", err);
            std::process::exit(2);
        }
    };
    if let Some(index) = cli.index {
        config.index_dir = Some(index);
    }
    if cli.vendored {
        config.find_package = FindPackageStrategy::Vendored;
    }
    if cli.no_enrich {
        config.enrich = false;
    }
    tracing::info!(?config, "starting symnav");

    let (service, socket) = LspService::new(|client| Backend::new(client, config));
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;
}
