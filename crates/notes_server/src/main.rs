//! Notes API server entrypoint.

use notes_server::{
    config::{env_flag_enabled, Config},
    serve_router, AppState, Database, TantivySearchIndex, DEFAULT_PORT,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => flags.help = true,
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

fn require_signing_secret(config: &Config) -> anyhow::Result<()> {
    if config.signing_secret.trim().is_empty() {
        anyhow::bail!("SIGNING_SECRET must be set to a non-empty value");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "notes=info,notes_core=info,notes_server=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli_flags = parse_cli_flags(&args)?;

    if cli_flags.help {
        print_help();
        return Ok(());
    }

    let config = Config::from_env();
    require_signing_secret(&config)?;

    let database = Database::open(&config.db_path, config.database_options())?;
    let index = TantivySearchIndex::open(&config.search_path, config.search_limit)?;
    let state = AppState::new(config.clone(), database, Arc::new(index));

    let allow_public = env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    if allow_public {
        tracing::warn!("Public access enabled - server will accept requests from any origin");
    }

    let bind_addr = notes_server::resolve_bind_address(&config, allow_public);
    if !bind_addr.ip().is_loopback() {
        tracing::warn!(
            "Binding to non-localhost address: {} - ensure proper security measures are in place",
            bind_addr
        );
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!("Notes server running at http://{}", actual_addr);

    let service = state.service.clone();
    let serve_result = serve_router(listener, state, allow_public, shutdown_signal()).await;

    if let Err(err) = service.close() {
        tracing::error!("Failed to release id leases: {}", err);
    } else {
        tracing::info!("Note store closed");
    }

    serve_result?;

    Ok(())
}

fn print_help() {
    println!("Notes Server\n");
    println!("Usage: notes [OPTIONS]\n");
    println!("Options:");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!("  SIGNING_SECRET    Secret used to verify tenant tokens (required)");
    println!("  DB_PATH           Database directory (default: ~/.cache/notes/kv)");
    println!("  SEARCH_PATH       Search index directory (default: ~/.cache/notes/search)");
    println!("  PORT              Server port (default: {})", DEFAULT_PORT);
    println!("  STATIC_DIR        Directory served for non-API paths (default: ./static)");
    println!("  ID_LEASE_SIZE     Ids reserved per sequence lease (default: 100)");
    println!("  MAX_TAG_LOOKUPS   Concurrent tag lookups per note (default: 8)");
    println!("  SEARCH_LIMIT      Maximum search hits (default: 50)");
    println!("  REQUEST_TIMEOUT_SECS  Per-request timeout (default: 20)");
    println!("  ALLOW_PUBLIC_ACCESS  Allow CORS from any origin");
    println!(
        "  BIND              Override bind address (e.g. 0.0.0.0:{})",
        DEFAULT_PORT
    );
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
