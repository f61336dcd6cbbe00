use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};
use vorbabuna_core::config::StoreBackend;
use vorbabuna_core::store::ProverbStore;
use vorbabuna_core::{MemoryProverbStore, PgProverbStore, VorbaConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "vorbabuna.toml")]
    config: String,

    /// Check the store and exit
    #[arg(long)]
    health: bool,

    /// Serve from an in-memory store instead of Postgres
    #[arg(long)]
    memory: bool,

    /// Load the built-in proverbs before serving
    #[arg(long)]
    seed: bool,

    /// With --seed, remove every proverb first
    #[arg(long, requires = "seed")]
    reset: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = if args.memory && !std::path::Path::new(&args.config).exists() {
        VorbaConfig::in_memory()
    } else {
        match VorbaConfig::load(&args.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config from {}: {}", args.config, e);
                std::process::exit(1);
            }
        }
    };

    let backend = if args.memory {
        StoreBackend::Memory
    } else {
        config.database.backend
    };

    let store: Arc<dyn ProverbStore> = match backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory proverb store");
            Arc::new(MemoryProverbStore::new())
        }
        StoreBackend::Postgres => {
            let pool = match vorbabuna_core::db::create_pool(&config.database).await {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Failed to connect to database: {}", e);
                    std::process::exit(1);
                }
            };
            vorbabuna_core::db::migrate(&pool).await?;
            Arc::new(PgProverbStore::new(pool))
        }
    };

    if args.health {
        match store.health().await {
            Ok(v) => println!("✅ Store reachable: {}", v),
            Err(e) => {
                println!("❌ Store health check failed: {}", e);
                std::process::exit(1);
            }
        }
        println!("✅ Vorbă Bună health check passed");
        return Ok(());
    }

    if args.seed {
        let report = vorbabuna_seed::seed(store.as_ref(), &config.imagery, args.reset).await?;
        tracing::info!(
            "Seeded {} proverbs ({} already present, {} removed)",
            report.inserted,
            report.skipped,
            report.removed
        );
    }

    if !config.http.enabled {
        tracing::warn!("HTTP API disabled in config; nothing to serve");
        return Ok(());
    }

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    vorbabuna_server::http::start_http_server(store, config, tx.subscribe()).await?;

    Ok(())
}
