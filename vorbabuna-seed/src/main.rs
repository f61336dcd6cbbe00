use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};
use vorbabuna_core::{PgProverbStore, VorbaConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Load the built-in Romanian proverbs into Postgres", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "vorbabuna.toml")]
    config: String,

    /// Delete every proverb before seeding
    #[arg(long)]
    reset: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = VorbaConfig::load(&args.config)
        .map_err(|e| anyhow::anyhow!("Failed to load config from {}: {}", args.config, e))?;

    let pool = vorbabuna_core::db::create_pool(&config.database).await?;
    vorbabuna_core::db::migrate(&pool).await?;
    let store = PgProverbStore::new(pool);

    let report = vorbabuna_seed::seed(&store, &config.imagery, args.reset).await?;
    println!(
        "✅ Seeded {} proverbs ({} already present, {} removed)",
        report.inserted, report.skipped, report.removed
    );
    Ok(())
}
