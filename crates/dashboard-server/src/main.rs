use anyhow::{Context, Result};
use clap::Parser;
use infrastructure::AppConfig;
use migration::{Migrator, MigratorTrait};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dashboard_server::{api, in_memory_app_state, setup_app_state};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding default.toml and <RUN_MODE>.toml
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// API Port (overrides server.port)
    #[arg(long)]
    port: Option<u16>,

    /// Keep records in memory instead of connecting to the database
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info,dashboard_server=debug,application=debug")
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenv::dotenv().ok();
    let args = Args::parse();
    info!("📦 BIN Recovery Dashboard starting...");

    let mut config = AppConfig::load(&args.config_dir).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if config.auth.admin_password.is_empty() {
        warn!("No admin password configured; uploads and deletions are disabled");
    }

    let state = match config.database_url() {
        Some(url) if !args.in_memory => {
            info!("Connecting to database...");
            let db = sea_orm::Database::connect(&url)
                .await
                .context("Failed to connect to database")?;

            info!("Running database migrations...");
            Migrator::up(&db, None).await?;
            info!("✅ Migrations applied successfully");

            setup_app_state(db, &config)
        }
        _ => {
            warn!("Using in-memory record store; data is lost on exit");
            in_memory_app_state(&config)
        }
    };

    let app = api::create_router(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("🚀 API Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
