use anyhow::{Context, Result};
use tracing::info;
use translation_server::{config::Config, db::Database, server};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("translation_server=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("Starting translation server");

    let config = Config::from_env()?;

    let db = Database::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database_url))?;

    // First run only: load the bundled dataset
    db.seed_if_empty(&config.seed_file)
        .await
        .context("Failed to seed translations")?;

    server::serve(&config, db).await
}
