//! Interactive language provisioning.
//!
//! Usage:
//!   cargo run --bin create-lang
//!
//! Optional environment variables:
//! - DATABASE_URL (defaults to sqlite://translations.db)
//! - KEYS_FILE (defaults to data/keys.json)
//! - TRANSLATIONS_DIR (defaults to data/translations)

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use translation_server::config::Config;
use translation_server::db::Database;
use translation_server::provision::{self, AddLanguageRequest, MenuChoice, ProvisionPaths};

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim().to_string())
}

async fn run(config: &Config) -> Result<()> {
    println!("1. Add a new language");
    println!("2. Delete a language");
    let choice: MenuChoice = prompt("Choose an option (1/2): ")?.parse()?;

    let db = Database::new(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database at {}", config.database_url))?;

    match choice {
        MenuChoice::AddLanguage => {
            let name = prompt("Enter the language name: ")?;
            let code = prompt("Enter the language short key (ex: ta, en, etc.): ")?;
            let request = AddLanguageRequest::new(&name, &code)?;

            let report =
                provision::add_language(&db, &ProvisionPaths::from(config), &request).await?;

            println!("✅ Created translation file: {}", report.file_path.display());
            println!("Total keys written to file: {}", report.written);
            if report.inserted == 0 {
                println!("ℹ️ No new keys added to the database");
            } else {
                println!("✅ New keys added to the database: {}", report.inserted);
            }
        }
        MenuChoice::DeleteLanguage => {
            let code = prompt("Enter the language short key to delete: ")?;
            let answer = prompt(&format!(
                "Delete every translation for '{}'? (yes/no): ",
                code
            ))?;

            let removed =
                provision::delete_language(&db, &code, provision::is_affirmative(&answer)).await?;
            if removed == 0 {
                println!("ℹ️ No translations found for '{}'", code);
            } else {
                println!("🗑️ Deleted {} translations for '{}'", removed, code);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("translation_server=warn".parse()?),
        )
        .init();

    let config = Config::from_env()?;

    // Every failure is reported to the operator; the tool never panics out
    if let Err(e) = run(&config).await {
        println!("❌ {:#}", e);
    }

    Ok(())
}
