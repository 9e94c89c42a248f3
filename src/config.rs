use anyhow::Result;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Store
    pub database_url: String,

    // HTTP server
    pub host: String,
    pub port: u16,

    // Data files
    pub seed_file: PathBuf,
    pub keys_file: PathBuf,
    pub translations_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Store
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://translations.db".to_string()),

            // HTTP server
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),

            // Data files
            seed_file: std::env::var("SEED_FILE")
                .unwrap_or_else(|_| "data/translations.json".to_string())
                .into(),
            keys_file: std::env::var("KEYS_FILE")
                .unwrap_or_else(|_| "data/keys.json".to_string())
                .into(),
            translations_dir: std::env::var("TRANSLATIONS_DIR")
                .unwrap_or_else(|_| "data/translations".to_string())
                .into(),
        })
    }

    /// Socket address string the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
