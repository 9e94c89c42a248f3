use crate::error::{Error, Result};
use crate::keypath;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// One localized string as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct TranslationRow {
    pub id: i64,
    pub key: String,
    pub lang: String,
    pub name: String,
    pub value: String,
}

/// A row before the store assigns it an id.
///
/// This is also the record shape of the seed file and of the flat
/// per-language files written by provisioning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTranslation {
    pub key: String,
    pub lang: String,
    pub name: String,
    pub value: String,
}

/// A language present in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Language {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the store and make sure the schema exists
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Every connection to `sqlite::memory:` is its own database
        let in_memory = database_url.contains(":memory:");
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS translations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                key TEXT NOT NULL,
                lang TEXT NOT NULL,
                name TEXT NOT NULL,
                value TEXT NOT NULL,
                CONSTRAINT unique_key_lang UNIQUE (key, lang)
            )",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    /// Insert a batch of rows in a single transaction.
    ///
    /// Either every row is committed or none is. Rejects duplicate
    /// `(key, lang)` pairs (inside the batch or against stored rows) and
    /// keys that would collide with another key's path in the same language.
    pub async fn insert_many(&self, rows: &[NewTranslation]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut by_lang: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        let mut seen = HashSet::new();
        for row in rows {
            if row.lang.trim().is_empty() {
                return Err(Error::ConstraintViolation(format!(
                    "empty language code for key '{}'",
                    row.key
                )));
            }
            if row.name.trim().is_empty() {
                return Err(Error::ConstraintViolation(format!(
                    "empty language name for '{}'",
                    row.lang
                )));
            }
            if !seen.insert((row.key.as_str(), row.lang.as_str())) {
                return Err(Error::ConstraintViolation(format!(
                    "duplicate key '{}' for language '{}' in batch",
                    row.key, row.lang
                )));
            }
            by_lang
                .entry(row.lang.as_str())
                .or_default()
                .push(row.key.as_str());
        }

        let mut tx = self.pool.begin().await?;

        for (lang, batch_keys) in &by_lang {
            let stored =
                sqlx::query_scalar::<_, String>("SELECT key FROM translations WHERE lang = ?1")
                    .bind(*lang)
                    .fetch_all(&mut *tx)
                    .await?;

            keypath::check_key_paths(
                stored
                    .iter()
                    .map(String::as_str)
                    .chain(batch_keys.iter().copied()),
            )
            .map_err(|e| Error::ConstraintViolation(format!("language '{}': {}", lang, e)))?;
        }

        let mut inserted = 0;
        for row in rows {
            inserted += sqlx::query(
                "INSERT INTO translations (key, lang, name, value) VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(&row.key)
            .bind(&row.lang)
            .bind(&row.name)
            .bind(&row.value)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        // Dropping `tx` on any earlier `?` rolls the batch back
        tx.commit().await?;

        Ok(inserted)
    }

    /// All rows for one language; empty when the language is unknown
    pub async fn query_by_lang(&self, lang: &str) -> Result<Vec<TranslationRow>> {
        let rows = sqlx::query_as::<_, TranslationRow>(
            "SELECT id, key, lang, name, value FROM translations WHERE lang = ?1 ORDER BY id",
        )
        .bind(lang)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// One entry per language, in first-inserted order.
    ///
    /// The display name comes from the earliest row of that language.
    pub async fn query_distinct_langs(&self) -> Result<Vec<Language>> {
        let languages = sqlx::query_as::<_, Language>(
            "SELECT lang AS code, name, MIN(id) AS first_id
             FROM translations
             GROUP BY lang
             ORDER BY first_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(languages)
    }

    pub async fn query_all(&self) -> Result<Vec<TranslationRow>> {
        let rows = sqlx::query_as::<_, TranslationRow>(
            "SELECT id, key, lang, name, value FROM translations ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn keys_for_lang(&self, lang: &str) -> Result<Vec<String>> {
        let keys = sqlx::query_scalar::<_, String>(
            "SELECT key FROM translations WHERE lang = ?1 ORDER BY id",
        )
        .bind(lang)
        .fetch_all(&self.pool)
        .await?;

        Ok(keys)
    }

    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM translations")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Remove every row of a language, returning how many were removed
    pub async fn delete_by_lang(&self, lang: &str) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM translations WHERE lang = ?1")
            .bind(lang)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        Ok(removed)
    }

    /// Load the bundled dataset, but only into an empty table
    pub async fn seed_if_empty(&self, seed_file: &Path) -> Result<u64> {
        if self.count().await? > 0 {
            info!("Translations already exist in the database, skipping seed");
            return Ok(0);
        }

        let contents = match tokio::fs::read_to_string(seed_file).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "Seed file {} not found, starting with an empty table",
                    seed_file.display()
                );
                return Ok(0);
            }
            Err(e) => return Err(e.into()),
        };

        let rows: Vec<NewTranslation> = serde_json::from_str(&contents)?;
        let inserted = self.insert_many(&rows).await?;

        info!("✓ Database initialized with {} translations", inserted);
        Ok(inserted)
    }
}
