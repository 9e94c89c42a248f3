//! Language provisioning: seed a new language from the canonical key set,
//! or remove one.
//!
//! Nothing here reads stdin. The `create-lang` binary collects answers and
//! passes them in, so every step can be driven from tests.

use crate::config::Config;
use crate::db::{Database, NewTranslation};
use crate::error::{Error, Result};
use crate::keypath;
use regex::Regex;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use tracing::info;

static LANGUAGE_CODE_REGEX: OnceLock<Regex> = OnceLock::new();

fn language_code_regex() -> &'static Regex {
    LANGUAGE_CODE_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z]{2,3}([-_][A-Za-z0-9]{2,8})*$").expect("Invalid regex")
    })
}

/// Files the provisioning workflow reads and writes
#[derive(Debug, Clone)]
pub struct ProvisionPaths {
    pub keys_file: PathBuf,
    pub translations_dir: PathBuf,
}

impl From<&Config> for ProvisionPaths {
    fn from(config: &Config) -> Self {
        Self {
            keys_file: config.keys_file.clone(),
            translations_dir: config.translations_dir.clone(),
        }
    }
}

/// Top-level menu of the interactive tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    AddLanguage,
    DeleteLanguage,
}

impl FromStr for MenuChoice {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        match input.trim() {
            "1" => Ok(MenuChoice::AddLanguage),
            "2" => Ok(MenuChoice::DeleteLanguage),
            other => Err(Error::UserAborted(format!("Invalid choice '{}'", other))),
        }
    }
}

/// A validated request to add a language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLanguageRequest {
    name: String,
    code: String,
}

impl AddLanguageRequest {
    /// Trim and validate operator input.
    ///
    /// The name becomes a file name, so path separators and `..` are refused.
    pub fn new(name: &str, code: &str) -> Result<Self> {
        let name = name.trim();
        let code = code.trim();

        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(Error::ConstraintViolation(format!(
                "Invalid language name '{}'",
                name
            )));
        }
        if !language_code_regex().is_match(code) {
            return Err(Error::ConstraintViolation(format!(
                "Invalid language key '{}' (expected a short code such as 'en' or 'pt-BR')",
                code
            )));
        }

        Ok(Self {
            name: name.to_string(),
            code: code.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

/// Outcome of [`add_language`].
///
/// `written` counts every candidate in the flat file; `inserted` only the
/// rows that were new to the store. They differ when the language already
/// had some keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLanguageReport {
    pub file_path: PathBuf,
    pub written: usize,
    pub inserted: u64,
}

/// Read the canonical dotted paths, first occurrence wins.
///
/// A key file that repeats a path yields fewer paths (and so fewer flat
/// file records) than it has entries.
pub async fn load_canonical_keys(keys_file: &Path) -> Result<Vec<String>> {
    let contents = match tokio::fs::read_to_string(keys_file).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NotFound(format!(
                "Key file not found: {}",
                keys_file.display()
            )));
        }
        Err(e) => return Err(e.into()),
    };

    let document: Value = serde_json::from_str(&contents)?;

    let mut seen = HashSet::new();
    let paths: Vec<String> = keypath::collect_paths(&document)
        .into_iter()
        .filter(|path| seen.insert(path.clone()))
        .collect();

    keypath::check_key_paths(paths.iter().map(String::as_str))
        .map_err(|e| Error::ConstraintViolation(format!("{}: {}", keys_file.display(), e)))?;

    Ok(paths)
}

/// One empty-valued row per canonical path
pub fn build_candidates(paths: &[String], request: &AddLanguageRequest) -> Vec<NewTranslation> {
    paths
        .iter()
        .map(|path| NewTranslation {
            key: path.clone(),
            lang: request.code.clone(),
            name: request.name.clone(),
            value: String::new(),
        })
        .collect()
}

/// Write `{dir}/{language name}.json`, replacing any previous file
pub async fn write_flat_file(
    translations_dir: &Path,
    language_name: &str,
    candidates: &[NewTranslation],
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(translations_dir).await?;
    let file_path = translations_dir.join(format!("{}.json", language_name));

    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    candidates.serialize(&mut serializer)?;

    tokio::fs::write(&file_path, buf).await?;
    Ok(file_path)
}

/// Provision a language from the canonical key set.
///
/// The flat file always receives the full candidate set. The store only
/// receives keys the language does not have yet. The two writes are not
/// linked: a failed insert leaves the file in place.
pub async fn add_language(
    db: &Database,
    paths: &ProvisionPaths,
    request: &AddLanguageRequest,
) -> Result<AddLanguageReport> {
    let canonical = load_canonical_keys(&paths.keys_file).await?;
    let candidates = build_candidates(&canonical, request);

    let file_path =
        write_flat_file(&paths.translations_dir, &request.name, &candidates).await?;
    info!(
        "Wrote {} keys for '{}' to {}",
        candidates.len(),
        request.code,
        file_path.display()
    );

    let existing: HashSet<String> = db.keys_for_lang(&request.code).await?.into_iter().collect();
    let written = candidates.len();
    let new_rows: Vec<NewTranslation> = candidates
        .into_iter()
        .filter(|candidate| !existing.contains(&candidate.key))
        .collect();

    let inserted = if new_rows.is_empty() {
        info!("No new keys added for '{}'", request.code);
        0
    } else {
        let inserted = db.insert_many(&new_rows).await?;
        info!("✓ Inserted {} new keys for '{}'", inserted, request.code);
        inserted
    };

    Ok(AddLanguageReport {
        file_path,
        written,
        inserted,
    })
}

/// Accepts `y` / `yes` in any case
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Delete every row of a language once the operator has confirmed
pub async fn delete_language(db: &Database, code: &str, confirmed: bool) -> Result<u64> {
    if !confirmed {
        return Err(Error::UserAborted("Deletion cancelled".to_string()));
    }

    let code = code.trim();
    let removed = db.delete_by_lang(code).await?;
    info!("Deleted {} translations for '{}'", removed, code);
    Ok(removed)
}
