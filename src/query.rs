//! Read-only operations behind the HTTP endpoints.
//!
//! Every function takes the store handle explicitly and holds no state
//! between calls.

use crate::db::{Database, Language};
use crate::error::{Error, Result};
use crate::keypath::{self, TranslationTree};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

pub const LANGUAGE_NOT_FOUND: &str = "Language not found";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
}

/// Translations of one key across languages: `lang -> value`.
pub type LanguageValues = BTreeMap<String, String>;

/// Every key's translations, numbered `1..=n` in first-seen row order.
///
/// The ordinals are recomputed on every call and shift whenever rows are
/// added or removed. They are not identifiers; do not persist them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedTranslations {
    groups: Vec<(String, LanguageValues)>,
}

impl GroupedTranslations {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// `(ordinal, key, values)` in ordinal order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str, &LanguageValues)> {
        self.groups
            .iter()
            .enumerate()
            .map(|(idx, (key, values))| (idx + 1, key.as_str(), values))
    }
}

impl Serialize for GroupedTranslations {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (ordinal, _, values) in self.iter() {
            map.serialize_entry(&ordinal.to_string(), values)?;
        }
        map.end()
    }
}

/// Nested translation tree for one language
pub async fn get_translations(db: &Database, lang: &str) -> Result<TranslationTree> {
    let rows = db.query_by_lang(lang).await?;
    if rows.is_empty() {
        return Err(Error::NotFound(LANGUAGE_NOT_FOUND.to_string()));
    }

    keypath::nest(rows.into_iter().map(|row| (row.key, row.value)))
        .map_err(|e| Error::Internal(e.to_string()))
}

pub async fn list_languages(db: &Database) -> Result<Vec<Language>> {
    db.query_distinct_langs().await
}

pub async fn list_all_grouped(db: &Database) -> Result<GroupedTranslations> {
    let rows = db.query_all().await?;

    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, LanguageValues)> = Vec::new();
    for row in rows {
        let idx = match positions.get(&row.key) {
            Some(&idx) => idx,
            None => {
                positions.insert(row.key.clone(), groups.len());
                groups.push((row.key, LanguageValues::new()));
                groups.len() - 1
            }
        };
        groups[idx].1.insert(row.lang, row.value);
    }

    Ok(GroupedTranslations { groups })
}

pub fn health() -> HealthStatus {
    HealthStatus { status: "OK" }
}
