//! Key-path codec: dotted translation keys <-> nested trees.
//!
//! `navbar.home = "Home"` becomes `{"navbar": {"home": "Home"}}`. A key can
//! never be both a value and a group in the same language; such collisions
//! are reported instead of one write silently replacing the other.

use serde::Serialize;
use serde_json::Value;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

pub const SEPARATOR: &str = ".";

/// One level of a nested translation tree.
pub type TranslationTree = BTreeMap<String, TranslationNode>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TranslationNode {
    Leaf(String),
    Branch(TranslationTree),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyPathError {
    #[error("Invalid key '{0}': empty path segment")]
    InvalidKey(String),

    #[error("Key path '{0}' is used both as a value and as a group")]
    Conflict(String),

    #[error("Duplicate key '{0}'")]
    Duplicate(String),
}

/// Split a dotted key into its segments, rejecting empty segments.
pub fn split_key(key: &str) -> Result<Vec<&str>, KeyPathError> {
    let segments: Vec<&str> = key.split(SEPARATOR).collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(KeyPathError::InvalidKey(key.to_string()));
    }
    Ok(segments)
}

/// Build a nested tree from `(dotted key, value)` pairs.
pub fn nest<K, V, I>(entries: I) -> Result<TranslationTree, KeyPathError>
where
    K: AsRef<str>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    let mut root = TranslationTree::new();

    for (key, value) in entries {
        let key = key.as_ref();
        let segments = split_key(key)?;
        let Some((leaf, parents)) = segments.split_last() else {
            return Err(KeyPathError::InvalidKey(key.to_string()));
        };

        let mut current = &mut root;
        for (depth, segment) in parents.iter().enumerate() {
            let node = current
                .entry((*segment).to_string())
                .or_insert_with(|| TranslationNode::Branch(TranslationTree::new()));
            current = match node {
                TranslationNode::Branch(children) => children,
                TranslationNode::Leaf(_) => {
                    let path = segments[..=depth].join(SEPARATOR);
                    return Err(KeyPathError::Conflict(path));
                }
            };
        }

        match current.entry((*leaf).to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(TranslationNode::Leaf(value.into()));
            }
            Entry::Occupied(slot) => {
                return Err(match slot.get() {
                    TranslationNode::Leaf(_) => KeyPathError::Duplicate(key.to_string()),
                    TranslationNode::Branch(_) => KeyPathError::Conflict(key.to_string()),
                });
            }
        }
    }

    Ok(root)
}

/// Inverse of [`nest`]: every leaf back to its dotted key, in tree order.
pub fn flatten(tree: &TranslationTree) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten_into(tree, None, &mut out);
    out
}

fn flatten_into(tree: &TranslationTree, prefix: Option<&str>, out: &mut Vec<(String, String)>) {
    for (segment, node) in tree {
        let path = match prefix {
            Some(prefix) => format!("{prefix}{SEPARATOR}{segment}"),
            None => segment.clone(),
        };
        match node {
            TranslationNode::Leaf(value) => out.push((path, value.clone())),
            TranslationNode::Branch(children) => flatten_into(children, Some(path.as_str()), out),
        }
    }
}

/// Gather dotted paths from a canonical key file.
///
/// Only string values matter; the names they sit under are discarded.
/// Nested objects and arrays are walked, so both flat and grouped key
/// files are accepted. Order follows the document.
pub fn collect_paths(document: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_into(document, &mut paths);
    paths
}

fn collect_into(value: &Value, paths: &mut Vec<String>) {
    match value {
        Value::String(path) => paths.push(path.clone()),
        Value::Object(map) => map.values().for_each(|v| collect_into(v, paths)),
        Value::Array(items) => items.iter().for_each(|v| collect_into(v, paths)),
        _ => {}
    }
}

/// Validate a set of keys belonging to one language.
///
/// Fails when a key is malformed, or when one key is a dotted prefix of
/// another (`"a"` next to `"a.b"`), which [`nest`] could not represent.
pub fn check_key_paths<'a, I>(keys: I) -> Result<(), KeyPathError>
where
    I: IntoIterator<Item = &'a str>,
{
    let keys: Vec<&str> = keys.into_iter().collect();
    for key in &keys {
        split_key(key)?;
    }

    let known: HashSet<&str> = keys.iter().copied().collect();
    for key in &keys {
        for (idx, _) in key.match_indices(SEPARATOR) {
            let prefix = &key[..idx];
            if known.contains(prefix) {
                return Err(KeyPathError::Conflict(prefix.to_string()));
            }
        }
    }

    Ok(())
}
