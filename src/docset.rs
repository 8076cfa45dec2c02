use crate::config::{ENTRIES_FILE, META_FILE};
use crate::models::DocMeta;
use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// One documentation set loaded from disk: the metadata document plus the
/// key-to-HTML entry map, in document order.
///
/// Read once per conversion run and never mutated. Raw keys are unique within
/// a set (enforced by the JSON object they come from).
#[derive(Debug)]
pub struct DocSet {
    pub meta: DocMeta,
    pub entries: Vec<(String, String)>,
}

impl DocSet {
    /// Reads `meta.json` and `db.json` from a slug directory. Any missing or
    /// unparsable document is fatal for the whole set.
    pub fn load(dir: &Path) -> Result<Self> {
        let meta_path = dir.join(META_FILE);
        let raw = fs::read(&meta_path)
            .with_context(|| format!("Failed to read {}", meta_path.display()))?;
        let meta: DocMeta = serde_json::from_slice(&raw)
            .with_context(|| format!("Failed to parse {}", meta_path.display()))?;

        let db_path = dir.join(ENTRIES_FILE);
        let raw =
            fs::read(&db_path).with_context(|| format!("Failed to read {}", db_path.display()))?;
        let map: serde_json::Map<String, Value> = serde_json::from_slice(&raw)
            .with_context(|| format!("Failed to parse {}", db_path.display()))?;

        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in map {
            match value {
                Value::String(html) => entries.push((key, html)),
                _ => bail!(
                    "Entry {key:?} in {} is not an HTML string",
                    db_path.display()
                ),
            }
        }

        Ok(Self { meta, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
