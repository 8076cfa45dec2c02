use rustc_hash::FxHashSet;
use serde::Deserialize;

/// Metadata document (`meta.json`) of one documentation set.
///
/// Only `name` is guaranteed by the service; everything else is optional and
/// absence is a first-class state, not a runtime probe.
#[derive(Debug, Clone, Deserialize)]
pub struct DocMeta {
    pub name: String,
    #[serde(default)]
    pub links: Option<DocLinks>,
    #[serde(default)]
    pub release: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocLinks {
    #[serde(default)]
    pub home: Option<String>,
}

/// One row of the devdocs.io catalog (`docs.json`)
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogDoc {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub release: Option<String>,
}

/// Conversion configuration, immutable for the duration of a run.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Derive secondary lookup keys from key segments
    pub tokenize: bool,
    /// Separator and link-rewrite rules of older dictionary readers
    pub compat: bool,
    /// Prefix for the visible text of external links; empty disables the rule
    pub external_prefix: String,
    /// Lowercased tokens excluded from secondary-key derivation
    pub filtered: FxHashSet<String>,
}

impl ConvertOptions {
    /// Builds options from the CLI surface; `filter_csv` is a comma separated
    /// token list compared case-insensitively.
    pub fn new(tokenize: bool, compat: bool, external_prefix: String, filter_csv: &str) -> Self {
        let filtered = filter_csv
            .split(',')
            .map(|token| token.trim().to_lowercase())
            .filter(|token| !token.is_empty())
            .collect();
        Self {
            tokenize,
            compat,
            external_prefix,
            filtered,
        }
    }
}
