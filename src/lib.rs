//! docs2dict: convert DevDocs documentation sets into offline dictionaries
//!
//! The tool works against documentation snapshots downloaded from DevDocs:
//! each set (one "slug") is a metadata document plus a flat map from lookup
//! key to HTML fragment. Conversion turns that map into a compressed
//! dictionary file, one entry per topic:
//!
//! 1. **Load** -- Read `meta.json` and `db.json` for a slug into a typed,
//!    order-preserving [`docset::DocSet`]
//! 2. **Rewrite** -- Walk each entry's hyperlinks and rewrite their targets
//!    for the dictionary's flat key namespace (external-link flagging,
//!    compatibility rewriting, or relative-to-absolute resolution)
//! 3. **Key** -- Normalize the entry key under the active separator regime
//!    and, when tokenization is on, derive secondary lookup keys from its
//!    significant segments
//! 4. **Write** -- Hand each (key set, content) pair to the dictionary
//!    writer, then attach the label/source/version/copyright tags
//!
//! Everything runs strictly single-threaded; each documentation set is
//! converted to completion before the next one starts, and a failing set in
//! batch mode never halts the rest.
//!
//! # Key Modules
//!
//! - [`docset`] -- On-disk documentation-set loading
//! - [`keys`] -- Key normalization and tokenization
//! - [`links`] -- Hyperlink rewriting inside entry HTML
//! - [`convert`] -- Per-entry pipeline and batch driver
//! - [`dict`] -- Dictionary container: write interface and file format
//! - [`fetch`] -- DevDocs catalog listing and raw document download
//! - [`models`] -- Typed metadata records and conversion options
//! - [`stats`] -- Per-run counters for the summary printout
//! - [`config`] -- Separators, content type, endpoints

pub mod config;
pub mod convert;
pub mod dict;
pub mod docset;
pub mod fetch;
pub mod keys;
pub mod links;
pub mod models;
pub mod stats;
