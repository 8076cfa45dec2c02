/// Token separator used when normalizing and splitting keys
pub const TOKEN_SEP: char = '-';

/// Marker between a token and its canonical key in secondary lookup keys;
/// never appears in a canonical key, so secondary keys cannot collide
pub const LEAD_TOKEN_SEP: char = '~';

/// Directory separator for compatibility mode (must not be `/`)
pub const COMPAT_DIR_SEP: char = ':';

/// Content type recorded for every dictionary entry
pub const CONTENT_TYPE: &str = "text/html;charset=utf-8";

/// Metadata document inside a downloaded slug directory
pub const META_FILE: &str = "meta.json";

/// Entry-map document inside a downloaded slug directory
pub const ENTRIES_FILE: &str = "db.json";

/// Extension of generated dictionary files
pub const DICT_EXTENSION: &str = "dict";

/// Catalog endpoint of the documentation service
pub const DEVDOCS_URL: &str = "https://devdocs.io";

/// Raw document endpoint of the documentation service
pub const DEVDOCS_DOCUMENTS_URL: &str = "https://documents.devdocs.io";

/// Copyright tag attached to every generated dictionary
pub fn copyright_notice(doc_name: &str) -> String {
    format!(
        "Copyright by the original authors of the {doc_name} documentation. \
         Thanks to DevDocs (https://www.devdocs.io) for providing the documentation."
    )
}
