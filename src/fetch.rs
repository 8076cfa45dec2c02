use crate::config::{DEVDOCS_DOCUMENTS_URL, DEVDOCS_URL, ENTRIES_FILE, META_FILE};
use crate::models::CatalogDoc;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::Path;
use tracing::info;

/// Fetches the service catalog (`docs.json`).
pub fn list_catalog() -> Result<Vec<CatalogDoc>> {
    let url = format!("{DEVDOCS_URL}/docs.json");
    let docs: Vec<CatalogDoc> = ureq::get(&url)
        .call()
        .with_context(|| format!("Failed to fetch catalog from {url}"))?
        .into_json()
        .context("Failed to parse catalog listing")?;
    info!(count = docs.len(), "Fetched documentation catalog");
    Ok(docs)
}

/// Prints the catalog as an aligned TITLE/SLUG/VERSION/RELEASE table, slug
/// highlighted since it is what the other commands take.
pub fn print_catalog(docs: &[CatalogDoc]) {
    println!(
        "{:<30} {:<30} {:<10} {:<10}",
        "TITLE", "SLUG", "VERSION", "RELEASE"
    );
    for doc in docs {
        println!(
            "{:<30} \x1b[92m{:<30}\x1b[0m {:<10} {:<10}",
            doc.name,
            doc.slug,
            doc.version.as_deref().unwrap_or(""),
            doc.release.as_deref().unwrap_or("")
        );
    }
}

/// Downloads the raw `meta.json` and `db.json` documents for one slug into
/// `docdir/<slug>/`. No retries; a failed request aborts the download.
pub fn download_set(docdir: &Path, slug: &str) -> Result<()> {
    let target = docdir.join(slug);
    fs::create_dir_all(&target)
        .with_context(|| format!("Failed to create directory: {}", target.display()))?;

    for name in [META_FILE, ENTRIES_FILE] {
        let url = format!("{DEVDOCS_DOCUMENTS_URL}/{slug}/{name}");
        let response = ureq::get(&url).call().with_context(|| {
            format!("Download failed for {url}. Is the --slug argument correct?")
        })?;

        let path = target.join(name);
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        io::copy(&mut response.into_reader(), &mut BufWriter::new(file))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(url = %url, path = %path.display(), "Downloaded document");
    }

    println!(
        "Downloaded documentation for {} to: {}",
        slug,
        target.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // network access is out of test scope; the table formatter is the only
    // pure piece here
    #[test]
    fn print_catalog_handles_missing_fields() {
        let docs = vec![
            CatalogDoc {
                name: "JavaScript".to_string(),
                slug: "javascript".to_string(),
                version: None,
                release: Some("2024".to_string()),
            },
            CatalogDoc {
                name: "Lua".to_string(),
                slug: "lua~5.4".to_string(),
                version: Some("5.4".to_string()),
                release: None,
            },
        ];
        print_catalog(&docs);
    }
}
