use crate::config::{self, CONTENT_TYPE, DICT_EXTENSION};
use crate::dict::{DictFile, DictSink};
use crate::docset::DocSet;
use crate::keys;
use crate::links;
use crate::models::ConvertOptions;
use crate::stats::ConvertStats;
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rustc_hash::FxHashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Drives conversion of downloaded documentation sets into dictionary files.
pub struct Converter {
    docdir: PathBuf,
    outdir: PathBuf,
    opts: ConvertOptions,
}

impl Converter {
    pub fn new(docdir: PathBuf, outdir: PathBuf, opts: ConvertOptions) -> Self {
        Self {
            docdir,
            outdir,
            opts,
        }
    }

    /// Converts the named slug, or every subdirectory of the doc root when no
    /// slug is given. In batch mode a failing set is logged and skipped; the
    /// remaining sets are still processed.
    pub fn generate(&self, slug: Option<&str>) -> Result<()> {
        match slug {
            Some(slug) => {
                let slugdir = self.docdir.join(slug);
                if !slugdir.is_dir() {
                    bail!(
                        "Documentation directory does not exist: {}",
                        slugdir.display()
                    );
                }
                self.convert_dir(&slugdir, slug)
            }
            None => {
                let mut converted = 0usize;
                let dir_iter = fs::read_dir(&self.docdir).with_context(|| {
                    format!("Failed to read doc directory: {}", self.docdir.display())
                })?;
                for entry in dir_iter {
                    let entry = entry?;
                    if !entry.file_type()?.is_dir() {
                        continue;
                    }
                    let slug = entry.file_name().to_string_lossy().into_owned();
                    match self.convert_dir(&entry.path(), &slug) {
                        Ok(()) => converted += 1,
                        Err(e) => {
                            error!(slug = %slug, error = %e, "Conversion failed, continuing with next set");
                        }
                    }
                }
                if converted == 0 {
                    warn!(
                        docdir = %self.docdir.display(),
                        "No documentation sets were converted"
                    );
                }
                Ok(())
            }
        }
    }

    fn convert_dir(&self, slugdir: &Path, slug: &str) -> Result<()> {
        println!(
            "Processing documentation for {} from {}",
            slug,
            slugdir.display()
        );
        let start = Instant::now();

        let set = DocSet::load(slugdir)?;
        let out_path = self.outdir.join(format!("{slug}.{DICT_EXTENSION}"));
        let mut dict = DictFile::create(&out_path)?;
        let mut stats = ConvertStats::new();

        convert_set(&set, &self.opts, &mut dict, &mut stats)?;
        dict.finish()?;

        println!(
            "Generated {} from {} entries in {:.2} seconds.",
            out_path.display(),
            stats.entries(),
            start.elapsed().as_secs_f64()
        );
        info!(
            slug = slug,
            entries = stats.entries(),
            keys = stats.keys(),
            rewritten = stats.rewritten(),
            collisions = stats.collisions(),
            "Conversion complete"
        );
        Ok(())
    }
}

/// Writes every entry of `set` into `sink`, then the summary tags.
///
/// Entries are processed independently, in document order, one `add` per
/// entry; tokenization only widens an entry's key set, never splits the
/// write. Canonical-key collisions are logged and written anyway; the later
/// write detectably overwrites the earlier one in the container index.
pub fn convert_set(
    set: &DocSet,
    opts: &ConvertOptions,
    sink: &mut dyn DictSink,
    stats: &mut ConvertStats,
) -> Result<()> {
    let pb = make_progress_bar(set.len() as u64);
    let mut seen: FxHashSet<String> = FxHashSet::default();

    for (raw_key, html) in &set.entries {
        let (content, had_links) = links::rewrite_links(html, raw_key, opts);
        if had_links {
            stats.inc_rewritten();
        }

        let canonical = keys::normalize(raw_key, opts);
        if !seen.insert(canonical.clone()) {
            warn!(
                key = %canonical,
                raw = %raw_key,
                "Canonical key collision, later entry overwrites earlier one"
            );
            stats.inc_collisions();
        }

        let key_set = if opts.tokenize {
            keys::tokenize(&canonical, opts)
        } else {
            vec![canonical]
        };
        sink.add(&key_set, content.as_bytes(), CONTENT_TYPE)?;
        stats.inc_entries();
        stats.add_keys(key_set.len() as u64);
        pb.inc(1);
    }
    pb.finish_and_clear();

    sink.tag("label", &set.meta.name)?;
    if let Some(home) = set.meta.links.as_ref().and_then(|links| links.home.as_deref()) {
        sink.tag("source", home)?;
    }
    if let Some(release) = set.meta.release.as_deref() {
        sink.tag("version", release)?;
    }
    sink.tag("copyright", &config::copyright_notice(&set.meta.name))?;
    Ok(())
}

fn make_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} entries")
            .unwrap()
            .progress_chars("=> "),
    );
    pb
}
