use anyhow::{bail, Context, Result};
use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;
use bzip2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::mem;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Container format version, bumped on any layout change
const FORMAT_VERSION: u32 = 1;

const MAGIC: &[u8; 8] = b"DOCDICT\0";

/// Write interface the entry pipeline needs from a dictionary container.
///
/// One `add` call per entry; tags are attached once, after every entry has
/// been written.
pub trait DictSink {
    /// Adds one content blob, indexed under every key in `keys`.
    fn add(&mut self, keys: &[String], content: &[u8], content_type: &str) -> Result<()>;

    /// Attaches a named metadata string to the whole dictionary.
    fn tag(&mut self, name: &str, value: &str) -> Result<()>;
}

#[derive(Serialize, Deserialize)]
struct IndexEntry {
    keys: Vec<String>,
    offset: u64,
    len: u64,
    content_type: String,
}

#[derive(Serialize, Deserialize)]
struct DictIndex {
    entries: Vec<IndexEntry>,
    tags: Vec<(String, String)>,
}

/// Incrementally written dictionary file.
///
/// Layout: magic + version header, one bzip2-compressed block per entry, a
/// bincode index (key sets, block offsets, tags), and a trailing 8-byte
/// little-endian offset of the index. The file is only valid after
/// [`DictFile::finish`]; dropping an unfinished writer leaves a truncated
/// file behind and logs a warning.
pub struct DictFile {
    writer: BufWriter<File>,
    path: PathBuf,
    offset: u64,
    entries: Vec<IndexEntry>,
    tags: Vec<(String, String)>,
    finished: bool,
}

impl DictFile {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create dictionary file: {}", path.display()))?;
        let mut writer = BufWriter::with_capacity(256 * 1024, file);
        writer.write_all(MAGIC)?;
        writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
        Ok(Self {
            writer,
            path: path.to_path_buf(),
            offset: (MAGIC.len() + mem::size_of::<u32>()) as u64,
            entries: Vec::new(),
            tags: Vec::new(),
            finished: false,
        })
    }

    /// Writes the index and trailing offset, making the file readable.
    pub fn finish(mut self) -> Result<()> {
        let index = DictIndex {
            entries: mem::take(&mut self.entries),
            tags: mem::take(&mut self.tags),
        };
        let index_offset = self.offset;
        bincode::serialize_into(&mut self.writer, &index)
            .with_context(|| format!("Failed to write index: {}", self.path.display()))?;
        self.writer.write_all(&index_offset.to_le_bytes())?;
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush dictionary file: {}", self.path.display()))?;
        self.finished = true;
        Ok(())
    }
}

impl DictSink for DictFile {
    fn add(&mut self, keys: &[String], content: &[u8], content_type: &str) -> Result<()> {
        if keys.is_empty() {
            bail!("Dictionary entry must carry at least one key");
        }
        let block = compress(content)?;
        self.writer.write_all(&block)?;
        self.entries.push(IndexEntry {
            keys: keys.to_vec(),
            offset: self.offset,
            len: block.len() as u64,
            content_type: content_type.to_string(),
        });
        self.offset += block.len() as u64;
        Ok(())
    }

    fn tag(&mut self, name: &str, value: &str) -> Result<()> {
        self.tags.push((name.to_string(), value.to_string()));
        Ok(())
    }
}

impl Drop for DictFile {
    fn drop(&mut self) {
        if !self.finished {
            warn!(
                path = %self.path.display(),
                "Dictionary file dropped without finish, output is incomplete"
            );
        }
    }
}

fn compress(content: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = BzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(content)?;
    Ok(encoder.finish()?)
}

fn decompress(block: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    BzDecoder::new(block)
        .read_to_end(&mut out)
        .context("Failed to decompress dictionary block")?;
    Ok(out)
}

/// Read-back side of the container, for verification and lookups.
pub struct DictReader {
    data: Vec<u8>,
    index: DictIndex,
}

impl DictReader {
    pub fn open(path: &Path) -> Result<Self> {
        let data = fs::read(path)
            .with_context(|| format!("Failed to read dictionary file: {}", path.display()))?;
        let header_len = MAGIC.len() + mem::size_of::<u32>();
        if data.len() < header_len + mem::size_of::<u64>() || &data[..MAGIC.len()] != MAGIC {
            bail!("Not a dictionary file: {}", path.display());
        }
        let version = u32::from_le_bytes(data[MAGIC.len()..header_len].try_into()?);
        if version != FORMAT_VERSION {
            bail!(
                "Unsupported dictionary format version {} in {}",
                version,
                path.display()
            );
        }
        let tail = data.len() - mem::size_of::<u64>();
        let index_offset = u64::from_le_bytes(data[tail..].try_into()?) as usize;
        if index_offset < header_len || index_offset > tail {
            bail!("Corrupt dictionary index in {}", path.display());
        }
        let index: DictIndex = bincode::deserialize(&data[index_offset..tail])
            .with_context(|| format!("Corrupt dictionary index in {}", path.display()))?;
        Ok(Self { data, index })
    }

    pub fn entry_count(&self) -> usize {
        self.index.entries.len()
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.index
            .tags
            .iter()
            .find(|(tag, _)| tag == name)
            .map(|(_, value)| value.as_str())
    }

    /// All keys in the index, in write order, canonical key first per entry.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.index
            .entries
            .iter()
            .flat_map(|entry| entry.keys.iter().map(String::as_str))
    }

    /// Decompressed content for `key`. With overwritten (colliding) keys the
    /// later write wins.
    pub fn lookup(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let found = self
            .index
            .entries
            .iter()
            .rev()
            .find(|entry| entry.keys.iter().any(|k| k == key));
        match found {
            Some(entry) => {
                let start = entry.offset as usize;
                let end = start + entry.len as usize;
                if end > self.data.len() {
                    bail!("Dictionary block for {key:?} is out of bounds");
                }
                Ok(Some(decompress(&self.data[start..end])?))
            }
            None => Ok(None),
        }
    }
}
