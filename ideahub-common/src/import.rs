//! Zip archive import
//!
//! Expected layout:
//!
//! ```text
//! <root>/metadata.json
//! <root>/pages/<filename>   (one per entry in metadata.pages)
//! ```
//!
//! The whole archive is validated in memory and turned into an [`Idea`];
//! nothing is written here, so a rejected archive never leaves a partial idea
//! behind.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::io::{Cursor, Read};
use tracing::debug;

use crate::error::{Result, ValidationError};
use crate::html::has_h1;
use crate::models::{Idea, IdeaType, Page, Principal, Settings, Visibility};
use crate::slug::{folder_id, is_safe_segment};

/// Largest uncompressed size accepted for a single archive entry
pub const MAX_ENTRY_BYTES: u64 = 10 * 1024 * 1024;

/// Folders some archivers add next to the real content
const IGNORED_ROOTS: &[&str] = &["__MACOSX"];

/// Archive contents keyed by normalized path
struct ArchiveContents {
    root: String,
    files: HashMap<String, Vec<u8>>,
    dirs: HashSet<String>,
}

impl ArchiveContents {
    fn file(&self, relative: &str) -> Option<&[u8]> {
        self.files
            .get(&format!("{}/{}", self.root, relative))
            .map(Vec::as_slice)
    }

    /// A folder exists if it has an explicit entry or anything inside it
    fn has_dir(&self, relative: &str) -> bool {
        let prefix = format!("{}/{}/", self.root, relative);
        self.dirs.contains(&prefix) || self.files.keys().any(|k| k.starts_with(&prefix))
    }
}

/// Validate an uploaded archive and build the idea it describes.
///
/// The id comes from the archive's root folder name, never from
/// `metadata.name`. The author is always `uploader`, whatever the metadata
/// claims, and approval follows `settings`.
pub fn parse_archive(
    bytes: &[u8],
    uploader: &Principal,
    settings: &Settings,
    now: DateTime<Utc>,
) -> Result<Idea> {
    let archive = read_archive(bytes)?;

    let metadata_raw = archive
        .file("metadata.json")
        .ok_or_else(|| ValidationError::MissingFile("metadata.json".to_string()))?;
    let metadata: Value = serde_json::from_slice(metadata_raw)
        .map_err(|e| ValidationError::InvalidMetadata(e.to_string()))?;

    let name = required_str(&metadata, "name")?;
    // Checked for presence only; the uploader is the author
    required_str(&metadata, "author")?;
    let description = required_str(&metadata, "description")?;
    let visibility = parse_visibility(&metadata)?;
    let idea_type = parse_idea_type(&metadata)?;
    let page_refs = parse_page_refs(&metadata)?;

    if !archive.has_dir("pages") {
        return Err(ValidationError::MissingFile("pages/".to_string()).into());
    }

    let mut pages = Vec::with_capacity(page_refs.len());
    for (title, filename) in page_refs {
        let raw = archive
            .file(&format!("pages/{}", filename))
            .ok_or_else(|| ValidationError::MissingFile(filename.clone()))?;

        let content = String::from_utf8(raw.to_vec()).map_err(|_| {
            ValidationError::InvalidArchive(format!("page {} is not valid UTF-8", filename))
        })?;

        if !has_h1(&content) {
            return Err(ValidationError::MissingHeading(filename).into());
        }

        pages.push(Page {
            title,
            content,
            filename,
        });
    }

    let id = folder_id(&archive.root);
    if !id.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidArchive(format!(
            "root folder {:?} does not yield a usable id",
            archive.root
        ))
        .into());
    }

    debug!(idea_id = %id, pages = pages.len(), "Archive validated");

    Ok(Idea {
        id,
        name,
        author: uploader.username.clone(),
        description,
        visibility,
        approved: settings.initial_approval(uploader),
        created_at: now,
        idea_type,
        pages,
    })
}

fn read_archive(bytes: &[u8]) -> Result<ArchiveContents> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ValidationError::InvalidArchive(e.to_string()))?;

    let mut files = HashMap::new();
    let mut dirs = HashSet::new();
    let mut roots = HashSet::new();

    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .map_err(|e| ValidationError::InvalidArchive(e.to_string()))?;

        let name = entry.name().trim_start_matches('/').to_string();
        if name.is_empty() {
            continue;
        }

        let root = name.split('/').next().unwrap_or_default().to_string();
        if IGNORED_ROOTS.contains(&root.as_str()) {
            continue;
        }
        if !name.contains('/') {
            return Err(ValidationError::InvalidArchive(format!(
                "{} is not inside a top-level folder",
                name
            ))
            .into());
        }
        roots.insert(root);

        if entry.is_dir() {
            dirs.insert(name);
            continue;
        }

        if entry.size() > MAX_ENTRY_BYTES {
            return Err(ValidationError::InvalidArchive(format!("{} is too large", name)).into());
        }

        let mut contents = Vec::new();
        entry
            .take(MAX_ENTRY_BYTES + 1)
            .read_to_end(&mut contents)
            .map_err(|e| ValidationError::InvalidArchive(format!("{}: {}", name, e)))?;
        if contents.len() as u64 > MAX_ENTRY_BYTES {
            return Err(ValidationError::InvalidArchive(format!("{} is too large", name)).into());
        }

        files.insert(name, contents);
    }

    if roots.len() != 1 {
        return Err(ValidationError::InvalidArchive(format!(
            "expected a single top-level folder, found {}",
            roots.len()
        ))
        .into());
    }

    let root = roots.into_iter().next().unwrap_or_default();
    Ok(ArchiveContents { root, files, dirs })
}

fn required_str(metadata: &Value, field: &str) -> Result<String> {
    match metadata.get(field).and_then(Value::as_str) {
        Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
        _ => Err(ValidationError::MissingField(field.to_string()).into()),
    }
}

fn parse_visibility(metadata: &Value) -> Result<Visibility> {
    let value = metadata
        .get("visibility")
        .filter(|v| !v.is_null())
        .ok_or_else(|| ValidationError::MissingField("visibility".to_string()))?;

    match value {
        Value::String(_) | Value::Array(_) => serde_json::from_value(value.clone())
            .map_err(|_| ValidationError::BadVisibility.into()),
        _ => Err(ValidationError::BadVisibility.into()),
    }
}

fn parse_idea_type(metadata: &Value) -> Result<IdeaType> {
    match metadata.get("ideaType") {
        None | Some(Value::Null) => Ok(IdeaType::default()),
        Some(Value::String(label)) => IdeaType::from_label(label).ok_or_else(|| {
            ValidationError::InvalidMetadata(format!("unknown ideaType {:?}", label)).into()
        }),
        Some(_) => Err(ValidationError::MissingField("ideaType".to_string()).into()),
    }
}

/// `(title, filename)` pairs in listed order
fn parse_page_refs(metadata: &Value) -> Result<Vec<(String, String)>> {
    let entries = metadata
        .get("pages")
        .and_then(Value::as_array)
        .ok_or_else(|| ValidationError::MissingField("pages".to_string()))?;

    if entries.is_empty() {
        return Err(ValidationError::InvalidMetadata("pages must list at least one page".to_string()).into());
    }

    let mut seen = HashSet::new();
    let mut refs = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let title = required_str(entry, "title")
            .map_err(|_| ValidationError::MissingField(format!("pages[{}].title", i)))?;
        let filename = required_str(entry, "filename")
            .map_err(|_| ValidationError::MissingField(format!("pages[{}].filename", i)))?;

        if !is_safe_segment(&filename) {
            return Err(ValidationError::InvalidMetadata(format!("unusable page filename {:?}", filename)).into());
        }
        if !seen.insert(filename.clone()) {
            return Err(ValidationError::InvalidMetadata(format!("page {} listed twice", filename)).into());
        }

        refs.push((title, filename));
    }

    Ok(refs)
}
