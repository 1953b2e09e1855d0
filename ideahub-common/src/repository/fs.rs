//! Directory-per-idea storage
//!
//! ```text
//! <root>/<idea-id>/metadata.json
//! <root>/<idea-id>/pages/<filename>
//! ```
//!
//! No in-memory cache: every read rescans disk.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::IdeaRepository;
use crate::error::{Error, Result, ValidationError};
use crate::models::{Idea, IdeaType, Page, PageRef, Visibility};
use crate::slug::is_safe_segment;

const METADATA_FILE: &str = "metadata.json";
const PAGES_DIR: &str = "pages";

/// On-disk `metadata.json` document
///
/// Older or hand-edited documents may lack `description`, `visibility`,
/// `approved`, `createdAt` or `ideaType`, or carry `null` or unrecognised
/// values there; those load with defaults instead of hiding the idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaMetadata {
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub author: String,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::visibility")]
    pub visibility: Visibility,
    #[serde(default = "default_approved", deserialize_with = "lenient::approved")]
    pub approved: bool,
    /// RFC 3339; anything else loads as the current time
    #[serde(
        default,
        deserialize_with = "lenient::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient::idea_type")]
    pub idea_type: IdeaType,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub pages: Vec<PageRef>,
}

fn default_approved() -> bool {
    true
}

impl From<&Idea> for IdeaMetadata {
    fn from(idea: &Idea) -> Self {
        Self {
            name: idea.name.clone(),
            author: idea.author.clone(),
            description: idea.description.clone(),
            visibility: idea.visibility.clone(),
            approved: idea.approved,
            created_at: Some(idea.created_at.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            idea_type: idea.idea_type,
            pages: idea.page_refs(),
        }
    }
}

mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use tracing::warn;

    use crate::models::{IdeaType, Visibility};

    /// `null` reads as the type's default
    pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    /// `null` and `""` are public; unrecognised modes are private
    pub fn visibility<'de, D>(deserializer: D) -> Result<Visibility, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match Option::<Value>::deserialize(deserializer)? {
            None => return Ok(Visibility::Public),
            Some(Value::String(mode)) if mode.is_empty() => return Ok(Visibility::Public),
            Some(value) => value,
        };

        match serde_json::from_value::<Visibility>(value.clone()) {
            Ok(visibility) => Ok(visibility),
            Err(_) => {
                warn!(visibility = %value, "Unrecognised visibility, loading as private");
                Ok(Visibility::Private)
            }
        }
    }

    /// An explicit `null` or a non-boolean flag is unapproved
    pub fn approved<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            Some(Value::Bool(approved)) => Ok(approved),
            None => Ok(false),
            Some(other) => {
                warn!(approved = %other, "Non-boolean approval flag, loading as unapproved");
                Ok(false)
            }
        }
    }

    pub fn idea_type<'de, D>(deserializer: D) -> Result<IdeaType, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(value) = Option::<Value>::deserialize(deserializer)? else {
            return Ok(IdeaType::default());
        };
        Ok(serde_json::from_value(value.clone()).unwrap_or_else(|_| {
            warn!(idea_type = %value, "Unknown idea type, loading as default");
            IdeaType::default()
        }))
    }

    /// Non-string timestamps read as absent
    pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(raw)) => Ok(Some(raw)),
            _ => Ok(None),
        }
    }
}

/// Filesystem-backed [`IdeaRepository`]
#[derive(Debug, Clone)]
pub struct FsIdeaRepository {
    root: PathBuf,
}

impl FsIdeaRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the repository root if it does not exist yet
    pub async fn ensure_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    fn idea_dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    fn page_path(&self, id: &str, filename: &str) -> PathBuf {
        self.idea_dir(id).join(PAGES_DIR).join(filename)
    }

    /// Load one idea folder. `Ok(None)` when it has no metadata document.
    async fn load_idea(&self, id: &str) -> Result<Option<Idea>> {
        let idea_dir = self.idea_dir(id);
        let raw = match tokio::fs::read_to_string(idea_dir.join(METADATA_FILE)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let metadata: IdeaMetadata = serde_json::from_str(&raw)
            .map_err(|e| Error::corrupt_document(&format!("metadata for idea {}", id), e))?;

        let mut pages = Vec::with_capacity(metadata.pages.len());
        for page_ref in &metadata.pages {
            if !is_safe_segment(&page_ref.filename) {
                warn!(idea_id = %id, filename = %page_ref.filename, "Skipping page with unsafe filename");
                continue;
            }

            match tokio::fs::read_to_string(self.page_path(id, &page_ref.filename)).await {
                Ok(content) => pages.push(Page {
                    title: page_ref.title.clone(),
                    content,
                    filename: page_ref.filename.clone(),
                }),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(idea_id = %id, filename = %page_ref.filename, "Page file missing, skipping");
                }
                Err(e) => return Err(e.into()),
            }
        }

        let created_at = match metadata.created_at.as_deref() {
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(created_at) => created_at.with_timezone(&Utc),
                Err(e) => {
                    warn!(idea_id = %id, created_at = %raw, "Unparsable createdAt, using current time: {}", e);
                    Utc::now()
                }
            },
            None => Utc::now(),
        };

        Ok(Some(Idea {
            id: id.to_string(),
            name: metadata.name,
            author: metadata.author,
            description: metadata.description,
            visibility: metadata.visibility,
            approved: metadata.approved,
            created_at,
            idea_type: metadata.idea_type,
            pages,
        }))
    }
}

#[async_trait]
impl IdeaRepository for FsIdeaRepository {
    async fn list_all(&self) -> Result<Vec<Idea>> {
        self.ensure_root().await?;

        let mut ideas = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }

            let Some(id) = entry.file_name().to_str().map(str::to_owned) else {
                warn!(path = %entry.path().display(), "Skipping idea folder with non UTF-8 name");
                continue;
            };

            match self.load_idea(&id).await {
                Ok(Some(idea)) => ideas.push(idea),
                Ok(None) => debug!(idea_id = %id, "Folder has no metadata.json, skipping"),
                Err(e) => warn!(idea_id = %id, "Error loading idea, skipping: {}", e),
            }
        }

        ideas.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(ideas)
    }

    async fn get(&self, id: &str) -> Result<Option<Idea>> {
        if !is_safe_segment(id) {
            return Ok(None);
        }
        self.load_idea(id).await
    }

    async fn save(&self, idea: &Idea) -> Result<()> {
        if !is_safe_segment(&idea.id) {
            return Err(ValidationError::InvalidMetadata(format!("unusable idea id {:?}", idea.id)).into());
        }
        if idea.pages.is_empty() {
            warn!(idea_id = %idea.id, "Refusing to save idea without pages");
            return Err(ValidationError::InvalidMetadata(format!("idea {} has no pages", idea.id)).into());
        }
        if let Some(page) = idea.pages.iter().find(|p| !is_safe_segment(&p.filename)) {
            return Err(ValidationError::InvalidMetadata(format!(
                "unusable page filename {:?}",
                page.filename
            ))
            .into());
        }

        let idea_dir = self.idea_dir(&idea.id);
        tokio::fs::create_dir_all(idea_dir.join(PAGES_DIR)).await?;

        let metadata = serde_json::to_string_pretty(&IdeaMetadata::from(idea))
            .map_err(|e| Error::corrupt_document("idea metadata", e))?;
        tokio::fs::write(idea_dir.join(METADATA_FILE), metadata).await?;

        for page in &idea.pages {
            tokio::fs::write(self.page_path(&idea.id, &page.filename), &page.content).await?;
        }

        debug!(idea_id = %idea.id, pages = idea.pages.len(), "Idea saved");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if !is_safe_segment(id) {
            return Err(Error::NotFound(format!("idea {}", id)));
        }

        match tokio::fs::remove_dir_all(self.idea_dir(id)).await {
            Ok(()) => {
                info!(idea_id = %id, "Idea deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_page_artifact(&self, id: &str, filename: &str) -> Result<()> {
        if !is_safe_segment(id) || !is_safe_segment(filename) {
            return Err(Error::NotFound(format!("page {}/{}", id, filename)));
        }
        tokio::fs::remove_file(self.page_path(id, filename)).await?;
        Ok(())
    }
}
