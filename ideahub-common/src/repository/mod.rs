//! Idea repository
//!
//! The repository is the only writer of idea and page state. Backends
//! implement the storage primitives (`list_all`, `get`, `save`, `delete`,
//! `remove_page_artifact`); page-level edits are built on top of them as
//! load-modify-save cycles with no cross-request locking, so concurrent edits
//! to the same idea are last-writer-wins.

mod fs;

pub use fs::{FsIdeaRepository, IdeaMetadata};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::models::{Idea, Page};

#[async_trait]
pub trait IdeaRepository: Send + Sync {
    /// Every stored idea, pages in their persisted order
    async fn list_all(&self) -> Result<Vec<Idea>>;

    /// One idea by id, `None` when absent
    async fn get(&self, id: &str) -> Result<Option<Idea>>;

    /// Idempotent upsert of metadata and page contents.
    ///
    /// Never removes artifacts of pages that are no longer listed.
    async fn save(&self, idea: &Idea) -> Result<()>;

    /// Remove the idea and everything stored under it
    async fn delete(&self, id: &str) -> Result<()>;

    /// Remove the stored content of a page that has left the page list
    async fn remove_page_artifact(&self, id: &str, filename: &str) -> Result<()>;

    /// Like [`get`](Self::get) but absent ideas are [`Error::NotFound`]
    async fn require(&self, id: &str) -> Result<Idea> {
        self.get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("idea {}", id)))
    }

    async fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.get(id).await?.is_some())
    }

    /// Append a page to the end of the idea's page order and persist
    async fn add_page(&self, id: &str, page: Page) -> Result<Idea> {
        let mut idea = self.require(id).await?;
        idea.push_page(page)?;
        self.save(&idea).await?;
        Ok(idea)
    }

    /// Remove a page and persist.
    ///
    /// Fails with [`Error::LastPage`] when the idea has a single page. The
    /// metadata is the source of truth for which pages exist, so failing to
    /// remove the page artifact afterwards is only logged.
    async fn delete_page(&self, id: &str, filename: &str) -> Result<Idea> {
        let mut idea = self.require(id).await?;
        let removed = idea.remove_page(filename)?;
        self.save(&idea).await?;

        if let Err(e) = self.remove_page_artifact(id, &removed.filename).await {
            warn!(idea_id = %id, filename = %removed.filename, "Failed to delete page file: {}", e);
        }

        info!(idea_id = %id, filename = %removed.filename, "Page deleted");
        Ok(idea)
    }

    /// Rearrange pages into `order` (a permutation of current filenames) and persist
    async fn reorder_pages(&self, id: &str, order: &[String]) -> Result<Idea> {
        let mut idea = self.require(id).await?;
        idea.reorder_pages(order)?;
        self.save(&idea).await?;
        Ok(idea)
    }
}
