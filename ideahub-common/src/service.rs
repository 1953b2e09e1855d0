//! Idea service: the request/response operations behind the HTTP API
//!
//! Every operation loads fresh state from the repository, applies the
//! visibility and ownership rules, and persists through the repository.
//! Sessions live in the web layer; operations receive the principal.

use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::credentials::CredentialVerifier;
use crate::error::{Error, Result, ValidationError};
use crate::generator::{
    check_brief, parse_generated_idea, validate_generated_page, ContentGenerator, PageRequest,
};
use crate::import::parse_archive;
use crate::models::{Idea, IdeaType, Page, PageRef, Principal, Settings, Visibility};
use crate::repository::IdeaRepository;
use crate::settings::SettingsStore;
use crate::slug::{page_filename, slugify};
use crate::visibility::{can_delete, can_edit_pages, principal_can_view};

/// Result of an upload or generation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedIdea {
    pub idea: Idea,
    pub requires_approval: bool,
}

#[derive(Clone)]
pub struct IdeaService {
    repo: Arc<dyn IdeaRepository>,
    settings: SettingsStore,
    credentials: Arc<dyn CredentialVerifier>,
    generator: Arc<dyn ContentGenerator>,
}

impl IdeaService {
    pub fn new(
        repo: Arc<dyn IdeaRepository>,
        settings: SettingsStore,
        credentials: Arc<dyn CredentialVerifier>,
        generator: Arc<dyn ContentGenerator>,
    ) -> Self {
        Self {
            repo,
            settings,
            credentials,
            generator,
        }
    }

    pub fn repository(&self) -> &Arc<dyn IdeaRepository> {
        &self.repo
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Result<Principal> {
        match self.credentials.verify(username, password) {
            Some(principal) => {
                info!(username = %principal.username, role = %principal.role, "Login succeeded");
                Ok(principal)
            }
            None => {
                warn!(username = %username, "Login rejected");
                Err(Error::Auth("Invalid credentials".to_string()))
            }
        }
    }

    /// Ideas the viewer may see
    pub async fn list_ideas(&self, viewer: Option<&Principal>) -> Result<Vec<Idea>> {
        let ideas = self.repo.list_all().await?;
        Ok(ideas
            .into_iter()
            .filter(|idea| principal_can_view(idea, viewer))
            .collect())
    }

    pub async fn get_idea(&self, id: &str, viewer: Option<&Principal>) -> Result<Idea> {
        let idea = self.repo.require(id).await?;
        if !principal_can_view(&idea, viewer) {
            return Err(Error::Forbidden(
                "You do not have permission to view this idea".to_string(),
            ));
        }
        Ok(idea)
    }

    /// Validate an uploaded archive and store the idea it describes.
    ///
    /// Re-importing over an existing idea is limited to its author or an
    /// admin and keeps the original author and creation time.
    pub async fn import_idea(&self, archive: &[u8], uploader: &Principal) -> Result<CreatedIdea> {
        let settings = self.settings.load().await;
        let mut idea = parse_archive(archive, uploader, &settings, Utc::now())?;

        let previous = self.repo.get(&idea.id).await?;
        if let Some(existing) = &previous {
            if !uploader.is_admin() && existing.author != uploader.username {
                return Err(Error::Forbidden(format!(
                    "idea {} belongs to another author",
                    existing.id
                )));
            }
            idea.author = existing.author.clone();
            idea.created_at = existing.created_at;
        }

        self.repo.save(&idea).await?;

        if let Some(existing) = previous {
            self.remove_stale_pages(&existing, &idea).await;
        }

        info!(
            idea_id = %idea.id,
            author = %idea.author,
            approved = idea.approved,
            pages = idea.pages.len(),
            "Idea imported"
        );

        Ok(CreatedIdea {
            requires_approval: settings.requires_approval(uploader),
            idea,
        })
    }

    /// Generate a new idea from a free-text brief
    pub async fn generate_idea(
        &self,
        brief: &str,
        idea_type: IdeaType,
        author: &Principal,
    ) -> Result<CreatedIdea> {
        let brief = check_brief(brief)?;
        let settings = self.settings.load().await;

        let raw = self.generator.generate_idea(brief, idea_type).await?;
        let generated = parse_generated_idea(&raw)?;

        let id = slugify(&generated.name);
        if id.is_empty() {
            return Err(Error::Upstream(format!(
                "generated name {:?} does not yield a usable id",
                generated.name
            )));
        }
        if self.repo.exists(&id).await? {
            return Err(Error::Conflict(
                "An idea with a similar name already exists. Please try a different description."
                    .to_string(),
            ));
        }

        let idea = Idea {
            id,
            name: generated.name,
            author: author.username.clone(),
            description: generated.description,
            visibility: Visibility::Public,
            approved: settings.initial_approval(author),
            created_at: Utc::now(),
            idea_type,
            pages: generated.pages,
        };
        self.repo.save(&idea).await?;

        info!(idea_id = %idea.id, author = %idea.author, idea_type = idea_type.label(), "Idea generated");

        Ok(CreatedIdea {
            requires_approval: settings.requires_approval(author),
            idea,
        })
    }

    pub async fn set_approval(&self, id: &str, approved: bool, principal: &Principal) -> Result<Idea> {
        if !principal.is_admin() {
            return Err(Error::Forbidden("Admin access required".to_string()));
        }

        let mut idea = self.repo.require(id).await?;
        if idea.approved != approved {
            idea.approved = approved;
            self.repo.save(&idea).await?;
            info!(idea_id = %id, approved, "Approval changed");
        }
        Ok(idea)
    }

    pub async fn delete_idea(&self, id: &str, principal: &Principal) -> Result<()> {
        let idea = self.repo.require(id).await?;
        if !can_delete(&idea, principal) {
            return Err(Error::Forbidden(
                "You do not have permission to delete this idea".to_string(),
            ));
        }
        self.repo.delete(id).await
    }

    /// Generate one more page for an idea and append it
    pub async fn add_page(
        &self,
        id: &str,
        title: &str,
        brief: &str,
        principal: &Principal,
    ) -> Result<PageRef> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingField("title".to_string()).into());
        }
        let brief = check_brief(brief)?;

        let idea = self.repo.require(id).await?;
        if !can_edit_pages(&idea, principal) {
            return Err(Error::Forbidden(
                "Only the author can add pages to this idea".to_string(),
            ));
        }

        let filename = page_filename(title);
        if idea.has_page(&filename) {
            return Err(Error::Conflict(format!("page {} already exists", filename)));
        }

        let content = self
            .generator
            .generate_page(PageRequest {
                idea_name: &idea.name,
                idea_description: &idea.description,
                title,
                brief,
            })
            .await?;
        validate_generated_page(&content, &filename)?;

        let page = Page {
            title: title.to_string(),
            content,
            filename,
        };
        let page_ref = page.page_ref();
        self.repo.add_page(id, page).await?;

        info!(idea_id = %id, filename = %page_ref.filename, "Page added");
        Ok(page_ref)
    }

    pub async fn delete_page(&self, id: &str, filename: &str, principal: &Principal) -> Result<()> {
        let idea = self.repo.require(id).await?;
        if !can_edit_pages(&idea, principal) {
            return Err(Error::Forbidden(
                "Only the author can delete pages from this idea".to_string(),
            ));
        }
        self.repo.delete_page(id, filename).await?;
        Ok(())
    }

    pub async fn reorder_pages(&self, id: &str, order: &[String], principal: &Principal) -> Result<Idea> {
        let idea = self.repo.require(id).await?;
        if !can_edit_pages(&idea, principal) {
            return Err(Error::Forbidden(
                "Only the author can reorder pages of this idea".to_string(),
            ));
        }
        self.repo.reorder_pages(id, order).await
    }

    pub async fn get_settings(&self, _principal: &Principal) -> Settings {
        self.settings.load().await
    }

    pub async fn put_settings(&self, settings: Settings, principal: &Principal) -> Result<Settings> {
        if !principal.is_admin() {
            return Err(Error::Forbidden("Admin access required".to_string()));
        }
        self.settings.save(&settings).await?;
        info!(require_admin_approval = settings.require_admin_approval, "Settings updated");
        Ok(settings)
    }

    async fn remove_stale_pages(&self, previous: &Idea, current: &Idea) {
        let kept: HashSet<&str> = current.pages.iter().map(|p| p.filename.as_str()).collect();
        for page in previous.pages.iter().filter(|p| !kept.contains(p.filename.as_str())) {
            if let Err(e) = self.repo.remove_page_artifact(&current.id, &page.filename).await {
                warn!(idea_id = %current.id, filename = %page.filename, "Failed to remove stale page file: {}", e);
            }
        }
    }
}
