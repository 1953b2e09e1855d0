//! Data model: ideas, pages, visibility, principals and settings
//!
//! Wire and on-disk field names are camelCase to stay compatible with the
//! existing `metadata.json` documents and the browser front end.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::error::{Error, Result, ValidationError};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    /// Ordinary user
    Hacker,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Hacker => write!(f, "hacker"),
        }
    }
}

/// Authenticated identity attached to a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Access-control mode of an idea
///
/// Stored as `"public"`, `"private"` or a JSON array of usernames.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "VisibilityRepr", into = "VisibilityRepr")]
pub enum Visibility {
    /// Any viewer
    #[default]
    Public,
    /// Author only
    Private,
    /// Listed users only
    RestrictedTo(BTreeSet<String>),
}

impl Visibility {
    pub fn restricted_to<I, S>(users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Visibility::RestrictedTo(users.into_iter().map(Into::into).collect())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum VisibilityRepr {
    Mode(String),
    Users(Vec<String>),
}

impl TryFrom<VisibilityRepr> for Visibility {
    type Error = ValidationError;

    fn try_from(repr: VisibilityRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            VisibilityRepr::Mode(mode) => match mode.as_str() {
                "public" => Ok(Visibility::Public),
                "private" => Ok(Visibility::Private),
                _ => Err(ValidationError::BadVisibility),
            },
            VisibilityRepr::Users(users) => Ok(Visibility::RestrictedTo(users.into_iter().collect())),
        }
    }
}

impl From<Visibility> for VisibilityRepr {
    fn from(visibility: Visibility) -> Self {
        match visibility {
            Visibility::Public => VisibilityRepr::Mode("public".to_string()),
            Visibility::Private => VisibilityRepr::Mode("private".to_string()),
            Visibility::RestrictedTo(users) => VisibilityRepr::Users(users.into_iter().collect()),
        }
    }
}

/// Kind of idea a write-up describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IdeaType {
    #[default]
    #[serde(rename = "Hackathon idea")]
    Hackathon,
    #[serde(rename = "Project idea")]
    Project,
    #[serde(rename = "Resume project idea")]
    ResumeProject,
}

impl IdeaType {
    pub fn label(self) -> &'static str {
        match self {
            IdeaType::Hackathon => "Hackathon idea",
            IdeaType::Project => "Project idea",
            IdeaType::ResumeProject => "Resume project idea",
        }
    }

    /// Parse a form value; unknown labels are rejected
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Hackathon idea" => Some(IdeaType::Hackathon),
            "Project idea" => Some(IdeaType::Project),
            "Resume project idea" => Some(IdeaType::ResumeProject),
            _ => None,
        }
    }
}

/// One HTML fragment belonging to an idea
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub title: String,
    pub content: String,
    pub filename: String,
}

impl Page {
    pub fn page_ref(&self) -> PageRef {
        PageRef {
            title: self.title.clone(),
            filename: self.filename.clone(),
        }
    }
}

/// Page descriptor as listed in `metadata.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRef {
    pub title: String,
    pub filename: String,
}

/// A shareable write-up: metadata plus an ordered, non-empty page list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: String,
    pub name: String,
    pub author: String,
    pub description: String,
    pub visibility: Visibility,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub idea_type: IdeaType,
    pub pages: Vec<Page>,
}

impl Idea {
    pub fn page(&self, filename: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.filename == filename)
    }

    pub fn has_page(&self, filename: &str) -> bool {
        self.page(filename).is_some()
    }

    /// Append a page at the end of the order
    pub fn push_page(&mut self, page: Page) -> Result<()> {
        if self.has_page(&page.filename) {
            return Err(Error::Conflict(format!(
                "page {} already exists in idea {}",
                page.filename, self.id
            )));
        }
        self.pages.push(page);
        Ok(())
    }

    /// Remove a page by filename, refusing to empty the idea
    pub fn remove_page(&mut self, filename: &str) -> Result<Page> {
        if self.pages.len() <= 1 {
            return Err(Error::LastPage);
        }

        let index = self
            .pages
            .iter()
            .position(|p| p.filename == filename)
            .ok_or_else(|| Error::NotFound(format!("page {}", filename)))?;

        Ok(self.pages.remove(index))
    }

    /// Rearrange pages into the given filename order
    ///
    /// `order` must name every current page exactly once. The idea is left
    /// untouched when it does not.
    pub fn reorder_pages(&mut self, order: &[String]) -> Result<()> {
        if order.len() != self.pages.len() {
            return Err(ValidationError::PageOrder(format!(
                "lists {} filenames, idea has {} pages",
                order.len(),
                self.pages.len()
            ))
            .into());
        }

        let mut seen = HashSet::with_capacity(order.len());
        for filename in order {
            if !seen.insert(filename.as_str()) || !self.has_page(filename) {
                return Err(ValidationError::PageOrder(format!(
                    "unknown or duplicate filename {}",
                    filename
                ))
                .into());
            }
        }

        let mut remaining = std::mem::take(&mut self.pages);
        for filename in order {
            if let Some(index) = remaining.iter().position(|p| &p.filename == filename) {
                self.pages.push(remaining.swap_remove(index));
            }
        }
        Ok(())
    }

    pub fn page_refs(&self) -> Vec<PageRef> {
        self.pages.iter().map(Page::page_ref).collect()
    }
}

/// Application settings singleton
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub require_admin_approval: bool,
}

impl Settings {
    /// Whether a new idea from `author` starts approved
    pub fn initial_approval(&self, author: &Principal) -> bool {
        author.is_admin() || !self.require_admin_approval
    }

    /// Whether a new idea from `author` will wait for review
    pub fn requires_approval(&self, author: &Principal) -> bool {
        !self.initial_approval(author)
    }
}
