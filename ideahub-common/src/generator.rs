//! Text-generation boundary
//!
//! A [`ContentGenerator`] is an untrusted oracle: it returns raw model text.
//! Everything it produces is parsed and re-validated here (structure, `<h1>`
//! presence, filename safety and uniqueness) before anything reaches the
//! repository. Unusable output is an [`Error::Upstream`] the user may retry.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;

use crate::error::{Error, Result, ValidationError};
use crate::html::has_h1;
use crate::models::{IdeaType, Page};
use crate::slug::{is_safe_segment, page_filename};

/// Longest brief accepted, in characters
pub const MAX_BRIEF_CHARS: usize = 5000;

/// Inputs for generating one extra page of an existing idea
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    pub idea_name: &'a str,
    pub idea_description: &'a str,
    pub title: &'a str,
    pub brief: &'a str,
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Raw model text expected to hold an idea JSON document
    async fn generate_idea(&self, brief: &str, idea_type: IdeaType) -> Result<String>;

    /// Raw HTML fragment for one page
    async fn generate_page(&self, request: PageRequest<'_>) -> Result<String>;
}

/// Generator used when no backend is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledGenerator;

#[async_trait]
impl ContentGenerator for DisabledGenerator {
    async fn generate_idea(&self, _brief: &str, _idea_type: IdeaType) -> Result<String> {
        Err(Error::Upstream("generator not configured".to_string()))
    }

    async fn generate_page(&self, _request: PageRequest<'_>) -> Result<String> {
        Err(Error::Upstream("generator not configured".to_string()))
    }
}

/// Reject empty or oversized briefs before any generator call
pub fn check_brief(brief: &str) -> Result<&str> {
    let trimmed = brief.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyBrief.into());
    }

    let actual = brief.chars().count();
    if actual > MAX_BRIEF_CHARS {
        return Err(ValidationError::BriefTooLong {
            max: MAX_BRIEF_CHARS,
            actual,
        }
        .into());
    }

    Ok(trimmed)
}

#[derive(Debug, Deserialize)]
struct RawIdea {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    pages: Vec<RawPage>,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    #[serde(default)]
    title: String,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    content: String,
}

/// Validated generator output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedIdea {
    pub name: String,
    pub description: String,
    pub pages: Vec<Page>,
}

/// Parse and validate raw model output into an idea payload.
///
/// Markdown code fences around the JSON are tolerated.
pub fn parse_generated_idea(raw: &str) -> Result<GeneratedIdea> {
    let json = strip_code_fences(raw);
    let idea: RawIdea = serde_json::from_str(json)
        .map_err(|e| Error::Upstream(format!("generator returned invalid JSON: {}", e)))?;

    if idea.name.trim().is_empty() || idea.description.trim().is_empty() || idea.pages.is_empty() {
        return Err(Error::Upstream("generator returned an incomplete idea structure".to_string()));
    }

    let mut seen = HashSet::new();
    let mut pages = Vec::with_capacity(idea.pages.len());
    for page in idea.pages {
        if page.title.trim().is_empty() || page.content.trim().is_empty() {
            return Err(Error::Upstream("generator returned an invalid page structure".to_string()));
        }

        let filename = match page.filename {
            Some(f) if is_safe_segment(&f) && f.ends_with(".html") => f,
            _ => page_filename(&page.title),
        };
        if !seen.insert(filename.clone()) {
            return Err(Error::Upstream(format!("generator returned duplicate page {}", filename)));
        }

        if !has_h1(&page.content) {
            return Err(ValidationError::MissingHeading(filename).into());
        }

        pages.push(Page {
            title: page.title.trim().to_string(),
            content: page.content,
            filename,
        });
    }

    Ok(GeneratedIdea {
        name: idea.name.trim().to_string(),
        description: idea.description.trim().to_string(),
        pages,
    })
}

/// Validate a generated page fragment
pub fn validate_generated_page(content: &str, filename: &str) -> Result<()> {
    if !has_h1(content) {
        return Err(ValidationError::MissingHeading(filename.to_string()).into());
    }
    Ok(())
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (e.g. "json") on the opening fence line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}
