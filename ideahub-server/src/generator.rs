//! OpenAI chat-completions client
//!
//! Implements [`ContentGenerator`] against an OpenAI-compatible
//! `/chat/completions` endpoint. Returns raw model text; parsing and
//! validation happen in `ideahub_common::generator`.

use async_trait::async_trait;
use ideahub_common::config::GeneratorConfig;
use ideahub_common::generator::{ContentGenerator, PageRequest};
use ideahub_common::{Error, IdeaType, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

const USER_AGENT: &str = concat!("ideahub/", env!("CARGO_PKG_VERSION"));

const IDEA_TEMPERATURE: f32 = 0.8;
const IDEA_MAX_TOKENS: u32 = 3000;
const PAGE_TEMPERATURE: f32 = 0.7;
const PAGE_MAX_TOKENS: u32 = 2000;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// What the prompts call an idea of each type
fn subject(idea_type: IdeaType) -> &'static str {
    match idea_type {
        IdeaType::Hackathon => "hackathon project",
        IdeaType::Project => "software project",
        IdeaType::ResumeProject => "resume portfolio project",
    }
}

fn idea_prompt(brief: &str, idea_type: IdeaType) -> String {
    let subject = subject(idea_type);
    format!(
        r#"Turn the following description into a complete {subject} write-up with:

1. A catchy, professional name
2. A 1-2 sentence description
3. 2-3 detailed pages of well-structured HTML content

DESCRIPTION:
{brief}

Reply with raw JSON only, in exactly this shape:
{{
  "name": "Project Name",
  "description": "Short description",
  "pages": [
    {{"title": "Overview", "filename": "overview.html", "content": "<h1>Overview</h1>\n<p>...</p>"}},
    {{"title": "Implementation", "filename": "implementation.html", "content": "<h1>Implementation</h1>\n<p>...</p>"}}
  ]
}}

Rules:
- Every page has a title, a lowercase-with-hyphens .html filename and content
- Every page's content is an HTML fragment that starts with an <h1> tag
- Cover features, technical stack and implementation steps"#
    )
}

fn page_prompt(request: &PageRequest<'_>) -> String {
    format!(
        "Write a page for the project \"{}\". Project description: \"{}\".\n\n\
         Page title: \"{}\"\n\n\
         The page should cover: {}",
        request.idea_name, request.idea_description, request.title, request.brief
    )
}

const PAGE_SYSTEM_PROMPT: &str = "You write detailed project pages as HTML fragments. \
Use only h1, h2, h3, p, ul, ol, li, strong and em tags. \
Never emit <html>, <head> or <body>. Start with an <h1> holding the page title.";

/// Chat-completions backed generator
pub struct OpenAiGenerator {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(config: &GeneratorConfig, api_key: String) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key,
            model: config.model.clone(),
        })
    }

    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature,
            max_tokens,
        };

        debug!(model = %self.model, "Calling chat completions");

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Upstream("generation timed out".to_string())
                } else {
                    Error::Upstream(format!("generator request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Generator returned an error: {}", error_text);
            return Err(Error::Upstream(format!("generator returned HTTP {}", status.as_u16())));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("unreadable generator response: {}", e)))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| Error::Upstream("generator returned no content".to_string()))?;

        info!(model = %self.model, chars = content.len(), "Generation complete");
        Ok(content)
    }
}

#[async_trait]
impl ContentGenerator for OpenAiGenerator {
    async fn generate_idea(&self, brief: &str, idea_type: IdeaType) -> Result<String> {
        let system = format!(
            "You generate {} ideas. Always respond with valid JSON only, no markdown formatting.",
            subject(idea_type)
        );
        self.complete(
            vec![
                ChatMessage::system(system),
                ChatMessage::user(idea_prompt(brief, idea_type)),
            ],
            IDEA_TEMPERATURE,
            IDEA_MAX_TOKENS,
        )
        .await
    }

    async fn generate_page(&self, request: PageRequest<'_>) -> Result<String> {
        self.complete(
            vec![
                ChatMessage::system(PAGE_SYSTEM_PROMPT),
                ChatMessage::user(page_prompt(&request)),
            ],
            PAGE_TEMPERATURE,
            PAGE_MAX_TOKENS,
        )
        .await
    }
}
