//! Authoring guide for archive uploads

use axum::{extract::State, http::header, response::IntoResponse};
use ideahub_common::Error;
use tracing::warn;

use crate::error::ApiResult;
use crate::AppState;

/// Guide served when no `context_file` is configured
pub const BUILTIN_GUIDE: &str = include_str!("../../assets/ideas-context.md");

/// GET /api/ideas/context-file
pub async fn context_file(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let guide = match &state.context_file {
        Some(path) => tokio::fs::read_to_string(path).await.map_err(|e| {
            warn!(path = %path.display(), "Failed to read context file: {}", e);
            Error::Storage(e)
        })?,
        None => BUILTIN_GUIDE.to_string(),
    };

    Ok(([(header::CONTENT_TYPE, "text/markdown; charset=utf-8")], guide))
}
