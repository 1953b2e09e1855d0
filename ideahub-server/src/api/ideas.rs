//! Idea endpoints
//!
//! Listing and single fetches are open to anonymous viewers and filtered by
//! visibility; every mutation needs a session.

use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, State},
    Json,
};
use ideahub_common::{CreatedIdea, Idea, IdeaType, PageRef};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::session::{AuthPrincipal, MaybePrincipal};
use crate::AppState;

/// Upload or generation result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub message: String,
    #[serde(flatten)]
    pub created: CreatedIdea,
}

#[derive(Debug, Serialize)]
pub struct IdeaResponse {
    pub message: String,
    pub idea: Idea,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub approved: bool,
}

#[derive(Debug, Deserialize)]
pub struct AddPageRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct AddPageResponse {
    pub message: String,
    pub page: PageRef,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub filenames: Vec<String>,
}

/// GET /api/ideas
pub async fn list_ideas(
    State(state): State<AppState>,
    MaybePrincipal(viewer): MaybePrincipal,
) -> ApiResult<Json<Vec<Idea>>> {
    let ideas = state.service.list_ideas(viewer.as_ref()).await?;
    Ok(Json(ideas))
}

/// GET /api/ideas/:id
pub async fn get_idea(
    State(state): State<AppState>,
    MaybePrincipal(viewer): MaybePrincipal,
    Path(id): Path<String>,
) -> ApiResult<Json<Idea>> {
    let idea = state.service.get_idea(&id, viewer.as_ref()).await?;
    Ok(Json(idea))
}

/// POST /api/ideas/upload
///
/// Multipart form with the archive in the `zip` field.
pub async fn upload_idea(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    mut multipart: Multipart,
) -> ApiResult<Json<CreatedResponse>> {
    let mut archive = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("zip") {
            archive = Some(field.bytes().await?);
        }
    }

    let archive = archive.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;
    let created = state.service.import_idea(&archive, &principal).await?;

    Ok(Json(CreatedResponse {
        message: "Idea uploaded successfully".to_string(),
        created,
    }))
}

/// POST /api/ideas/generate
///
/// Multipart form: `description` text or a `file` whose contents replace
/// it, plus an optional `ideaType` label.
pub async fn generate_idea(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    mut multipart: Multipart,
) -> ApiResult<Json<CreatedResponse>> {
    let mut description = String::new();
    let mut file_text = None;
    let mut idea_type = IdeaType::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("description") => description = field.text().await?,
            Some("file") => {
                let bytes = field.bytes().await?;
                let text = String::from_utf8(bytes.to_vec()).map_err(|_| {
                    ApiError::BadRequest("Uploaded description file is not UTF-8 text".to_string())
                })?;
                file_text = Some(text);
            }
            Some("ideaType") => {
                let label = field.text().await?;
                idea_type = IdeaType::from_label(label.trim()).ok_or_else(|| {
                    ApiError::BadRequest(format!("Unknown idea type {:?}", label))
                })?;
            }
            _ => {}
        }
    }

    let brief = file_text.unwrap_or(description);
    let created = state
        .service
        .generate_idea(&brief, idea_type, &principal)
        .await?;

    Ok(Json(CreatedResponse {
        message: "Idea generated successfully".to_string(),
        created,
    }))
}

/// PATCH /api/ideas/:id
pub async fn update_idea(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<String>,
    body: Result<Json<ApprovalRequest>, JsonRejection>,
) -> ApiResult<Json<IdeaResponse>> {
    let Json(request) = body?;
    let idea = state
        .service
        .set_approval(&id, request.approved, &principal)
        .await?;

    Ok(Json(IdeaResponse {
        message: "Idea updated successfully".to_string(),
        idea,
    }))
}

/// DELETE /api/ideas/:id
pub async fn delete_idea(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.service.delete_idea(&id, &principal).await?;
    Ok(Json(json!({ "message": "Idea deleted successfully" })))
}

/// POST /api/ideas/:id/pages
pub async fn add_page(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<String>,
    body: Result<Json<AddPageRequest>, JsonRejection>,
) -> ApiResult<Json<AddPageResponse>> {
    let Json(request) = body?;
    let page = state
        .service
        .add_page(&id, &request.title, &request.description, &principal)
        .await?;

    Ok(Json(AddPageResponse {
        message: "Page added successfully".to_string(),
        page,
    }))
}

/// PUT /api/ideas/:id/pages/order
pub async fn reorder_pages(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path(id): Path<String>,
    body: Result<Json<ReorderRequest>, JsonRejection>,
) -> ApiResult<Json<IdeaResponse>> {
    let Json(request) = body?;
    let idea = state
        .service
        .reorder_pages(&id, &request.filenames, &principal)
        .await?;

    Ok(Json(IdeaResponse {
        message: "Pages reordered successfully".to_string(),
        idea,
    }))
}

/// DELETE /api/ideas/:id/pages/:filename
pub async fn delete_page(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Path((id, filename)): Path<(String, String)>,
) -> ApiResult<Json<Value>> {
    state.service.delete_page(&id, &filename, &principal).await?;
    Ok(Json(json!({ "message": "Page deleted successfully" })))
}
