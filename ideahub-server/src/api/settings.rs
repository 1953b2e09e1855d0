//! Application settings endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use ideahub_common::Settings;
use serde::Serialize;

use crate::error::ApiResult;
use crate::session::AuthPrincipal;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub message: String,
    pub settings: Settings,
}

/// GET /api/ideas/settings/app
pub async fn get_settings(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
) -> Json<Settings> {
    Json(state.service.get_settings(&principal).await)
}

/// PUT /api/ideas/settings/app (admin only)
pub async fn put_settings(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    body: Result<Json<Settings>, JsonRejection>,
) -> ApiResult<Json<SettingsResponse>> {
    let Json(settings) = body?;
    let settings = state.service.put_settings(settings, &principal).await?;

    Ok(Json(SettingsResponse {
        message: "Settings updated successfully".to_string(),
        settings,
    }))
}
