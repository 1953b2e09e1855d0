//! Login, logout and session lookup

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use ideahub_common::Principal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::error::ApiResult;
use crate::session::{clear_session_cookie, session_cookie, session_token, AuthPrincipal};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: Principal,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = body?;
    let principal = state
        .service
        .authenticate(&request.username, &request.password)?;

    let token = state.sessions.create(principal.clone()).await;

    Ok((
        AppendHeaders([(header::SET_COOKIE, session_cookie(&token))]),
        Json(UserResponse { user: principal }),
    ))
}

/// POST /api/auth/logout
///
/// Succeeds with or without a live session.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = session_token(&headers) {
        if let Some(principal) = state.sessions.remove(&token).await {
            info!(username = %principal.username, "Logged out");
        }
    }

    (
        AppendHeaders([(header::SET_COOKIE, clear_session_cookie())]),
        Json(json!({ "message": "Logged out successfully" })),
    )
}

/// GET /api/auth/me
pub async fn me(AuthPrincipal(user): AuthPrincipal) -> Json<UserResponse> {
    Json(UserResponse { user })
}
