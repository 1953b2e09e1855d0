//! ideahub-server library - HTTP front end for the idea-sharing service
//!
//! Thin axum layer over `ideahub_common::IdeaService`: cookie sessions,
//! multipart uploads and error-to-status mapping live here.

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::Router;
use ideahub_common::IdeaService;
use std::path::PathBuf;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod generator;
pub mod session;

use session::SessionStore;

/// Largest accepted request body (zip uploads)
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: IdeaService,
    pub sessions: SessionStore,
    /// Authoring guide on disk; the built-in guide when `None`
    pub context_file: Option<PathBuf>,
}

impl AppState {
    /// Create new application state
    pub fn new(service: IdeaService, context_file: Option<PathBuf>) -> Self {
        Self {
            service,
            sessions: SessionStore::new(),
            context_file,
        }
    }
}

/// CORS for a browser front end served from another origin. Session cookies
/// require credentials, so origins and headers are mirrored instead of `*`.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_credentials(true)
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post, put};

    let auth = Router::new()
        .route("/api/auth/login", post(api::login))
        .route("/api/auth/logout", post(api::logout))
        .route("/api/auth/me", get(api::me));

    let ideas = Router::new()
        .route("/api/ideas", get(api::list_ideas))
        .route("/api/ideas/context-file", get(api::context_file))
        .route(
            "/api/ideas/settings/app",
            get(api::get_settings).put(api::put_settings),
        )
        .route("/api/ideas/upload", post(api::upload_idea))
        .route("/api/ideas/generate", post(api::generate_idea))
        .route(
            "/api/ideas/:id",
            get(api::get_idea)
                .patch(api::update_idea)
                .delete(api::delete_idea),
        )
        .route("/api/ideas/:id/pages", post(api::add_page))
        .route("/api/ideas/:id/pages/order", put(api::reorder_pages))
        .route("/api/ideas/:id/pages/:filename", delete(api::delete_page));

    Router::new()
        .merge(auth)
        .merge(ideas)
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}
