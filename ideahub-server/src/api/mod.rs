//! HTTP API handlers for ideahub-server

pub mod auth;
pub mod context;
pub mod health;
pub mod ideas;
pub mod settings;

pub use auth::{login, logout, me};
pub use context::context_file;
pub use health::health_routes;
pub use ideas::{
    add_page, delete_idea, delete_page, generate_idea, get_idea, list_ideas, reorder_pages,
    update_idea, upload_idea,
};
pub use settings::{get_settings, put_settings};
