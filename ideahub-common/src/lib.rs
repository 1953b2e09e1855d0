//! # ideahub Common Library
//!
//! Core of the idea-sharing service, shared by the HTTP server:
//! - Data model (ideas, ordered pages, visibility, principals, settings)
//! - Idea repository trait and its directory-per-idea backend
//! - Visibility authorization
//! - Zip import validation
//! - Text-generation contract and output validation
//! - Transport-agnostic service operations
//! - Configuration loading

pub mod config;
pub mod credentials;
pub mod error;
pub mod generator;
pub mod html;
pub mod import;
pub mod models;
pub mod repository;
pub mod seed;
pub mod service;
pub mod settings;
pub mod slug;
pub mod visibility;

pub use error::{Error, Result, ValidationError};
pub use models::{Idea, IdeaType, Page, PageRef, Principal, Role, Settings, Visibility};
pub use repository::{FsIdeaRepository, IdeaRepository};
pub use service::{CreatedIdea, IdeaService};
