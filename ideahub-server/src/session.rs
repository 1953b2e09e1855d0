//! Cookie sessions
//!
//! Opaque UUID v4 tokens map to principals in memory. Sessions expire after
//! [`SESSION_TTL`] and do not survive a restart.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use ideahub_common::Principal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

pub const SESSION_COOKIE: &str = "ideahub_session";

/// Lifetime of a session from login
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone)]
struct Session {
    principal: Principal,
    issued_at: Instant,
}

/// In-memory token → principal map
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    fn is_live(&self, session: &Session) -> bool {
        session.issued_at.elapsed() < self.ttl
    }

    /// Start a session and return its token. Expired sessions are pruned.
    pub async fn create(&self, principal: Principal) -> String {
        let token = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, session| self.is_live(session));
        if sessions.len() < before {
            debug!(pruned = before - sessions.len(), "Expired sessions pruned");
        }

        sessions.insert(
            token.clone(),
            Session {
                principal,
                issued_at: Instant::now(),
            },
        );
        token
    }

    /// Principal of a live session
    pub async fn get(&self, token: &str) -> Option<Principal> {
        self.sessions
            .read()
            .await
            .get(token)
            .filter(|session| self.is_live(session))
            .map(|session| session.principal.clone())
    }

    pub async fn remove(&self, token: &str) -> Option<Principal> {
        self.sessions
            .write()
            .await
            .remove(token)
            .map(|session| session.principal)
    }

    /// Stored sessions, including expired ones not yet pruned
    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// `Set-Cookie` value starting a session
pub fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE,
        token,
        SESSION_TTL.as_secs()
    )
}

/// `Set-Cookie` value expiring the session cookie
pub fn clear_session_cookie() -> String {
    format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE
    )
}

/// Session token from the request's `Cookie` headers
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Principal of the request, if any. Never rejects.
pub struct MaybePrincipal(pub Option<Principal>);

#[async_trait]
impl FromRequestParts<AppState> for MaybePrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let principal = match session_token(&parts.headers) {
            Some(token) => state.sessions.get(&token).await,
            None => None,
        };
        Ok(MaybePrincipal(principal))
    }
}

/// Principal of the request; rejects with 401 without a live session
pub struct AuthPrincipal(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for AuthPrincipal {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let MaybePrincipal(principal) = MaybePrincipal::from_request_parts(parts, state).await?;
        principal.map(AuthPrincipal).ok_or(ApiError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use ideahub_common::Role;

    #[tokio::test]
    async fn test_session_lifecycle() {
        let store = SessionStore::new();
        let token = store
            .create(Principal::new("hacker", Role::Hacker))
            .await;

        assert_eq!(store.get(&token).await.unwrap().username, "hacker");
        assert!(store.remove(&token).await.is_some());
        assert!(store.get(&token).await.is_none());
        assert_eq!(store.active_count().await, 0);
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let store = SessionStore::new();
        let a = store.create(Principal::new("admin", Role::Admin)).await;
        let b = store.create(Principal::new("admin", Role::Admin)).await;
        assert_ne!(a, b);
        assert_eq!(store.active_count().await, 2);
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected_and_pruned() {
        let store = SessionStore::with_ttl(Duration::ZERO);
        let stale = store.create(Principal::new("hacker", Role::Hacker)).await;
        assert!(store.get(&stale).await.is_none());

        let _fresh = store.create(Principal::new("admin", Role::Admin)).await;
        assert_eq!(store.active_count().await, 1);
    }

    #[tokio::test]
    async fn test_session_live_within_ttl() {
        let store = SessionStore::with_ttl(Duration::from_secs(60));
        let token = store.create(Principal::new("alice", Role::Hacker)).await;
        let _other = store.create(Principal::new("bob", Role::Hacker)).await;

        assert_eq!(store.get(&token).await.unwrap().username, "alice");
        assert_eq!(store.active_count().await, 2);
    }

    #[test]
    fn test_token_from_cookie_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; ideahub_session=abc-123; lang=en"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_missing_or_empty_cookie() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("ideahub_session="));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("tok");
        assert!(cookie.starts_with("ideahub_session=tok;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
