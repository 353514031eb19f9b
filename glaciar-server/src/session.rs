//! Login sessions
//!
//! Sessions live in memory and are lost on restart. A session is
//! identified by a random token carried in the `glaciar_session` cookie and
//! expires after a period of inactivity; every authenticated request
//! extends it.

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use glaciar_common::api::User;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "glaciar_session";

const MAX_TTL_MINUTES: u64 = 365 * 24 * 60;

/// An active login
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

/// Shared session table
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Session lifetime from minutes, as found in the config file
    ///
    /// Capped at one year.
    pub fn with_ttl_minutes(minutes: u64) -> Self {
        let minutes = minutes.min(MAX_TTL_MINUTES) as i64;
        Self::new(Duration::minutes(minutes))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Open a session for `user` and return its token
    pub async fn create(&self, user: User) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let session = Session {
            user,
            expires_at: Utc::now() + self.ttl,
        };
        self.sessions.write().await.insert(token.clone(), session);
        token
    }

    /// Look up a live session and extend it
    ///
    /// An expired session is removed and reported as absent.
    pub async fn touch(&self, token: &str) -> Option<Session> {
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();

        match sessions.get_mut(token) {
            Some(session) if session.expires_at > now => {
                session.expires_at = now + self.ttl;
                Some(session.clone())
            }
            Some(_) => {
                sessions.remove(token);
                debug!("Session expired");
                None
            }
            None => None,
        }
    }

    /// Look up a live session without extending it
    pub async fn peek(&self, token: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        sessions
            .get(token)
            .filter(|s| s.expires_at > Utc::now())
            .cloned()
    }

    /// End a session; returns whether it existed
    pub async fn remove(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// Drop every expired session; returns how many were dropped
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Session token from the request's `Cookie` headers
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value establishing a session
pub fn session_cookie(token: &str, ttl: Duration) -> String {
    format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl.num_seconds()
    )
}

/// `Set-Cookie` value clearing the session cookie
pub fn clear_session_cookie() -> String {
    format!("{}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
