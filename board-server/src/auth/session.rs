//! In-memory admin session store.
//!
//! A session is created when the login flow starts and carries the OAuth
//! `state` token until the callback consumes it. A successful callback
//! replaces the pending session with an admin session under a fresh id.
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "board_session";

/// Pending logins must finish within this window.
const LOGIN_TTL_MINUTES: i64 = 10;

#[derive(Debug, Clone)]
pub struct AdminSession {
    pub email: Option<String>,
    pub name: Option<String>,
    pub is_admin: bool,
    pub oauth_state: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<DashMap<String, AdminSession>>,
    ttl: Duration,
}

fn random_token() -> String {
    let part1 = Uuid::new_v4().simple().to_string();
    let part2 = Uuid::new_v4().simple().to_string();
    format!("{}{}", part1, part2)
}

impl SessionStore {
    pub fn new(ttl_hours: u64) -> Self {
        let hours = ttl_hours.clamp(1, 24 * 365) as i64;
        Self {
            sessions: Arc::new(DashMap::new()),
            ttl: Duration::hours(hours),
        }
    }

    /// Opens a pending session for the login flow and returns
    /// `(session_id, state)`.
    pub fn begin_login(&self) -> (String, String) {
        let session_id = random_token();
        let state = random_token();

        self.sessions.insert(
            session_id.clone(),
            AdminSession {
                email: None,
                name: None,
                is_admin: false,
                oauth_state: Some(state.clone()),
                expires_at: Utc::now() + Duration::minutes(LOGIN_TTL_MINUTES),
            },
        );

        (session_id, state)
    }

    /// Re-arms a pending session with a fresh state so repeated login
    /// attempts reuse one session. Admin and expired sessions return `None`.
    pub fn resume_login(&self, session_id: &str) -> Option<String> {
        let now = Utc::now();
        let mut session = self.sessions.get_mut(session_id)?;
        if session.is_admin || session.is_expired(now) {
            return None;
        }

        let state = random_token();
        session.oauth_state = Some(state.clone());
        session.expires_at = now + Duration::minutes(LOGIN_TTL_MINUTES);
        Some(state)
    }

    /// Consumes the pending state. Returns true only when it matches; a
    /// state can be checked once.
    pub fn take_oauth_state(&self, session_id: &str, state: &str) -> bool {
        let now = Utc::now();
        match self.sessions.get_mut(session_id) {
            Some(mut session) if !session.is_expired(now) => {
                let expected = session.oauth_state.take();
                expected.as_deref() == Some(state)
            }
            _ => false,
        }
    }

    /// Replaces `previous_id` with an admin session and returns the new id.
    pub fn promote(&self, previous_id: &str, email: String, name: Option<String>) -> String {
        self.sessions.remove(previous_id);

        let session_id = random_token();
        debug!("Admin session opened for {}", email);
        self.sessions.insert(
            session_id.clone(),
            AdminSession {
                email: Some(email),
                name,
                is_admin: true,
                oauth_state: None,
                expires_at: Utc::now() + self.ttl,
            },
        );
        session_id
    }

    /// Looks a session up, dropping it if it has expired.
    pub fn get(&self, session_id: &str) -> Option<AdminSession> {
        let now = Utc::now();
        let session = self.sessions.get(session_id)?.clone();
        if session.is_expired(now) {
            self.sessions.remove(session_id);
            return None;
        }
        Some(session)
    }

    /// Returns the session only if it belongs to a signed-in admin.
    pub fn admin(&self, session_id: &str) -> Option<AdminSession> {
        self.get(session_id).filter(|s| s.is_admin)
    }

    pub fn remove(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    /// Drops every expired session. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut removed = 0;
        self.sessions.retain(|_, s| {
            let keep = !s.is_expired(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    #[cfg(test)]
    fn insert_raw(&self, id: &str, session: AdminSession) {
        self.sessions.insert(id.to_string(), session);
    }
}
