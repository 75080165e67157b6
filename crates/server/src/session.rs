// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Staff access checks and the form session store.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use presence::FormSession;
use std::collections::HashMap;
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::AppState;

/// Extractor for staff-only routes.
///
/// Requires `Authorization: Bearer <access key>` carrying the key the
/// server was started with.
///
/// # Errors
///
/// Rejects with HTTP 401 Unauthorized if the header is missing, is not a
/// bearer token, or carries the wrong key.
pub struct StaffAccess;

impl FromRequestParts<AppState> for StaffAccess {
    type Rejection = AccessError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header: &str = parts
            .headers
            .get("Authorization")
            .ok_or_else(|| {
                debug!("Missing Authorization header");
                AccessError::MissingAuthorizationHeader
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid Authorization header encoding");
                AccessError::InvalidAuthorizationHeader
            })?;

        let token: &str = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            warn!("Authorization header does not start with 'Bearer '");
            AccessError::InvalidAuthorizationHeader
        })?;

        if !keys_match(token.as_bytes(), state.access_key.as_bytes()) {
            warn!("Staff access refused: wrong access key");
            return Err(AccessError::WrongAccessKey);
        }

        Ok(Self)
    }
}

/// Compares a presented key with the expected one in time independent of
/// where they first differ. Only the length can leak.
#[must_use]
pub fn keys_match(presented: &[u8], expected: &[u8]) -> bool {
    if presented.len() != expected.len() {
        return false;
    }
    let difference: u8 = presented
        .iter()
        .zip(expected)
        .fold(0, |difference, (a, b)| difference | (a ^ b));
    std::hint::black_box(difference) == 0
}

/// Staff access errors, returned as HTTP 401.
#[derive(Debug)]
pub enum AccessError {
    /// Authorization header is missing.
    MissingAuthorizationHeader,
    /// Authorization header format is invalid.
    InvalidAuthorizationHeader,
    /// The bearer token is not the access key.
    WrongAccessKey,
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let message: &str = match self {
            Self::MissingAuthorizationHeader => "Missing Authorization header",
            Self::InvalidAuthorizationHeader => {
                "Invalid Authorization header format. Expected: 'Bearer <access key>'"
            }
            Self::WrongAccessKey => "Invalid access key",
        };

        (StatusCode::UNAUTHORIZED, message).into_response()
    }
}

/// Sessions untouched for this long are dropped.
pub const SESSION_IDLE_LIMIT: Duration = Duration::hours(12);

/// Most sessions kept open at once. The least recently used one is dropped
/// to make room.
pub const MAX_OPEN_SESSIONS: usize = 10_000;

#[derive(Debug)]
struct StoredSession {
    session: FormSession,
    last_seen: OffsetDateTime,
}

/// In-memory form sessions, keyed by an opaque random key.
///
/// Sessions are not persisted; a restart starts every form afresh. Idle
/// sessions expire after [`SESSION_IDLE_LIMIT`] and are swept whenever a
/// new one is opened. An expired key behaves like an unknown one.
#[derive(Debug)]
pub struct SessionStore {
    sessions: HashMap<String, StoredSession>,
    idle_limit: Duration,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(SESSION_IDLE_LIMIT, MAX_OPEN_SESSIONS)
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with custom expiry and capacity.
    ///
    /// # Arguments
    ///
    /// * `idle_limit` - How long a session may go untouched
    /// * `capacity` - Most sessions kept at once (at least one)
    #[must_use]
    pub fn with_limits(idle_limit: Duration, capacity: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            idle_limit,
            capacity: capacity.max(1),
        }
    }

    /// Number of sessions currently held, expired ones included until the
    /// next sweep.
    #[must_use]
    pub fn open_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Opens a new session on the attendance page and returns its key.
    pub fn create(&mut self) -> (String, FormSession) {
        self.create_at(OffsetDateTime::now_utc())
    }

    /// Opens a new session as of `now`.
    pub fn create_at(&mut self, now: OffsetDateTime) -> (String, FormSession) {
        self.evict_idle(now);
        if self.sessions.len() >= self.capacity {
            self.evict_least_recent();
        }

        let mut key: String = generate_session_key();
        while self.sessions.contains_key(&key) {
            key = generate_session_key();
        }
        let session: FormSession = FormSession::new();
        self.sessions.insert(
            key.clone(),
            StoredSession {
                session: session.clone(),
                last_seen: now,
            },
        );
        debug!(
            session_key = %key,
            open_sessions = self.open_sessions(),
            "Opened session"
        );
        (key, session)
    }

    /// Returns a copy of the session and marks it as used.
    ///
    /// Returns `None` if the key is unknown or the session has expired.
    pub fn get(&mut self, key: &str) -> Option<FormSession> {
        self.get_at(key, OffsetDateTime::now_utc())
    }

    /// Returns a copy of the session as of `now`.
    pub fn get_at(&mut self, key: &str, now: OffsetDateTime) -> Option<FormSession> {
        let stored: &mut StoredSession = self.sessions.get_mut(key)?;
        if now - stored.last_seen > self.idle_limit {
            self.sessions.remove(key);
            debug!(session_key = %key, "Session expired");
            return None;
        }
        stored.last_seen = now;
        Some(stored.session.clone())
    }

    /// Stores the new state of an existing session.
    ///
    /// Returns `false` if the key is unknown.
    pub fn replace(&mut self, key: &str, session: FormSession) -> bool {
        self.replace_at(key, session, OffsetDateTime::now_utc())
    }

    /// Stores the new state of an existing session as of `now`.
    pub fn replace_at(&mut self, key: &str, session: FormSession, now: OffsetDateTime) -> bool {
        match self.sessions.get_mut(key) {
            Some(stored) => {
                stored.session = session;
                stored.last_seen = now;
                true
            }
            None => false,
        }
    }

    fn evict_idle(&mut self, now: OffsetDateTime) {
        let before: usize = self.sessions.len();
        let idle_limit: Duration = self.idle_limit;
        self.sessions.retain(|_, stored| now - stored.last_seen <= idle_limit);
        let evicted: usize = before - self.sessions.len();
        if evicted > 0 {
            debug!(evicted, "Dropped idle sessions");
        }
    }

    fn evict_least_recent(&mut self) {
        let oldest: Option<String> = self
            .sessions
            .iter()
            .min_by_key(|(_, stored)| stored.last_seen)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.sessions.remove(&key);
            warn!(
                session_key = %key,
                "Session store full; dropped least recently used session"
            );
        }
    }
}

fn generate_session_key() -> String {
    format!(
        "{:016x}{:016x}",
        rand::random::<u64>(),
        rand::random::<u64>()
    )
}
