//! Session tokens and the per-session view state they map to.

mod state;

pub use state::{
    AuthPrompt, SessionError, SessionSnapshot, SessionState, Toast, ToastKind, View,
};

use dashmap::DashMap;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// A session key derived from the bearer token, used for lookups.
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct SessionKey(String);

impl SessionKey {
    /// Creates a session key from a raw bearer token.
    ///
    /// The token is hashed so the store never holds it in the clear.
    pub fn from_token(token: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        let result = hasher.finalize();
        // First 16 bytes are plenty for a lookup key
        Self(hex::encode(&result[..16]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only show first 8 chars in logs
        write!(f, "{}...", &self.0[..8.min(self.0.len())])
    }
}

mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// All live sessions. Sessions are never persisted.
pub struct SessionStore {
    sessions: DashMap<SessionKey, SessionState>,
    toast_duration: Duration,
}

impl SessionStore {
    pub fn new(toast_duration: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            toast_duration,
        }
    }

    /// Creates an anonymous session and returns its bearer token.
    pub fn create(&self) -> (String, SessionKey) {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(&bytes);
        let key = SessionKey::from_token(&token);

        self.sessions
            .insert(key.clone(), SessionState::new(self.toast_duration));
        (token, key)
    }

    pub fn contains(&self, key: &SessionKey) -> bool {
        self.sessions.contains_key(key)
    }

    /// Runs `f` against the session's state. `None` if the session is unknown.
    ///
    /// Never hold the closure across an await point; copy what is needed out.
    pub fn with<R>(&self, key: &SessionKey, f: impl FnOnce(&mut SessionState) -> R) -> Option<R> {
        self.sessions.get_mut(key).map(|mut entry| f(entry.value_mut()))
    }

    pub fn remove(&self, key: &SessionKey) {
        self.sessions.remove(key);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
