use dekdekapp::api::DekApi;
use dekdekapp::config::AppConfig;
use dekdekapp::store::fs_backend::FsBackend;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

/// How long an admin token stays valid after login.
pub const SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Open sessions kept at most; the oldest is dropped to make room.
pub const MAX_SESSIONS: usize = 16;

/// Everything a request handler needs, built once at startup.
pub struct AppContext {
    pub api: DekApi<FsBackend>,
    pub config: AppConfig,
    sessions: Sessions,
}

impl AppContext {
    pub fn new(api: DekApi<FsBackend>, config: AppConfig) -> Self {
        Self {
            api,
            config,
            sessions: Sessions::default(),
        }
    }

    /// Checks admin credentials against the configuration and opens a session.
    pub fn login(&self, username: &str, password: &str) -> Option<String> {
        if username != self.config.admin_username || password != self.config.admin_password {
            return None;
        }
        Some(self.sessions.open(Instant::now()))
    }

    /// Closes a session. Returns false if the token was not open.
    pub fn logout(&self, token: &str) -> bool {
        self.sessions.close(token)
    }

    pub fn is_admin_session(&self, token: &str) -> bool {
        self.sessions.is_open(token, Instant::now())
    }
}

/// Bearer tokens of admin sessions with their login time.
///
/// Expired tokens are swept on every login, and the table never holds more than
/// [`MAX_SESSIONS`] entries.
#[derive(Default)]
pub struct Sessions {
    open: Mutex<HashMap<String, Instant>>,
}

impl Sessions {
    pub fn open(&self, now: Instant) -> String {
        let mut open = self.lock();
        open.retain(|_, opened| !expired(*opened, now));
        while open.len() >= MAX_SESSIONS {
            let oldest = open
                .iter()
                .min_by_key(|(_, opened)| **opened)
                .map(|(token, _)| token.clone());
            match oldest {
                Some(token) => open.remove(&token),
                None => break,
            };
        }
        let token = Uuid::new_v4().simple().to_string();
        open.insert(token.clone(), now);
        token
    }

    pub fn close(&self, token: &str) -> bool {
        self.lock().remove(token).is_some()
    }

    pub fn is_open(&self, token: &str, now: Instant) -> bool {
        let mut open = self.lock();
        match open.get(token) {
            Some(opened) if expired(*opened, now) => {
                open.remove(token);
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn expired(opened: Instant, now: Instant) -> bool {
    now.saturating_duration_since(opened) >= SESSION_TTL
}
