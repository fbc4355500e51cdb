//! Access to the signed-in employee, passed explicitly into controllers.

use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};
use shared::domain::{UserSession, DEFAULT_EMPLOYEE_EMAIL};
use tracing::warn;

const USER_KEY: &str = "user";

pub trait SessionSource: Send + Sync {
    fn current_user(&self) -> Option<UserSession>;
}

/// Unauthenticated context: always resolves to the default employee email.
pub struct NoSession;

impl SessionSource for NoSession {
    fn current_user(&self) -> Option<UserSession> {
        None
    }
}

pub struct FixedSession(pub Option<UserSession>);

impl SessionSource for FixedSession {
    fn current_user(&self) -> Option<UserSession> {
        self.0.clone()
    }
}

/// String key-value store holding the serialized user under `user`,
/// the way the login page persists it.
#[derive(Debug, Default, Clone)]
pub struct KeyValueSession {
    entries: HashMap<String, String>,
}

impl KeyValueSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read session file '{}'", path.display()))?;
        let entries = serde_json::from_str::<HashMap<String, String>>(&raw)
            .with_context(|| format!("malformed session file '{}'", path.display()))?;
        Ok(Self { entries })
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set_item(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn set_user(&mut self, user: &UserSession) -> Result<()> {
        let raw = serde_json::to_string(user).context("failed to serialize user session")?;
        self.set_item(USER_KEY, raw);
        Ok(())
    }
}

impl SessionSource for KeyValueSession {
    fn current_user(&self) -> Option<UserSession> {
        let raw = self.get_item(USER_KEY)?;
        match serde_json::from_str::<Option<UserSession>>(raw) {
            Ok(user) => user,
            Err(err) => {
                warn!("session: ignoring unreadable user entry: {err}");
                None
            }
        }
    }
}

/// Email of the current employee, or the default one when nobody is signed in.
pub fn resolve_email(session: &dyn SessionSource) -> String {
    session
        .current_user()
        .and_then(|user| user.email)
        .unwrap_or_else(|| DEFAULT_EMPLOYEE_EMAIL.to_string())
}
