//! One-shot notifications shown on the next page rendered for a login session.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Info,
    Danger,
}

impl Level {
    /// Bootstrap alert class for this level.
    pub fn css_class(self) -> &'static str {
        match self {
            Level::Success => "alert-success",
            Level::Info => "alert-info",
            Level::Danger => "alert-danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashMessage {
    pub level: Level,
    pub text: String,
}

/// Pending messages per session id, drained when a page is rendered for that session.
///
/// Keyed by session rather than user, so two logins of the same account each see only
/// their own messages.
#[derive(Debug, Clone, Default)]
pub struct FlashStore {
    pending: Arc<Mutex<HashMap<Uuid, Vec<FlashMessage>>>>,
}

impl FlashStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, session: Uuid, level: Level, text: impl Into<String>) {
        self.lock().entry(session).or_default().push(FlashMessage {
            level,
            text: text.into(),
        });
    }

    pub fn success(&self, session: Uuid, text: impl Into<String>) {
        self.push(session, Level::Success, text);
    }

    /// Removes and returns everything queued for `session`, oldest first.
    pub fn take(&self, session: Uuid) -> Vec<FlashMessage> {
        self.lock().remove(&session).unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, Vec<FlashMessage>>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
