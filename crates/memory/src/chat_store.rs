//! Chat session persistence.
//!
//! [`FileChatStore`] keeps one pretty-printed JSON file per session under
//! `<data_dir>/sessions/`. [`InMemoryChatStore`] is for tests and for runs
//! without a writable data directory.

use async_trait::async_trait;
use skiff_core::error::SessionError;
use skiff_core::message::Conversation;
use skiff_core::session::{ChatStore, SessionId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

pub struct FileChatStore {
    dir: PathBuf,
}

impl FileChatStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing a session. Characters outside `[A-Za-z0-9_-]` become `_`.
    pub fn path_for(&self, id: &SessionId) -> PathBuf {
        let file: String = id
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

#[async_trait]
impl ChatStore for FileChatStore {
    async fn load(&self, id: &SessionId) -> Result<Option<Conversation>, SessionError> {
        let path = self.path_for(id);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Conversation>(&raw) {
            Ok(conversation) => {
                debug!(session = %id, messages = conversation.messages.len(), "Loaded chat session");
                Ok(Some(conversation))
            }
            Err(e) => {
                // A corrupt file starts the session fresh rather than blocking the chat.
                warn!(session = %id, error = %e, "Ignoring unreadable chat session file");
                Ok(None)
            }
        }
    }

    async fn save(&self, id: &SessionId, conversation: &Conversation) -> Result<(), SessionError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let body = serde_json::to_string_pretty(conversation)
            .map_err(|e| SessionError::Store(format!("Failed to serialize session: {e}")))?;
        tokio::fs::write(self.path_for(id), body).await?;
        debug!(session = %id, "Saved chat session");
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryChatStore {
    sessions: RwLock<HashMap<SessionId, Conversation>>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn load(&self, id: &SessionId) -> Result<Option<Conversation>, SessionError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn save(&self, id: &SessionId, conversation: &Conversation) -> Result<(), SessionError> {
        self.sessions.write().await.insert(id.clone(), conversation.clone());
        Ok(())
    }
}
