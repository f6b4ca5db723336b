//! Chat session identity and the chat persistence port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::message::{Conversation, ConversationId};

/// Identifier of a persisted chat session.
///
/// Reusing an id reloads the earlier turns of that session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    const PREFIX: &'static str = "my-chat-session-";

    /// Session id for an agent picked from the menu, e.g.
    /// `"Book Assistant"` → `"my-chat-session-Book-Assistant"`.
    pub fn for_agent(agent_name: &str) -> Self {
        Self(format!("{}{}", Self::PREFIX, agent_name.replace(' ', "-")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn conversation_id(&self) -> ConversationId {
        ConversationId(self.0.clone())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn load(&self, id: &SessionId) -> Result<Option<Conversation>, SessionError>;

    async fn save(&self, id: &SessionId, conversation: &Conversation) -> Result<(), SessionError>;
}
