//! Chat sessions: multi-turn conversations with streamed replies.

use skiff_core::error::SessionError;
use skiff_core::message::{Conversation, Message};
use skiff_core::session::SessionId;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

use crate::agent::Agent;
use crate::stream_event::AgentStreamEvent;

const EVENT_BUFFER: usize = 64;

/// A conversation with one agent.
///
/// Turns are serialized: a second `send` waits until the previous turn has
/// finished updating the history.
pub struct Chat {
    agent: Arc<Agent>,
    id: SessionId,
    persist: bool,
    conversation: Arc<Mutex<Option<Conversation>>>,
}

impl Chat {
    pub(crate) fn new(agent: Arc<Agent>, id: SessionId, persist: bool) -> Self {
        Self {
            agent,
            id,
            persist,
            conversation: Arc::new(Mutex::new(None)),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn agent(&self) -> &Arc<Agent> {
        &self.agent
    }

    pub fn persist(&self) -> bool {
        self.persist
    }

    /// Start a turn. The returned channel yields the turn's events in order
    /// and closes after the final `End` or `Error`.
    ///
    /// Fails only if the stored session cannot be loaded.
    pub async fn send(&self, input: &str) -> Result<mpsc::Receiver<AgentStreamEvent>, SessionError> {
        let mut guard = Arc::clone(&self.conversation).lock_owned().await;
        if guard.is_none() {
            *guard = Some(self.agent.load_conversation(&self.id, self.persist).await?);
        }

        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let agent = Arc::clone(&self.agent);
        let id = self.id.clone();
        let persist = self.persist;
        let input = input.to_string();

        tokio::spawn(async move {
            let conversation = guard.get_or_insert_with(|| agent.new_conversation(id.conversation_id()));
            let checkpoint = conversation.messages.len();
            conversation.push(Message::user(input));

            let last = match agent.run_turn(conversation, &tx).await {
                Ok(()) => {
                    if persist {
                        if let Err(e) = agent.save_conversation(&id, conversation).await {
                            warn!(session = %id, error = %e, "Failed to save chat session");
                        }
                    }
                    debug!(session = %id, messages = conversation.messages.len(), "Turn complete");
                    AgentStreamEvent::End
                }
                Err(e) => {
                    // Drop the partial turn so the history stays well-formed.
                    conversation.messages.truncate(checkpoint);
                    warn!(session = %id, error = %e, "Turn failed");
                    AgentStreamEvent::Error { message: e.to_string() }
                }
            };
            let _ = tx.send(last).await;
        });

        Ok(rx)
    }

    /// Messages exchanged so far, including the system prompt.
    pub async fn history(&self) -> Vec<Message> {
        self.conversation
            .lock()
            .await
            .as_ref()
            .map(|c| c.messages.clone())
            .unwrap_or_default()
    }
}
