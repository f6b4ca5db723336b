//! Agents: identity, behavior prompt, model and registered skills.
//!
//! An [`Agent`] is immutable once built. Share it behind an `Arc` and open
//! any number of [`Chat`] sessions on it.

use serde_json::Value;
use skiff_core::error::{Error, SessionError, SkillError};
use skiff_core::message::{Conversation, ConversationId, Message};
use skiff_core::provider::ProviderRequest;
use skiff_core::session::{ChatStore, SessionId};
use skiff_core::skill::{Skill, SkillOutcome, SkillRegistry};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::chat::Chat;
use crate::model::Model;
use crate::stream_event::AgentStreamEvent;

const MAX_ITERATIONS_REPLY: &str =
    "I've reached the maximum number of tool call iterations. Please provide further guidance.";

pub struct AgentBuilder {
    id: String,
    name: String,
    behavior: String,
    model: Model,
    skills: SkillRegistry,
    max_iterations: u32,
    store: Option<Arc<dyn ChatStore>>,
}

impl AgentBuilder {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// System prompt sent at the start of every conversation.
    pub fn behavior(mut self, behavior: impl Into<String>) -> Self {
        self.behavior = behavior.into();
        self
    }

    pub fn max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    /// Where persistent chats are loaded from and saved to.
    pub fn chat_store(mut self, store: Arc<dyn ChatStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Register a skill. Fails on a duplicate name.
    pub fn skill(mut self, skill: Arc<dyn Skill>) -> Result<Self, SkillError> {
        self.skills.register(skill)?;
        Ok(self)
    }

    pub fn build(self) -> Agent {
        debug!(agent = %self.name, skills = self.skills.len(), "Agent built");
        Agent {
            id: self.id,
            name: self.name,
            behavior: self.behavior,
            model: self.model,
            skills: self.skills,
            max_iterations: self.max_iterations,
            store: self.store,
        }
    }
}

pub struct Agent {
    id: String,
    name: String,
    behavior: String,
    model: Model,
    skills: SkillRegistry,
    max_iterations: u32,
    store: Option<Arc<dyn ChatStore>>,
}

impl Agent {
    pub fn builder(name: impl Into<String>, model: Model) -> AgentBuilder {
        AgentBuilder {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            behavior: String::new(),
            model,
            skills: SkillRegistry::new(),
            max_iterations: 10,
            store: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn behavior(&self) -> &str {
        &self.behavior
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn skills(&self) -> &SkillRegistry {
        &self.skills
    }

    /// Invoke one skill directly, bypassing the LLM.
    pub async fn call(&self, skill: &str, arguments: Value) -> SkillOutcome {
        self.skills.invoke(skill, &arguments).await
    }

    /// One-shot prompt with skills available. Returns the full reply text.
    pub async fn prompt(&self, text: &str) -> Result<String, Error> {
        let mut conversation = self.new_conversation(ConversationId::new());
        conversation.push(Message::user(text));

        let (tx, mut rx) = mpsc::channel(32);
        let run = async move {
            let result = self.run_turn(&mut conversation, &tx).await;
            drop(tx);
            result
        };
        let collect = async {
            let mut reply = String::new();
            while let Some(event) = rx.recv().await {
                if let AgentStreamEvent::Content { text } = event {
                    reply.push_str(&text);
                }
            }
            reply
        };

        let (result, reply) = tokio::join!(run, collect);
        result?;
        Ok(reply)
    }

    /// One-shot prompt delivered as a stream of events.
    pub async fn prompt_stream(self: &Arc<Self>, text: &str) -> Result<mpsc::Receiver<AgentStreamEvent>, SessionError> {
        let ephemeral = SessionId(format!("prompt-{}", uuid::Uuid::new_v4()));
        self.chat(ephemeral, false).send(text).await
    }

    /// Open a chat session. With `persist`, earlier turns saved under the
    /// same id are reloaded and every completed turn is saved back.
    pub fn chat(self: &Arc<Self>, id: SessionId, persist: bool) -> Chat {
        info!(agent = %self.name, session = %id, persist, "Chat session opened");
        Chat::new(Arc::clone(self), id, persist)
    }

    pub(crate) fn new_conversation(&self, id: ConversationId) -> Conversation {
        let mut conversation = Conversation::with_id(id);
        if !self.behavior.is_empty() {
            conversation.set_system_prompt(&self.behavior);
        }
        conversation
    }

    pub(crate) async fn load_conversation(&self, id: &SessionId, persist: bool) -> Result<Conversation, SessionError> {
        let stored = match (&self.store, persist) {
            (Some(store), true) => store.load(id).await?,
            (None, true) => {
                warn!(session = %id, "No chat store configured, session will not persist");
                None
            }
            _ => None,
        };

        Ok(match stored {
            Some(mut conversation) => {
                debug!(session = %id, turns = conversation.user_turns(), "Resuming chat session");
                if !self.behavior.is_empty() {
                    conversation.set_system_prompt(&self.behavior);
                }
                conversation
            }
            None => self.new_conversation(id.conversation_id()),
        })
    }

    pub(crate) async fn save_conversation(&self, id: &SessionId, conversation: &Conversation) -> Result<(), SessionError> {
        match &self.store {
            Some(store) => store.save(id, conversation).await,
            None => Ok(()),
        }
    }

    /// Run one user turn to completion: call the LLM, dispatch any skill
    /// calls it requests and loop until it answers with plain text.
    ///
    /// Emits `Content` and `ToolCall` events; the caller emits the final
    /// `End` or `Error`.
    pub(crate) async fn run_turn(
        &self,
        conversation: &mut Conversation,
        events: &mpsc::Sender<AgentStreamEvent>,
    ) -> Result<(), Error> {
        let tools = self.skills.definitions();

        for iteration in 1..=self.max_iterations {
            debug!(agent = %self.name, conversation_id = %conversation.id, iteration, "Agent loop iteration");

            let request = ProviderRequest {
                model: self.model.name().to_string(),
                messages: conversation.messages.clone(),
                temperature: self.model.temperature(),
                max_tokens: self.model.max_tokens(),
                tools: tools.clone(),
            };
            let mut chunks = self.model.provider().stream(request).await?;

            let mut content = String::new();
            let mut tool_calls = Vec::new();
            while let Some(chunk) = chunks.recv().await {
                let chunk = chunk?;
                if let Some(text) = chunk.content.filter(|t| !t.is_empty()) {
                    content.push_str(&text);
                    let _ = events.send(AgentStreamEvent::Content { text }).await;
                }
                tool_calls.extend(chunk.tool_calls);
                if chunk.done {
                    break;
                }
            }

            if tool_calls.is_empty() {
                conversation.push(Message::assistant(content));
                return Ok(());
            }

            debug!(tool_count = tool_calls.len(), "Executing skill calls");
            conversation.push(Message::assistant_tool_calls(content, tool_calls.clone()));

            for call in &tool_calls {
                let arguments = parse_arguments(&call.arguments);
                let _ = events
                    .send(AgentStreamEvent::ToolCall {
                        name: call.name.clone(),
                        arguments: arguments.clone(),
                    })
                    .await;

                let outcome = self.skills.invoke(&call.name, &arguments).await;
                if let SkillOutcome::Failure(message) = &outcome {
                    warn!(skill = %call.name, error = %message, "Skill call failed");
                }
                conversation.push(Message::tool_result(&call.id, outcome.to_tool_content()));
            }
        }

        warn!(agent = %self.name, max = self.max_iterations, "Max tool iterations reached, forcing text response");
        let _ = events
            .send(AgentStreamEvent::Content {
                text: MAX_ITERATIONS_REPLY.to_string(),
            })
            .await;
        conversation.push(Message::assistant(MAX_ITERATIONS_REPLY));
        Ok(())
    }
}

/// Tool call arguments arrive as a JSON string; an empty string means no arguments.
fn parse_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
