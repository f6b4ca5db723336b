//! Test doubles shared by this crate's unit tests.

use async_trait::async_trait;
use serde_json::Value;
use skiff_core::error::{ProviderError, SessionError, SkillError};
use skiff_core::message::{Conversation, Message, MessageToolCall};
use skiff_core::provider::{ChunkReceiver, Provider, ProviderRequest, ProviderResponse, StreamChunk};
use skiff_core::session::{ChatStore, SessionId};
use skiff_core::skill::{FieldSpec, InputSchema, Skill, SkillInputs};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub enum Step {
    Text(String),
    Chunks(Vec<String>),
    ToolCall(String, String),
    Fail(String),
}

/// Replays a fixed script of replies and records every request.
#[derive(Clone)]
pub struct ScriptedProvider {
    steps: Arc<Mutex<VecDeque<Step>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl ScriptedProvider {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Arc::new(Mutex::new(steps.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self, request: ProviderRequest) -> Step {
        let call = self.requests.lock().unwrap().len();
        self.requests.lock().unwrap().push(request);
        self.steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Step::Text(format!("(script exhausted at call {call})")))
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let message = match self.next(request) {
            Step::Text(text) => Message::assistant(text),
            Step::Chunks(parts) => Message::assistant(parts.concat()),
            Step::ToolCall(name, arguments) => Message::assistant_tool_calls(
                "",
                vec![MessageToolCall {
                    id: format!("call_{name}"),
                    name,
                    arguments,
                }],
            ),
            Step::Fail(reason) => return Err(ProviderError::Network(reason)),
        };
        Ok(ProviderResponse {
            message,
            usage: None,
            model: "scripted".into(),
        })
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ChunkReceiver, ProviderError> {
        let chunks: Vec<StreamChunk> = match self.next(request) {
            Step::Chunks(parts) => parts
                .into_iter()
                .map(|part| StreamChunk {
                    content: Some(part),
                    ..StreamChunk::default()
                })
                .chain(std::iter::once(StreamChunk {
                    done: true,
                    ..StreamChunk::default()
                }))
                .collect(),
            Step::Text(text) => vec![StreamChunk {
                content: Some(text),
                done: true,
                ..StreamChunk::default()
            }],
            Step::ToolCall(name, arguments) => vec![StreamChunk {
                tool_calls: vec![MessageToolCall {
                    id: format!("call_{name}"),
                    name,
                    arguments,
                }],
                done: true,
                ..StreamChunk::default()
            }],
            Step::Fail(reason) => return Err(ProviderError::Network(reason)),
        };

        let (tx, rx) = tokio::sync::mpsc::channel(chunks.len().max(1));
        for chunk in chunks {
            let _ = tx.send(Ok(chunk)).await;
        }
        Ok(rx)
    }
}

struct Echo;

#[async_trait]
impl Skill for Echo {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo the text back"
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new().field("text", FieldSpec::text("Text to echo"))
    }

    async fn process(&self, inputs: SkillInputs) -> Result<Value, SkillError> {
        Ok(Value::String(format!("echo: {}", inputs.require_text("text")?)))
    }
}

pub fn echo_skill() -> Arc<dyn Skill> {
    Arc::new(Echo)
}

#[derive(Default)]
pub struct MemoryStore {
    pub sessions: Mutex<HashMap<SessionId, Conversation>>,
    pub broken: bool,
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn load(&self, id: &SessionId) -> Result<Option<Conversation>, SessionError> {
        if self.broken {
            return Err(SessionError::Store("disk unavailable".into()));
        }
        Ok(self.sessions.lock().unwrap().get(id).cloned())
    }

    async fn save(&self, id: &SessionId, conversation: &Conversation) -> Result<(), SessionError> {
        self.sessions.lock().unwrap().insert(id.clone(), conversation.clone());
        Ok(())
    }
}
