//! Hand-written port doubles for skill tests.

use async_trait::async_trait;
use serde_json::Value;
use skiff_agent::Model;
use skiff_core::error::{MemoryError, ProviderError, SkillError};
use skiff_core::fetch::HttpFetcher;
use skiff_core::message::Message;
use skiff_core::provider::{Provider, ProviderRequest, ProviderResponse};
use skiff_core::vector::{SearchHit, VectorStore};
use std::sync::{Arc, Mutex};

type Responder = Box<dyn Fn(&str) -> Result<Value, SkillError> + Send + Sync>;

pub struct MockFetcher {
    respond: Responder,
    pub urls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new(respond: impl Fn(&str) -> Result<Value, SkillError> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            respond: Box::new(respond),
            urls: Mutex::new(Vec::new()),
        })
    }

    pub fn fixed(body: Value) -> Arc<Self> {
        Self::new(move |_| Ok(body.clone()))
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpFetcher for MockFetcher {
    async fn get_json(&self, url: &str) -> Result<Value, SkillError> {
        self.urls.lock().unwrap().push(url.to_string());
        (self.respond)(url)
    }
}

#[derive(Default)]
pub struct MemStore {
    pub hits: Vec<SearchHit>,
    pub fail: bool,
    pub inserts: Mutex<Vec<(String, String)>>,
    pub searches: Mutex<Vec<(String, usize)>>,
}

impl MemStore {
    pub fn with_hits(hits: Vec<SearchHit>) -> Arc<Self> {
        Arc::new(Self { hits, ..Self::default() })
    }

    pub fn inserts(&self) -> Vec<(String, String)> {
        self.inserts.lock().unwrap().clone()
    }
}

#[async_trait]
impl VectorStore for MemStore {
    fn namespace(&self) -> &str {
        "test"
    }

    async fn insert_doc(&self, id: &str, text: &str) -> Result<bool, MemoryError> {
        if self.fail {
            return Err(MemoryError::Storage("store offline".into()));
        }
        self.inserts.lock().unwrap().push((id.to_string(), text.to_string()));
        Ok(true)
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, MemoryError> {
        if self.fail {
            return Err(MemoryError::QueryFailed("store offline".into()));
        }
        self.searches.lock().unwrap().push((query.to_string(), top_k));
        Ok(self.hits.iter().take(top_k).cloned().collect())
    }
}

pub fn hit(id: &str, content: &str, similarity: f32) -> SearchHit {
    SearchHit {
        id: id.into(),
        content: content.into(),
        similarity,
    }
}

/// Answers every prompt with a fixed reply and remembers the prompts.
#[derive(Default)]
pub struct CannedLlm {
    pub reply: String,
    pub fail: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl CannedLlm {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.into(),
            ..Self::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for CannedLlm {
    fn name(&self) -> &str {
        "canned"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        if self.fail {
            return Err(ProviderError::Network("connection reset".into()));
        }
        let prompt = request.messages.last().map(|m| m.content.clone()).unwrap_or_default();
        self.prompts.lock().unwrap().push(prompt);
        Ok(ProviderResponse {
            message: Message::assistant(self.reply.clone()),
            usage: None,
            model: request.model,
        })
    }
}

pub fn model(llm: &Arc<CannedLlm>) -> Model {
    Model::new(llm.clone(), "gpt-4o")
}
