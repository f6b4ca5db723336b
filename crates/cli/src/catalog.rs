//! The agents offered in the menu and how each one is assembled.

use skiff_agent::{Agent, Model};
use skiff_config::AppConfig;
use skiff_core::document::DocumentParser;
use skiff_core::error::SkillError;
use skiff_core::fetch::HttpFetcher;
use skiff_core::provider::Provider;
use skiff_core::session::ChatStore;
use skiff_core::skill::Skill;
use skiff_core::vector::VectorStore;
use skiff_memory::{FileChatStore, RamVec};
use skiff_providers::OpenAiCompatProvider;
use skiff_skills::{PlainTextParser, ReqwestFetcher, TripStores, book, crypto, trip};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Book,
    Crypto,
    Trip,
}

impl AgentKind {
    /// Menu order.
    pub const ALL: [AgentKind; 3] = [AgentKind::Book, AgentKind::Crypto, AgentKind::Trip];

    pub fn label(self) -> &'static str {
        match self {
            AgentKind::Book => "Book Assistant",
            AgentKind::Crypto => "Crypto Assistant",
            AgentKind::Trip => "Trip Planner",
        }
    }

    pub fn labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|k| k.label()).collect()
    }

    fn id(self) -> &'static str {
        match self {
            AgentKind::Book => "book-assistant",
            AgentKind::Crypto => "crypto-assistant",
            AgentKind::Trip => trip::AGENT_ID,
        }
    }

    pub fn build(self, services: &Services) -> Result<Agent, SkillError> {
        let (behavior, skills) = match self {
            AgentKind::Book => (
                book::BEHAVIOR,
                book::skills(
                    services.parser.clone(),
                    services.vector_store(book::NAMESPACE),
                    services.fetcher.clone(),
                    &services.config.books,
                ),
            ),
            AgentKind::Crypto => (
                crypto::BEHAVIOR,
                crypto::skills(services.fetcher.clone(), &services.config.crypto),
            ),
            AgentKind::Trip => {
                let stores = TripStores {
                    destinations: services.vector_store(trip::DESTINATIONS_NAMESPACE),
                    travel_plans: services.vector_store(trip::TRAVEL_PLANS_NAMESPACE),
                    trip_context: services.vector_store(trip::TRIP_CONTEXT_NAMESPACE),
                };
                (
                    trip::BEHAVIOR,
                    trip::skills(services.model(), stores, services.config.budget.clone()),
                )
            }
        };
        assemble(self, behavior, skills, services)
    }
}

fn assemble(
    kind: AgentKind,
    behavior: &str,
    skills: Vec<Arc<dyn Skill>>,
    services: &Services,
) -> Result<Agent, SkillError> {
    let mut builder = Agent::builder(kind.label(), services.model())
        .id(kind.id())
        .behavior(behavior)
        .max_iterations(services.config.max_tool_iterations)
        .chat_store(services.chat_store.clone());
    for skill in skills {
        builder = builder.skill(skill)?;
    }
    Ok(builder.build())
}

/// Shared adapters every agent is built from.
pub struct Services {
    pub config: AppConfig,
    pub provider: Arc<dyn Provider>,
    pub fetcher: Arc<dyn HttpFetcher>,
    pub parser: Arc<dyn DocumentParser>,
    pub chat_store: Arc<dyn ChatStore>,
}

impl Services {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let provider = OpenAiCompatProvider::from_config(config)?;
        let fetcher = ReqwestFetcher::new(&config.http)?;
        Ok(Self {
            config: config.clone(),
            provider: Arc::new(provider),
            fetcher: Arc::new(fetcher),
            parser: Arc::new(PlainTextParser),
            chat_store: Arc::new(FileChatStore::new(config.sessions_dir())),
        })
    }

    pub fn model(&self) -> Model {
        Model::new(self.provider.clone(), self.config.default_model.clone())
            .with_temperature(self.config.default_temperature)
            .with_max_tokens(self.config.default_max_tokens)
    }

    fn vector_store(&self, namespace: &str) -> Arc<dyn VectorStore> {
        Arc::new(RamVec::new(
            namespace,
            self.provider.clone(),
            self.config.embedding_model.clone(),
        ))
    }
}
