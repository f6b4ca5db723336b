//! # skiff core
//!
//! Domain types, capability ports and the skill registry for skiff agents.
//! Nothing in here talks to the network or the filesystem: every external
//! collaborator (LLM, vector store, document parser, HTTP, chat storage) is
//! a trait that the adapter crates implement.
//!
//! ## Layout
//!
//! - [`skill`]: typed input schemas, validation and dispatch
//! - [`provider`]: the LLM port
//! - [`vector`], [`document`], [`fetch`], [`session`]: the remaining ports
//! - [`message`]: conversations as they are sent to the LLM and persisted

pub mod document;
pub mod error;
pub mod fetch;
pub mod message;
pub mod provider;
pub mod session;
pub mod skill;
pub mod vector;

pub use document::{DocumentParser, ParsedDocument};
pub use error::{Error, Result};
pub use fetch::HttpFetcher;
pub use message::{Conversation, ConversationId, Message, MessageToolCall, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, StreamChunk, ToolDefinition};
pub use session::{ChatStore, SessionId};
pub use skill::{
    FieldSpec, FieldType, InputSchema, Skill, SkillInputs, SkillOutcome, SkillRegistry,
};
pub use vector::{SearchHit, VectorStore};
