//! Agents and chat sessions for skiff.
//!
//! A chat turn follows a simple cycle:
//!
//! 1. Append the user message to the conversation
//! 2. Stream a reply from the LLM, forwarding text as it arrives
//! 3. If the LLM asks for skills, run them through the agent's registry,
//!    append the results and go back to step 2
//! 4. Otherwise the turn ends
//!
//! The loop stops early once the configured iteration limit is reached.

pub mod agent;
pub mod chat;
pub mod model;
pub mod stream_event;

#[cfg(test)]
mod testing;

pub use agent::{Agent, AgentBuilder};
pub use chat::Chat;
pub use model::Model;
pub use stream_event::AgentStreamEvent;
