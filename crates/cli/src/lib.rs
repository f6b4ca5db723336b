//! Terminal front end for the skiff demo agents: the agent catalogue, the
//! selection menu and the chat session driver.

pub mod catalog;
pub mod menu;
pub mod terminal;

pub use catalog::{AgentKind, Services};
pub use menu::{AgentPicker, DialoguerPicker};
pub use terminal::{ChatBackend, DriverState, LineAction, TerminalDriver, TurnRenderer, classify_line};
