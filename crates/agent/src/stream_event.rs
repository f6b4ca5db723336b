//! Events emitted while a chat turn runs.

use serde::{Deserialize, Serialize};

/// One step of a streamed chat turn, delivered in order over a channel.
///
/// Every turn ends with exactly one `End` or `Error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStreamEvent {
    /// Partial reply text from the LLM.
    Content { text: String },

    /// The agent is calling a skill.
    ToolCall {
        name: String,
        arguments: serde_json::Value,
    },

    /// The turn completed.
    End,

    /// The turn failed.
    Error { message: String },
}

impl AgentStreamEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Content { .. } => "content",
            Self::ToolCall { .. } => "tool_call",
            Self::End => "end",
            Self::Error { .. } => "error",
        }
    }

    /// Whether no further events follow in this turn.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::End | Self::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_serializes_tagged() {
        let event = AgentStreamEvent::Content { text: "Hello".into() };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"content""#));
        assert!(json.contains(r#""text":"Hello""#));
    }

    #[test]
    fn tool_call_keeps_arguments() {
        let event = AgentStreamEvent::ToolCall {
            name: "get_book_info".into(),
            arguments: serde_json::json!({"book_name": "Dune"}),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"tool_call""#));
        assert!(json.contains(r#""book_name":"Dune""#));
    }

    #[test]
    fn only_end_and_error_are_terminal() {
        assert!(AgentStreamEvent::End.is_terminal());
        assert!(AgentStreamEvent::Error { message: "boom".into() }.is_terminal());
        assert!(!AgentStreamEvent::Content { text: String::new() }.is_terminal());
        assert_eq!(AgentStreamEvent::End.event_type(), "end");
    }

    #[test]
    fn round_trips_through_json() {
        let event = AgentStreamEvent::Error { message: "rate limited".into() };
        let back: AgentStreamEvent = serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(back, event);
    }
}
