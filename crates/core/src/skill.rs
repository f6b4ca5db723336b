//! Skills — named, schema-typed actions an agent can call.
//!
//! A skill declares an [`InputSchema`]. The [`SkillRegistry`] checks raw
//! JSON inputs against that schema before the body runs, and turns every
//! failure (bad input, body error, panic) into a [`SkillOutcome::Failure`]
//! so the LLM always gets an answer it can react to.

use async_trait::async_trait;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::SkillError;
use crate::provider::ToolDefinition;

/// The type of a declared input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    Text,
    Number,
    Array,
    Object,
}

impl FieldType {
    fn json_type(self) -> &'static str {
        match self {
            FieldType::Text => "string",
            FieldType::Number => "number",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }

    /// Coerce `value` into this type, or `None` on mismatch.
    ///
    /// Numbers also accept numeric strings, since models often quote them.
    fn coerce(self, value: &Value) -> Option<Value> {
        match (self, value) {
            (FieldType::Text, Value::String(_)) => Some(value.clone()),
            (FieldType::Number, Value::Number(_)) => Some(value.clone()),
            (FieldType::Number, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number),
            (FieldType::Array, Value::Array(_)) => Some(value.clone()),
            (FieldType::Object, Value::Object(_)) => Some(value.clone()),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldType::Text => "Text",
            FieldType::Number => "Number",
            FieldType::Array => "Array",
            FieldType::Object => "Object",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub field_type: FieldType,
    #[serde(default)]
    pub optional: bool,
    pub description: String,
}

impl FieldSpec {
    fn new(field_type: FieldType, description: impl Into<String>) -> Self {
        Self {
            field_type,
            optional: false,
            description: description.into(),
        }
    }

    pub fn text(description: impl Into<String>) -> Self {
        Self::new(FieldType::Text, description)
    }

    pub fn number(description: impl Into<String>) -> Self {
        Self::new(FieldType::Number, description)
    }

    pub fn array(description: impl Into<String>) -> Self {
        Self::new(FieldType::Array, description)
    }

    pub fn object(description: impl Into<String>) -> Self {
        Self::new(FieldType::Object, description)
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Ordered mapping of field name to [`FieldSpec`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSchema {
    fields: Vec<(String, FieldSpec)>,
}

impl InputSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field. A later field with the same name replaces the earlier one.
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        let name = name.into();
        self.fields.retain(|(n, _)| *n != name);
        self.fields.push((name, spec));
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// JSON Schema sent to the LLM.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for (name, spec) in &self.fields {
            let mut prop = serde_json::json!({
                "type": spec.field_type.json_type(),
                "description": spec.description,
            });
            if spec.field_type == FieldType::Array {
                prop["items"] = serde_json::json!({ "type": "string" });
            }
            properties.insert(name.clone(), prop);
            if !spec.optional {
                required.push(Value::String(name.clone()));
            }
        }
        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Check `raw` against the schema.
    ///
    /// `null` counts as absent. Fields the schema does not declare are dropped.
    pub fn validate(&self, raw: &Value) -> Result<SkillInputs, SkillError> {
        let empty = Map::new();
        let object = match raw {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => {
                return Err(SkillError::InvalidArgument(
                    "skill inputs must be a JSON object".into(),
                ));
            }
        };

        let mut values = Map::new();
        for (name, spec) in &self.fields {
            match object.get(name) {
                None | Some(Value::Null) => {
                    if !spec.optional {
                        return Err(SkillError::MissingField(name.clone()));
                    }
                }
                Some(value) => {
                    let coerced = spec.field_type.coerce(value).ok_or_else(|| {
                        SkillError::TypeMismatch {
                            field: name.clone(),
                            expected: spec.field_type.to_string(),
                        }
                    })?;
                    values.insert(name.clone(), coerced);
                }
            }
        }
        Ok(SkillInputs { values })
    }
}

/// Validated inputs handed to a skill body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillInputs {
    values: Map<String, Value>,
}

impl SkillInputs {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(Value::as_f64)
    }

    pub fn array(&self, name: &str) -> Option<&Vec<Value>> {
        self.values.get(name).and_then(Value::as_array)
    }

    /// Text of a required field. Validation already guarantees presence, so
    /// the error only fires if a body asks for an undeclared field.
    pub fn require_text(&self, name: &str) -> Result<&str, SkillError> {
        self.text(name).ok_or_else(|| SkillError::MissingField(name.to_string()))
    }

    /// Human-readable rendering of any field, for prompt interpolation.
    ///
    /// Arrays become comma-separated lists, whole numbers drop the decimal
    /// point, objects become compact JSON.
    pub fn display(&self, name: &str) -> Option<String> {
        self.values.get(name).map(display_value)
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

/// The answer of a skill invocation. Always data, never a fault.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum SkillOutcome {
    Success(Value),
    Failure(String),
}

impl SkillOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SkillOutcome::Success(_))
    }

    /// Text fed back to the LLM as the tool result.
    pub fn to_tool_content(&self) -> String {
        match self {
            SkillOutcome::Success(Value::String(s)) => s.clone(),
            SkillOutcome::Success(value) => value.to_string(),
            SkillOutcome::Failure(message) => serde_json::json!({ "error": message }).to_string(),
        }
    }
}

impl From<Result<Value, SkillError>> for SkillOutcome {
    fn from(result: Result<Value, SkillError>) -> Self {
        match result {
            Ok(value) => SkillOutcome::Success(value),
            Err(e) => SkillOutcome::Failure(e.to_string()),
        }
    }
}

/// A callable agent capability.
#[async_trait]
pub trait Skill: Send + Sync {
    /// Unique within an agent (e.g. "get_book_info").
    fn name(&self) -> &str;

    /// Sent to the LLM so it knows when to call the skill.
    fn description(&self) -> &str;

    fn input_schema(&self) -> InputSchema;

    /// Run the skill on inputs that already passed schema validation.
    async fn process(&self, inputs: SkillInputs) -> Result<Value, SkillError>;
}

struct Registered {
    skill: Arc<dyn Skill>,
    schema: InputSchema,
}

/// The skills of one agent, in registration order.
#[derive(Default)]
pub struct SkillRegistry {
    skills: Vec<Registered>,
    index: HashMap<String, usize>,
}

impl SkillRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a skill. Names must be unique.
    pub fn register(&mut self, skill: Arc<dyn Skill>) -> Result<(), SkillError> {
        let name = skill.name().to_string();
        if self.index.contains_key(&name) {
            return Err(SkillError::DuplicateSkillName(name));
        }
        let schema = skill.input_schema();
        self.index.insert(name, self.skills.len());
        self.skills.push(Registered { skill, schema });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.skills.iter().map(|r| r.skill.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Tool definitions for the LLM request.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.skills
            .iter()
            .map(|r| ToolDefinition {
                name: r.skill.name().to_string(),
                description: r.skill.description().to_string(),
                parameters: r.schema.to_json_schema(),
            })
            .collect()
    }

    /// Validate and run a skill, surfacing failures as errors.
    ///
    /// A panic inside the body is reported as `ExecutionFailed`.
    pub async fn try_invoke(&self, name: &str, raw: &Value) -> Result<Value, SkillError> {
        let registered = self
            .index
            .get(name)
            .map(|&i| &self.skills[i])
            .ok_or_else(|| SkillError::UnknownSkill(name.to_string()))?;

        let inputs = registered.schema.validate(raw)?;
        debug!(skill = name, "Invoking skill");

        match AssertUnwindSafe(registered.skill.process(inputs)).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                warn!(skill = name, %reason, "Skill panicked");
                Err(SkillError::ExecutionFailed {
                    skill: name.to_string(),
                    reason,
                })
            }
        }
    }

    /// Validate and run a skill. Never fails: errors become `Failure`.
    pub async fn invoke(&self, name: &str, raw: &Value) -> SkillOutcome {
        let outcome = SkillOutcome::from(self.try_invoke(name, raw).await);
        if let SkillOutcome::Failure(message) = &outcome {
            debug!(skill = name, %message, "Skill returned failure");
        }
        outcome
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "skill panicked".to_string()
    }
}
