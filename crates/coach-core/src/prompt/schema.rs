//! Structured-output schemas attached to built prompts.

use coach_types::action::{CoachResponse, SentinelResponse};
use coach_types::llm::{OutputConfig, add_additional_properties_false};

/// Which response shape the oracle is asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSchema {
    /// Interactive coach turn: reply text, optional component, all actions.
    Coach,
    /// Background extraction: note actions only.
    Sentinel,
}

impl ResponseSchema {
    pub fn name(&self) -> &'static str {
        match self {
            ResponseSchema::Coach => "CoachResponse",
            ResponseSchema::Sentinel => "SentinelResponse",
        }
    }

    /// JSON schema with `additionalProperties: false` on every object.
    pub fn json_schema(&self) -> serde_json::Value {
        let schema = match self {
            ResponseSchema::Coach => schemars::schema_for!(CoachResponse),
            ResponseSchema::Sentinel => schemars::schema_for!(SentinelResponse),
        };
        let mut value = serde_json::to_value(schema)
            .unwrap_or_else(|_| serde_json::json!({ "type": "object" }));
        add_additional_properties_false(&mut value);
        value
    }

    pub fn output_config(&self) -> OutputConfig {
        OutputConfig::json_schema(self.name(), self.json_schema())
    }
}
