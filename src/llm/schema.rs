//! Output schema sent to the backend's structured-output mode

use serde::Serialize;
use serde_json::{json, Value};

/// Top-level fields every analysis response must carry, in display order.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "score",
    "missingKeywords",
    "weakBulletPoints",
    "atsFriendliness",
    "skillsFound",
];

/// A named JSON schema in the backend's OpenAPI-subset dialect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDescriptor {
    pub name: String,
    pub schema: Value,
}

impl SchemaDescriptor {
    /// Schema for `AnalysisResult`.
    pub fn analysis_result() -> Self {
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "score": {
                    "type": "INTEGER",
                    "description": "Overall compatibility score from 0 to 100",
                    "minimum": 0,
                    "maximum": 100
                },
                "missingKeywords": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" }
                },
                "weakBulletPoints": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "original": { "type": "STRING" },
                            "suggestion": { "type": "STRING" }
                        },
                        "required": ["original", "suggestion"],
                        "propertyOrdering": ["original", "suggestion"]
                    }
                },
                "atsFriendliness": { "type": "STRING" },
                "skillsFound": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" }
                }
            },
            "required": REQUIRED_FIELDS,
            "propertyOrdering": REQUIRED_FIELDS
        });

        Self {
            name: "analysis_result".to_string(),
            schema,
        }
    }

    pub fn required_fields(&self) -> Vec<&str> {
        self.schema
            .get("required")
            .and_then(Value::as_array)
            .map(|fields| fields.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.schema).unwrap_or_else(|_| self.schema.to_string())
    }
}
