//! Interpreted field descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type tag for one request field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Email,
    Url,
    Uuid,
    Date,
    Integer,
    Numeric,
    Boolean,
    Array,
    Json,
}

impl FieldType {
    pub const ALL: [Self; 10] = [
        Self::String,
        Self::Email,
        Self::Url,
        Self::Uuid,
        Self::Date,
        Self::Integer,
        Self::Numeric,
        Self::Boolean,
        Self::Array,
        Self::Json,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Email => "email",
            Self::Url => "url",
            Self::Uuid => "uuid",
            Self::Date => "date",
            Self::Integer => "integer",
            Self::Numeric => "numeric",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Json => "json",
        }
    }

    /// Map a rule name onto the type it declares. `date_format` counts as a
    /// date rule.
    pub fn from_rule(name: &str) -> Option<Self> {
        match name {
            "date" | "date_format" => Some(Self::Date),
            other => Self::ALL.into_iter().find(|t| t.as_str() == other),
        }
    }

    /// Integer and numeric fields take `min`/`max` as value bounds.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Numeric)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type, constraints and example value for one input field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Dotted path, may contain `*` segments (`items.*.sku`)
    pub path: String,
    pub required: bool,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    pub example: Value,
}

impl FieldDescriptor {
    /// The most conservative descriptor: an optional string with an empty
    /// example.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            required: false,
            field_type: FieldType::String,
            format: None,
            min: None,
            max: None,
            enum_values: None,
            example: Value::String(String::new()),
        }
    }
}
