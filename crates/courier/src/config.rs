//! Generation configuration.
//!
//! Every key has a default, so an empty JSON object is a valid configuration.
//!
//! ```json
//! {
//!   "collection": { "name": "Shop API", "base_url": "https://shop.test" },
//!   "routes": { "prefix": "api", "exclude": ["api/internal/*"], "group_by": "prefix" },
//!   "request_body": { "required_only": true, "example_values": { "integer": 7 } },
//!   "merge": { "preserve_fields": ["request.description", "event"] }
//! }
//! ```

use std::path::{Path, PathBuf};

use courier_core::FieldType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{CourierError, CourierResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourierConfig {
    pub collection: CollectionConfig,
    pub routes: RoutesConfig,
    pub request_body: RequestBodyConfig,
    pub merge: MergeConfig,
    pub output: OutputConfig,
    pub remote: RemoteConfig,
}

impl CourierConfig {
    pub fn from_json(raw: &str) -> CourierResult<Self> {
        let config: Self =
            serde_json::from_str(raw).map_err(|e| CourierError::json("configuration", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> CourierResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| CourierError::io(path, e))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| CourierError::json(path.display().to_string(), e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> CourierResult<()> {
        let file_name = &self.output.file_name;
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            return Err(CourierError::Config(format!(
                "output.file_name must be a bare file name, got {file_name:?}"
            )));
        }
        if self.collection.name.trim().is_empty() {
            return Err(CourierError::Config(
                "collection.name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConfig {
    pub name: String,
    pub description: String,
    pub base_url: String,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            name: "API Collection".to_string(),
            description: String::new(),
            base_url: "http://localhost".to_string(),
        }
    }
}

/// How routes are grouped into folders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    /// One folder per owning handler type
    #[default]
    Controller,
    /// One folder per first URI segment
    Prefix,
    /// A single "All Routes" folder
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Only routes whose URI starts with this prefix are kept
    pub prefix: Option<String>,
    /// Glob patterns of URIs to drop
    pub exclude: Vec<String>,
    /// When non-empty, a route must carry at least one of these middleware
    pub middleware: Vec<String>,
    pub group_by: GroupBy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestBodyConfig {
    pub generate_examples: bool,
    pub required_only: bool,
    pub example_values: ExampleValues,
}

impl Default for RequestBodyConfig {
    fn default() -> Self {
        Self {
            generate_examples: true,
            required_only: false,
            example_values: ExampleValues::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub enabled: bool,
    /// Dotted paths into a request node whose prior value survives regeneration
    pub preserve_fields: Vec<String>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            preserve_fields: vec![
                "request.description".to_string(),
                "request.auth".to_string(),
                "event".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub file_name: String,
    /// Number of previous versions kept under `<directory>/history`
    pub keep: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("collections"),
            file_name: "collection.json".to_string(),
            keep: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub enabled: bool,
    /// Identifier of the published collection; looked up by name when absent
    pub collection_id: Option<String>,
}

/// Example value per field type
///
/// A user-supplied map overlays the defaults type by type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "IndexMap<FieldType, Value>", into = "IndexMap<FieldType, Value>")]
pub struct ExampleValues(IndexMap<FieldType, Value>);

impl ExampleValues {
    pub fn get(&self, field_type: FieldType) -> Option<&Value> {
        self.0.get(&field_type)
    }

    #[must_use]
    pub fn with(mut self, field_type: FieldType, value: Value) -> Self {
        self.0.insert(field_type, value);
        self
    }
}

impl Default for ExampleValues {
    fn default() -> Self {
        Self(IndexMap::from([
            (FieldType::String, json!("example")),
            (FieldType::Email, json!("user@example.com")),
            (FieldType::Url, json!("https://example.com")),
            (
                FieldType::Uuid,
                json!("550e8400-e29b-41d4-a716-446655440000"),
            ),
            (FieldType::Date, json!("2024-01-01")),
            (FieldType::Integer, json!(1)),
            (FieldType::Numeric, json!(1.5)),
            (FieldType::Boolean, json!(true)),
            (FieldType::Array, json!([])),
            (FieldType::Json, json!({})),
        ]))
    }
}

impl From<IndexMap<FieldType, Value>> for ExampleValues {
    fn from(overrides: IndexMap<FieldType, Value>) -> Self {
        let mut values = Self::default();
        values.0.extend(overrides);
        values
    }
}

impl From<ExampleValues> for IndexMap<FieldType, Value> {
    fn from(values: ExampleValues) -> Self {
        values.0
    }
}
