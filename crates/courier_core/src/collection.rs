//! v2.1 collection document structures.
//!
//! The structures serialize to the collection format downstream tools import.
//! Every object also keeps the keys it does not model in an `extra` map, so a
//! previously published document that was curated by hand (descriptions,
//! auth blocks, test scripts under `event`) survives a load/save round-trip.
//!
//! Reading is lenient: optional wire fields default, a URL may be a bare
//! string, and a tree element that fits neither the folder nor the request
//! shape is kept verbatim as [`Node::Other`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Schema URL written into `info.schema`.
pub const SCHEMA_V2_1: &str = "https://schema.getpostman.com/json/collection/v2.1.0/collection.json";

/// Host placeholder every request URL starts with.
pub const BASE_URL_HOST: &str = "{{base_url}}";

/// Collection document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub info: Info,
    #[serde(default)]
    pub item: Vec<Node>,
    #[serde(default)]
    pub variable: Vec<Variable>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    /// Find a node by name path, e.g. `["Users", "Get User"]`.
    pub fn find(&self, names: &[&str]) -> Option<&Node> {
        let (first, rest) = names.split_first()?;
        let mut node = self.item.iter().rev().find(|n| n.name() == *first)?;
        for name in rest {
            node = node.children().iter().rev().find(|n| n.name() == *name)?;
        }
        Some(node)
    }

    /// Number of request nodes anywhere in the tree.
    pub fn request_count(&self) -> usize {
        fn count(nodes: &[Node]) -> usize {
            nodes
                .iter()
                .map(|n| match n {
                    Node::Folder(folder) => count(&folder.item),
                    Node::Request(_) => 1,
                    Node::Other(_) => 0,
                })
                .sum()
        }
        count(&self.item)
    }
}

/// Collection info block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(rename = "_postman_id", default)]
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_schema() -> String {
    SCHEMA_V2_1.to_string()
}

impl Info {
    pub fn new(name: impl Into<String>, description: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema: default_schema(),
            id: id.into(),
            extra: Map::new(),
        }
    }
}

/// Collection variable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub key: String,
    /// Usually a string, but numbers and booleans are valid too
    #[serde(default)]
    pub value: Value,
    #[serde(rename = "type", default = "default_variable_type")]
    pub kind: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_variable_type() -> String {
    "string".to_string()
}

impl Variable {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            kind: default_variable_type(),
            extra: Map::new(),
        }
    }
}

/// Element of the collection tree
///
/// Folders are recognized by their `item` array, requests by their `request`
/// object. Anything else read from a prior document is carried as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Folder(Folder),
    Request(Request),
    Other(Value),
}

impl Node {
    /// Name used to match nodes between document generations.
    pub fn name(&self) -> &str {
        match self {
            Self::Folder(folder) => &folder.name,
            Self::Request(request) => &request.name,
            Self::Other(value) => value.get("name").and_then(Value::as_str).unwrap_or_default(),
        }
    }

    pub fn children(&self) -> &[Self] {
        match self {
            Self::Folder(folder) => &folder.item,
            Self::Request(_) | Self::Other(_) => &[],
        }
    }

    pub fn as_request(&self) -> Option<&Request> {
        match self {
            Self::Request(request) => Some(request),
            Self::Folder(_) | Self::Other(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            Self::Folder(folder) => Some(folder),
            Self::Request(_) | Self::Other(_) => None,
        }
    }
}

/// Named group of nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
    pub item: Vec<Node>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Folder {
    pub fn new(name: impl Into<String>, item: Vec<Node>) -> Self {
        Self {
            name: name.into(),
            item,
            extra: Map::new(),
        }
    }
}

/// Request node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub name: String,
    pub request: RequestSpec,
    #[serde(default)]
    pub response: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Request {
    pub fn new(name: impl Into<String>, request: RequestSpec) -> Self {
        Self {
            name: name.into(),
            request,
            response: Vec::new(),
            extra: Map::new(),
        }
    }
}

fn default_method() -> String {
    "GET".to_string()
}

/// The `request` object of a request node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestSpec {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub header: Vec<Header>,
    #[serde(default)]
    pub url: Url,
    #[serde(default)]
    pub body: Option<Body>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "type", default = "default_header_type")]
    pub kind: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_header_type() -> String {
    "text".to_string()
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            kind: default_header_type(),
            extra: Map::new(),
        }
    }
}

/// Structured request URL
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Url {
    #[serde(default)]
    pub raw: String,
    #[serde(default)]
    pub host: Vec<String>,
    #[serde(default)]
    pub path: Vec<String>,
    #[serde(default)]
    pub variable: Vec<UrlVariable>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Url {
    /// Build a URL on the `{{base_url}}` host from already-converted path
    /// segments (`:id` style variables).
    pub fn on_base(path: Vec<String>, variable: Vec<UrlVariable>) -> Self {
        let raw = if path.is_empty() {
            BASE_URL_HOST.to_string()
        } else {
            format!("{BASE_URL_HOST}/{}", path.join("/"))
        };
        Self {
            raw,
            host: vec![BASE_URL_HOST.to_string()],
            path,
            variable,
            extra: Map::new(),
        }
    }
}

/// Path variable of a request URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlVariable {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UrlVariable {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            description: String::new(),
            extra: Map::new(),
        }
    }
}

/// Request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Body {
    /// Raw JSON body with the JSON language hint set.
    pub fn json(raw: impl Into<String>) -> Self {
        Self {
            mode: "raw".to_string(),
            raw: Some(raw.into()),
            options: Some(serde_json::json!({ "raw": { "language": "json" } })),
            extra: Map::new(),
        }
    }
}
