#![cfg(test)]
//! Shared test utilities for courier tests.
//!
//! # Test Macros
//!
//! - [`rule_map!`] - Build a [`RuleMap`](courier_core::RuleMap) from pipe-delimited rule strings
//!
//! # Test Functions
//!
//! - [`document`], [`folder`], [`request`] - Build collection trees by hand
//! - [`names`], [`folder_names`], [`request_names`] - Read names back out of a tree
//!
//! # Example
//!
//! ```ignore
//! let rules = rule_map! { "email" => "required|email", "age" => "integer|min:18" };
//! assert_eq!(rules.len(), 2);
//! ```

use courier_core::{Document, Folder, Info, Node, Request, RequestSpec, Url, UrlVariable, Variable};
use serde_json::Map;

/// Build a rule map from `path => "rule|rule"` pairs, keeping their order
#[macro_export]
macro_rules! rule_map {
    ($($path:expr => $rules:expr),* $(,)?) => {{
        let mut map = courier_core::RuleMap::new();
        $(map.insert($path.to_string(), courier_core::parse_rules($rules));)*
        map
    }};
}

/// Document with a `base_url` variable and the given top-level nodes
pub fn document(id: &str, item: Vec<Node>) -> Document {
    Document {
        info: Info::new("Test Collection", "", id),
        item,
        variable: vec![Variable::new("base_url", "http://localhost")],
        extra: Map::new(),
    }
}

pub fn folder(name: &str, item: Vec<Node>) -> Node {
    Node::Folder(Folder::new(name, item))
}

/// Request node; `:name` path segments become URL variables
pub fn request(name: &str, method: &str, path: &str) -> Node {
    let path: Vec<String> = path
        .split('/')
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect();
    let variable = path
        .iter()
        .filter_map(|s| s.strip_prefix(':'))
        .map(|key| UrlVariable::new(key, "1"))
        .collect();
    Node::Request(Request::new(
        name,
        RequestSpec {
            method: method.to_string(),
            header: Vec::new(),
            url: Url::on_base(path, variable),
            body: None,
            extra: Map::new(),
        },
    ))
}

pub fn names(nodes: &[Node]) -> Vec<&str> {
    nodes.iter().map(Node::name).collect()
}

pub fn folder_names(doc: &Document) -> Vec<String> {
    doc.item.iter().map(|n| n.name().to_string()).collect()
}

/// Names of the requests inside the top-level folder `folder`
pub fn request_names(doc: &Document, folder: &str) -> Vec<String> {
    doc.find(&[folder])
        .map(|node| node.children().iter().map(|n| n.name().to_string()).collect())
        .unwrap_or_default()
}

/// Create temp directory for tests
pub fn create_test_temp_dir() -> tempfile::TempDir {
    tempfile::TempDir::new().expect("Failed to create temp dir")
}
