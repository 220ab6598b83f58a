//! Route and validation-rule sources.
//!
//! The engine never inspects the host application itself. Routes come from a
//! [`RouteSource`] read once per generation cycle, and validation rules from a
//! [`RuleSource`] keyed by handler id.
//!
//! [`Manifest`] implements both from a JSON export:
//!
//! ```json
//! {
//!   "routes": [
//!     { "uri": "api/users", "methods": ["POST"], "name": "users.store",
//!       "handler": "App\\Http\\Controllers\\UserController@store" }
//!   ],
//!   "rules": {
//!     "App\\Http\\Controllers\\UserController@store": {
//!       "email": "required|email",
//!       "roles.*": ["required", "in:admin,editor"],
//!       "avatar": ["nullable", { "opaque": true, "implies_required": false }]
//!     }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use courier_core::{RouteDescriptor, RuleMap, RuleToken, parse_rules};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{CourierError, CourierResult};

/// Produces the host application's routes.
pub trait RouteSource {
    fn list_routes(&self) -> anyhow::Result<Vec<RouteDescriptor>>;
}

/// Resolves the validation rules of a handler.
///
/// Returning `None` means no rules could be resolved; the request then gets an
/// empty example body.
pub trait RuleSource {
    fn rules_for(&self, handler: &str) -> Option<RuleMap>;
}

/// A rule source that knows no handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRules;

impl RuleSource for NoRules {
    fn rules_for(&self, _handler: &str) -> Option<RuleMap> {
        None
    }
}

impl RouteSource for Vec<RouteDescriptor> {
    fn list_routes(&self) -> anyhow::Result<Vec<RouteDescriptor>> {
        Ok(self.clone())
    }
}

impl RuleSource for HashMap<String, RuleMap> {
    fn rules_for(&self, handler: &str) -> Option<RuleMap> {
        self.get(handler).cloned()
    }
}

/// Routes and rules exported by the host application as JSON.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub routes: Vec<RouteDescriptor>,
    pub rules: HashMap<String, RuleMap>,
}

#[derive(Deserialize)]
struct RawManifest {
    #[serde(default)]
    routes: Vec<RouteDescriptor>,
    #[serde(default)]
    rules: HashMap<String, IndexMap<String, RawRules>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRules {
    Piped(String),
    List(Vec<RawToken>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawToken {
    Rule(String),
    Opaque {
        #[allow(dead_code)]
        opaque: bool,
        #[serde(default)]
        implies_required: bool,
    },
}

impl RawRules {
    fn into_tokens(self) -> Vec<RuleToken> {
        match self {
            Self::Piped(raw) => parse_rules(&raw),
            // list entries are whole rules; a `|` inside one belongs to it
            Self::List(tokens) => tokens
                .into_iter()
                .filter_map(|token| match token {
                    RawToken::Rule(raw) if raw.trim().is_empty() => None,
                    RawToken::Rule(raw) => Some(RuleToken::parse(&raw)),
                    RawToken::Opaque {
                        implies_required, ..
                    } => Some(RuleToken::opaque(implies_required)),
                })
                .collect(),
        }
    }
}

impl Manifest {
    pub fn from_json(raw: &str) -> CourierResult<Self> {
        let parsed: RawManifest =
            serde_json::from_str(raw).map_err(|e| CourierError::json("route manifest", e))?;
        let rules = parsed
            .rules
            .into_iter()
            .map(|(handler, fields)| {
                let fields = fields
                    .into_iter()
                    .map(|(path, raw)| (path, raw.into_tokens()))
                    .collect();
                (handler, fields)
            })
            .collect();
        Ok(Self {
            routes: parsed.routes,
            rules,
        })
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read route manifest: {}", path.display()))?;
        Self::from_json(&raw)
            .with_context(|| format!("Failed to parse route manifest: {}", path.display()))
    }
}

impl RouteSource for Manifest {
    fn list_routes(&self) -> anyhow::Result<Vec<RouteDescriptor>> {
        Ok(self.routes.clone())
    }
}

impl RuleSource for Manifest {
    fn rules_for(&self, handler: &str) -> Option<RuleMap> {
        self.rules.get(handler).cloned()
    }
}
