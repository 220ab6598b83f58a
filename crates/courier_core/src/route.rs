//! Route descriptors and HTTP method utilities.
//!
//! A [`RouteDescriptor`] is the normalized description of one registered HTTP
//! endpoint, as produced by whatever introspects the host application. It is
//! read once per generation cycle and never mutated.
//!
//! # Supported Methods
//!
//! The following HTTP methods are recognized (case-insensitive):
//! GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS, TRACE. Other declared verbs
//! are carried through uppercased.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }

    /// Methods whose requests carry a JSON body.
    pub fn carries_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    /// HEAD and OPTIONS are registered implicitly by most routers and never
    /// chosen as the primary method of a request.
    pub fn is_implicit(self) -> bool {
        matches!(self, Self::Head | Self::Options)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known HTTP method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMethod(pub String);

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown HTTP method: {}", self.0)
    }
}

impl std::error::Error for UnknownMethod {}

impl FromStr for HttpMethod {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            "put" => Ok(Self::Put),
            "patch" => Ok(Self::Patch),
            "delete" => Ok(Self::Delete),
            "head" => Ok(Self::Head),
            "options" => Ok(Self::Options),
            "trace" => Ok(Self::Trace),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

/// A declared path parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathParameter {
    /// Parameter name, without braces
    pub name: String,
    /// `false` for optional segments such as `{page?}`
    #[serde(default = "default_true")]
    pub required: bool,
}

fn default_true() -> bool {
    true
}

/// Route metadata read from the host application
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RouteDescriptor {
    /// URI template, e.g. `api/users/{id}`
    pub uri: String,
    /// HTTP methods in declaration order
    #[serde(default)]
    pub methods: Vec<String>,
    /// Route name, e.g. `users.show`
    #[serde(default)]
    pub name: Option<String>,
    /// Owning handler, e.g. `App\Http\Controllers\UserController@show`
    #[serde(default)]
    pub handler: Option<String>,
    /// Middleware applied to the route
    #[serde(default)]
    pub middleware: Vec<String>,
    /// Declared path parameters, in URI order
    #[serde(default)]
    pub parameters: Vec<PathParameter>,
}

impl RouteDescriptor {
    pub fn new(uri: impl Into<String>, methods: &[&str]) -> Self {
        Self {
            uri: uri.into(),
            methods: methods.iter().map(|m| (*m).to_string()).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn handled_by(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    #[must_use]
    pub fn with_middleware(mut self, middleware: &[&str]) -> Self {
        self.middleware = middleware.iter().map(|m| (*m).to_string()).collect();
        self
    }

    /// The verb a generated request uses: the first declared method that is
    /// not HEAD or OPTIONS, uppercased, or GET when none remains.
    pub fn primary_method(&self) -> String {
        self.methods
            .iter()
            .map(|m| m.trim().to_uppercase())
            .filter(|m| !m.is_empty())
            .find(|m| !m.parse::<HttpMethod>().is_ok_and(HttpMethod::is_implicit))
            .unwrap_or_else(|| HttpMethod::Get.to_string())
    }
}
