//! Route filtering applied before grouping.
//!
//! A route is kept when all three filters pass:
//!
//! - **prefix**: the URI starts with the configured prefix (leading `/` is
//!   ignored on both sides),
//! - **exclude**: the URI matches none of the exclude globs (`*` and `?` over
//!   the full URI, `/` included; braces and brackets are literal so
//!   `api/users/{id}` names the templated route),
//! - **middleware**: the filter is empty or shares a middleware with the route.

use courier_core::RouteDescriptor;
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::RoutesConfig;

#[derive(Debug, Clone)]
pub struct RouteFilter {
    prefix: Option<String>,
    exclude: GlobSet,
    middleware: Vec<String>,
}

impl RouteFilter {
    /// Compile the filter. Invalid exclude patterns are logged and skipped so a
    /// typo in one pattern never stops generation.
    pub fn new(config: &RoutesConfig) -> Self {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.exclude {
            match Glob::new(&escape_template(pattern)) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(error) => {
                    tracing::warn!(pattern = %pattern, %error, "ignoring invalid exclude pattern");
                }
            }
        }
        let exclude = builder.build().unwrap_or_else(|error| {
            tracing::warn!(%error, "exclude patterns could not be compiled, excluding nothing");
            GlobSet::empty()
        });

        Self {
            prefix: config
                .prefix
                .as_deref()
                .map(|p| p.trim_start_matches('/').to_string())
                .filter(|p| !p.is_empty()),
            exclude,
            middleware: config.middleware.clone(),
        }
    }

    pub fn allows(&self, route: &RouteDescriptor) -> bool {
        let uri = route.uri.trim_start_matches('/');

        if let Some(prefix) = &self.prefix
            && !uri.starts_with(prefix.as_str())
        {
            tracing::debug!(uri = %route.uri, "route outside prefix");
            return false;
        }

        if self.exclude.is_match(&route.uri) || self.exclude.is_match(uri) {
            tracing::debug!(uri = %route.uri, "route excluded");
            return false;
        }

        if !self.middleware.is_empty()
            && !route
                .middleware
                .iter()
                .any(|m| self.middleware.contains(m))
        {
            tracing::debug!(uri = %route.uri, "route lacks required middleware");
            return false;
        }

        true
    }

    /// Keep the allowed routes in their original order.
    pub fn apply<'a>(&self, routes: &'a [RouteDescriptor]) -> Vec<&'a RouteDescriptor> {
        routes.iter().filter(|route| self.allows(route)).collect()
    }
}

/// Make route template characters literal; only `*` and `?` stay wildcards.
fn escape_template(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '{' | '}' | '[' | ']' => {
                escaped.push('[');
                escaped.push(c);
                escaped.push(']');
            }
            c => escaped.push(c),
        }
    }
    escaped
}
