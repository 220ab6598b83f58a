//! Names, URLs and group keys derived from route descriptors.

use courier_core::{RouteDescriptor, Url, UrlVariable};

/// Example value substituted for `uuid`-like path variables.
pub const EXAMPLE_UUID: &str = "550e8400-e29b-41d4-a716-446655440000";

/// Split a URI template into its non-empty segments.
pub fn uri_segments(uri: &str) -> Vec<&str> {
    uri.split('/').filter(|s| !s.is_empty()).collect()
}

/// Name of a `{param}` or `{param?}` segment.
pub fn path_variable(segment: &str) -> Option<&str> {
    let inner = segment.strip_prefix('{')?.strip_suffix('}')?;
    let name = inner.strip_suffix('?').unwrap_or(inner);
    (!name.is_empty()).then_some(name)
}

/// Example value for a path variable, picked from its name.
///
/// `uuid` is tested before `id` since every `uuid` name also contains `id`.
pub fn variable_example(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    if lower.contains("uuid") {
        EXAMPLE_UUID
    } else if lower.contains("id") {
        "1"
    } else if lower.contains("slug") {
        "example-slug"
    } else {
        "value"
    }
}

/// Build the request URL: `{param}` segments become `:param` variables.
pub fn build_url(uri: &str) -> Url {
    let mut path = Vec::new();
    let mut variables = Vec::new();
    for segment in uri_segments(uri) {
        if let Some(name) = path_variable(segment) {
            path.push(format!(":{name}"));
            variables.push(UrlVariable::new(name, variable_example(name)));
        } else {
            path.push(segment.to_string());
        }
    }
    Url::on_base(path, variables)
}

/// Uppercase the first letter of every whitespace-separated word.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Display name of the request generated for `route`.
///
/// Named routes use their name with dots as word breaks (`users.show` →
/// `Users Show`). Unnamed routes use their static URI segments
/// (`/v1/users/{id}` → `V1 Users`). Anything else is called `Request`.
pub fn request_name(route: &RouteDescriptor) -> String {
    if let Some(name) = route.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        let named = title_case(&name.replace('.', " "));
        if !named.is_empty() {
            return named;
        }
    }

    let words: Vec<&str> = uri_segments(&route.uri)
        .into_iter()
        .filter(|segment| path_variable(segment).is_none())
        .collect();
    let named = title_case(&words.join(" ").replace(['-', '_'], " "));
    if named.is_empty() {
        "Request".to_string()
    } else {
        named
    }
}

/// Short type name of a handler id: `App\Http\Controllers\UserController@show`
/// and `crate::handlers::UserController` both give `UserController`.
pub fn handler_short_name(handler: &str) -> Option<&str> {
    let owner = handler.split('@').next().unwrap_or(handler);
    owner
        .rsplit(['\\', '/', ':', '.'])
        .find(|segment| !segment.is_empty())
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

/// Capitalized first URI segment, or `Root` for `/`.
pub fn prefix_group(uri: &str) -> String {
    uri_segments(uri)
        .first()
        .map_or_else(|| "Root".to_string(), |segment| capitalize(segment))
}
