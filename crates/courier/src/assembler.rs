//! Collection assembly: route descriptors to a collection document.
//!
//! # Overview
//!
//! Routes are filtered ([`RouteFilter`]), grouped into folders by the
//! configured [`GroupBy`] policy, and each kept route becomes one request
//! node. Folders are sorted by name; requests keep route order inside their
//! folder.
//!
//! Assembly is total: any route sequence, including an empty one, yields a
//! document. Missing handlers or rules degrade to an empty example body.
//!
//! Every call mints a new `info._postman_id`. Keeping the id stable across
//! cycles is left to [`reconcile`](crate::reconcile()).

use std::collections::BTreeMap;

use courier_core::{
    Body, Document, Folder, Header, HttpMethod, Info, Node, Request, RequestSpec,
    RouteDescriptor, Variable,
};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::body::{describe_fields, synthesize};
use crate::config::{CourierConfig, GroupBy, RequestBodyConfig};
use crate::filter::RouteFilter;
use crate::naming::{build_url, handler_short_name, prefix_group, request_name};
use crate::source::RuleSource;

/// Folder for routes without a resolvable handler under [`GroupBy::Controller`].
pub const OTHER_GROUP: &str = "Other";
/// The single folder used by [`GroupBy::None`].
pub const ALL_ROUTES_GROUP: &str = "All Routes";

/// Assemble a collection document from `routes`.
pub fn assemble(
    routes: &[RouteDescriptor],
    rules: &dyn RuleSource,
    config: &CourierConfig,
) -> Document {
    let filter = RouteFilter::new(&config.routes);
    let kept = filter.apply(routes);

    let mut groups: BTreeMap<String, Vec<Node>> = BTreeMap::new();
    for route in &kept {
        let key = group_key(route, config.routes.group_by);
        tracing::debug!(uri = %route.uri, group = %key, "adding route");
        groups
            .entry(key)
            .or_default()
            .push(Node::Request(build_request(route, rules, &config.request_body)));
    }

    tracing::info!(
        routes = routes.len(),
        kept = kept.len(),
        folders = groups.len(),
        "assembled collection"
    );

    Document {
        info: Info::new(
            config.collection.name.clone(),
            config.collection.description.clone(),
            Uuid::new_v4().to_string(),
        ),
        item: groups
            .into_iter()
            .map(|(name, item)| Node::Folder(Folder::new(name, item)))
            .collect(),
        variable: vec![Variable::new("base_url", config.collection.base_url.clone())],
        extra: Map::new(),
    }
}

/// Folder name for `route` under the given policy.
pub fn group_key(route: &RouteDescriptor, group_by: GroupBy) -> String {
    match group_by {
        GroupBy::Controller => route
            .handler
            .as_deref()
            .and_then(handler_short_name)
            .unwrap_or(OTHER_GROUP)
            .to_string(),
        GroupBy::Prefix => prefix_group(&route.uri),
        GroupBy::None => ALL_ROUTES_GROUP.to_string(),
    }
}

/// Build the request node for one route.
pub fn build_request(
    route: &RouteDescriptor,
    rules: &dyn RuleSource,
    body_config: &RequestBodyConfig,
) -> Request {
    let method = route.primary_method();
    let carries_body = method
        .parse::<HttpMethod>()
        .is_ok_and(HttpMethod::carries_body);

    let mut header = vec![Header::new("Accept", "application/json")];
    if carries_body {
        header.push(Header::new("Content-Type", "application/json"));
    }

    let body =
        carries_body.then(|| Body::json(render_body(&example_body(route, rules, body_config))));

    Request::new(
        request_name(route),
        RequestSpec {
            method,
            header,
            url: build_url(&route.uri),
            body,
            extra: Map::new(),
        },
    )
}

fn example_body(
    route: &RouteDescriptor,
    rules: &dyn RuleSource,
    body_config: &RequestBodyConfig,
) -> Value {
    if !body_config.generate_examples {
        return Value::Object(Map::new());
    }
    let Some(rule_map) = route.handler.as_deref().and_then(|h| rules.rules_for(h)) else {
        tracing::debug!(uri = %route.uri, "no validation rules resolved, using empty body");
        return Value::Object(Map::new());
    };
    let fields = describe_fields(&rule_map, &body_config.example_values);
    synthesize(&fields, body_config.required_only)
}

fn render_body(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use courier_core::{RuleMap, parse_rules};
    use insta::assert_snapshot;
    use rstest::rstest;

    use super::*;
    use crate::source::NoRules;
    use crate::test_helpers::{folder_names, request_names};

    fn user_rules() -> HashMap<String, RuleMap> {
        let mut rules = RuleMap::new();
        rules.insert("email".to_string(), parse_rules("required|email"));
        rules.insert("age".to_string(), parse_rules("integer|min:18"));
        HashMap::from([("UserController@store".to_string(), rules)])
    }

    fn routes() -> Vec<RouteDescriptor> {
        vec![
            RouteDescriptor::new("api/users", &["GET", "HEAD"])
                .named("users.index")
                .handled_by("App\\Http\\Controllers\\UserController@index"),
            RouteDescriptor::new("api/users", &["POST"])
                .named("users.store")
                .handled_by("UserController@store"),
            RouteDescriptor::new("api/orders/{order}", &["DELETE"])
                .handled_by("App\\Http\\Controllers\\OrderController@destroy"),
            RouteDescriptor::new("health", &["GET"]),
        ]
    }

    #[test]
    fn test_group_by_controller_sorted() {
        let doc = assemble(&routes(), &NoRules, &CourierConfig::default());
        assert_eq!(
            folder_names(&doc),
            vec!["OrderController", "Other", "UserController"]
        );
        assert_eq!(
            request_names(&doc, "UserController"),
            vec!["Users Index", "Users Store"]
        );
    }

    #[rstest]
    #[case(GroupBy::Prefix, vec!["Api", "Health"])]
    #[case(GroupBy::None, vec![ALL_ROUTES_GROUP])]
    fn test_other_groupings(#[case] group_by: GroupBy, #[case] expected: Vec<&str>) {
        let mut config = CourierConfig::default();
        config.routes.group_by = group_by;
        let doc = assemble(&routes(), &NoRules, &config);
        assert_eq!(folder_names(&doc), expected);
        assert_eq!(doc.request_count(), 4);
    }

    #[test]
    fn test_empty_routes() {
        let doc = assemble(&[], &NoRules, &CourierConfig::default());
        assert!(doc.item.is_empty());
        assert_eq!(doc.variable, vec![Variable::new("base_url", "http://localhost")]);
        assert!(Uuid::parse_str(&doc.info.id).is_ok());
    }

    #[test]
    fn test_fresh_id_per_assembly() {
        let config = CourierConfig::default();
        let first = assemble(&routes(), &NoRules, &config);
        let second = assemble(&routes(), &NoRules, &config);
        assert_ne!(first.info.id, second.info.id);
        assert_eq!(first.item, second.item);
    }

    #[test]
    fn test_filters_applied_before_grouping() {
        let mut config = CourierConfig::default();
        config.routes.prefix = Some("api".to_string());
        config.routes.exclude = vec!["api/orders/*".to_string()];
        let doc = assemble(&routes(), &NoRules, &config);
        assert_eq!(folder_names(&doc), vec!["UserController"]);
    }

    #[test]
    fn test_get_route_with_path_variable() {
        let route = RouteDescriptor::new("/v1/users/{id}", &["GET", "HEAD"]);
        let request = build_request(&route, &NoRules, &RequestBodyConfig::default());
        assert_eq!(request.request.method, "GET");
        assert_eq!(request.request.url.variable[0].key, "id");
        assert_eq!(request.request.url.variable[0].value, "1");
        assert_eq!(request.request.body, None);
        assert_eq!(request.request.header, vec![Header::new("Accept", "application/json")]);
    }

    #[rstest]
    #[case(&["PUT"], true)]
    #[case(&["PATCH"], true)]
    #[case(&["DELETE"], false)]
    #[case(&["OPTIONS"], false)]
    fn test_body_only_for_body_methods(#[case] methods: &[&str], #[case] has_body: bool) {
        let route = RouteDescriptor::new("api/users/{id}", methods);
        let request = build_request(&route, &NoRules, &RequestBodyConfig::default());
        assert_eq!(request.request.body.is_some(), has_body);
        assert_eq!(request.request.header.len(), if has_body { 2 } else { 1 });
    }

    #[rstest]
    #[case(&["CONNECT"], "CONNECT")]
    #[case(&["HEAD", "purge"], "PURGE")]
    fn test_unknown_verb_kept_without_body(#[case] methods: &[&str], #[case] expected: &str) {
        let route = RouteDescriptor::new("api/tunnel", methods);
        let request = build_request(&route, &NoRules, &RequestBodyConfig::default());
        assert_eq!(request.request.method, expected);
        assert_eq!(request.request.body, None);
        assert_eq!(request.request.header, vec![Header::new("Accept", "application/json")]);
    }

    #[test]
    fn test_body_without_rules_is_empty_object() {
        let route = RouteDescriptor::new("api/users", &["POST"]).handled_by("Unknown@store");
        let request = build_request(&route, &user_rules(), &RequestBodyConfig::default());
        assert_eq!(request.request.body, Some(Body::json("{}")));
    }

    #[test]
    fn test_generate_examples_disabled() {
        let route = RouteDescriptor::new("api/users", &["POST"]).handled_by("UserController@store");
        let body_config = RequestBodyConfig {
            generate_examples: false,
            ..RequestBodyConfig::default()
        };
        let request = build_request(&route, &user_rules(), &body_config);
        assert_eq!(request.request.body, Some(Body::json("{}")));
    }

    #[test]
    fn test_post_request_snapshot() {
        let route = RouteDescriptor::new("api/users", &["POST"])
            .named("users.store")
            .handled_by("UserController@store");
        let request = build_request(&route, &user_rules(), &RequestBodyConfig::default());
        assert_snapshot!(serde_json::to_string_pretty(&request).unwrap(), @r#"
        {
          "name": "Users Store",
          "request": {
            "method": "POST",
            "header": [
              {
                "key": "Accept",
                "value": "application/json",
                "type": "text"
              },
              {
                "key": "Content-Type",
                "value": "application/json",
                "type": "text"
              }
            ],
            "url": {
              "raw": "{{base_url}}/api/users",
              "host": [
                "{{base_url}}"
              ],
              "path": [
                "api",
                "users"
              ],
              "variable": []
            },
            "body": {
              "mode": "raw",
              "raw": "{\n  \"email\": \"user@example.com\",\n  \"age\": 18\n}",
              "options": {
                "raw": {
                  "language": "json"
                }
              }
            }
          },
          "response": []
        }
        "#);
    }
}
