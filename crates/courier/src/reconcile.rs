//! Reconciliation of a freshly assembled collection with a published one.
//!
//! # Overview
//!
//! Sibling lists are merged by node name:
//!
//! - a fresh node with a same-named prior node is merged with it (folders
//!   recurse, requests take the fresh node and copy the preserved field paths
//!   over from the prior one),
//! - a fresh node without a prior match is kept as is,
//! - prior nodes left unmatched are appended after the fresh siblings, in
//!   their prior order. Routes that vanished are never deleted here; removing
//!   them is a manual decision.
//!
//! When a prior sibling list repeats a name, the last node with that name is
//! the one matched (and the one kept if unmatched), at the position where the
//! name first appeared. Prior nodes without a name cannot be matched and are
//! all kept.
//!
//! Prior nodes that did not fit the typed model ([`Node::Other`]) still take
//! part: they are kept verbatim when orphaned, and a fresh request matched
//! with one copies the preserved paths over from it.
//!
//! The merge is a pure function of its inputs: the prior document is only
//! read, and the same inputs always give the same document.

use courier_core::{Document, Folder, Info, Node, Variable};
use indexmap::IndexMap;

use crate::config::MergeConfig;
use crate::field_path;

/// Reconciler configured from the `merge` section.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: MergeConfig,
}

impl Reconciler {
    pub fn new(config: &MergeConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Merge `fresh` with `prior`; returns `fresh` unchanged when there is no
    /// prior document or merging is disabled.
    pub fn reconcile(&self, fresh: Document, prior: Option<&Document>) -> Document {
        match prior {
            Some(prior) if self.config.enabled => {
                reconcile(&fresh, Some(prior), &self.config.preserve_fields)
            }
            Some(_) => {
                tracing::debug!("merging disabled, using fresh collection");
                fresh
            }
            None => fresh,
        }
    }
}

/// Merge `fresh` with `prior`, preserving `preserve_fields` on matched nodes.
///
/// Besides the tree merge, the prior `info._postman_id` is kept so the
/// collection identity is stable across cycles, and prior variables whose key
/// is not generated any more are appended after the fresh ones.
pub fn reconcile(fresh: &Document, prior: Option<&Document>, preserve_fields: &[String]) -> Document {
    let Some(prior) = prior else {
        return fresh.clone();
    };

    let item = merge_siblings(&fresh.item, &prior.item, preserve_fields);
    tracing::info!(
        fresh = fresh.item.len(),
        kept_from_prior = item.len() - fresh.item.len(),
        "reconciled collection"
    );

    let id = if prior.info.id.is_empty() {
        fresh.info.id.clone()
    } else {
        prior.info.id.clone()
    };

    Document {
        info: Info {
            id,
            ..fresh.info.clone()
        },
        item,
        variable: merge_variables(&fresh.variable, &prior.variable),
        extra: fresh.extra.clone(),
    }
}

fn merge_siblings(fresh: &[Node], prior: &[Node], preserve_fields: &[String]) -> Vec<Node> {
    let mut index: IndexMap<&str, &Node> = IndexMap::new();
    let mut unnamed = Vec::new();
    for node in prior {
        if node.name().is_empty() {
            unnamed.push(node);
        } else {
            index.insert(node.name(), node);
        }
    }

    let mut merged = Vec::with_capacity(fresh.len() + prior.len());
    for node in fresh {
        match index.shift_remove(node.name()) {
            Some(prior_node) => merged.push(merge_node(node, prior_node, preserve_fields)),
            None => merged.push(node.clone()),
        }
    }

    for (name, orphan) in index {
        tracing::debug!(name, "keeping node missing from the current routes");
        merged.push(orphan.clone());
    }
    merged.extend(unnamed.into_iter().cloned());
    merged
}

fn merge_node(fresh: &Node, prior: &Node, preserve_fields: &[String]) -> Node {
    match (fresh, prior) {
        (Node::Folder(fresh_folder), Node::Folder(prior_folder)) => {
            let folder = Node::Folder(Folder {
                item: merge_siblings(&fresh_folder.item, &prior_folder.item, preserve_fields),
                ..fresh_folder.clone()
            });
            preserve(&folder, prior, preserve_fields)
        }
        (Node::Request(_), Node::Request(_) | Node::Other(_)) => {
            preserve(fresh, prior, preserve_fields)
        }
        _ => {
            tracing::debug!(name = fresh.name(), "node kind changed, using fresh node");
            fresh.clone()
        }
    }
}

/// Copy every preserved path present in `prior` onto `merged`.
fn preserve(merged: &Node, prior: &Node, preserve_fields: &[String]) -> Node {
    if preserve_fields.is_empty() {
        return merged.clone();
    }
    let (Ok(mut target), Ok(source)) = (serde_json::to_value(merged), serde_json::to_value(prior))
    else {
        return merged.clone();
    };

    let mut changed = false;
    for path in preserve_fields {
        let Some(value) = field_path::lookup(&source, path).filter(|v| !v.is_null()) else {
            continue;
        };
        if field_path::lookup(&target, path) == Some(value) {
            continue;
        }
        if field_path::upsert(&mut target, path, value.clone()) {
            changed = true;
        } else {
            tracing::warn!(name = merged.name(), path = %path, "preserved field has no place in the new node");
        }
    }
    if !changed {
        return merged.clone();
    }

    serde_json::from_value::<Node>(target).unwrap_or_else(|error| {
        tracing::warn!(name = merged.name(), %error, "preserved fields do not fit the node, dropping them");
        merged.clone()
    })
}

fn merge_variables(fresh: &[Variable], prior: &[Variable]) -> Vec<Variable> {
    let mut merged = fresh.to_vec();
    for variable in prior {
        if !merged.iter().any(|v| v.key == variable.key) {
            merged.push(variable.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::test_helpers::{document, folder, names, request};

    fn paths(paths: &[&str]) -> Vec<String> {
        paths.iter().map(ToString::to_string).collect()
    }

    fn fresh() -> Document {
        document(
            "fresh-id",
            vec![folder(
                "Users",
                vec![request("Get User", "GET", "users/:id"), request("Create User", "POST", "users")],
            )],
        )
    }

    fn prior() -> Document {
        let mut get_user = request("Get User", "GET", "users/:id");
        if let Node::Request(r) = &mut get_user {
            r.request.extra.insert("description".into(), json!("legacy"));
            r.request.extra.insert("auth".into(), json!({ "type": "bearer" }));
            r.extra.insert("event".into(), json!([{ "listen": "test" }]));
        }
        let mut doc = document(
            "prior-id",
            vec![
                folder(
                    "Users",
                    vec![get_user, request("Delete User", "DELETE", "users/:id")],
                ),
                folder("Legacy", vec![request("Old Report", "GET", "reports/old")]),
            ],
        );
        doc.variable.push(Variable::new("token", "secret"));
        doc
    }

    #[test]
    fn test_no_prior_is_identity() {
        let fresh = fresh();
        assert_eq!(reconcile(&fresh, None, &paths(&["request.description"])), fresh);
    }

    #[test]
    fn test_disabled_merge_is_identity() {
        let config = MergeConfig {
            enabled: false,
            ..MergeConfig::default()
        };
        let fresh = fresh();
        let merged = Reconciler::new(&config).reconcile(fresh.clone(), Some(&prior()));
        assert_eq!(merged, fresh);
    }

    #[test]
    fn test_preserves_description() {
        let merged = reconcile(&fresh(), Some(&prior()), &paths(&["request.description"]));
        let node = merged.find(&["Users", "Get User"]).unwrap().as_request().unwrap();
        assert_eq!(node.request.extra["description"], "legacy");
        assert!(!node.request.extra.contains_key("auth"));
        assert!(!node.extra.contains_key("event"));
    }

    #[test]
    fn test_preserves_default_fields() {
        let reconciler = Reconciler::new(&MergeConfig::default());
        let merged = reconciler.reconcile(fresh(), Some(&prior()));
        let node = merged.find(&["Users", "Get User"]).unwrap().as_request().unwrap();
        assert_eq!(node.request.extra["auth"], json!({ "type": "bearer" }));
        assert_eq!(node.extra["event"], json!([{ "listen": "test" }]));
    }

    #[test]
    fn test_absent_prior_value_keeps_fresh() {
        let mut fresh = fresh();
        if let Node::Folder(users) = &mut fresh.item[0]
            && let Node::Request(create) = &mut users.item[1]
        {
            create.request.extra.insert("description".into(), json!("generated"));
        }
        let mut prior = prior();
        if let Node::Folder(users) = &mut prior.item[0] {
            users.item.push(request("Create User", "POST", "users"));
        }
        let merged = reconcile(&fresh, Some(&prior), &paths(&["request.description"]));
        let node = merged.find(&["Users", "Create User"]).unwrap().as_request().unwrap();
        assert_eq!(node.request.extra["description"], "generated");
    }

    #[test]
    fn test_orphans_follow_fresh_siblings() {
        let merged = reconcile(&fresh(), Some(&prior()), &[]);
        let top: Vec<&str> = merged.item.iter().map(Node::name).collect();
        assert_eq!(top, vec!["Users", "Legacy"]);
        assert_eq!(
            names(merged.item[0].children()),
            vec!["Get User", "Create User", "Delete User"]
        );
    }

    #[test]
    fn test_empty_preserve_list_unions_only() {
        let merged = reconcile(&fresh(), Some(&prior()), &[]);
        let node = merged.find(&["Users", "Get User"]).unwrap();
        assert_eq!(node, fresh().find(&["Users", "Get User"]).unwrap());
    }

    #[test]
    fn test_identity_and_variables() {
        let merged = reconcile(&fresh(), Some(&prior()), &[]);
        assert_eq!(merged.info.id, "prior-id");
        let keys: Vec<&str> = merged.variable.iter().map(|v| v.key.as_str()).collect();
        assert_eq!(keys, vec!["base_url", "token"]);
    }

    #[test]
    fn test_empty_prior_id_keeps_fresh_id() {
        let mut prior = prior();
        prior.info.id = String::new();
        assert_eq!(reconcile(&fresh(), Some(&prior), &[]).info.id, "fresh-id");
    }

    #[rstest]
    #[case(&[])]
    #[case(&["request.description"])]
    #[case(&["request.description", "request.auth", "event"])]
    #[case(&["request.header.0.value", "description"])]
    fn test_idempotent(#[case] preserve: &[&str]) {
        let preserve = paths(preserve);
        let fresh = fresh();
        let once = reconcile(&fresh, Some(&prior()), &preserve);
        let twice = reconcile(&fresh, Some(&once), &preserve);
        assert_eq!(twice, once);
        assert_eq!(
            serde_json::to_string(&twice).unwrap(),
            serde_json::to_string(&once).unwrap()
        );
    }

    #[test]
    fn test_deterministic_output() {
        let preserve = paths(&["request.description", "event"]);
        let a = reconcile(&fresh(), Some(&prior()), &preserve);
        let b = reconcile(&fresh(), Some(&prior()), &preserve);
        assert_eq!(
            serde_json::to_string_pretty(&a).unwrap(),
            serde_json::to_string_pretty(&b).unwrap()
        );
    }

    #[test]
    fn test_duplicate_prior_names_last_wins() {
        let mut first = request("Get User", "GET", "users/:id");
        if let Node::Request(r) = &mut first {
            r.request.extra.insert("description".into(), json!("first"));
        }
        let mut second = request("Get User", "GET", "users/:id");
        if let Node::Request(r) = &mut second {
            r.request.extra.insert("description".into(), json!("second"));
        }
        let prior = document("p", vec![folder("Users", vec![first, second])]);
        let merged = reconcile(&fresh(), Some(&prior), &paths(&["request.description"]));
        let node = merged.find(&["Users", "Get User"]).unwrap().as_request().unwrap();
        assert_eq!(node.request.extra["description"], "second");
        assert_eq!(names(merged.item[0].children()), vec!["Get User", "Create User"]);
    }

    #[test]
    fn test_kind_change_uses_fresh_node() {
        let prior = document("p", vec![request("Users", "GET", "users")]);
        let merged = reconcile(&fresh(), Some(&prior), &paths(&["request.description"]));
        assert!(merged.item[0].as_folder().is_some());
        assert_eq!(merged.item.len(), 1);
    }

    #[test]
    fn test_folder_fields_preserved() {
        let mut prior = prior();
        if let Node::Folder(users) = &mut prior.item[0] {
            users.extra.insert("description".into(), json!("All user endpoints"));
        }
        let merged = reconcile(&fresh(), Some(&prior), &paths(&["description"]));
        let users = merged.item[0].as_folder().unwrap();
        assert_eq!(users.extra["description"], "All user endpoints");
    }

    #[test]
    fn test_preserve_core_request_fields() {
        let mut prior = prior();
        if let Node::Folder(users) = &mut prior.item[0]
            && let Node::Request(get) = &mut users.item[0]
        {
            get.request.method = "PATCH".into();
        }
        let merged = reconcile(&fresh(), Some(&prior), &paths(&["request.method", "request.url"]));
        let node = merged.find(&["Users", "Get User"]).unwrap().as_request().unwrap();
        assert_eq!(node.request.method, "PATCH");
    }

    #[test]
    fn test_unmodelled_prior_nodes_take_part() {
        let legacy_get = json!({
            "name": "Get User",
            "request": "{{base_url}}/users/1",
            "event": [{ "listen": "test" }]
        });
        let legacy_report = json!({ "name": "Old Report", "request": "{{base_url}}/reports" });
        let prior = document(
            "p",
            vec![folder(
                "Users",
                vec![Node::Other(legacy_get), Node::Other(legacy_report.clone())],
            )],
        );
        let merged = reconcile(&fresh(), Some(&prior), &paths(&["request.description", "event"]));

        let get = merged.find(&["Users", "Get User"]).unwrap().as_request().unwrap();
        assert_eq!(get.extra["event"], json!([{ "listen": "test" }]));
        assert_eq!(get.request.method, "GET");
        assert_eq!(
            names(merged.item[0].children()),
            vec!["Get User", "Create User", "Old Report"]
        );
        assert_eq!(merged.item[0].children()[2], Node::Other(legacy_report));
    }

    #[test]
    fn test_unnamed_prior_nodes_all_kept() {
        let prior = document(
            "p",
            vec![folder("Users", vec![Node::Other(json!(1)), Node::Other(json!({ "note": "x" }))])],
        );
        let preserve = paths(&["event"]);
        let merged = reconcile(&fresh(), Some(&prior), &preserve);
        assert_eq!(
            merged.item[0].children()[2..],
            [Node::Other(json!(1)), Node::Other(json!({ "note": "x" }))]
        );
        assert_eq!(reconcile(&fresh(), Some(&merged), &preserve), merged);
    }
}
