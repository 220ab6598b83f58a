//! Example request bodies built from field descriptors.
//!
//! Each admitted field's example is placed at its dotted path. `*` and purely
//! numeric segments become index `0`, so `items.*.sku` yields
//! `{"items": [{"sku": ...}]}` with a single representative element.

use courier_core::{FieldDescriptor, RuleMap};
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::config::ExampleValues;
use crate::interpreter::interpret;

/// Field descriptors of one handler, keyed by dotted path in rule order.
pub type FieldMap = IndexMap<String, FieldDescriptor>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Key(String),
    Index,
}

/// Interpret every field of a handler's rule map.
pub fn describe_fields(rules: &RuleMap, examples: &ExampleValues) -> FieldMap {
    rules
        .iter()
        .map(|(path, tokens)| (path.clone(), interpret(path, tokens, examples)))
        .collect()
}

/// Assemble the example payload for a set of fields.
///
/// Fields are visited in map order. With `required_only`, optional fields are
/// skipped. The result is always a JSON object.
pub fn synthesize(fields: &FieldMap, required_only: bool) -> Value {
    let mut root = Value::Object(Map::new());
    for field in fields.values() {
        if required_only && !field.required {
            continue;
        }
        let segments = split_path(&field.path);
        if segments.is_empty() {
            continue;
        }
        place(&mut root, &segments, field.example.clone());
    }
    root
}

fn split_path(path: &str) -> Vec<Segment> {
    path.split('.')
        .filter(|s| !s.is_empty())
        .map(|s| {
            if s == "*" || s.chars().all(|c| c.is_ascii_digit()) {
                Segment::Index
            } else {
                Segment::Key(s.to_string())
            }
        })
        .collect()
}

fn place(slot: &mut Value, segments: &[Segment], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        // a leaf never clobbers a container that already holds nested fields
        if !is_populated_container(slot) {
            *slot = value;
        }
        return;
    };
    place(child_slot(slot, head), rest, value);
}

fn is_populated_container(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

fn child_slot<'a>(slot: &'a mut Value, segment: &Segment) -> &'a mut Value {
    match segment {
        Segment::Key(key) => {
            match slot {
                Value::Object(_) => {}
                Value::Array(items) if !items.is_empty() => {
                    let map = std::mem::take(items)
                        .into_iter()
                        .enumerate()
                        .map(|(i, v)| (i.to_string(), v))
                        .collect();
                    *slot = Value::Object(map);
                }
                _ => *slot = Value::Object(Map::new()),
            }
            let Value::Object(map) = slot else {
                unreachable!("slot was just made an object")
            };
            map.entry(key.clone()).or_insert(Value::Null)
        }
        Segment::Index => {
            if slot.is_object() {
                let Value::Object(map) = slot else {
                    unreachable!("slot is an object")
                };
                return map.entry("0".to_string()).or_insert(Value::Null);
            }
            if !slot.is_array() {
                *slot = Value::Array(Vec::new());
            }
            let Value::Array(items) = slot else {
                unreachable!("slot was just made an array")
            };
            if items.is_empty() {
                items.push(Value::Null);
            }
            &mut items[0]
        }
    }
}
