//! Dotted paths into JSON values (`request.auth`, `request.header.0.value`).
//!
//! Segments address object keys; on arrays a numeric segment addresses an
//! index. Writing creates missing intermediate objects but never grows an
//! array.

use serde_json::{Map, Value};

fn segments(path: &str) -> Vec<&str> {
    path.split('.').filter(|s| !s.is_empty()).collect()
}

/// Value at `path`, or `None` when any segment is missing.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let segments = segments(path);
    if segments.is_empty() {
        return None;
    }
    segments.into_iter().try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Write `new` at `path`, creating missing intermediate objects.
///
/// Returns `false` when the path is empty or runs through an array index that
/// does not exist; `target` is left untouched in that case.
pub fn upsert(target: &mut Value, path: &str, new: Value) -> bool {
    let segments = segments(path);
    let Some((last, parents)) = segments.split_last() else {
        return false;
    };
    if !reachable(target, parents, last) {
        return false;
    }

    let mut current = target;
    for segment in parents {
        current = descend(current, segment);
    }
    match current {
        Value::Array(items) => {
            if let Some(slot) = last.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
                *slot = new;
            }
        }
        Value::Object(map) => {
            map.insert((*last).to_string(), new);
        }
        other => {
            let mut map = Map::new();
            map.insert((*last).to_string(), new);
            *other = Value::Object(map);
        }
    }
    true
}

/// Check the walk can complete before mutating anything.
fn reachable(target: &Value, parents: &[&str], last: &str) -> bool {
    let mut current = Some(target);
    for segment in parents.iter().chain(std::iter::once(&last)) {
        current = match current {
            Some(Value::Array(items)) => match segment.parse::<usize>().ok() {
                Some(i) if i < items.len() => Some(&items[i]),
                _ => return false,
            },
            Some(Value::Object(map)) => map.get(*segment),
            // scalars and missing keys get replaced by fresh objects
            _ => None,
        };
    }
    true
}

fn descend<'a>(current: &'a mut Value, segment: &str) -> &'a mut Value {
    if current.is_array() {
        let Value::Array(items) = current else {
            unreachable!("checked by is_array")
        };
        let index = segment.parse::<usize>().unwrap_or_default();
        return &mut items[index];
    }
    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    let Value::Object(map) = current else {
        unreachable!("current was just made an object")
    };
    let child = map
        .entry(segment.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !child.is_object() && !child.is_array() {
        *child = Value::Object(Map::new());
    }
    child
}
