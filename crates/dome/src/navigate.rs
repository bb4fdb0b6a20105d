//! Per-object path resolution.

use dome_host::{PathStep, Value};
use tracing::trace;

/// What one collection member resolved to.
///
/// `ancestor` is the nearest tree node met while walking the path, starting
/// with the member itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub value: Value,
    pub ancestor: Value,
}

fn walk(object: &Value, path: &[PathStep]) -> Option<Resolution> {
    let mut value = object.clone();
    let mut ancestor = object.clone();
    for step in path {
        value = match value.get(step) {
            Some(Value::Undefined) | None => return None,
            Some(next) => next,
        };
        if value.is_node() {
            ancestor = value.clone();
        }
    }
    Some(Resolution { value, ancestor })
}

/// Resolves `path` against every member of `collection`, in order.
///
/// Members on which some step yields nothing are dropped silently. `Null`
/// is a value when it is the last step, but stepping through it yields
/// nothing, so `{"a": null}` is dropped for the path `a.b`.
pub fn resolve(collection: &[Value], path: &[PathStep]) -> Vec<Resolution> {
    let out: Vec<Resolution> = collection.iter().filter_map(|o| walk(o, path)).collect();
    if out.len() < collection.len() {
        trace!(
            path = %dome_host::format_path(path),
            dropped = collection.len() - out.len(),
            "unreachable members"
        );
    }
    out
}

/// Like [`resolve`], keeping only the values.
pub fn values(collection: &[Value], path: &[PathStep]) -> Vec<Value> {
    resolve(collection, path).into_iter().map(|r| r.value).collect()
}
