//! Path-projection handles and the interception layer.
//!
//! A [`Handle`] is an immutable `(collection, path)` pair. Reading a key
//! produces a new handle with a longer path; nothing is resolved until the
//! handle is written, called or iterated, and every such use re-resolves
//! the path against the live members.

use std::fmt;
use std::rc::Rc;

use dome_host::{format_path, parse_path, split_last, PathStep, Value};
use tracing::debug;

use crate::events::{EventMode, EventProtocol};
use crate::navigate::{self, Resolution};
use crate::ops::{BaseOperation, BoundOperation};
use crate::DomeError;

/// Key of the flattening accessor.
pub const FLATTEN_KEY: &str = "$f";

/// Result of reading a key from a handle.
#[derive(Debug, Clone)]
pub enum Access {
    /// A path extension (or the flattened collection for `$f`).
    Handle(Handle),
    /// The `on` / `off` event sub-protocol.
    Events(EventProtocol),
    /// A base operation bound to the handle.
    Operation(BoundOperation),
}

impl Access {
    pub fn into_handle(self) -> Option<Handle> {
        match self {
            Access::Handle(h) => Some(h),
            _ => None,
        }
    }

    pub fn into_events(self) -> Option<EventProtocol> {
        match self {
            Access::Events(e) => Some(e),
            _ => None,
        }
    }

    pub fn into_operation(self) -> Option<BoundOperation> {
        match self {
            Access::Operation(op) => Some(op),
            _ => None,
        }
    }
}

/// One handle addressing a path inside every member of a collection.
#[derive(Clone)]
pub struct Handle {
    collection: Rc<[Value]>,
    path: Vec<PathStep>,
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("members", &self.collection.len())
            .field("path", &format_path(&self.path))
            .finish()
    }
}

impl Handle {
    /// A root handle (empty path) over `collection`.
    pub fn new(collection: impl IntoIterator<Item = Value>) -> Self {
        Self {
            collection: collection.into_iter().collect(),
            path: Vec::new(),
        }
    }

    pub(crate) fn with_path(collection: Rc<[Value]>, path: Vec<PathStep>) -> Self {
        Self { collection, path }
    }

    pub fn collection(&self) -> &[Value] {
        &self.collection
    }

    pub fn path(&self) -> &[PathStep] {
        &self.path
    }

    /// Appends `key` to the path without checking reserved names.
    pub fn extend(&self, key: impl Into<PathStep>) -> Handle {
        let mut path = self.path.clone();
        path.push(key.into());
        Self::with_path(Rc::clone(&self.collection), path)
    }

    /// The handle covering the same collection at `path[..-1]`.
    pub(crate) fn parent(&self) -> Option<(Handle, &PathStep)> {
        let (init, last) = split_last(&self.path)?;
        Some((
            Self::with_path(Rc::clone(&self.collection), init.to_vec()),
            last,
        ))
    }

    /// Reads `key`. Event and base-operation names take precedence over
    /// host properties of the same name.
    pub fn read_key(&self, key: impl Into<PathStep>) -> Result<Access, DomeError> {
        let key = key.into();
        let PathStep::Key(name) = &key else {
            return Ok(Access::Handle(self.extend(key)));
        };
        match name.as_str() {
            "on" => return Ok(Access::Events(self.events(EventMode::Subscribe))),
            "off" => return Ok(Access::Events(self.events(EventMode::Unsubscribe))),
            FLATTEN_KEY => return self.flatten().map(Access::Handle),
            _ => {}
        }
        if let Some(op) = BaseOperation::from_name(name) {
            return Ok(Access::Operation(BoundOperation::new(op, self.clone())));
        }
        Ok(Access::Handle(self.extend(key)))
    }

    /// Reads `key`, requiring a plain path extension.
    ///
    /// `$f` is accepted since it yields a handle; `on`, `off` and the base
    /// operation names are [`DomeError::ReservedKey`].
    pub fn prop(&self, key: impl Into<PathStep>) -> Result<Handle, DomeError> {
        let key = key.into();
        let name = key.to_string();
        self.read_key(key)?
            .into_handle()
            .ok_or(DomeError::ReservedKey { key: name })
    }

    /// Follows a textual path such as `"style.color"` or `"childNodes[2].value"`.
    pub fn at(&self, path: &str) -> Result<Handle, DomeError> {
        parse_path(path)?
            .into_iter()
            .try_fold(self.clone(), |handle, step| handle.prop(step))
    }

    /// Resolves the full path on every member.
    pub fn resolve(&self) -> Vec<Resolution> {
        navigate::resolve(&self.collection, &self.path)
    }

    /// The values at the full path, in collection order.
    pub fn values(&self) -> Vec<Value> {
        navigate::values(&self.collection, &self.path)
    }

    pub fn iter(&self) -> std::vec::IntoIter<Value> {
        self.values().into_iter()
    }

    fn split(&self, op: &'static str) -> Result<(Vec<Resolution>, &PathStep), DomeError> {
        let (parent, last) = self
            .parent()
            .ok_or(DomeError::InvalidPathOperation { op })?;
        Ok((parent.resolve(), last))
    }

    /// Sets the last path step to `value` on every reachable receiver.
    pub fn assign(&self, value: Value) -> Result<(), DomeError> {
        let (receivers, key) = self.split("assign")?;
        for receiver in &receivers {
            receiver.value.set(key, value.clone())?;
        }
        Ok(())
    }

    /// Writes `key`. Writing a mapping to `on` / `off` subscribes or
    /// unsubscribes each of its entries.
    pub fn write_key(&self, key: impl Into<PathStep>, value: Value) -> Result<(), DomeError> {
        let key = key.into();
        let mode = match key.as_key() {
            Some("on") => Some(EventMode::Subscribe),
            Some("off") => Some(EventMode::Unsubscribe),
            _ => None,
        };
        match mode {
            Some(mode) => match &value {
                Value::Map(map) => self.events(mode).bind_map(map).map(drop),
                other => Err(DomeError::InvalidEventArguments(format!(
                    "`{key}` only accepts a mapping of event names to handlers, got {}",
                    other.type_name()
                ))),
            },
            None => self.extend(key).assign(value),
        }
    }

    /// Calls the method named by the last path step on every reachable
    /// receiver. The results form a new root handle.
    pub fn invoke(&self, args: &[Value]) -> Result<Handle, DomeError> {
        let (receivers, method) = self.split("invoke")?;
        debug!(%method, receivers = receivers.len(), "invoke");
        let results = receivers
            .iter()
            .map(|r| r.value.invoke(method, args))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Handle::new(results))
    }

    /// `self.extend(name).invoke(args)`.
    pub fn call_method(&self, name: &str, args: &[Value]) -> Result<Handle, DomeError> {
        self.extend(name).invoke(args)
    }

    fn events(&self, mode: EventMode) -> EventProtocol {
        EventProtocol::new(self.clone(), mode)
    }

    /// The subscribing event sub-protocol for this handle.
    pub fn on(&self) -> EventProtocol {
        self.events(EventMode::Subscribe)
    }

    /// The unsubscribing event sub-protocol for this handle.
    pub fn off(&self) -> EventProtocol {
        self.events(EventMode::Unsubscribe)
    }
}

impl IntoIterator for &Handle {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data() -> Handle {
        Handle::new([
            Value::from(json!({"style": {"color": "red"}, "n": 1})),
            Value::from(json!({"style": {"color": "blue"}})),
            Value::from(json!({"n": 3})),
        ])
    }

    #[test]
    fn test_read_key_extends_path() {
        let h = data().prop("style").unwrap().prop("color").unwrap();
        assert_eq!(h.path(), &[PathStep::from("style"), PathStep::from("color")]);
        assert_eq!(h.values(), vec![Value::from("red"), Value::from("blue")]);
    }

    #[test]
    fn test_at_matches_chained_props() {
        let a = data().at("style.color").unwrap();
        let b = data().prop("style").unwrap().prop("color").unwrap();
        assert_eq!(a.path(), b.path());
        assert!(data().at("style..color").is_err());
    }

    #[test]
    fn test_reserved_keys() {
        let h = data();
        assert!(matches!(h.read_key("on").unwrap(), Access::Events(_)));
        assert!(matches!(h.read_key("off").unwrap(), Access::Events(_)));
        for name in ["forEach", "map", "filter", "update", "flat", "flatten", "$"] {
            assert!(
                matches!(h.read_key(name).unwrap(), Access::Operation(_)),
                "{name}"
            );
            assert_eq!(
                h.prop(name).unwrap_err(),
                DomeError::ReservedKey { key: name.into() }
            );
        }
        assert_eq!(h.extend("map").path(), &[PathStep::from("map")]);
    }

    #[test]
    fn test_index_steps_are_never_reserved() {
        let h = Handle::new([Value::from(json!([10, 20]))]);
        assert_eq!(h.prop(1usize).unwrap().values(), vec![Value::from(20i64)]);
    }

    #[test]
    fn test_empty_path_operations_fail() {
        let h = data();
        assert_eq!(
            h.assign(Value::Null).unwrap_err(),
            DomeError::InvalidPathOperation { op: "assign" }
        );
        assert_eq!(
            h.invoke(&[]).unwrap_err(),
            DomeError::InvalidPathOperation { op: "invoke" }
        );
    }

    #[test]
    fn test_plain_data_rejects_writes() {
        let err = data().prop("n").unwrap().assign(Value::from(2i64)).unwrap_err();
        assert!(matches!(err, DomeError::Host(_)));
    }

    #[test]
    fn test_write_key_on_requires_mapping() {
        let err = data().write_key("on", Value::from(1i64)).unwrap_err();
        assert!(matches!(err, DomeError::InvalidEventArguments(_)));
    }

    #[test]
    fn test_iteration_re_resolves() {
        let h = data().prop("n").unwrap();
        let collected: Vec<Value> = (&h).into_iter().collect();
        assert_eq!(collected, vec![Value::from(1i64), Value::from(3i64)]);
        assert_eq!(h.iter().count(), 2);
    }
}
