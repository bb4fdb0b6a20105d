//! Collection-level operations available on every handle.

use std::convert::Infallible;

use dome_host::{Function, Value};
use tracing::debug;

use crate::{DomeError, Handle};

/// The verbs reachable through [`Handle::read_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseOperation {
    ForEach,
    Map,
    Filter,
    Update,
    Flatten,
    Query,
}

impl BaseOperation {
    pub const ALL: [BaseOperation; 6] = [
        BaseOperation::ForEach,
        BaseOperation::Map,
        BaseOperation::Filter,
        BaseOperation::Update,
        BaseOperation::Flatten,
        BaseOperation::Query,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "forEach" => BaseOperation::ForEach,
            "map" => BaseOperation::Map,
            "filter" => BaseOperation::Filter,
            "update" => BaseOperation::Update,
            "flat" | "flatten" => BaseOperation::Flatten,
            "$" => BaseOperation::Query,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            BaseOperation::ForEach => "forEach",
            BaseOperation::Map => "map",
            BaseOperation::Filter => "filter",
            BaseOperation::Update => "update",
            BaseOperation::Flatten => "flat",
            BaseOperation::Query => "$",
        }
    }
}

/// A base operation captured together with the handle it was read from.
#[derive(Debug, Clone)]
pub struct BoundOperation {
    op: BaseOperation,
    handle: Handle,
}

impl BoundOperation {
    pub(crate) fn new(op: BaseOperation, handle: Handle) -> Self {
        Self { op, handle }
    }

    pub fn op(&self) -> BaseOperation {
        self.op
    }

    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    fn callback(&self, args: &[Value]) -> Result<Function, DomeError> {
        args.first()
            .and_then(Value::as_function)
            .cloned()
            .ok_or_else(|| {
                DomeError::InvalidArgument(format!("{} expects a function", self.op.name()))
            })
    }

    /// Runs the operation with dynamic arguments.
    ///
    /// Callbacks are called with `this` undefined: `forEach` and `map` pass
    /// `[value]`, `filter` and `update` pass `[value, ancestor]`. `$` takes a
    /// selector string. Returns `None` for `forEach`.
    pub fn call(&self, args: &[Value]) -> Result<Option<Handle>, DomeError> {
        let this = Value::Undefined;
        let handle = &self.handle;
        match self.op {
            BaseOperation::ForEach => {
                let f = self.callback(args)?;
                handle.try_for_each(|v| f.call(&this, &[v.clone()]).map(drop))?;
                Ok(None)
            }
            BaseOperation::Map => {
                let f = self.callback(args)?;
                Ok(Some(handle.try_map(|v| f.call(&this, &[v.clone()]))?))
            }
            BaseOperation::Filter => {
                let f = self.callback(args)?;
                let kept = handle.try_filter(|v, ancestor| {
                    f.call(&this, &[v.clone(), ancestor.clone()])
                        .map(|r| r.is_truthy())
                })?;
                Ok(Some(kept))
            }
            BaseOperation::Update => {
                let f = self.callback(args)?;
                let updated = handle.try_update(|v, ancestor| {
                    Ok(f.call(&this, &[v.clone(), ancestor.clone()])?)
                })?;
                Ok(Some(updated))
            }
            BaseOperation::Flatten => handle.flatten().map(Some),
            BaseOperation::Query => {
                let selector = args.first().and_then(Value::as_str).ok_or_else(|| {
                    DomeError::InvalidArgument("$ expects a selector string".to_owned())
                })?;
                handle.query(selector).map(Some)
            }
        }
    }
}

fn infallible<T>(result: Result<T, Infallible>) -> T {
    match result {
        Ok(v) => v,
        Err(never) => match never {},
    }
}

impl Handle {
    /// Calls `f` on every value at the full path.
    pub fn for_each(&self, mut f: impl FnMut(&Value)) {
        infallible(self.try_for_each(|v| {
            f(v);
            Ok(())
        }))
    }

    /// Like [`Handle::for_each`], stopping at the first error.
    pub fn try_for_each<E>(&self, f: impl FnMut(&Value) -> Result<(), E>) -> Result<(), E> {
        self.values().iter().try_for_each(f)
    }

    /// A new root handle over `f` applied to every value at the full path.
    pub fn map(&self, mut f: impl FnMut(&Value) -> Value) -> Handle {
        infallible(self.try_map(|v| Ok(f(v))))
    }

    pub fn try_map<E>(&self, f: impl FnMut(&Value) -> Result<Value, E>) -> Result<Handle, E> {
        let mapped = self.values().iter().map(f).collect::<Result<Vec<_>, E>>()?;
        Ok(Handle::new(mapped))
    }

    /// Keeps the values at the parent path for which `pred(value, ancestor)`
    /// holds. With an empty path the members themselves are tested.
    pub fn filter(&self, mut pred: impl FnMut(&Value, &Value) -> bool) -> Handle {
        infallible(self.try_filter(|v, a| Ok(pred(v, a))))
    }

    pub fn try_filter<E>(
        &self,
        mut pred: impl FnMut(&Value, &Value) -> Result<bool, E>,
    ) -> Result<Handle, E> {
        let resolved = match self.parent() {
            Some((parent, _)) => parent.resolve(),
            None => self.resolve(),
        };
        let mut kept = Vec::new();
        for r in resolved {
            if pred(&r.value, &r.ancestor)? {
                kept.push(r.value);
            }
        }
        Ok(Handle::new(kept))
    }

    /// For every receiver at the parent path, replaces the property named by
    /// the last step with `f(current, ancestor)`. Absent properties are
    /// passed as `Undefined`. Returns a root handle over the receivers.
    pub fn update(&self, mut f: impl FnMut(&Value, &Value) -> Value) -> Result<Handle, DomeError> {
        self.try_update(|v, a| Ok(f(v, a)))
    }

    pub fn try_update(
        &self,
        mut f: impl FnMut(&Value, &Value) -> Result<Value, DomeError>,
    ) -> Result<Handle, DomeError> {
        let (parent, key) = self
            .parent()
            .ok_or(DomeError::InvalidPathOperation { op: "update" })?;
        let mut receivers = Vec::new();
        for r in parent.resolve() {
            let current = r.value.get(key).unwrap_or_default();
            let next = f(&current, &r.ancestor)?;
            r.value.set(key, next)?;
            receivers.push(r.value);
        }
        Ok(Handle::new(receivers))
    }

    /// Concatenates the items of every value at the full path, one level deep.
    pub fn flatten(&self) -> Result<Handle, DomeError> {
        let mut flat = Vec::new();
        for group in self.values() {
            let items = group.items().ok_or_else(|| DomeError::NotIterable {
                type_name: group.type_name().to_owned(),
            })?;
            flat.extend(items);
        }
        Ok(Handle::new(flat))
    }

    /// Runs `querySelectorAll(selector)` on every value at the full path and
    /// flattens the matches.
    pub fn query(&self, selector: &str) -> Result<Handle, DomeError> {
        debug!(selector, path = %dome_host::format_path(self.path()), "nested query");
        self.call_method("querySelectorAll", &[Value::from(selector)])?
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dome_host::HostError;
    use serde_json::json;

    fn numbers() -> Handle {
        Handle::new([
            Value::from(json!({"n": 1})),
            Value::from(json!({"m": 2})),
            Value::from(json!({"n": 3})),
        ])
    }

    #[test]
    fn test_names_round_trip() {
        for op in BaseOperation::ALL {
            assert_eq!(BaseOperation::from_name(op.name()), Some(op));
        }
        assert_eq!(
            BaseOperation::from_name("flatten"),
            Some(BaseOperation::Flatten)
        );
        assert_eq!(BaseOperation::from_name("each"), None);
    }

    #[test]
    fn test_map_and_for_each_visit_same_values() {
        let h = numbers().extend("n");
        let mut seen = Vec::new();
        h.for_each(|v| seen.push(v.clone()));
        let mapped = h.map(|v| Value::from(v.as_f64().unwrap_or(0.0) * 10.0));
        assert_eq!(seen, vec![Value::from(1i64), Value::from(3i64)]);
        assert_eq!(mapped.values(), vec![Value::from(10i64), Value::from(30i64)]);
    }

    #[test]
    fn test_filter_uses_parent_path() {
        // the predicate sees the members holding `n`, not the numbers
        let kept = numbers()
            .extend("n")
            .filter(|v, _| v.get(&"n".into()) == Some(Value::from(3i64)));
        assert_eq!(kept.values(), vec![Value::from(json!({"n": 3}))]);

        let members = numbers().filter(|v, _| v.get(&"m".into()).is_some());
        assert_eq!(members.values(), vec![Value::from(json!({"m": 2}))]);
    }

    #[test]
    fn test_try_map_stops_on_first_error() {
        let mut calls = 0;
        let err = numbers()
            .try_map(|_| {
                calls += 1;
                Err::<Value, _>("boom")
            })
            .unwrap_err();
        assert_eq!(err, "boom");
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_update_requires_path() {
        assert_eq!(
            numbers().update(|v, _| v.clone()).unwrap_err(),
            DomeError::InvalidPathOperation { op: "update" }
        );
    }

    #[test]
    fn test_flatten_groups() {
        let h = Handle::new([
            Value::from(json!([1, 2])),
            Value::from(json!([])),
            Value::from(json!([3])),
        ]);
        assert_eq!(
            h.flatten().unwrap().values(),
            vec![Value::from(1i64), Value::from(2i64), Value::from(3i64)]
        );
        let err = Handle::new([Value::from(1i64)]).flatten().unwrap_err();
        assert_eq!(
            err,
            DomeError::NotIterable {
                type_name: "number".into()
            }
        );
    }

    #[test]
    fn test_bound_call_validates_arguments() {
        let h = numbers().extend("n");
        let map = BoundOperation::new(BaseOperation::Map, h.clone());
        assert!(matches!(map.call(&[]), Err(DomeError::InvalidArgument(_))));

        let double = Function::from_fn(|args| Value::from(args[0].as_f64().unwrap_or(0.0) * 2.0));
        let out = map.call(&[Value::from(double)]).unwrap().unwrap();
        assert_eq!(out.values(), vec![Value::from(2i64), Value::from(6i64)]);

        let each = BoundOperation::new(BaseOperation::ForEach, h);
        let failing = Function::new(|_, _| Err(HostError::Thrown("nope".into())));
        assert_eq!(
            each.call(&[Value::from(failing)]).unwrap_err(),
            DomeError::Host(HostError::Thrown("nope".into()))
        );
    }
}
