//! Query entry point.

use dome_host::{HostDocument, Value};
use tracing::debug;

use crate::{construct, DomeConfig, DomeError, Handle};

/// What [`Dome::select`] should wrap.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Query the document.
    Selector(String),
    /// Wrap the given objects.
    Collection(Vec<Value>),
    /// Wrap a single object.
    Object(Value),
}

impl Target {
    /// Classifies a dynamic value: tree nodes become single-object targets,
    /// strings become selectors, lists and iterable host objects become
    /// collections.
    pub fn from_value(value: Value) -> Result<Self, DomeError> {
        if value.is_node() {
            return Ok(Target::Object(value));
        }
        match value {
            Value::String(selector) => Ok(Target::Selector(selector)),
            Value::List(items) => Ok(Target::Collection(items)),
            other => match other.items() {
                Some(items) if matches!(other, Value::Object(_)) => Ok(Target::Collection(items)),
                _ => Err(DomeError::InvalidArgument(format!(
                    "cannot select from a {}",
                    other.type_name()
                ))),
            },
        }
    }
}

impl From<&str> for Target {
    fn from(selector: &str) -> Self {
        Target::Selector(selector.to_owned())
    }
}

impl From<String> for Target {
    fn from(selector: String) -> Self {
        Target::Selector(selector)
    }
}

impl From<Vec<Value>> for Target {
    fn from(items: Vec<Value>) -> Self {
        Target::Collection(items)
    }
}

/// A root handle over `items`.
pub fn wrap(items: impl IntoIterator<Item = Value>) -> Handle {
    Handle::new(items)
}

/// A root handle over a single object.
pub fn wrap_one(value: Value) -> Handle {
    Handle::new([value])
}

/// Binds the engine to a document.
#[derive(Debug, Clone, Default)]
pub struct Dome<D> {
    document: D,
    config: DomeConfig,
}

impl<D: HostDocument> Dome<D> {
    pub fn new(document: D) -> Self {
        Self::with_config(document, DomeConfig::default())
    }

    pub fn with_config(document: D, config: DomeConfig) -> Self {
        Self { document, config }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn config(&self) -> &DomeConfig {
        &self.config
    }

    /// A root handle over every document match of `selector`.
    pub fn query(&self, selector: &str) -> Result<Handle, DomeError> {
        let found = self.document.query_all(selector)?;
        debug!(selector, matches = found.len(), "select");
        Ok(Handle::new(found))
    }

    pub fn select(&self, target: impl Into<Target>) -> Result<Handle, DomeError> {
        match target.into() {
            Target::Selector(selector) => self.query(&selector),
            Target::Collection(items) => Ok(wrap(items)),
            Target::Object(value) => Ok(wrap_one(value)),
        }
    }

    /// [`Dome::select`] on a dynamic value, see [`Target::from_value`].
    pub fn select_value(&self, value: Value) -> Result<Handle, DomeError> {
        self.select(Target::from_value(value)?)
    }

    /// Builds one object from a descriptor such as `"li.item[data-id=3]"`.
    pub fn construct(&self, descriptor: &str, children: &[Value]) -> Result<Value, DomeError> {
        construct::construct(&self.document, &self.config, descriptor, children)
    }
}
