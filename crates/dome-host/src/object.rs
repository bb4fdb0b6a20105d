//! Capability traits a host object model implements.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::{Function, HostError, PathStep, Value};

/// Shared handle to a live host object.
pub type ObjectRef = Rc<dyn HostObject>;

/// A live object of the host tree (an element, a style bag, a class list).
///
/// All methods take `&self`: hosts use interior mutability, and writes made
/// through one reference are immediately visible through every other.
pub trait HostObject: fmt::Debug {
    /// A short type name used in diagnostics (`"Element"`, `"CSSStyle"`).
    fn type_name(&self) -> &str;

    /// Reads a property. `None` means the property is undefined.
    fn get(&self, key: &PathStep) -> Option<Value>;

    /// Assigns a property.
    fn set(&self, key: &PathStep, value: Value) -> Result<(), HostError>;

    /// Invokes a native method with this object as the receiver.
    fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, HostError> {
        let _ = args;
        Err(HostError::not_callable(self.type_name(), name))
    }

    /// Whether this object is a node of the host tree.
    fn is_node(&self) -> bool {
        false
    }

    /// The members of an iterable host collection, or `None` if not iterable.
    fn items(&self) -> Option<Vec<Value>> {
        None
    }

    fn add_event_listener(&self, event: &str, listener: Function) -> Result<(), HostError> {
        let _ = (event, listener);
        Err(HostError::Unsupported(format!(
            "{}.addEventListener",
            self.type_name()
        )))
    }

    fn remove_event_listener(&self, event: &str, listener: &Function) -> Result<(), HostError> {
        let _ = (event, listener);
        Err(HostError::Unsupported(format!(
            "{}.removeEventListener",
            self.type_name()
        )))
    }

    fn as_any(&self) -> &dyn Any;
}

/// Document-level capabilities: object creation and global queries.
pub trait HostDocument {
    /// Creates a new, detached element with the given tag.
    fn create_element(&self, tag: &str) -> Result<Value, HostError>;

    /// Creates a new, detached text node.
    fn create_text_node(&self, text: &str) -> Result<Value, HostError>;

    /// Returns every object matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Result<Vec<Value>, HostError>;
}

impl<D: HostDocument + ?Sized> HostDocument for &D {
    fn create_element(&self, tag: &str) -> Result<Value, HostError> {
        (**self).create_element(tag)
    }

    fn create_text_node(&self, text: &str) -> Result<Value, HostError> {
        (**self).create_text_node(text)
    }

    fn query_all(&self, selector: &str) -> Result<Vec<Value>, HostError> {
        (**self).query_all(selector)
    }
}

impl<D: HostDocument + ?Sized> HostDocument for Rc<D> {
    fn create_element(&self, tag: &str) -> Result<Value, HostError> {
        (**self).create_element(tag)
    }

    fn create_text_node(&self, text: &str) -> Result<Value, HostError> {
        (**self).create_text_node(text)
    }

    fn query_all(&self, selector: &str) -> Result<Vec<Value>, HostError> {
        (**self).query_all(selector)
    }
}
