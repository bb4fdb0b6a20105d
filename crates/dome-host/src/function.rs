use std::fmt;
use std::rc::Rc;

use crate::{HostError, Value};

type Callable = dyn Fn(&Value, &[Value]) -> Result<Value, HostError>;

/// A callable value: event handlers, callbacks and host methods.
///
/// Functions are compared by identity, so the same `Function` (or a clone of
/// it) can be used to remove a listener that it previously registered.
#[derive(Clone)]
pub struct Function {
    inner: Rc<Callable>,
}

impl Function {
    /// Wraps a closure receiving `this` and the call arguments.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, HostError> + 'static,
    {
        Self { inner: Rc::new(f) }
    }

    /// Wraps a closure that ignores `this` and never fails.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Value + 'static,
    {
        Self::new(move |_this, args| Ok(f(args)))
    }

    pub fn call(&self, this: &Value, args: &[Value]) -> Result<Value, HostError> {
        (self.inner)(this, args)
    }

    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({:p})", Rc::as_ptr(&self.inner) as *const ())
    }
}
