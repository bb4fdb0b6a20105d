//! Host object capability model for dome.
//!
//! The engine in the `dome` crate never touches a concrete UI tree. It talks
//! to host objects through the small capability set defined here:
//!
//! - [`Value`]: the dynamic values flowing through property reads, writes and
//!   calls,
//! - [`Function`]: identity-compared callables (handlers, callbacks),
//! - [`PathStep`]: a typed property key or index,
//! - [`HostObject`] / [`HostDocument`]: what a live object and a document must
//!   be able to do.
//!
//! # Example
//!
//! ```
//! use dome_host::{parse_path, Value};
//! use serde_json::json;
//!
//! let data = Value::from(json!({"style": {"color": "red"}}));
//! let mut current = data;
//! for step in parse_path("style.color").unwrap() {
//!     current = current.get(&step).unwrap();
//! }
//! assert_eq!(current, Value::from("red"));
//! ```

pub mod error;
pub mod function;
pub mod object;
pub mod path;
pub mod value;

pub use error::HostError;
pub use function::Function;
pub use object::{HostDocument, HostObject, ObjectRef};
pub use path::{format_path, is_index, parse_path, split_last, Path, PathError, PathStep};
pub use value::Value;

pub use indexmap::IndexMap;
