//! Collection handles for host UI objects.
//!
//! A [`Handle`] addresses one property path inside every member of a
//! collection. Reading keys extends the path, writes and calls fan out over
//! the members, and paths that do not resolve on some member skip it
//! silently.
//!
//! ```
//! use dome::{Dome, Value};
//! use dome_tree::Document;
//!
//! let dome = Dome::new(Document::new());
//! let list = dome.construct("ul#menu", &[]).unwrap();
//! for label in ["a", "b"] {
//!     let item = dome.construct("li.item", &[Value::from(label)]).unwrap();
//!     list.invoke(&"appendChild".into(), &[item]).unwrap();
//! }
//! dome.document().append_child(&dome_tree::Node::from_value(&list).unwrap()).unwrap();
//!
//! let items = dome.query("#menu li").unwrap();
//! items.at("style.color").unwrap().assign(Value::from("red")).unwrap();
//! let colors: Vec<Value> = items.at("style.color").unwrap().iter().collect();
//! assert_eq!(colors, vec![Value::from("red"), Value::from("red")]);
//! ```

pub mod config;
pub mod construct;
pub mod entry;
pub mod error;
pub mod events;
pub mod handle;
pub mod navigate;
pub mod ops;

pub use config::DomeConfig;
pub use construct::{construct, Descriptor, DescriptorError};
pub use entry::{wrap, wrap_one, Dome, Target};
pub use error::DomeError;
pub use events::{EventBinder, EventMode, EventOp, EventProtocol};
pub use handle::{Access, Handle, FLATTEN_KEY};
pub use navigate::{resolve, values, Resolution};
pub use ops::{BaseOperation, BoundOperation};

pub use dome_host::{Function, HostDocument, HostError, HostObject, IndexMap, PathStep, Value};
