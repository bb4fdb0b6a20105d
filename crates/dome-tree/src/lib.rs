//! In-memory document tree: a reference host for the dome engine.
//!
//! Provides element and text nodes with the capabilities the engine expects
//! from a host: named properties, native methods, a class list, an inline
//! style bag, parent/ancestor links, event listeners and selector queries.
//!
//! # Example
//!
//! ```
//! use dome_tree::Document;
//!
//! let doc = Document::new();
//! let ul = doc.create_element("ul").unwrap();
//! for label in ["one", "two"] {
//!     let li = doc.create_element("li").unwrap();
//!     li.set_text_content(label);
//!     ul.append_child(&li).unwrap();
//! }
//! doc.append_child(&ul).unwrap();
//!
//! let items = doc.query_selector_all("ul > li").unwrap();
//! assert_eq!(items.len(), 2);
//! assert_eq!(doc.to_html(), "<ul><li>one</li><li>two</li></ul>");
//! ```

pub mod class_list;
pub mod document;
pub mod html;
pub mod node;
pub mod selector;
pub mod style;

pub use class_list::ClassList;
pub use document::Document;
pub use node::{Node, NodeInner};
pub use selector::{SelectorError, SelectorList};
pub use style::Style;
