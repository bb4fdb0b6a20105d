//! Element and text nodes of the in-memory tree.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use dome_host::{Function, HostError, HostObject, IndexMap, PathStep, Value};
use tracing::trace;

use crate::class_list::ClassList;
use crate::html;
use crate::selector::SelectorList;
use crate::style::Style;

/// Property names whose values are reflected into string attributes.
const REFLECTED_ATTRIBUTES: &[&str] = &[
    "type",
    "name",
    "value",
    "href",
    "src",
    "title",
    "placeholder",
    "alt",
    "rel",
    "lang",
    "dir",
    "role",
    "for",
    "checked",
    "disabled",
    "required",
    "selected",
];

/// Properties that can be read but never assigned.
const READ_ONLY_PROPERTIES: &[&str] = &[
    "nodeType",
    "nodeName",
    "tagName",
    "localName",
    "classList",
    "outerHTML",
    "parentNode",
    "parentElement",
    "children",
    "childNodes",
    "firstChild",
    "lastChild",
    "childElementCount",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Document,
    Element { tag: String },
    Text,
}

/// Storage behind a [`Node`]. This is the type exposed to the engine as a
/// [`HostObject`].
pub struct NodeInner {
    kind: NodeKind,
    this: Weak<NodeInner>,
    parent: RefCell<Weak<NodeInner>>,
    children: RefCell<Vec<Rc<NodeInner>>>,
    data: RefCell<String>,
    attributes: RefCell<IndexMap<String, String>>,
    properties: RefCell<IndexMap<String, Value>>,
    class_list: Rc<ClassList>,
    style: Rc<Style>,
    listeners: RefCell<Vec<(String, Function)>>,
}

impl fmt::Debug for NodeInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NodeKind::Document => f.write_str("#document"),
            NodeKind::Text => write!(f, "#text({:?})", self.data.borrow()),
            NodeKind::Element { tag } => {
                write!(f, "<{tag}")?;
                if let Some(id) = self.attributes.borrow().get("id") {
                    write!(f, "#{id}")?;
                }
                for class in self.class_list.to_vec() {
                    write!(f, ".{class}")?;
                }
                f.write_str(">")
            }
        }
    }
}

/// A shared reference to a tree node. Cloning is cheap and aliases the node.
#[derive(Clone)]
pub struct Node(Rc<NodeInner>);

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Node {}

impl Node {
    pub(crate) fn new(kind: NodeKind, data: &str) -> Self {
        Node(Rc::new_cyclic(|this| NodeInner {
            kind,
            this: this.clone(),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            data: RefCell::new(data.to_owned()),
            attributes: RefCell::new(IndexMap::new()),
            properties: RefCell::new(IndexMap::new()),
            class_list: Rc::new(ClassList::default()),
            style: Rc::new(Style::default()),
            listeners: RefCell::new(Vec::new()),
        }))
    }

    /// Recovers a node from a value produced by [`Node::to_value`].
    pub fn from_value(value: &Value) -> Option<Node> {
        let inner = value.as_object()?.as_any().downcast_ref::<NodeInner>()?;
        inner.this.upgrade().map(Node)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub(crate) fn kind(&self) -> &NodeKind {
        &self.0.kind
    }

    pub fn is_element(&self) -> bool {
        matches!(self.0.kind, NodeKind::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.0.kind, NodeKind::Text)
    }

    /// Lowercase tag name, for elements.
    pub fn tag(&self) -> Option<String> {
        match &self.0.kind {
            NodeKind::Element { tag } => Some(tag.clone()),
            _ => None,
        }
    }

    pub fn id(&self) -> String {
        self.get_attribute("id").unwrap_or_default()
    }

    pub fn set_id(&self, id: &str) {
        self.set_attribute("id", id);
    }

    pub fn class_list(&self) -> Rc<ClassList> {
        self.0.class_list.clone()
    }

    pub fn classes(&self) -> Vec<String> {
        self.0.class_list.to_vec()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.0.class_list.contains(class)
    }

    pub fn style(&self) -> Rc<Style> {
        self.0.style.clone()
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        match name {
            "class" if !self.0.class_list.is_empty() => Some(self.0.class_list.value()),
            "class" => None,
            "style" if !self.0.style.is_empty() => Some(self.0.style.css_text()),
            "style" => None,
            _ => self.0.attributes.borrow().get(name).cloned(),
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        match name {
            "class" => self.0.class_list.set_value(value),
            "style" => self.0.style.set_css_text(value),
            _ => {
                self.0
                    .attributes
                    .borrow_mut()
                    .insert(name.to_owned(), value.to_owned());
            }
        }
    }

    pub fn remove_attribute(&self, name: &str) {
        match name {
            "class" => self.0.class_list.set_value(""),
            "style" => self.0.style.set_css_text(""),
            _ => {
                self.0.attributes.borrow_mut().shift_remove(name);
            }
        }
    }

    /// Attributes in insertion order, excluding `class` and `style`.
    pub(crate) fn attributes(&self) -> Vec<(String, String)> {
        self.0
            .attributes
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Character data of a text node.
    pub fn data(&self) -> String {
        self.0.data.borrow().clone()
    }

    pub fn parent(&self) -> Option<Node> {
        self.0.parent.borrow().upgrade().map(Node)
    }

    pub fn parent_element(&self) -> Option<Node> {
        self.parent().filter(Node::is_element)
    }

    pub fn child_nodes(&self) -> Vec<Node> {
        self.0.children.borrow().iter().cloned().map(Node).collect()
    }

    pub fn children(&self) -> Vec<Node> {
        self.child_nodes().into_iter().filter(Node::is_element).collect()
    }

    /// Whether `other` is this node or one of its descendants.
    pub fn contains(&self, other: &Node) -> bool {
        let mut cursor = Some(other.clone());
        while let Some(node) = cursor {
            if node == *self {
                return true;
            }
            cursor = node.parent();
        }
        false
    }

    pub fn text_content(&self) -> String {
        match self.0.kind {
            NodeKind::Text => self.data(),
            _ => self
                .child_nodes()
                .iter()
                .map(Node::text_content)
                .collect(),
        }
    }

    pub fn set_text_content(&self, text: &str) {
        match self.0.kind {
            NodeKind::Text => *self.0.data.borrow_mut() = text.to_owned(),
            _ => {
                for child in self.child_nodes() {
                    child.remove();
                }
                if !text.is_empty() {
                    let node = Node::new(NodeKind::Text, text);
                    self.attach(&node);
                }
            }
        }
    }

    /// Appends `child`, detaching it from its current parent first.
    pub fn append_child(&self, child: &Node) -> Result<(), HostError> {
        if self.is_text() {
            return Err(HostError::Hierarchy("text nodes cannot have children".into()));
        }
        if matches!(child.0.kind, NodeKind::Document) {
            return Err(HostError::Hierarchy("a document cannot be appended".into()));
        }
        if child.contains(self) {
            return Err(HostError::Hierarchy(
                "the new child is an ancestor of the parent".into(),
            ));
        }
        child.remove();
        self.attach(child);
        Ok(())
    }

    fn attach(&self, child: &Node) {
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.children.borrow_mut().push(child.0.clone());
    }

    /// Detaches this node from its parent. A detached node is left untouched.
    pub fn remove(&self) {
        if let Some(parent) = self.parent() {
            parent
                .0
                .children
                .borrow_mut()
                .retain(|c| !Rc::ptr_eq(c, &self.0));
        }
        *self.0.parent.borrow_mut() = Weak::new();
    }

    /// Descendants in document (pre-order) order, excluding this node.
    pub fn descendants(&self) -> Vec<Node> {
        let mut out = Vec::new();
        let mut stack: Vec<Node> = self.child_nodes().into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            stack.extend(node.child_nodes().into_iter().rev());
            out.push(node);
        }
        out
    }

    pub fn matches(&self, selector: &str) -> Result<bool, HostError> {
        Ok(parse_selector(selector)?.matches(self))
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>, HostError> {
        let list = parse_selector(selector)?;
        let found: Vec<Node> = self
            .descendants()
            .into_iter()
            .filter(|n| list.matches(n))
            .collect();
        trace!(selector, matches = found.len(), "query_selector_all");
        Ok(found)
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<Node>, HostError> {
        let list = parse_selector(selector)?;
        Ok(self.descendants().into_iter().find(|n| list.matches(n)))
    }

    /// This node or its nearest ancestor matching `selector`.
    pub fn closest(&self, selector: &str) -> Result<Option<Node>, HostError> {
        let list = parse_selector(selector)?;
        let mut cursor = Some(self.clone());
        while let Some(node) = cursor {
            if list.matches(&node) {
                return Ok(Some(node));
            }
            cursor = node.parent_element();
        }
        Ok(None)
    }

    /// Registers `listener` for `event`. Registering the same listener twice is a no-op.
    pub fn add_event_listener(&self, event: &str, listener: Function) {
        let mut listeners = self.0.listeners.borrow_mut();
        if !listeners.iter().any(|(e, f)| e == event && f.ptr_eq(&listener)) {
            listeners.push((event.to_owned(), listener));
        }
    }

    pub fn remove_event_listener(&self, event: &str, listener: &Function) {
        self.0
            .listeners
            .borrow_mut()
            .retain(|(e, f)| !(e == event && f.ptr_eq(listener)));
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.0
            .listeners
            .borrow()
            .iter()
            .filter(|(e, _)| e == event)
            .count()
    }

    /// Calls every listener of `event` in registration order, with this node
    /// as `this`. Returns the number of listeners called.
    pub fn dispatch_event(&self, event: &str, args: &[Value]) -> Result<usize, HostError> {
        let listeners: Vec<Function> = self
            .0
            .listeners
            .borrow()
            .iter()
            .filter(|(e, _)| e == event)
            .map(|(_, f)| f.clone())
            .collect();
        let this = self.to_value();
        for listener in &listeners {
            listener.call(&this, args)?;
        }
        trace!(event, listeners = listeners.len(), "dispatch_event");
        Ok(listeners.len())
    }

    pub fn outer_html(&self) -> String {
        html::to_html(self)
    }

    pub fn inner_html(&self) -> String {
        self.child_nodes().iter().map(html::to_html).collect()
    }

    fn property(&self, key: &str) -> Option<Value> {
        let node_or_null = |node: Option<Node>| Some(node.map_or(Value::Null, |n| n.to_value()));
        let list = |nodes: Vec<Node>| Some(Value::List(nodes.iter().map(Node::to_value).collect()));
        match (key, &self.0.kind) {
            ("nodeType", kind) => Some(Value::Number(match kind {
                NodeKind::Element { .. } => 1.0,
                NodeKind::Text => 3.0,
                NodeKind::Document => 9.0,
            })),
            ("nodeName", NodeKind::Element { tag }) | ("tagName", NodeKind::Element { tag }) => {
                Some(Value::String(tag.to_ascii_uppercase()))
            }
            ("localName", NodeKind::Element { tag }) => Some(Value::String(tag.clone())),
            ("nodeName", NodeKind::Text) => Some(Value::from("#text")),
            ("nodeName", NodeKind::Document) => Some(Value::from("#document")),
            ("data" | "nodeValue", NodeKind::Text) => Some(Value::String(self.data())),
            ("textContent", _) => Some(Value::String(self.text_content())),
            ("parentNode", _) => node_or_null(self.parent()),
            ("parentElement", _) => node_or_null(self.parent_element()),
            ("childNodes", _) => list(self.child_nodes()),
            ("children", NodeKind::Element { .. } | NodeKind::Document) => list(self.children()),
            ("childElementCount", NodeKind::Element { .. } | NodeKind::Document) => {
                Some(Value::Number(self.children().len() as f64))
            }
            ("firstChild", _) => node_or_null(self.child_nodes().first().cloned()),
            ("lastChild", _) => node_or_null(self.child_nodes().last().cloned()),
            (_, NodeKind::Element { .. }) => self.element_property(key),
            _ => self.0.properties.borrow().get(key).cloned(),
        }
    }

    fn element_property(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(Value::String(self.id())),
            "className" => Some(Value::String(self.0.class_list.value())),
            "classList" => Some(Value::Object(self.0.class_list.clone())),
            "style" => Some(Value::Object(self.0.style.clone())),
            "outerHTML" => Some(Value::String(self.outer_html())),
            "innerHTML" => Some(Value::String(self.inner_html())),
            _ => {
                if let Some(v) = self.0.properties.borrow().get(key) {
                    return Some(v.clone());
                }
                if REFLECTED_ATTRIBUTES.contains(&key) {
                    return self.get_attribute(key).map(Value::String);
                }
                None
            }
        }
    }

    fn set_property(&self, key: &str, value: Value) -> Result<(), HostError> {
        if READ_ONLY_PROPERTIES.contains(&key) {
            return Err(HostError::not_writable(self.0.type_name(), key));
        }
        match (key, &self.0.kind) {
            ("textContent", _) | ("data" | "nodeValue", NodeKind::Text) => {
                self.set_text_content(&value.to_string());
            }
            ("id", NodeKind::Element { .. }) => self.set_id(&value.to_string()),
            ("className", NodeKind::Element { .. }) => {
                self.0.class_list.set_value(&value.to_string())
            }
            ("style", NodeKind::Element { .. }) => self.0.style.set_css_text(&value.to_string()),
            (_, NodeKind::Element { .. }) if REFLECTED_ATTRIBUTES.contains(&key) => match value {
                Value::Bool(false) | Value::Undefined | Value::Null => self.remove_attribute(key),
                Value::Bool(true) => self.set_attribute(key, ""),
                other => self.set_attribute(key, &other.to_string()),
            },
            _ => {
                self.0.properties.borrow_mut().insert(key.to_owned(), value);
            }
        }
        Ok(())
    }
}

fn parse_selector(selector: &str) -> Result<SelectorList, HostError> {
    SelectorList::parse(selector).map_err(|e| HostError::InvalidSelector {
        selector: selector.to_owned(),
        reason: e.to_string(),
    })
}

fn arg_string(args: &[Value], idx: usize, method: &str) -> Result<String, HostError> {
    match args.get(idx) {
        None | Some(Value::Undefined) => Err(HostError::invalid_argument(format!(
            "{method} expects argument {idx}"
        ))),
        Some(v) => Ok(v.to_string()),
    }
}

fn arg_node(args: &[Value], idx: usize, method: &str) -> Result<Node, HostError> {
    args.get(idx)
        .and_then(Node::from_value)
        .ok_or_else(|| HostError::invalid_argument(format!("{method} expects a node")))
}

fn arg_function(args: &[Value], idx: usize, method: &str) -> Result<Function, HostError> {
    args.get(idx)
        .and_then(Value::as_function)
        .cloned()
        .ok_or_else(|| HostError::invalid_argument(format!("{method} expects a function")))
}

impl HostObject for NodeInner {
    fn type_name(&self) -> &str {
        match self.kind {
            NodeKind::Document => "Document",
            NodeKind::Element { .. } => "Element",
            NodeKind::Text => "Text",
        }
    }

    fn get(&self, key: &PathStep) -> Option<Value> {
        let node = Node(self.this.upgrade()?);
        match key {
            PathStep::Key(k) => node.property(k),
            PathStep::Index(_) => None,
        }
    }

    fn set(&self, key: &PathStep, value: Value) -> Result<(), HostError> {
        let node = self
            .this
            .upgrade()
            .map(Node)
            .ok_or_else(|| HostError::Thrown("node has been dropped".into()))?;
        match key {
            PathStep::Key(k) => node.set_property(k, value),
            PathStep::Index(idx) => Err(HostError::not_writable(self.type_name(), idx.to_string())),
        }
    }

    fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, HostError> {
        let node = self
            .this
            .upgrade()
            .map(Node)
            .ok_or_else(|| HostError::Thrown("node has been dropped".into()))?;
        let opt = |found: Option<Node>| found.map_or(Value::Null, |n| n.to_value());
        match name {
            "appendChild" => {
                let child = arg_node(args, 0, name)?;
                node.append_child(&child)?;
                Ok(child.to_value())
            }
            "remove" => {
                node.remove();
                Ok(Value::Undefined)
            }
            "contains" => Ok(Value::Bool(node.contains(&arg_node(args, 0, name)?))),
            "addEventListener" => {
                node.add_event_listener(&arg_string(args, 0, name)?, arg_function(args, 1, name)?);
                Ok(Value::Undefined)
            }
            "removeEventListener" => {
                node.remove_event_listener(
                    &arg_string(args, 0, name)?,
                    &arg_function(args, 1, name)?,
                );
                Ok(Value::Undefined)
            }
            "dispatchEvent" => {
                let called = node.dispatch_event(&arg_string(args, 0, name)?, &args[1..])?;
                Ok(Value::Bool(called > 0))
            }
            _ if node.is_text() => Err(HostError::not_callable(self.type_name(), name)),
            "querySelectorAll" => Ok(Value::List(
                node.query_selector_all(&arg_string(args, 0, name)?)?
                    .iter()
                    .map(Node::to_value)
                    .collect(),
            )),
            "querySelector" => Ok(opt(node.query_selector(&arg_string(args, 0, name)?)?)),
            _ if !node.is_element() => Err(HostError::not_callable(self.type_name(), name)),
            "setAttribute" => {
                node.set_attribute(&arg_string(args, 0, name)?, &arg_string(args, 1, name)?);
                Ok(Value::Undefined)
            }
            "getAttribute" => Ok(node
                .get_attribute(&arg_string(args, 0, name)?)
                .map_or(Value::Null, Value::String)),
            "hasAttribute" => Ok(Value::Bool(node.has_attribute(&arg_string(args, 0, name)?))),
            "removeAttribute" => {
                node.remove_attribute(&arg_string(args, 0, name)?);
                Ok(Value::Undefined)
            }
            "closest" => Ok(opt(node.closest(&arg_string(args, 0, name)?)?)),
            "matches" => Ok(Value::Bool(node.matches(&arg_string(args, 0, name)?)?)),
            _ => Err(HostError::not_callable(self.type_name(), name)),
        }
    }

    fn is_node(&self) -> bool {
        true
    }

    fn add_event_listener(&self, event: &str, listener: Function) -> Result<(), HostError> {
        if let Some(inner) = self.this.upgrade() {
            Node(inner).add_event_listener(event, listener);
        }
        Ok(())
    }

    fn remove_event_listener(&self, event: &str, listener: &Function) -> Result<(), HostError> {
        if let Some(inner) = self.this.upgrade() {
            Node(inner).remove_event_listener(event, listener);
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
