//! Inline style declarations of an element.

use std::any::Any;
use std::cell::RefCell;

use dome_host::{HostError, HostObject, IndexMap, PathStep, Value};

/// Inline style bag. Properties are stored under their CSS names
/// (`background-color`) and can be addressed in camel case (`backgroundColor`).
#[derive(Debug, Default)]
pub struct Style {
    props: RefCell<IndexMap<String, String>>,
}

/// `backgroundColor` -> `background-color`. Names already in CSS form pass through.
pub fn css_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

impl Style {
    pub fn get_property(&self, name: &str) -> String {
        self.props
            .borrow()
            .get(&css_name(name))
            .cloned()
            .unwrap_or_default()
    }

    /// Sets a property; an empty value removes it.
    pub fn set_property(&self, name: &str, value: &str) {
        let name = css_name(name);
        let value = value.trim();
        if value.is_empty() {
            self.props.borrow_mut().shift_remove(&name);
        } else {
            self.props.borrow_mut().insert(name, value.to_owned());
        }
    }

    pub fn remove_property(&self, name: &str) -> String {
        self.props
            .borrow_mut()
            .shift_remove(&css_name(name))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.props.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.borrow().is_empty()
    }

    pub fn css_text(&self) -> String {
        self.props
            .borrow()
            .iter()
            .map(|(k, v)| format!("{k}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Replaces every declaration with those parsed from `text`.
    pub fn set_css_text(&self, text: &str) {
        self.props.borrow_mut().clear();
        for decl in text.split(';') {
            if let Some((name, value)) = decl.split_once(':') {
                let name = name.trim();
                if !name.is_empty() {
                    self.set_property(name, value);
                }
            }
        }
    }
}

impl HostObject for Style {
    fn type_name(&self) -> &str {
        "CSSStyleDeclaration"
    }

    fn get(&self, key: &PathStep) -> Option<Value> {
        match key {
            PathStep::Index(idx) => self
                .props
                .borrow()
                .get_index(*idx)
                .map(|(k, _)| Value::from(k.as_str())),
            PathStep::Key(k) => Some(match k.as_str() {
                "cssText" => Value::String(self.css_text()),
                "length" => Value::Number(self.len() as f64),
                name => Value::String(self.get_property(name)),
            }),
        }
    }

    fn set(&self, key: &PathStep, value: Value) -> Result<(), HostError> {
        match key {
            PathStep::Key(k) if k == "cssText" => {
                self.set_css_text(&value.to_string());
                Ok(())
            }
            PathStep::Key(k) if k == "length" => {
                Err(HostError::not_writable(self.type_name(), k.as_str()))
            }
            PathStep::Key(k) => {
                let text = match value {
                    Value::Undefined | Value::Null => String::new(),
                    v => v.to_string(),
                };
                self.set_property(k, &text);
                Ok(())
            }
            PathStep::Index(idx) => Err(HostError::not_writable(self.type_name(), idx.to_string())),
        }
    }

    fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, HostError> {
        let prop = || {
            args.first().map(Value::to_string).ok_or_else(|| {
                HostError::invalid_argument(format!("{name} expects a property name"))
            })
        };
        match name {
            "getPropertyValue" => Ok(Value::String(self.get_property(&prop()?))),
            "setProperty" => {
                let value = args.get(1).map(Value::to_string).unwrap_or_default();
                self.set_property(&prop()?, &value);
                Ok(Value::Undefined)
            }
            "removeProperty" => Ok(Value::String(self.remove_property(&prop()?))),
            _ => Err(HostError::not_callable(self.type_name(), name)),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_name() {
        assert_eq!(css_name("backgroundColor"), "background-color");
        assert_eq!(css_name("color"), "color");
        assert_eq!(css_name("font-size"), "font-size");
    }

    #[test]
    fn test_camel_and_css_names_alias() {
        let style = Style::default();
        style.set(&"backgroundColor".into(), Value::from("red")).unwrap();
        assert_eq!(style.get_property("background-color"), "red");
        assert_eq!(style.get(&"backgroundColor".into()), Some(Value::from("red")));
        assert_eq!(style.get(&"color".into()), Some(Value::from("")));
    }

    #[test]
    fn test_css_text_roundtrip() {
        let style = Style::default();
        style.set_css_text("color: red; margin-top : 4px;; bogus");
        assert_eq!(style.css_text(), "color: red; margin-top: 4px;");
        assert_eq!(style.get(&PathStep::Index(1)), Some(Value::from("margin-top")));
        style.set(&"color".into(), Value::from("")).unwrap();
        assert_eq!(style.css_text(), "margin-top: 4px;");
    }

    #[test]
    fn test_methods() {
        let style = Style::default();
        style
            .invoke("setProperty", &[Value::from("width"), Value::from("10px")])
            .unwrap();
        assert_eq!(
            style.invoke("getPropertyValue", &[Value::from("width")]),
            Ok(Value::from("10px"))
        );
        assert_eq!(
            style.invoke("removeProperty", &[Value::from("width")]),
            Ok(Value::from("10px"))
        );
        assert!(style.is_empty());
    }
}
