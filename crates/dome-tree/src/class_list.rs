//! Ordered set of class tokens attached to an element.

use std::any::Any;
use std::cell::RefCell;

use dome_host::{HostError, HostObject, PathStep, Value};

#[derive(Debug, Default)]
pub struct ClassList {
    tokens: RefCell<Vec<String>>,
}

fn validate_token(token: &str) -> Result<(), HostError> {
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(HostError::invalid_argument(format!(
            "class token `{token}` is empty or contains whitespace"
        )));
    }
    Ok(())
}

impl ClassList {
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.borrow().iter().any(|t| t == token)
    }

    pub fn add(&self, token: &str) -> Result<(), HostError> {
        validate_token(token)?;
        if !self.contains(token) {
            self.tokens.borrow_mut().push(token.to_owned());
        }
        Ok(())
    }

    pub fn remove(&self, token: &str) -> Result<(), HostError> {
        validate_token(token)?;
        self.tokens.borrow_mut().retain(|t| t != token);
        Ok(())
    }

    /// Toggles `token`, or forces it on/off. Returns whether it is now present.
    pub fn toggle(&self, token: &str, force: Option<bool>) -> Result<bool, HostError> {
        validate_token(token)?;
        let present = self.contains(token);
        let want = force.unwrap_or(!present);
        if want && !present {
            self.tokens.borrow_mut().push(token.to_owned());
        } else if !want && present {
            self.tokens.borrow_mut().retain(|t| t != token);
        }
        Ok(want)
    }

    /// Replaces `old` with `new` in place. Returns `false` if `old` was absent.
    pub fn replace(&self, old: &str, new: &str) -> Result<bool, HostError> {
        validate_token(old)?;
        validate_token(new)?;
        let mut tokens = self.tokens.borrow_mut();
        let Some(pos) = tokens.iter().position(|t| t == old) else {
            return Ok(false);
        };
        if tokens.iter().any(|t| t == new) {
            tokens.remove(pos);
        } else {
            tokens[pos] = new.to_owned();
        }
        Ok(true)
    }

    pub fn len(&self) -> usize {
        self.tokens.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.borrow().is_empty()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.tokens.borrow().clone()
    }

    /// The space-joined token list, as held by the `class` attribute.
    pub fn value(&self) -> String {
        self.tokens.borrow().join(" ")
    }

    pub fn set_value(&self, value: &str) {
        let mut tokens: Vec<String> = Vec::new();
        for token in value.split_whitespace() {
            if !tokens.iter().any(|t| t == token) {
                tokens.push(token.to_owned());
            }
        }
        *self.tokens.borrow_mut() = tokens;
    }
}

fn string_arg(args: &[Value], idx: usize, method: &str) -> Result<String, HostError> {
    match args.get(idx) {
        Some(Value::Undefined) | None => Err(HostError::invalid_argument(format!(
            "DOMTokenList.{method} expects argument {idx}"
        ))),
        Some(v) => Ok(v.to_string()),
    }
}

impl HostObject for ClassList {
    fn type_name(&self) -> &str {
        "DOMTokenList"
    }

    fn get(&self, key: &PathStep) -> Option<Value> {
        match key.as_key() {
            Some("length") => return Some(Value::Number(self.len() as f64)),
            Some("value") => return Some(Value::String(self.value())),
            _ => {}
        }
        let idx = key.as_index()?;
        self.tokens.borrow().get(idx).cloned().map(Value::String)
    }

    fn set(&self, key: &PathStep, value: Value) -> Result<(), HostError> {
        match key.as_key() {
            Some("value") => {
                self.set_value(&value.to_string());
                Ok(())
            }
            _ => Err(HostError::not_writable(self.type_name(), key.to_string())),
        }
    }

    fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, HostError> {
        match name {
            "add" => {
                for arg in args {
                    self.add(&arg.to_string())?;
                }
                Ok(Value::Undefined)
            }
            "remove" => {
                for arg in args {
                    self.remove(&arg.to_string())?;
                }
                Ok(Value::Undefined)
            }
            "toggle" => {
                let token = string_arg(args, 0, name)?;
                let force = match args.get(1) {
                    None | Some(Value::Undefined) => None,
                    Some(v) => Some(v.is_truthy()),
                };
                Ok(Value::Bool(self.toggle(&token, force)?))
            }
            "replace" => {
                let old = string_arg(args, 0, name)?;
                let new = string_arg(args, 1, name)?;
                Ok(Value::Bool(self.replace(&old, &new)?))
            }
            "contains" => Ok(Value::Bool(self.contains(&string_arg(args, 0, name)?))),
            "item" => {
                let idx = args.first().and_then(Value::as_f64).unwrap_or(-1.0);
                if idx < 0.0 {
                    return Ok(Value::Null);
                }
                Ok(self
                    .tokens
                    .borrow()
                    .get(idx as usize)
                    .cloned()
                    .map_or(Value::Null, Value::String))
            }
            _ => Err(HostError::not_callable(self.type_name(), name)),
        }
    }

    fn items(&self) -> Option<Vec<Value>> {
        Some(self.to_vec().into_iter().map(Value::String).collect())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
