//! Descriptor parsing and object construction.
//!
//! A descriptor names a tag followed by class, id and attribute fragments:
//! `input.required[type=text]#name`. The tag may be omitted, in which case
//! the configured default is used.

use std::str::FromStr;
use std::sync::OnceLock;

use dome_host::{HostDocument, HostError, PathStep, Value};
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::{DomeConfig, DomeError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("empty {kind} name at offset {offset}")]
    EmptyName { kind: &'static str, offset: usize },
    #[error("`{0}` is not a valid tag name")]
    InvalidTag(String),
    #[error("`{0}` is not a valid attribute name")]
    InvalidAttribute(String),
    #[error("unterminated attribute starting at offset {0}")]
    UnterminatedAttribute(usize),
    #[error("unterminated quote starting at offset {0}")]
    UnterminatedQuote(usize),
    #[error("second id at offset {0}")]
    DuplicateId(usize),
    #[error("unexpected character `{0}` at offset {1}")]
    UnexpectedChar(char, usize),
}

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").unwrap())
}

fn attribute_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_:-]*$").unwrap())
}

/// Whether `name` is usable as a tag name.
pub fn is_valid_name(name: &str) -> bool {
    name_regex().is_match(name)
}

/// A parsed descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    /// Attributes in source order. A bare `[attr]` has the value `attr`.
    pub attributes: Vec<(String, String)>,
}

impl Descriptor {
    pub fn parse(input: &str) -> Result<Self, DescriptorError> {
        DescriptorParser { input, pos: 0 }.parse()
    }
}

impl FromStr for Descriptor {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Descriptor::parse(s)
    }
}

struct DescriptorParser<'a> {
    input: &'a str,
    pos: usize,
}

fn ends_fragment(c: char) -> bool {
    matches!(c, '.' | '#' | '[' | ']' | '=' | '"' | '\'') || c.is_whitespace()
}

impl<'a> DescriptorParser<'a> {
    fn parse(mut self) -> Result<Descriptor, DescriptorError> {
        let mut descriptor = Descriptor::default();
        let tag = self.take_while(|c| !ends_fragment(c));
        if !tag.is_empty() {
            if !is_valid_name(tag) {
                return Err(DescriptorError::InvalidTag(tag.to_owned()));
            }
            descriptor.tag = Some(tag.to_owned());
        }
        loop {
            let start = self.pos;
            match self.peek() {
                None => break,
                Some('.') => {
                    self.advance();
                    descriptor.classes.push(self.fragment_name("class")?);
                }
                Some('#') => {
                    if descriptor.id.is_some() {
                        return Err(DescriptorError::DuplicateId(start));
                    }
                    self.advance();
                    descriptor.id = Some(self.fragment_name("id")?);
                }
                Some('[') => {
                    self.advance();
                    descriptor.attributes.push(self.parse_attribute(start)?);
                }
                Some(c) => return Err(DescriptorError::UnexpectedChar(c, start)),
            }
        }
        Ok(descriptor)
    }

    fn fragment_name(&mut self, kind: &'static str) -> Result<String, DescriptorError> {
        let offset = self.pos;
        let name = self.take_while(|c| !ends_fragment(c));
        if name.is_empty() {
            return Err(DescriptorError::EmptyName { kind, offset });
        }
        Ok(name.to_owned())
    }

    fn parse_attribute(&mut self, open: usize) -> Result<(String, String), DescriptorError> {
        let name = self.take_while(|c| c != '=' && c != ']').trim().to_owned();
        if !attribute_regex().is_match(&name) {
            return match self.peek() {
                None => Err(DescriptorError::UnterminatedAttribute(open)),
                _ if name.is_empty() => Err(DescriptorError::EmptyName {
                    kind: "attribute",
                    offset: open + 1,
                }),
                _ => Err(DescriptorError::InvalidAttribute(name)),
            };
        }
        let value = match self.peek() {
            Some(']') => name.clone(),
            Some('=') => {
                self.advance();
                match self.peek() {
                    Some(q @ ('"' | '\'')) => self.quoted(q)?,
                    _ => self.take_while(|c| c != ']').to_owned(),
                }
            }
            _ => return Err(DescriptorError::UnterminatedAttribute(open)),
        };
        match self.peek() {
            Some(']') => {
                self.advance();
                Ok((name, value))
            }
            Some(c) => Err(DescriptorError::UnexpectedChar(c, self.pos)),
            None => Err(DescriptorError::UnterminatedAttribute(open)),
        }
    }

    fn quoted(&mut self, quote: char) -> Result<String, DescriptorError> {
        let open = self.pos;
        self.advance();
        let value = self.take_while(|c| c != quote).to_owned();
        if self.peek().is_none() {
            return Err(DescriptorError::UnterminatedQuote(open));
        }
        self.advance();
        Ok(value)
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> &'a str {
        let input = self.input;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !keep(c) {
                break;
            }
            self.advance();
        }
        &input[start..self.pos]
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }
}

/// Builds one object from `descriptor` and appends `children` to it.
///
/// Attributes are set first and class fragments are then added to the class
/// list. String children become text nodes; host objects are appended as
/// they are. The id is set after everything else.
pub fn construct<D: HostDocument + ?Sized>(
    document: &D,
    config: &DomeConfig,
    descriptor: &str,
    children: &[Value],
) -> Result<Value, DomeError> {
    let parsed = Descriptor::parse(descriptor)?;
    let tag = parsed.tag.as_deref().unwrap_or(&config.default_tag);
    let element = document.create_element(tag)?;

    for (name, value) in &parsed.attributes {
        element.invoke(
            &PathStep::from("setAttribute"),
            &[Value::from(name.as_str()), Value::from(value.as_str())],
        )?;
    }
    // after the attributes, so a `[class=..]` fragment cannot drop them
    if !parsed.classes.is_empty() {
        let class_list = element
            .get(&PathStep::from("classList"))
            .ok_or_else(|| {
                HostError::Unsupported(format!("{}.classList", element.type_name()))
            })?;
        let tokens: Vec<Value> = parsed
            .classes
            .iter()
            .map(|c| Value::from(c.as_str()))
            .collect();
        class_list.invoke(&PathStep::from("add"), &tokens)?;
    }
    for child in children {
        let node = match child {
            Value::String(text) => document.create_text_node(text)?,
            Value::Object(_) => child.clone(),
            other => {
                return Err(DomeError::InvalidArgument(format!(
                    "cannot append a {} as a child",
                    other.type_name()
                )))
            }
        };
        element.invoke(&PathStep::from("appendChild"), &[node])?;
    }
    if let Some(id) = &parsed.id {
        element.set(&PathStep::from("id"), Value::from(id.as_str()))?;
    }
    debug!(descriptor, tag, children = children.len(), "constructed");
    Ok(element)
}
