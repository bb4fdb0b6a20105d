//! A small CSS selector engine.
//!
//! Supported syntax: selector lists (`a, b`), compound selectors built from
//! `*`, a tag name, `#id`, `.class`, `[attr]`, `[attr=value]` and
//! `[attr="value"]`, joined by the descendant (whitespace) and child (`>`)
//! combinators.

use thiserror::Error;

use crate::node::Node;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unexpected character `{0}` at offset {1}")]
    UnexpectedChar(char, usize),
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("expected a name at offset {0}")]
    ExpectedName(usize),
    #[error("unclosed string at offset {0}")]
    UnclosedString(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrSelector {
    Exists(String),
    Equals(String, String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// One complex selector: `compounds[0] (comb[0]) compounds[1] ...`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
    combinators: Vec<Combinator>,
}

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<Complex>,
}

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        SelectorParser { input, pos: 0 }.parse_list()
    }

    /// Whether `node` is an element matched by any selector in the list.
    pub fn matches(&self, node: &Node) -> bool {
        node.is_element()
            && self
                .selectors
                .iter()
                .any(|s| matches_at(s, s.compounds.len() - 1, node))
    }
}

fn matches_compound(compound: &Compound, node: &Node) -> bool {
    if let Some(tag) = &compound.tag {
        if !node.tag().is_some_and(|t| t.eq_ignore_ascii_case(tag)) {
            return false;
        }
    }
    if let Some(id) = &compound.id {
        if node.id() != *id {
            return false;
        }
    }
    if !compound.classes.iter().all(|c| node.has_class(c)) {
        return false;
    }
    compound.attrs.iter().all(|attr| match attr {
        AttrSelector::Exists(name) => node.has_attribute(name),
        AttrSelector::Equals(name, value) => {
            node.get_attribute(name).as_deref() == Some(value.as_str())
        }
    })
}

/// Right-to-left match of `complex.compounds[..=idx]` ending at `node`.
fn matches_at(complex: &Complex, idx: usize, node: &Node) -> bool {
    if !matches_compound(&complex.compounds[idx], node) {
        return false;
    }
    if idx == 0 {
        return true;
    }
    match complex.combinators[idx - 1] {
        Combinator::Child => node
            .parent_element()
            .is_some_and(|parent| matches_at(complex, idx - 1, &parent)),
        Combinator::Descendant => {
            let mut cursor = node.parent_element();
            while let Some(ancestor) = cursor {
                if matches_at(complex, idx - 1, &ancestor) {
                    return true;
                }
                cursor = ancestor.parent_element();
            }
            false
        }
    }
}

struct SelectorParser<'a> {
    input: &'a str,
    pos: usize,
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

impl SelectorParser<'_> {
    fn parse_list(&mut self) -> Result<SelectorList, SelectorError> {
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            selectors.push(self.parse_complex()?);
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(',') => self.advance(),
                Some(c) => return Err(SelectorError::UnexpectedChar(c, self.pos)),
            }
        }
        Ok(SelectorList { selectors })
    }

    fn parse_complex(&mut self) -> Result<Complex, SelectorError> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                Some('>') => {
                    self.advance();
                    self.skip_whitespace();
                    Combinator::Child
                }
                Some(',') | None => break,
                Some(_) if had_space => Combinator::Descendant,
                Some(c) => return Err(SelectorError::UnexpectedChar(c, self.pos)),
            };
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }
        Ok(Complex {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let start = self.pos;
        let mut compound = Compound::default();
        match self.peek() {
            Some('*') => self.advance(),
            Some(c) if is_name_char(c) => {
                compound.tag = Some(self.parse_name()?.to_ascii_lowercase())
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.advance();
                    compound.id = Some(self.parse_name()?);
                }
                Some('.') => {
                    self.advance();
                    compound.classes.push(self.parse_name()?);
                }
                Some('[') => {
                    self.advance();
                    compound.attrs.push(self.parse_attr()?);
                }
                _ => break,
            }
        }
        if self.pos == start {
            return match self.peek() {
                None => Err(if start == 0 {
                    SelectorError::Empty
                } else {
                    SelectorError::UnexpectedEnd
                }),
                Some(c) => Err(SelectorError::UnexpectedChar(c, self.pos)),
            };
        }
        Ok(compound)
    }

    fn parse_attr(&mut self) -> Result<AttrSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.parse_name()?;
        self.skip_whitespace();
        let attr = match self.peek() {
            Some(']') => AttrSelector::Exists(name),
            Some('=') => {
                self.advance();
                self.skip_whitespace();
                let value = match self.peek() {
                    Some(q @ ('"' | '\'')) => self.parse_quoted(q)?,
                    _ => self.parse_name()?,
                };
                self.skip_whitespace();
                AttrSelector::Equals(name, value)
            }
            Some(c) => return Err(SelectorError::UnexpectedChar(c, self.pos)),
            None => return Err(SelectorError::UnexpectedEnd),
        };
        match self.peek() {
            Some(']') => {
                self.advance();
                Ok(attr)
            }
            Some(c) => Err(SelectorError::UnexpectedChar(c, self.pos)),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    fn parse_quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        let open = self.pos;
        self.advance();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                let value = self.input[start..self.pos].to_owned();
                self.advance();
                return Ok(value);
            }
            self.advance();
        }
        Err(SelectorError::UnclosedString(open))
    }

    fn parse_name(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !is_name_char(c) {
                break;
            }
            self.advance();
        }
        if self.pos == start {
            return Err(SelectorError::ExpectedName(start));
        }
        Ok(self.input[start..self.pos].to_owned())
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.advance();
        }
        self.pos > start
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
