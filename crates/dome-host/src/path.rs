//! Path steps and textual path parsing.

use std::fmt;
use thiserror::Error;

/// A single step in a property path: a named key or a numeric index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

/// An ordered sequence of steps. The empty path denotes the object itself.
pub type Path = Vec<PathStep>;

impl PathStep {
    /// Returns the key name, if this is a named step.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathStep::Key(key) => Some(key),
            PathStep::Index(_) => None,
        }
    }

    /// Returns the index, treating all-digit keys as indices.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathStep::Index(idx) => Some(*idx),
            PathStep::Key(key) if is_index(key) => key.parse().ok(),
            PathStep::Key(_) => None,
        }
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key(key) => f.write_str(key),
            PathStep::Index(idx) => write!(f, "{idx}"),
        }
    }
}

impl From<&str> for PathStep {
    fn from(key: &str) -> Self {
        PathStep::Key(key.to_owned())
    }
}

impl From<String> for PathStep {
    fn from(key: String) -> Self {
        PathStep::Key(key)
    }
}

impl From<usize> for PathStep {
    fn from(idx: usize) -> Self {
        PathStep::Index(idx)
    }
}

impl From<&PathStep> for PathStep {
    fn from(step: &PathStep) -> Self {
        step.clone()
    }
}

/// Check if a string is a canonical non-negative integer (no leading zeros).
pub fn is_index(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    let bytes = s.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    bytes.iter().all(|b| b.is_ascii_digit())
}

/// Splits a path into its parent and final step.
///
/// Returns `None` for the empty path, which has no final step.
pub fn split_last(path: &[PathStep]) -> Option<(&[PathStep], &PathStep)> {
    let (last, parent) = path.split_last()?;
    Some((parent, last))
}

/// Formats a path back into its textual form (`style.color`, `childNodes[2].value`).
pub fn format_path(path: &[PathStep]) -> String {
    let mut out = String::new();
    for step in path {
        match step {
            PathStep::Index(idx) => {
                out.push('[');
                out.push_str(&idx.to_string());
                out.push(']');
            }
            PathStep::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
        }
    }
    out
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("empty path segment at offset {0}")]
    EmptySegment(usize),
    #[error("unterminated bracket at offset {0}")]
    UnterminatedBracket(usize),
    #[error("invalid bracket content at offset {0}")]
    InvalidBracket(usize),
}

/// Parse a textual property path.
///
/// Dots separate named keys, brackets hold indices or quoted keys:
///
/// ```
/// use dome_host::{parse_path, PathStep};
///
/// assert_eq!(
///     parse_path("childNodes[2].value").unwrap(),
///     vec![
///         PathStep::Key("childNodes".into()),
///         PathStep::Index(2),
///         PathStep::Key("value".into()),
///     ]
/// );
/// assert!(parse_path("").unwrap().is_empty());
/// ```
pub fn parse_path(input: &str) -> Result<Path, PathError> {
    PathParser { input, pos: 0 }.parse()
}

struct PathParser<'a> {
    input: &'a str,
    pos: usize,
}

impl PathParser<'_> {
    fn parse(mut self) -> Result<Path, PathError> {
        let mut path = Vec::new();
        if self.input.is_empty() {
            return Ok(path);
        }
        loop {
            match self.peek() {
                Some('[') => path.push(self.parse_bracket()?),
                Some(_) => path.push(PathStep::Key(self.parse_key()?)),
                None => return Err(PathError::EmptySegment(self.pos)),
            }
            // Any number of bracket suffixes may follow a segment.
            while self.peek() == Some('[') {
                path.push(self.parse_bracket()?);
            }
            match self.peek() {
                None => return Ok(path),
                Some('.') => self.advance(),
                Some(_) => return Err(PathError::InvalidBracket(self.pos)),
            }
        }
    }

    fn parse_key(&mut self) -> Result<String, PathError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '.' || c == '[' {
                break;
            }
            self.advance();
        }
        if self.pos == start {
            return Err(PathError::EmptySegment(start));
        }
        Ok(self.input[start..self.pos].to_owned())
    }

    fn parse_bracket(&mut self) -> Result<PathStep, PathError> {
        let open = self.pos;
        self.advance();
        let step = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.advance();
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c == quote {
                        break;
                    }
                    self.advance();
                }
                if self.peek().is_none() {
                    return Err(PathError::UnterminatedBracket(open));
                }
                let key = self.input[start..self.pos].to_owned();
                self.advance();
                PathStep::Key(key)
            }
            _ => {
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c == ']' {
                        break;
                    }
                    self.advance();
                }
                let text = &self.input[start..self.pos];
                if !is_index(text) {
                    return Err(PathError::InvalidBracket(open));
                }
                PathStep::Index(text.parse().map_err(|_| PathError::InvalidBracket(open))?)
            }
        };
        if self.peek() != Some(']') {
            return Err(PathError::UnterminatedBracket(open));
        }
        self.advance();
        Ok(step)
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

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> PathStep {
        PathStep::Key(s.to_owned())
    }

    #[test]
    fn test_parse_simple_keys() {
        assert_eq!(parse_path("style.color").unwrap(), vec![key("style"), key("color")]);
        assert_eq!(parse_path("value").unwrap(), vec![key("value")]);
    }

    #[test]
    fn test_parse_indices_and_quoted_keys() {
        assert_eq!(
            parse_path("childNodes[2][0]").unwrap(),
            vec![key("childNodes"), PathStep::Index(2), PathStep::Index(0)]
        );
        assert_eq!(
            parse_path("[\"a.b\"].c").unwrap(),
            vec![key("a.b"), key("c")]
        );
        assert_eq!(parse_path("[1]").unwrap(), vec![PathStep::Index(1)]);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_path("a..b"), Err(PathError::EmptySegment(2)));
        assert_eq!(parse_path("a."), Err(PathError::EmptySegment(2)));
        assert_eq!(parse_path("a[1"), Err(PathError::UnterminatedBracket(1)));
        assert_eq!(parse_path("a[x]"), Err(PathError::InvalidBracket(1)));
        assert_eq!(parse_path("a[01]"), Err(PathError::InvalidBracket(1)));
        assert_eq!(parse_path("a[1]b"), Err(PathError::InvalidBracket(4)));
    }

    #[test]
    fn test_format_roundtrip() {
        for text in ["", "a", "style.color", "childNodes[2].value", "[0][1]"] {
            assert_eq!(format_path(&parse_path(text).unwrap()), text);
        }
    }

    #[test]
    fn test_as_index() {
        assert_eq!(PathStep::Index(3).as_index(), Some(3));
        assert_eq!(key("12").as_index(), Some(12));
        assert_eq!(key("012").as_index(), None);
        assert_eq!(key("x").as_index(), None);
    }

    #[test]
    fn test_split_last() {
        let path = vec![key("a"), key("b")];
        let (parent, last) = split_last(&path).unwrap();
        assert_eq!(parent, &[key("a")]);
        assert_eq!(last, &key("b"));
        assert!(split_last(&[]).is_none());
    }
}
