//! Native argument values handed to tool handlers.

use crate::types::{Error, Result};
use std::fmt;

/// A coerced argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Absence of a value (default for reference types).
    Null,
    Str(String),
    Int(i32),
    Long(i64),
    Short(i16),
    Byte(i8),
    Float(f32),
    Double(f64),
    Bool(bool),
    Char(char),
    /// Matched member name of an enumerated choice.
    Enum(String),
}

impl ArgValue {
    pub fn kind(&self) -> &'static str {
        match self {
            ArgValue::Null => "null",
            ArgValue::Str(_) => "string",
            ArgValue::Int(_) => "integer",
            ArgValue::Long(_) => "long",
            ArgValue::Short(_) => "short",
            ArgValue::Byte(_) => "byte",
            ArgValue::Float(_) => "float",
            ArgValue::Double(_) => "double",
            ArgValue::Bool(_) => "boolean",
            ArgValue::Char(_) => "char",
            ArgValue::Enum(_) => "enum",
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Null => f.write_str("null"),
            ArgValue::Str(s) | ArgValue::Enum(s) => f.write_str(s),
            ArgValue::Int(v) => write!(f, "{}", v),
            ArgValue::Long(v) => write!(f, "{}", v),
            ArgValue::Short(v) => write!(f, "{}", v),
            ArgValue::Byte(v) => write!(f, "{}", v),
            ArgValue::Float(v) => write!(f, "{}", v),
            ArgValue::Double(v) => write!(f, "{}", v),
            ArgValue::Bool(v) => write!(f, "{}", v),
            ArgValue::Char(c) => write!(f, "{}", c),
        }
    }
}

/// Positional arguments for one invocation.
///
/// Accessors fail with `Error::Invocation` when a slot is missing or holds a
/// different kind, which surfaces handler/metadata drift as a failed call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    values: Vec<ArgValue>,
}

impl CallArgs {
    pub fn new(values: Vec<ArgValue>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&ArgValue> {
        self.values
            .get(index)
            .ok_or_else(|| Error::invocation(format!("missing argument at position {}", index)))
    }

    /// String slot; `None` when absent.
    pub fn str(&self, index: usize) -> Result<Option<&str>> {
        match self.get(index)? {
            ArgValue::Null => Ok(None),
            ArgValue::Str(s) | ArgValue::Enum(s) => Ok(Some(s.as_str())),
            other => Err(mismatch(index, "string", other)),
        }
    }

    /// String slot treating absence and empty text alike.
    pub fn text(&self, index: usize) -> Result<&str> {
        Ok(self.str(index)?.unwrap_or(""))
    }

    pub fn i32(&self, index: usize) -> Result<i32> {
        match self.get(index)? {
            ArgValue::Int(v) => Ok(*v),
            ArgValue::Short(v) => Ok(i32::from(*v)),
            ArgValue::Byte(v) => Ok(i32::from(*v)),
            other => Err(mismatch(index, "integer", other)),
        }
    }

    pub fn i64(&self, index: usize) -> Result<i64> {
        match self.get(index)? {
            ArgValue::Long(v) => Ok(*v),
            ArgValue::Int(v) => Ok(i64::from(*v)),
            ArgValue::Short(v) => Ok(i64::from(*v)),
            ArgValue::Byte(v) => Ok(i64::from(*v)),
            other => Err(mismatch(index, "long", other)),
        }
    }

    pub fn f64(&self, index: usize) -> Result<f64> {
        match self.get(index)? {
            ArgValue::Double(v) => Ok(*v),
            ArgValue::Float(v) => Ok(f64::from(*v)),
            ArgValue::Int(v) => Ok(f64::from(*v)),
            ArgValue::Long(v) => Ok(*v as f64),
            other => Err(mismatch(index, "double", other)),
        }
    }

    pub fn bool(&self, index: usize) -> Result<bool> {
        match self.get(index)? {
            ArgValue::Bool(v) => Ok(*v),
            other => Err(mismatch(index, "boolean", other)),
        }
    }

    /// Enumerated choice; `None` when absent.
    pub fn enum_member(&self, index: usize) -> Result<Option<&str>> {
        match self.get(index)? {
            ArgValue::Null => Ok(None),
            ArgValue::Enum(s) => Ok(Some(s.as_str())),
            other => Err(mismatch(index, "enum", other)),
        }
    }

    /// Single-character slot. Supplied values arrive as one-character text,
    /// defaults as `'\0'`.
    pub fn char(&self, index: usize) -> Result<char> {
        match self.get(index)? {
            ArgValue::Char(c) => Ok(*c),
            ArgValue::Str(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(Error::invocation(format!(
                        "argument {} expected a single character, got '{}'",
                        index, s
                    ))),
                }
            }
            other => Err(mismatch(index, "char", other)),
        }
    }

    /// String list slot. Accepts a JSON array literal or comma-separated text.
    pub fn string_list(&self, index: usize) -> Result<Option<Vec<String>>> {
        let Some(raw) = self.str(index)? else {
            return Ok(None);
        };
        let trimmed = raw.trim();
        if trimmed.starts_with('[') {
            let items: Vec<String> = serde_json::from_str(trimmed).map_err(|e| {
                Error::invocation(format!("argument {} is not a string list: {}", index, e))
            })?;
            return Ok(Some(items));
        }
        Ok(Some(
            trimmed
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ))
    }
}

impl From<Vec<ArgValue>> for CallArgs {
    fn from(values: Vec<ArgValue>) -> Self {
        Self::new(values)
    }
}

fn mismatch(index: usize, expected: &str, got: &ArgValue) -> Error {
    Error::invocation(format!(
        "argument {} expected {}, got {}",
        index,
        expected,
        got.kind()
    ))
}
