// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Generic property model: `NAME;ATTR=VAL;...:VALUE`.
//!
//! A [`Property`] keeps the raw value string; typed values (dates, durations,
//! recurrence rules) are built from it on demand by the component builders.

use std::fmt::{self, Display};

use crate::Strictness;
use crate::error::ValueError;
use crate::syntax::framer::{LogicalLine, fold};
use crate::syntax::scanner::{ContentLine, scan_content_line};

/// One iCalendar property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    name: String,
    attributes: Vec<(String, String)>,
    value: String,
}

impl Property {
    /// Create a property without attributes.
    ///
    /// The name is stored uppercase.
    ///
    /// ## Errors
    /// Returns [`ValueError::Format`] if the name is empty or contains
    /// characters outside `[0-9A-Za-z_-]`.
    pub fn new(name: &str, value: impl Into<String>) -> Result<Self, ValueError> {
        if name.is_empty() {
            return Err(ValueError::format("property", "empty property name"));
        }
        if !name.chars().all(is_name_char) {
            return Err(ValueError::format(
                "property",
                format!("invalid property name `{name}`"),
            ));
        }

        Ok(Self {
            name: name.to_ascii_uppercase(),
            attributes: Vec::new(),
            value: value.into(),
        })
    }

    /// Create a property with a name known to be valid, e.g. a keyword.
    pub(crate) fn named(name: &'static str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            attributes: Vec::new(),
            value: value.into(),
        }
    }

    /// Parse one logical line.
    ///
    /// ## Errors
    /// See [`Property::parse_str`].
    pub fn parse(line: &LogicalLine, strictness: Strictness) -> Result<Self, ValueError> {
        Self::parse_str(&line.text, strictness)
    }

    /// Parse unfolded content line text.
    ///
    /// ## Errors
    /// Returns [`ValueError::Format`] when no `:` separator is found, when an
    /// attribute is malformed, or, in strict mode, when an attribute value
    /// list contains an unquoted element (`TYPE=a,b`).
    pub fn parse_str(text: &str, strictness: Strictness) -> Result<Self, ValueError> {
        let ContentLine {
            name,
            parameters,
            value,
        } = scan_content_line(text).map_err(|e| ValueError::format("property", e.to_string()))?;

        let mut attributes = Vec::with_capacity(parameters.len());
        for param in parameters {
            if strictness.is_strict()
                && param.values.len() > 1
                && param.values.iter().any(|v| !v.quoted)
            {
                return Err(ValueError::format(
                    "property",
                    format!("unquoted comma in value of attribute {}", param.name),
                ));
            }

            let value = param
                .values
                .iter()
                .map(|v| decode_caret(v.value.trim()))
                .collect::<Vec<_>>()
                .join(",");
            attributes.push((param.name.to_ascii_uppercase(), value));
        }

        Ok(Self {
            name: name.to_ascii_uppercase(),
            attributes,
            value: value.to_owned(),
        })
    }

    /// Property name, uppercase.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw property value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the raw value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// All attributes in source order.
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Value of the first attribute with the given name (case-insensitive).
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Append an attribute, keeping any existing one with the same name.
    pub fn push_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.attributes
            .push((name.to_ascii_uppercase(), value.into()));
    }

    /// Set the first attribute with the given name, appending it if absent.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name.to_ascii_uppercase(), value)),
        }
    }

    /// Remove every attribute with the given name.
    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes
            .retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    /// Builder form of [`Property::push_attribute`].
    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.push_attribute(name, value);
        self
    }

    /// Serialize to folded wire text, terminated by CRLF.
    ///
    /// Every attribute value is quoted, with `"`, `^` and line feeds
    /// caret-encoded.
    #[must_use]
    pub fn to_text(&self) -> String {
        fold(&self.to_string())
    }
}

/// Unfolded form, without line terminator.
impl Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for (name, value) in &self.attributes {
            write!(f, ";{name}=\"{}\"", encode_caret(value))?;
        }
        write!(f, ":{}", self.value)
    }
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Decode RFC 6868 caret escapes: `^n`, `^'` and `^^`.
fn decode_caret(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '^' {
            result.push(c);
            continue;
        }

        match chars.peek() {
            Some('^') => result.push('^'),
            Some('n' | 'N') => result.push('\n'),
            Some('\'') => result.push('"'),
            // Unknown escape, preserve as-is
            _ => {
                result.push('^');
                continue;
            }
        }
        chars.next();
    }
    result
}

fn encode_caret(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '^' => result.push_str("^^"),
            '\n' => result.push_str("^n"),
            '"' => result.push_str("^'"),
            '\r' => {}
            _ => result.push(c),
        }
    }
    result
}
