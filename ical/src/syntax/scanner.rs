// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Scanner for unfolded iCalendar content lines.
//!
//! ```text
//! Logical Line → Lexer → Token Stream → Scanner → Content Line
//! ```
//!
//! Per RFC 5545, a content line has the format:
//! ```text
//! contentline = name *(";" param) ":" value CRLF
//! ```
//!
//! The value is everything after the first colon that is not inside a quoted
//! parameter value, taken verbatim from the line.

use std::iter::Peekable;

use crate::syntax::lexer::{Span, SpannedToken, Token, tokenize};

/// A scanned iCalendar content line, borrowing from the source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine<'src> {
    /// Property name as written (e.g., "DTSTART", "summary")
    pub name: &'src str,

    /// Property parameters (semicolon-separated)
    pub parameters: Vec<ScannedParameter<'src>>,

    /// Raw property value
    pub value: &'src str,
}

/// A scanned parameter from a content line.
///
/// Parameters have the format: `name=value` or `name=value1,value2`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedParameter<'src> {
    /// Parameter name (e.g., "TZID", "VALUE")
    pub name: &'src str,

    /// Parameter values (comma-separated)
    pub values: Vec<ScannedParameterValue<'src>>,

    /// Span of the entire parameter
    pub span: Span,
}

/// A single scanned parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannedParameterValue<'src> {
    /// The parameter value, without surrounding quotes
    pub value: &'src str,

    /// Whether the value was quoted in the source
    pub quoted: bool,
}

/// Errors that can occur when scanning a content line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentLineError {
    /// Missing colon separator.
    ///
    /// Example: `PROPNAME value` instead of `PROPNAME:value`
    #[error("missing colon in property")]
    MissingColon {
        /// Description of what was found instead
        found: Option<String>,
    },

    /// Content line without a property name.
    #[error("empty property name")]
    EmptyName,

    /// Invalid parameter syntax.
    #[error("{kind} at offset {}", .span.start)]
    InvalidParameter {
        /// Span of the invalid parameter
        span: Span,
        /// Specific error details
        kind: ParameterErrorKind,
    },
}

/// Specific parameter parsing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ParameterErrorKind {
    /// Missing equals sign.
    ///
    /// Example: `TZID America/New_York`
    #[strum(to_string = "missing equals in parameter")]
    MissingEquals,

    /// Missing parameter value.
    ///
    /// Example: `TZID=`
    #[strum(to_string = "missing parameter value")]
    MissingValue,

    /// Empty parameter name.
    ///
    /// Example: `;=value`
    #[strum(to_string = "empty parameter name")]
    EmptyName,

    /// Unterminated quoted string.
    ///
    /// Example: `PARAM="unclosed value`
    #[strum(to_string = "unterminated quoted string")]
    UnterminatedQuote,
}

/// Scan one unfolded content line.
///
/// ## Errors
/// Returns a [`ContentLineError`] when the line has no name, a parameter is
/// malformed, or no colon separates the value.
pub fn scan_content_line(src: &str) -> Result<ContentLine<'_>, ContentLineError> {
    let mut tokens = tokenize(src).peekable();

    let name = parse_property_name(src, &mut tokens).ok_or(ContentLineError::EmptyName)?;

    let mut parameters = Vec::new();
    while let Some(&SpannedToken(Token::Semicolon, semi_span)) = tokens.peek() {
        tokens.next(); // consume semicolon
        let param = parse_parameter(src, &mut tokens).map_err(|kind| {
            ContentLineError::InvalidParameter {
                span: semi_span,
                kind,
            }
        })?;
        parameters.push(param);
    }

    match tokens.next() {
        Some(SpannedToken(Token::Colon, span)) => Ok(ContentLine {
            name,
            parameters,
            value: src.get(span.end..).unwrap_or_default(),
        }),
        Some(SpannedToken(token, _)) => Err(ContentLineError::MissingColon {
            found: Some(token.to_string()),
        }),
        None => Err(ContentLineError::MissingColon { found: None }),
    }
}

/// Parse property name from tokens.
///
/// Property names are one word token: hyphens are part of words, so
/// `PERCENT-COMPLETE` and `X-WR-CALNAME` are single tokens.
fn parse_property_name<'src>(
    src: &'src str,
    tokens: &mut Peekable<impl Iterator<Item = SpannedToken<'src>>>,
) -> Option<&'src str> {
    match tokens.peek() {
        Some(&SpannedToken(Token::Word(_), span)) => {
            tokens.next();
            src.get(span.start..span.end)
        }
        _ => None,
    }
}

/// Parse a single parameter.
///
/// Format: `name=value` or `name=value1,value2`
fn parse_parameter<'src>(
    src: &'src str,
    tokens: &mut Peekable<impl Iterator<Item = SpannedToken<'src>>>,
) -> Result<ScannedParameter<'src>, ParameterErrorKind> {
    let (name, name_span) = match tokens.next() {
        Some(SpannedToken(Token::Word(name), span)) => (name, span),
        _ => return Err(ParameterErrorKind::EmptyName),
    };

    match tokens.next() {
        Some(SpannedToken(Token::Equal, _)) => {}
        Some(_) | None => return Err(ParameterErrorKind::MissingEquals),
    }

    let mut values = Vec::new();
    let end = loop {
        let Some((value, span)) = parse_parameter_value(src, tokens)? else {
            return Err(ParameterErrorKind::MissingValue);
        };
        values.push(value);

        match tokens.peek() {
            Some(&SpannedToken(Token::Comma, _)) => {
                tokens.next(); // consume comma
            }
            _ => break span.end,
        }
    };

    Ok(ScannedParameter {
        name,
        values,
        span: Span::new(name_span.start, end),
    })
}

/// Parse a single parameter value.
///
/// Returns `Ok(None)` if there's no value to parse.
fn parse_parameter_value<'src>(
    src: &'src str,
    tokens: &mut Peekable<impl Iterator<Item = SpannedToken<'src>>>,
) -> Result<Option<(ScannedParameterValue<'src>, Span)>, ParameterErrorKind> {
    let Some(&SpannedToken(first, first_span)) = tokens.peek() else {
        return Ok(None);
    };

    if first == Token::DQuote {
        tokens.next(); // consume opening quote
        let start = first_span.end;
        for SpannedToken(token, span) in tokens.by_ref() {
            if token == Token::DQuote {
                let value = ScannedParameterValue {
                    value: src.get(start..span.start).unwrap_or_default(),
                    quoted: true,
                };
                return Ok(Some((value, Span::new(first_span.start, span.end))));
            }
        }
        return Err(ParameterErrorKind::UnterminatedQuote);
    }

    // Collect until separator (semicolon, colon, comma)
    let start = first_span.start;
    let mut end = start;
    while let Some(&SpannedToken(token, span)) = tokens.peek() {
        match token {
            Token::Semicolon | Token::Colon | Token::Comma => break,
            _ => {
                end = span.end;
                tokens.next();
            }
        }
    }

    if end == start {
        return Ok(None);
    }

    let value = ScannedParameterValue {
        value: src.get(start..end).unwrap_or_default(),
        quoted: false,
    };
    Ok(Some((value, Span::new(start, end))))
}
