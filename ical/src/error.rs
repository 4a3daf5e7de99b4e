// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Error types and the error reporter shared by every parsing stage.
//!
//! Value constructors fail with a [`ValueError`], which separates text that
//! does not match the grammar ([`ValueError::Format`]) from well-formed text
//! that denotes an impossible value ([`ValueError::Invalid`]). The component
//! assembler turns those failures, plus its own structural checks, into
//! [`ParseError`]s collected by an [`ErrorReporter`].

use std::fmt::{self, Display};

use crate::Strictness;

/// Failure of a single value constructor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// The text does not match the expected grammar.
    #[error("malformed {what}: {reason}")]
    Format {
        /// What was being parsed, e.g. `"date-time"`
        what: &'static str,
        /// Human readable reason
        reason: String,
    },

    /// The text is well-formed but denotes an impossible value.
    #[error("invalid {what}: {reason}")]
    Invalid {
        /// What was being parsed, e.g. `"date-time"`
        what: &'static str,
        /// Human readable reason
        reason: String,
    },
}

impl ValueError {
    pub(crate) fn format(what: &'static str, reason: impl Into<String>) -> Self {
        Self::Format {
            what,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(what: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            what,
            reason: reason.into(),
        }
    }

    /// The error category this failure belongs to.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Format { .. } => ErrorKind::Format,
            Self::Invalid { .. } => ErrorKind::Validity,
        }
    }
}

/// Category of a reported parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ErrorKind {
    /// Text does not match the expected grammar.
    Format,
    /// Text is well-formed but denotes an impossible value.
    Validity,
    /// Component nesting/ordering violation or missing calendar property.
    Structural,
}

/// A structured error reported while parsing a calendar stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-based number of the first physical line of the offending logical line,
    /// or of the last line read for end-of-stream errors.
    pub line: usize,

    /// Error category
    pub kind: ErrorKind,

    /// Human readable message
    pub message: String,

    /// The offending logical line, empty for end-of-stream errors
    pub text: String,
}

impl ParseError {
    /// Create a new parse error.
    #[must_use]
    pub fn new(
        line: usize,
        kind: ErrorKind,
        message: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            line,
            kind,
            message: message.into(),
            text: text.into(),
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text.is_empty() {
            write!(f, "line {}: {}", self.line, self.message)
        } else {
            write!(f, "line {}: {}: {}", self.line, self.message, self.text)
        }
    }
}

impl std::error::Error for ParseError {}

/// Receives every reported parse error, in line order.
pub trait ErrorListener {
    /// Called once per reported error.
    fn on_error(&mut self, error: &ParseError);
}

impl<F: FnMut(&ParseError)> ErrorListener for F {
    fn on_error(&mut self, error: &ParseError) {
        self(error);
    }
}

/// Accumulates parse errors and forwards them to the registered listeners.
///
/// Listeners are notified synchronously, in registration order, as soon as an
/// error is recorded.
pub struct ErrorReporter<'a> {
    strictness: Strictness,
    errors: Vec<ParseError>,
    listeners: Vec<Box<dyn ErrorListener + 'a>>,
}

impl<'a> ErrorReporter<'a> {
    /// Create an empty reporter for the given strictness.
    #[must_use]
    pub fn new(strictness: Strictness) -> Self {
        Self {
            strictness,
            errors: Vec::new(),
            listeners: Vec::new(),
        }
    }

    /// The strictness this reporter was created with.
    #[must_use]
    pub const fn strictness(&self) -> Strictness {
        self.strictness
    }

    /// Register a listener.
    pub fn add_listener(&mut self, listener: impl ErrorListener + 'a) {
        self.listeners.push(Box::new(listener));
    }

    /// Record an error regardless of strictness.
    pub fn report(&mut self, error: ParseError) {
        for listener in &mut self.listeners {
            listener.on_error(&error);
        }
        self.errors.push(error);
    }

    /// Record a failed value constructor for the given line.
    pub fn value(&mut self, line: usize, text: &str, error: &ValueError) {
        self.report(ParseError::new(line, error.kind(), error.to_string(), text));
    }

    /// Record a violation that is only an error in strict mode.
    ///
    /// Returns whether the error was recorded.
    pub fn strict(
        &mut self,
        line: usize,
        kind: ErrorKind,
        message: impl Into<String>,
        text: &str,
    ) -> bool {
        if self.strictness.is_strict() {
            self.report(ParseError::new(line, kind, message, text));
            true
        } else {
            false
        }
    }

    /// Record a structural violation (strict mode only).
    pub fn structural(&mut self, line: usize, message: impl Into<String>, text: &str) -> bool {
        self.strict(line, ErrorKind::Structural, message, text)
    }

    /// Errors recorded so far.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Consume the reporter, returning the recorded errors.
    #[must_use]
    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }
}

impl fmt::Debug for ErrorReporter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorReporter")
            .field("strictness", &self.strictness)
            .field("errors", &self.errors)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
