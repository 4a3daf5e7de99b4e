// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! iCalendar (RFC 5545) formatter module.
//!
//! Components are first turned into their properties with [`ToProperties`],
//! then every property is written as one folded content line.
//!
//! # Example
//!
//! ```
//! use calendula_ical::{ICalendar, VEvent, Descriptive, format_calendar};
//!
//! let mut calendar = ICalendar::new();
//! calendar.events.push(VEvent::new(Descriptive::with_uid("1")));
//!
//! let text = format_calendar(&calendar);
//! assert!(text.starts_with("BEGIN:VCALENDAR\r\n"));
//! assert!(text.contains("UID:1\r\n"));
//! ```

mod component;

use std::io::{self, Write};

use crate::calendar::ICalendar;
use crate::formatter::component::write_icalendar;
use crate::property::Property;
use crate::syntax::fold;

pub use crate::formatter::component::ToProperties;

/// Format an `ICalendar` to a `String`.
#[must_use]
pub fn format_calendar(calendar: &ICalendar) -> String {
    let mut buffer = Vec::new();
    let mut formatter = Formatter::new(&mut buffer);
    // writing into a Vec cannot fail
    let _ = formatter.write(calendar);
    String::from_utf8(buffer)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// iCalendar formatter that writes to any `Write` implementer.
#[derive(Debug)]
pub struct Formatter<W: Write> {
    writer: W,
}

impl<W: Write> Formatter<W> {
    /// Create a new formatter.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Consumes this formatter, returning the underlying writer.
    #[must_use]
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Write an `ICalendar` to the underlying writer.
    ///
    /// # Errors
    /// Returns an error if writing fails.
    pub fn write(&mut self, calendar: &ICalendar) -> io::Result<()> {
        write_icalendar(self, calendar)
    }

    /// Write one property as folded content lines.
    pub(crate) fn write_property(&mut self, property: &Property) -> io::Result<()> {
        self.write_line(&property.to_string())
    }

    /// Write one logical line, folded and terminated by CRLF.
    pub(crate) fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(fold(line).as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Descriptive, VEvent};
    use crate::syntax::MAX_LINE_CHARS;

    #[test]
    fn writes_to_any_writer() {
        let mut calendar = ICalendar::new();
        let event = VEvent::new(Descriptive::with_uid("a"));
        calendar.events.push(event);

        let mut formatter = Formatter::new(Vec::new());
        formatter.write(&calendar).unwrap();
        let bytes = formatter.into_writer();
        let written = String::from_utf8(bytes).unwrap();
        assert_eq!(written, format_calendar(&calendar));
    }

    #[test]
    fn long_lines_are_folded() {
        let mut descriptive = Descriptive::with_uid("a");
        descriptive.description = Some("word ".repeat(40));
        let mut calendar = ICalendar::new();
        calendar.events.push(VEvent::new(descriptive));

        let text = format_calendar(&calendar);
        assert!(text.ends_with("\r\n"));
        for line in text.split("\r\n") {
            assert!(line.chars().count() <= MAX_LINE_CHARS, "{line}");
        }
    }
}
