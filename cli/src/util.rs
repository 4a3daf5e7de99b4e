// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use calendula_ical::{ErrorKind, ICalendar, ParseError, Strictness, parse_reader};
use colored::Colorize;

/// Open a file for reading, `-` meaning standard input.
pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>, Box<dyn Error>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path).map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
    Ok(Box::new(BufReader::new(file)))
}

/// Parse a whole calendar file.
pub fn load_calendar(
    path: &Path,
    strictness: Strictness,
) -> Result<(ICalendar, Vec<ParseError>), Box<dyn Error>> {
    tracing::debug!(path = %path.display(), %strictness, "parsing calendar...");
    let reader = open_input(path)?;
    let (calendar, errors) = parse_reader(reader, strictness)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    tracing::debug!(components = calendar.len(), errors = errors.len(), "parsed");
    Ok((calendar, errors))
}

/// Render one error as `line N: kind error: message` plus the offending text.
pub fn format_parse_error(error: &ParseError) -> String {
    let head = format!("line {}:", error.line);
    let kind = format!("{} error:", error.kind);
    let kind = match error.kind {
        ErrorKind::Format => kind.red(),
        ErrorKind::Validity => kind.yellow(),
        ErrorKind::Structural => kind.magenta(),
    };

    let mut out = format!("{} {} {}", head.bold(), kind, error.message);
    if !error.text.is_empty() {
        out.push_str(&format!("\n    {}", error.text.dimmed()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn formats_parse_error() {
        colored::control::set_override(false);

        #[rustfmt::skip]
        let cases = [
            (ParseError::new(3, ErrorKind::Format, "bad", "DTSTART:x"),                      "line 3: format error: bad\n    DTSTART:x"),
            (ParseError::new(9, ErrorKind::Structural, "missing END:VCALENDAR", ""),         "line 9: structural error: missing END:VCALENDAR"),
        ];
        for (error, expected) in cases {
            assert_eq!(format_parse_error(&error), expected);
        }
    }

    #[test]
    fn loads_calendar_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.ics");
        std::fs::write(
            &path,
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:x\r\nBEGIN:VTODO\r\nUID:t\r\nEND:VTODO\r\nEND:VCALENDAR\r\n",
        )
        .unwrap();

        let (calendar, errors) = load_calendar(&path, Strictness::Strict).unwrap();
        assert!(errors.is_empty());
        assert_eq!(calendar.todos.len(), 1);

        let missing = temp_dir.path().join("missing.ics");
        assert!(load_calendar(&missing, Strictness::Loose).is_err());
    }
}
