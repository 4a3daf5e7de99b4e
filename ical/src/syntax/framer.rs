// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Line framing for iCalendar streams as defined in RFC 5545 Section 3.1.
//!
//! Unfolding joins physical lines that start with a single SPACE or HTAB onto
//! the previous logical line, and folding breaks long logical lines back into
//! physical lines of bounded width.
//!
//! ```text
//! DESCRIPTION:This is a lo        DESCRIPTION:This is a long description
//!  ng description          <=>
//! ```

use std::io::{self, BufRead};

/// Maximum number of content characters on one physical output line.
pub const MAX_LINE_CHARS: usize = 74;

const LINE_TERMINATOR: &str = "\r\n";

/// An unfolded content line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based number of the first physical line this logical line came from.
    pub number: usize,

    /// Unfolded text, without line terminator. Escaped `\n` sequences are
    /// already converted into line feeds.
    pub text: String,

    /// Whether the line was terminated by a bare LF (no CR) while more input
    /// followed.
    pub bare_line_feed: bool,
}

impl LogicalLine {
    /// Create a logical line from already unfolded text.
    #[must_use]
    pub fn new(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
            bare_line_feed: false,
        }
    }

    /// Whether the line contains nothing but whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug)]
struct PhysicalLine {
    number: usize,
    text: String,
    bare_line_feed: bool,
}

/// Lazy iterator of logical lines read from a buffered source.
///
/// Reading stops as soon as the caller stops pulling; bytes after the last
/// requested line (plus one line of lookahead) are never read.
#[derive(Debug)]
pub struct LogicalLines<R> {
    reader: R,
    read: usize,
    lookahead: Option<PhysicalLine>,
    exhausted: bool,
}

impl<R: BufRead> LogicalLines<R> {
    /// Wrap a buffered reader.
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            read: 0,
            lookahead: None,
            exhausted: false,
        }
    }

    /// Number of physical lines consumed from the source so far.
    #[must_use]
    pub const fn lines_read(&self) -> usize {
        self.read
    }

    fn read_physical(&mut self) -> io::Result<Option<PhysicalLine>> {
        let mut buf = Vec::new();
        if self.reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        self.read += 1;

        let mut bare_line_feed = false;
        if buf.last() == Some(&b'\n') {
            buf.pop();
            bare_line_feed = buf.last() != Some(&b'\r');
        }
        buf.retain(|&b| b != b'\r');

        let text = match String::from_utf8(buf) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        };

        Ok(Some(PhysicalLine {
            number: self.read,
            text,
            bare_line_feed,
        }))
    }

    fn next_physical(&mut self) -> io::Result<Option<PhysicalLine>> {
        match self.lookahead.take() {
            Some(line) => Ok(Some(line)),
            None => self.read_physical(),
        }
    }

    fn next_logical(&mut self) -> io::Result<Option<LogicalLine>> {
        let Some(first) = self.next_physical()? else {
            return Ok(None);
        };

        let number = first.number;
        let mut text = first.text;
        let mut last_bare = first.bare_line_feed;
        while let Some(next) = self.read_physical()? {
            match next.text.strip_prefix([' ', '\t']) {
                Some(continuation) => {
                    text.push_str(continuation);
                    last_bare = next.bare_line_feed;
                }
                None => {
                    self.lookahead = Some(next);
                    break;
                }
            }
        }

        Ok(Some(LogicalLine {
            number,
            text: unescape_line_breaks(text),
            bare_line_feed: last_bare && self.lookahead.is_some(),
        }))
    }
}

impl<R: BufRead> Iterator for LogicalLines<R> {
    type Item = io::Result<LogicalLine>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        match self.next_logical() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => {
                self.exhausted = true;
                None
            }
            Err(err) => {
                self.exhausted = true;
                Some(Err(err))
            }
        }
    }
}

/// Unfold an in-memory string into logical lines.
#[must_use]
pub fn unfold(src: &str) -> Vec<LogicalLine> {
    LogicalLines::new(src.as_bytes())
        .filter_map(Result::ok)
        .collect()
}

/// Fold one logical line into wire text.
///
/// Line feeds are escaped as `\n`, physical lines carry at most
/// [`MAX_LINE_CHARS`] characters of content (continuations start with one
/// SPACE, which counts), and the output always ends with CRLF.
#[must_use]
pub fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / MAX_LINE_CHARS * 3 + 2);
    let mut width = 0;
    let mut limit = MAX_LINE_CHARS;
    let mut push = |out: &mut String, c: char| {
        if width == limit {
            out.push_str(LINE_TERMINATOR);
            out.push(' ');
            width = 0;
            limit = MAX_LINE_CHARS - 1;
        }
        out.push(c);
        width += 1;
    };

    for c in text.chars() {
        match c {
            '\n' => {
                push(&mut out, '\\');
                push(&mut out, 'n');
            }
            '\r' => {}
            c => push(&mut out, c),
        }
    }

    out.push_str(LINE_TERMINATOR);
    out
}

/// Convert `\n` / `\N` escapes into line feeds, leaving `\\` pairs intact.
fn unescape_line_breaks(text: String) -> String {
    if !text.contains('\\') {
        return text;
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(src: &str) -> Vec<String> {
        unfold(src).into_iter().map(|l| l.text).collect()
    }

    #[test]
    fn unfolds_continuation_lines() {
        let src =
            "DESCRIPTION:This is a long description\r\n  that continues here\r\nSUMMARY:x\r\n";
        assert_eq!(
            texts(src),
            ["DESCRIPTION:This is a long description that continues here", "SUMMARY:x"]
        );
    }

    #[test]
    fn unfolds_tab_continuations() {
        let src = "A:First\r\n\tSecond\r\n Third\r\n";
        assert_eq!(texts(src), ["A:FirstSecondThird"]);
    }

    #[test]
    fn tracks_first_physical_line_number() {
        let lines = unfold("BEGIN:VCALENDAR\r\nX-A:1\r\n 2\r\n 3\r\nX-B:4\r\n");
        let numbers: Vec<_> = lines.iter().map(|l| l.number).collect();
        assert_eq!(numbers, [1, 2, 5]);
    }

    #[test]
    fn converts_escaped_line_breaks() {
        assert_eq!(texts("DESCRIPTION:a\\nb\\Nc\r\n"), ["DESCRIPTION:a\nb\nc"]);
        // An escaped backslash followed by `n` stays literal
        assert_eq!(texts("DESCRIPTION:a\\\\nb\r\n"), ["DESCRIPTION:a\\\\nb"]);
        // Escape split across a fold boundary
        assert_eq!(texts("DESCRIPTION:a\\\r\n nb\r\n"), ["DESCRIPTION:a\nb"]);
    }

    #[test]
    fn drops_carriage_returns() {
        assert_eq!(texts("A:x\ry\r\n"), ["A:xy"]);
    }

    #[test]
    fn flags_bare_line_feeds_followed_by_content() {
        let lines = unfold("A:1\nB:2\r\nC:3\n");
        assert!(lines[0].bare_line_feed);
        assert!(!lines[1].bare_line_feed);
        // followed by end of input
        assert!(!lines[2].bare_line_feed);

        // followed by a continuation marker
        let lines = unfold("A:1\n 2\r\nB:3\r\n");
        assert_eq!(lines[0].text, "A:12");
        assert!(!lines[0].bare_line_feed);
    }

    #[test]
    fn keeps_blank_lines() {
        assert_eq!(texts("A:1\r\n\r\nB:2\r\n"), ["A:1", "", "B:2"]);
    }

    #[test]
    fn iteration_is_lazy() {
        let src = "A:1\r\nB:2\r\nC:3\r\nD:4\r\n";
        let mut lines = LogicalLines::new(src.as_bytes());
        assert_eq!(lines.next().unwrap().unwrap().text, "A:1");
        // one line of lookahead
        assert_eq!(lines.lines_read(), 2);
    }

    #[test]
    fn folds_long_lines() {
        let text = "X".repeat(200);
        let folded = fold(&text);
        let physical: Vec<_> = folded.split_terminator("\r\n").collect();
        assert_eq!(physical.len(), 3);
        assert_eq!(physical[0].chars().count(), MAX_LINE_CHARS);
        assert_eq!(physical[1].chars().count(), MAX_LINE_CHARS);
        assert!(physical[1].starts_with(' '));
        assert!(physical[2].starts_with(' '));
        assert!(folded.ends_with("\r\n"));
    }

    #[test]
    fn fold_never_splits_characters() {
        let text = "SUMMARY:".to_string() + &"会议📅".repeat(40);
        let folded = fold(&text);
        for line in folded.split_terminator("\r\n") {
            assert!(line.chars().count() <= MAX_LINE_CHARS);
        }
    }

    #[test]
    fn fold_escapes_line_feeds() {
        assert_eq!(fold("DESCRIPTION:a\nb"), "DESCRIPTION:a\\nb\r\n");
        assert_eq!(fold(""), "\r\n");
    }

    #[test]
    fn fold_unfold_round_trip() {
        let cases = [
            String::new(),
            "SUMMARY:short".to_string(),
            "DESCRIPTION:".to_string() + &"lorem ipsum dolor ".repeat(30),
            "DESCRIPTION:multi\nline\ntext".to_string(),
            "  leading spaces survive".to_string(),
            "X-A:".to_string() + &" ".repeat(150),
            "SUMMARY:".to_string() + &"日本語テキスト".repeat(20),
        ];
        for text in cases {
            let lines = unfold(&fold(&text));
            assert_eq!(lines.len(), 1, "{text:?}");
            assert_eq!(lines[0].text, text);
        }
    }
}
