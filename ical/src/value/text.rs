// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Text value escaping as defined in RFC 5545 Section 3.3.11.
//!
//! ```txt
//! ESCAPED-CHAR = ("\\" / "\;" / "\," / "\N" / "\n")
//! ```
//!
//! Line breaks are already turned into `\n` characters by the line framer,
//! so only backslash, semicolon and comma escapes are handled here.

/// Resolve escapes in a TEXT value.
#[must_use]
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next() {
            Some(escaped @ ('\\' | ';' | ',')) => out.push(escaped),
            Some('n' | 'N') => out.push('\n'),
            // Not a valid escape, keep as-is
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Escape a TEXT value for output.
///
/// Line feeds are left alone; the line framer escapes them when folding.
#[must_use]
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\r' => {}
            c => out.push(c),
        }
    }
    out
}

/// Split a multi-valued TEXT property (e.g. `CATEGORIES`) on unescaped commas
/// and resolve each element.
#[must_use]
pub fn split_text_list(value: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ',' => {
                items.push(unescape_text(value.get(start..i).unwrap_or_default()));
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(unescape_text(value.get(start..).unwrap_or_default()));
    items
}

/// Join TEXT elements into one escaped, comma-separated value.
#[must_use]
pub fn join_text_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|s| escape_text(s.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}
