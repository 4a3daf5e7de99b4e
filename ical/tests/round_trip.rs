// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Round-trip tests for the parser and formatter.

use calendula_ical::syntax::MAX_LINE_CHARS;
use calendula_ical::{Strictness, format_calendar, parse_str};

const ORIGINAL: &str = "\
BEGIN:VCALENDAR\r
PRODID:-//Example Corp.//Cal Client 1.0//EN\r
VERSION:2.0\r
CALSCALE:GREGORIAN\r
X-WR-TIMEZONE:America/New_York\r
BEGIN:VTIMEZONE\r
TZID:America/New_York\r
BEGIN:DAYLIGHT\r
DTSTART:20070311T020000\r
RRULE:FREQ=YEARLY;BYMONTH=3;BYDAY=2SU\r
TZOFFSETFROM:-0500\r
TZOFFSETTO:-0400\r
TZNAME:EDT\r
END:DAYLIGHT\r
BEGIN:STANDARD\r
DTSTART:20071104T020000\r
RRULE:FREQ=YEARLY;BYMONTH=11;BYDAY=1SU\r
TZOFFSETFROM:-0400\r
TZOFFSETTO:-0500\r
TZNAME:EST\r
END:STANDARD\r
END:VTIMEZONE\r
BEGIN:VEVENT\r
UID:12345@example.com\r
DTSTAMP:20250110T120000Z\r
DTSTART;TZID=America/New_York:20250110T140000\r
DTEND;TZID=America/New_York:20250110T150000\r
SEQUENCE:2\r
SUMMARY:Planning\\, round two\r
DESCRIPTION:Agenda:\\n1. budget\\n2. a rather long item that will certainly need to be folded on output\r
LOCATION:Room 101\r
ORGANIZER;CN=\"Doe, Jane\":mailto:jane@example.com\r
RRULE:FREQ=WEEKLY;COUNT=10;BYDAY=FR\r
EXDATE;TZID=America/New_York:20250117T140000,20250124T140000\r
PRIORITY:1\r
TRANSP:TRANSPARENT\r
BEGIN:VALARM\r
ACTION:EMAIL\r
TRIGGER;RELATED=END:-PT5M\r
SUMMARY:Done\r
DESCRIPTION:The meeting is over\r
ATTENDEE:mailto:jane@example.com\r
END:VALARM\r
END:VEVENT\r
BEGIN:VTODO\r
UID:todo-1@example.com\r
DTSTAMP:20250110T120000Z\r
DTSTART:20250110T090000Z\r
DURATION:P2D\r
PERCENT-COMPLETE:40\r
STATUS:IN-PROCESS\r
END:VTODO\r
BEGIN:VFREEBUSY\r
UID:fb-1@example.com\r
FREEBUSY;FBTYPE=BUSY-UNAVAILABLE:20250110T080000Z/PT8H,20250111T080000Z/20250111T120000Z\r
END:VFREEBUSY\r
END:VCALENDAR\r
";

#[test]
fn parse_format_parse_is_stable() {
    let (first, errors) = parse_str(ORIGINAL, Strictness::Strict);
    assert!(errors.is_empty(), "{errors:?}");

    let formatted = format_calendar(&first);
    let (second, errors) = parse_str(&formatted, Strictness::Strict);
    assert!(errors.is_empty(), "{errors:?}\n{formatted}");
    assert_eq!(first, second);

    // formatting is a fixed point after the first pass
    assert_eq!(format_calendar(&second), formatted);
}

#[test]
fn output_obeys_wire_rules() {
    let (calendar, _) = parse_str(ORIGINAL, Strictness::Strict);
    let formatted = format_calendar(&calendar);

    assert!(formatted.starts_with("BEGIN:VCALENDAR\r\nPRODID:"));
    assert!(formatted.ends_with("END:VCALENDAR\r\n"));
    assert!(!formatted.replace("\r\n", "").contains('\n'));
    for line in formatted.trim_end_matches("\r\n").split("\r\n") {
        assert!(line.chars().count() <= MAX_LINE_CHARS, "{line}");
    }

    assert!(formatted.contains("ORGANIZER;CN=\"Doe, Jane\":mailto:jane@example.com\r\n"));
    assert!(formatted.contains("TRIGGER;RELATED=\"END\":-PT5M\r\n"));
    assert!(formatted.contains("RRULE:FREQ=WEEKLY;COUNT=10;BYDAY=FR\r\n"));
    assert!(formatted.contains("SUMMARY:Planning\\, round two\r\n"));
}

#[test]
fn lowercase_input_is_emitted_uppercase() {
    let src = "begin:vcalendar\r\nversion:2.0\r\nprodid:x\r\nbegin:vjournal\r\nuid:j\r\nx-note;x-lang=en:hello\r\nend:vjournal\r\nend:vcalendar\r\n";
    let (calendar, errors) = parse_str(src, Strictness::Strict);
    assert!(errors.is_empty(), "{errors:?}");

    let formatted = format_calendar(&calendar);
    let journal = "BEGIN:VJOURNAL\r\nUID:j\r\nX-NOTE;X-LANG=\"en\":hello\r\nEND:VJOURNAL\r\n";
    assert!(formatted.contains(journal));
}
