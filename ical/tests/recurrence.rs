// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for recurrence expansion of parsed components.

use calendula_ical::{DateTime, ExpandOptions, RecurrenceRule, Strictness, parse_str};

fn calendar_with(event_lines: &str) -> String {
    format!(
        "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//EN\r\nBEGIN:VEVENT\r\nUID:r\r\n{event_lines}END:VEVENT\r\nEND:VCALENDAR\r\n"
    )
}

fn strings(dates: &[DateTime]) -> Vec<String> {
    dates.iter().map(ToString::to_string).collect()
}

#[test]
fn daily_count_of_seven_yields_six() {
    let src = calendar_with("DTSTART;VALUE=DATE:20240101\r\nRRULE:FREQ=DAILY;COUNT=7\r\n");
    let (calendar, errors) = parse_str(&src, Strictness::Strict);
    assert!(errors.is_empty(), "{errors:?}");

    let dates = calendar.events[0].occurrences(ExpandOptions::default());
    assert_eq!(
        strings(&dates),
        ["20240102", "20240103", "20240104", "20240105", "20240106", "20240107"]
    );
}

#[test]
fn rdate_and_exdate_are_merged() {
    let src = calendar_with(
        "DTSTART:20240101T090000Z\r\n\
         RRULE:FREQ=WEEKLY;COUNT=4\r\n\
         RDATE:20240103T090000Z,20240104T090000Z\r\n\
         RDATE:20240101T090000Z\r\n\
         EXDATE:20240115T090000Z\r\n",
    );
    let (calendar, errors) = parse_str(&src, Strictness::Strict);
    assert!(errors.is_empty(), "{errors:?}");

    let dates = calendar.events[0].occurrences(ExpandOptions::default());
    assert_eq!(
        strings(&dates),
        ["20240103T090000Z", "20240104T090000Z", "20240108T090000Z", "20240122T090000Z"]
    );
}

#[test]
fn date_only_exdate_removes_the_whole_day() {
    let src = calendar_with(
        "DTSTART:20240101T090000Z\r\n\
         RRULE:FREQ=DAILY;COUNT=4\r\n\
         EXDATE;VALUE=DATE:20240103\r\n",
    );
    let (calendar, errors) = parse_str(&src, Strictness::Strict);
    assert!(errors.is_empty(), "{errors:?}");

    let dates = calendar.events[0].occurrences(ExpandOptions::default());
    assert_eq!(strings(&dates), ["20240102T090000Z", "20240104T090000Z"]);
}

#[test]
fn occurrences_are_capped() {
    let src = calendar_with("DTSTART:20240101T090000Z\r\nRRULE:FREQ=DAILY\r\n");
    let (calendar, _) = parse_str(&src, Strictness::Strict);
    let options = ExpandOptions::default().with_max_instances(5);
    assert_eq!(calendar.events[0].occurrences(options).len(), 5);
}

#[test]
fn invalid_rules_are_reported() {
    #[rustfmt::skip]
    let fail_cases = [
        "RRULE:COUNT=3",                  // no FREQ
        "RRULE:FREQ=MONTHLY;BYDAY=0MO",   // zero ordinal
        "RRULE:FREQ=FORTNIGHTLY",         // unknown frequency
        "RRULE:FREQ=DAILY;INTERVAL=0",    // zero interval
        "RRULE:FREQ=YEARLY;BYMONTH=13",   // out of range
    ];
    for line in fail_cases {
        let src = calendar_with(&format!("DTSTART:20240101T090000Z\r\n{line}\r\n"));
        for strictness in [Strictness::Strict, Strictness::Loose] {
            let (calendar, errors) = parse_str(&src, strictness);
            assert_eq!(errors.len(), 1, "{line}: {errors:?}");
            assert_eq!(errors[0].text, line);
            assert!(calendar.events[0].descriptive.rrule.is_none(), "{line}");
            assert!(calendar.events[0].occurrences(ExpandOptions::default()).is_empty());
        }
    }
}

#[test]
fn rule_text_is_regenerated() {
    #[rustfmt::skip]
    let cases = [
        ("freq=monthly;byday=-1fr;count=4",              "FREQ=MONTHLY;COUNT=4;BYDAY=-1FR"),
        ("FREQ=YEARLY;BYMONTH=3;BYDAY=2SU",              "FREQ=YEARLY;BYDAY=2SU;BYMONTH=3"),
        ("WKST=SU;FREQ=WEEKLY;INTERVAL=2;BYDAY=TU,TH",   "FREQ=WEEKLY;INTERVAL=2;BYDAY=TU,TH;WKST=SU"),
    ];
    for (src, expected) in cases {
        let rule = RecurrenceRule::parse(src, Strictness::Strict).unwrap();
        assert_eq!(rule.to_string(), expected);
        let reparsed = RecurrenceRule::parse(expected, Strictness::Strict).unwrap();
        assert_eq!(reparsed, rule);
    }
}

#[test]
fn rfc_examples() {
    #[rustfmt::skip]
    let cases: [(&str, &str, &[&str]); 4] = [
        // last Friday of the month
        ("FREQ=MONTHLY;BYDAY=-1FR;COUNT=4", "20240126T090000",
            &["20240223T090000", "20240329T090000", "20240426T090000"]),
        // last work day of the month
        ("FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1;COUNT=3", "19970930T090000",
            &["19971031T090000", "19971128T090000"]),
        // weekly on Tuesday and Thursday for five weeks
        ("FREQ=WEEKLY;UNTIL=19971007T000000Z;WKST=SU;BYDAY=TU,TH", "19970902T090000Z",
            &["19970904T090000Z", "19970909T090000Z", "19970911T090000Z", "19970916T090000Z",
              "19970918T090000Z", "19970923T090000Z", "19970925T090000Z", "19970930T090000Z",
              "19971002T090000Z"]),
        // leap days only
        ("FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=29;COUNT=3", "20240229",
            &["20280229", "20320229"]),
    ];
    for (rule, anchor, expected) in cases {
        let rule = RecurrenceRule::parse(rule, Strictness::Strict).unwrap();
        let anchor = DateTime::parse(anchor).unwrap();
        assert_eq!(strings(&rule.expand(&anchor)), expected);
    }
}
