// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Date, date-time and UTC offset values as defined in RFC 5545 Sections
//! 3.3.4, 3.3.5 and 3.3.14.
//!
//! Parsing happens in two steps: the chumsky grammar only checks the shape of
//! the text, then calendar rules are applied. A shape mismatch is a
//! [`ValueError::Format`], an impossible date or time is a
//! [`ValueError::Invalid`].

use std::cmp::Ordering;
use std::fmt::{self, Display};

use chumsky::extra::ParserExtra;
use chumsky::prelude::*;
use jiff::civil;

use crate::Strictness;
use crate::error::ValueError;
use crate::keyword::{KW_DATE, KW_DATETIME, KW_TZID, KW_VALUE};
use crate::property::Property;

/// A calendar date, optionally with a time of day.
///
/// Time-zone identifiers are not resolved: a value is either floating, UTC
/// (`Z` suffix), or carries a `TZID` on its [`DateProperty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateTime {
    civil: civil::DateTime,
    date_only: bool,
    utc: bool,
}

impl DateTime {
    /// Create a date-only value.
    ///
    /// ## Errors
    /// Returns [`ValueError::Invalid`] if the day does not exist.
    pub fn date(year: i16, month: i8, day: i8) -> Result<Self, ValueError> {
        let date = checked_date(year, month, day)?;
        Ok(Self {
            civil: date.to_datetime(civil::Time::midnight()),
            date_only: true,
            utc: false,
        })
    }

    /// Create a date-time value.
    ///
    /// ## Errors
    /// Returns [`ValueError::Invalid`] if the day does not exist or the time
    /// is out of range (hour > 23, minute or second > 59).
    pub fn date_time(
        year: i16,
        month: i8,
        day: i8,
        hour: i8,
        minute: i8,
        second: i8,
        utc: bool,
    ) -> Result<Self, ValueError> {
        let date = checked_date(year, month, day)?;
        let time = checked_time(hour, minute, second)?;
        Ok(Self {
            civil: date.to_datetime(time),
            date_only: false,
            utc,
        })
    }

    /// Parse `YYYYMMDD` or `YYYYMMDDTHHMMSS[Z]`.
    ///
    /// ## Errors
    /// Returns [`ValueError::Format`] when the text is not date-shaped and
    /// [`ValueError::Invalid`] when it denotes an impossible date or time.
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let shape = date_time_shape::<'_, _, extra::Err<Rich<'_, char>>>()
            .parse(text)
            .into_result()
            .map_err(|errs| ValueError::format("date-time", describe(text, &errs)))?;

        let (year, month, day) = shape.date;
        match shape.time {
            None => Self::date(year, month, day),
            Some((hour, minute, second)) => {
                Self::date_time(year, month, day, hour, minute, second, shape.utc)
            }
        }
    }

    /// Parse a comma-separated list of dates or date-times.
    ///
    /// ## Errors
    /// Fails with the error of the first element that does not parse.
    pub fn parse_list(text: &str) -> Result<Vec<Self>, ValueError> {
        text.split(',').map(|s| Self::parse(s.trim())).collect()
    }

    /// Build from a civil date-time, keeping only the date if `date_only`.
    #[must_use]
    pub fn from_civil(civil: civil::DateTime, date_only: bool, utc: bool) -> Self {
        let civil = if date_only {
            civil.date().to_datetime(civil::Time::midnight())
        } else {
            civil
        };
        Self {
            civil,
            date_only,
            utc: utc && !date_only,
        }
    }

    /// The value as a `jiff` civil date-time (midnight for date-only values).
    #[must_use]
    pub const fn civil(&self) -> civil::DateTime {
        self.civil
    }

    /// The calendar date.
    #[must_use]
    pub fn civil_date(&self) -> civil::Date {
        self.civil.date()
    }

    /// Year, 0-9999.
    #[must_use]
    pub fn year(&self) -> i16 {
        self.civil.year()
    }

    /// Month, 1-12.
    #[must_use]
    pub fn month(&self) -> i8 {
        self.civil.month()
    }

    /// Day of month, 1-31.
    #[must_use]
    pub fn day(&self) -> i8 {
        self.civil.day()
    }

    /// Hour, zero for date-only values.
    #[must_use]
    pub fn hour(&self) -> i8 {
        self.civil.hour()
    }

    /// Minute, zero for date-only values.
    #[must_use]
    pub fn minute(&self) -> i8 {
        self.civil.minute()
    }

    /// Second, zero for date-only values.
    #[must_use]
    pub fn second(&self) -> i8 {
        self.civil.second()
    }

    /// Whether this value carries no time of day.
    #[must_use]
    pub const fn is_date_only(&self) -> bool {
        self.date_only
    }

    /// Whether the value had a trailing `Z`.
    #[must_use]
    pub const fn is_utc(&self) -> bool {
        self.utc
    }

    /// The `VALUE` type this value serializes as.
    #[must_use]
    pub const fn value_type(&self) -> &'static str {
        if self.date_only { KW_DATE } else { KW_DATETIME }
    }

    fn sort_key(&self) -> (civil::Date, bool, civil::Time, bool) {
        let c = &self.civil;
        (c.date(), !self.date_only, c.time(), self.utc)
    }
}

/// Values order by calendar day first; on the same day a date-only value
/// sorts before any timed value.
impl Ord for DateTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for DateTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.civil;
        write!(f, "{:04}{:02}{:02}", c.year(), c.month(), c.day())?;
        if !self.date_only {
            write!(f, "T{:02}{:02}{:02}", c.hour(), c.minute(), c.second())?;
            if self.utc {
                write!(f, "Z")?;
            }
        }
        Ok(())
    }
}

fn out_of_range(what: &'static str, field: &str, value: impl Display) -> ValueError {
    ValueError::invalid(what, format!("{field} {value} out of range"))
}

fn checked_date(year: i16, month: i8, day: i8) -> Result<civil::Date, ValueError> {
    if !(0..=9999).contains(&year) {
        return Err(out_of_range("date", "year", year));
    }
    if !(1..=12).contains(&month) {
        return Err(out_of_range("date", "month", month));
    }
    civil::Date::new(year, month, day).map_err(|_| {
        ValueError::invalid(
            "date",
            format!("day {day} does not exist in {year:04}-{month:02}"),
        )
    })
}

fn checked_time(hour: i8, minute: i8, second: i8) -> Result<civil::Time, ValueError> {
    if !(0..=23).contains(&hour) {
        return Err(out_of_range("time", "hour", hour));
    }
    if !(0..=59).contains(&minute) {
        return Err(out_of_range("time", "minute", minute));
    }
    if !(0..=59).contains(&second) {
        return Err(out_of_range("time", "second", second));
    }
    civil::Time::new(hour, minute, second, 0)
        .map_err(|e| ValueError::invalid("time", e.to_string()))
}

/// A date or date-time property, with its `TZID` and `VALUE` tagging kept in
/// sync with the typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateProperty {
    property: Property,
    value: DateTime,
}

impl DateProperty {
    /// Create a property from a typed value, tagging `VALUE` as `DATE` or
    /// `DATE-TIME`.
    ///
    /// ## Errors
    /// Returns [`ValueError::Format`] if the property name is not valid.
    pub fn new(name: &str, value: DateTime) -> Result<Self, ValueError> {
        let mut property = Property::new(name, value.to_string())?;
        property.set_attribute(KW_VALUE, value.value_type());
        Ok(Self { property, value })
    }

    /// Parse the value of a property.
    ///
    /// In strict mode a `VALUE=DATE` / `VALUE=DATE-TIME` attribute that does
    /// not match the value is an error; in loose mode the value wins.
    ///
    /// ## Errors
    /// Fails with the error of [`DateTime::parse`], or [`ValueError::Invalid`]
    /// on a strict-mode `VALUE` mismatch.
    pub fn from_property(property: Property, strictness: Strictness) -> Result<Self, ValueError> {
        let value = DateTime::parse(property.value().trim())?;
        check_value_type(&property, &[value.value_type()], strictness)?;
        Ok(Self { property, value })
    }

    /// The typed value.
    #[must_use]
    pub const fn value(&self) -> &DateTime {
        &self.value
    }

    /// The underlying property.
    #[must_use]
    pub const fn property(&self) -> &Property {
        &self.property
    }

    /// The `TZID` attribute, if any.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.property.attribute(KW_TZID)
    }

    /// Replace the value, re-tagging `VALUE` when the kind changes.
    pub fn set(&mut self, value: DateTime) {
        self.property.set_value(value.to_string());
        if self.property.attribute(KW_VALUE).is_some() || value.is_date_only() {
            self.property.set_attribute(KW_VALUE, value.value_type());
        }
        if value.is_utc() {
            self.property.remove_attribute(KW_TZID);
        }
        self.value = value;
    }

    /// Set or clear the `TZID` attribute.
    pub fn set_tzid(&mut self, tzid: Option<&str>) {
        match tzid {
            Some(tzid) => self.property.set_attribute(KW_TZID, tzid),
            None => self.property.remove_attribute(KW_TZID),
        }
    }
}

/// Check a property's `VALUE` attribute against the accepted value types.
pub(crate) fn check_value_type(
    property: &Property,
    accepted: &[&str],
    strictness: Strictness,
) -> Result<(), ValueError> {
    match property.attribute(KW_VALUE) {
        Some(tag)
            if strictness.is_strict() && !accepted.iter().any(|a| a.eq_ignore_ascii_case(tag)) =>
        {
            Err(ValueError::invalid(
                "date-time",
                format!("VALUE={tag} does not match {}", property.value()),
            ))
        }
        _ => Ok(()),
    }
}

/// UTC offset value defined in RFC 5545 Section 3.3.14, stored in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcOffset {
    seconds: i32,
}

impl UtcOffset {
    /// Parse `(+|-)HHMM[SS]`.
    ///
    /// ## Errors
    /// Returns [`ValueError::Format`] on a shape mismatch and
    /// [`ValueError::Invalid`] for out-of-range fields or `-0000`.
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let shape = utc_offset_shape::<'_, _, extra::Err<Rich<'_, char>>>();
        let (negative, (hour, minute, second)) = shape
            .parse(text.trim())
            .into_result()
            .map_err(|errs| ValueError::format("utc-offset", describe(text, &errs)))?;

        if hour > 23 || minute > 59 || second > 59 {
            return Err(out_of_range("utc-offset", "offset", text));
        }
        if negative && hour == 0 && minute == 0 && second == 0 {
            return Err(ValueError::invalid("utc-offset", "-0000 is not allowed"));
        }

        let seconds = i32::from(hour) * 3600 + i32::from(minute) * 60 + i32::from(second);
        Ok(Self {
            seconds: if negative { -seconds } else { seconds },
        })
    }

    /// Offset from UTC in seconds.
    #[must_use]
    pub const fn seconds(self) -> i32 {
        self.seconds
    }
}

impl Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.seconds < 0 { '-' } else { '+' };
        let total = self.seconds.unsigned_abs();
        write!(f, "{sign}{:02}{:02}", total / 3600, total / 60 % 60)?;
        if total % 60 != 0 {
            write!(f, "{:02}", total % 60)?;
        }
        Ok(())
    }
}

struct DateTimeShape {
    date: (i16, i8, i8),
    time: Option<(i8, i8, i8)>,
    utc: bool,
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// date-time  = date [ "T" time ]
/// date       = 4DIGIT 2DIGIT 2DIGIT
/// time       = 2DIGIT 2DIGIT 2DIGIT [ "Z" ]
/// ```
fn date_time_shape<'src, I, E>() -> impl Parser<'src, I, DateTimeShape, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    let date = digits::<_, _, i16>(4).then(digits::<_, _, i8>(2)).then(digits::<_, _, i8>(2));
    let time = digits::<_, _, i8>(2)
        .then(digits::<_, _, i8>(2))
        .then(digits::<_, _, i8>(2))
        .then(just('Z').or_not());

    date.then(just('T').ignore_then(time).or_not())
        .map(|(((year, month), day), time)| DateTimeShape {
            date: (year, month, day),
            time: time.map(|(((h, m), s), _)| (h, m, s)),
            utc: matches!(time, Some((_, Some(_)))),
        })
}

/// ```txt
/// utc-offset = ("+" / "-") 2DIGIT 2DIGIT [2DIGIT]
/// ```
fn utc_offset_shape<'src, I, E>() -> impl Parser<'src, I, (bool, (u8, u8, u8)), E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    select! { c @ ('+' | '-') => c == '-' }.then(
        digits::<_, _, u8>(2)
            .then(digits::<_, _, u8>(2))
            .then(digits::<_, _, u8>(2).or_not())
            .map(|((h, m), s)| (h, m, s.unwrap_or(0))),
    )
}

/// Exactly `count` decimal digits, folded into a number.
fn digits<'src, I, E, T>(count: usize) -> impl Parser<'src, I, T, E> + Clone
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    T: TryFrom<u32> + Default,
{
    select! { c @ '0'..='9' => c }
        .repeated()
        .exactly(count)
        .collect::<String>()
        .map(|s| {
            let n = s
                .chars()
                .filter_map(|c| c.to_digit(10))
                .fold(0, |acc, d| acc * 10 + d);
            T::try_from(n).unwrap_or_default()
        })
}

/// Render chumsky errors as a short reason.
pub(crate) fn describe(text: &str, errs: &[Rich<'_, char>]) -> String {
    match errs.first() {
        Some(err) => format!("`{text}`: {err}"),
        None => format!("`{text}`"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dates_and_date_times() {
        #[rustfmt::skip]
        let success_cases = [
            // examples from RFC 5545 Section 3.3.4 and 3.3.5
            ("19970714",         (1997, 7, 14, 0, 0, 0, true, false)),
            ("19980118T230000",  (1998, 1, 18, 23, 0, 0, false, false)),
            ("19980119T070000Z", (1998, 1, 19, 7, 0, 0, false, true)),
            ("20000229",         (2000, 2, 29, 0, 0, 0, true, false)),
            ("20240229T235959",  (2024, 2, 29, 23, 59, 59, false, false)),
        ];
        for (src, (y, mo, d, h, mi, s, date_only, utc)) in success_cases {
            let dt = DateTime::parse(src).unwrap();
            let date = (dt.year(), dt.month(), dt.day());
            let time = (dt.hour(), dt.minute(), dt.second());
            assert_eq!((date, time), ((y, mo, d), (h, mi, s)), "{src}");
            assert_eq!(dt.is_date_only(), date_only, "{src}");
            assert_eq!(dt.is_utc(), utc, "{src}");
            assert_eq!(dt.to_string(), src);
        }
    }

    #[test]
    fn rejects_malformed_text_as_format_errors() {
        let fail_cases = [
            "",
            "2024011",
            "202401011",
            "abcd1234",
            "20240101T",
            "20240101T0900",
            "20240101T090000ZZ",
            "20240101 090000",
            "20240101t090000",
        ];
        for src in fail_cases {
            let err = DateTime::parse(src).unwrap_err();
            assert!(matches!(err, ValueError::Format { .. }), "{src}: {err}");
        }
    }

    #[test]
    fn rejects_impossible_values_as_validity_errors() {
        let fail_cases = [
            "20230230",
            "20241301",
            "20240001",
            "20240100",
            "20240132",
            "20240101T240000",
            "20240101T006000",
            "20240101T000060",
        ];
        for src in fail_cases {
            let err = DateTime::parse(src).unwrap_err();
            assert!(matches!(err, ValueError::Invalid { .. }), "{src}: {err}");
        }
    }

    #[test]
    fn applies_gregorian_leap_year_rule() {
        assert!(DateTime::date(2023, 2, 29).is_err());
        assert!(DateTime::date(2024, 2, 29).is_ok());
        assert!(DateTime::date(2000, 2, 29).is_ok());
        // Century years are leap years only when divisible by 400
        assert!(DateTime::date(1900, 2, 29).is_err());
        assert!(DateTime::date(2100, 2, 29).is_err());
    }

    #[test]
    fn orders_date_only_before_timed_on_same_day() {
        let date = DateTime::date(2024, 3, 1).unwrap();
        let midnight = DateTime::date_time(2024, 3, 1, 0, 0, 0, false).unwrap();
        let noon = DateTime::date_time(2024, 3, 1, 12, 0, 0, false).unwrap();
        let prev_evening = DateTime::date_time(2024, 2, 29, 23, 0, 0, false).unwrap();

        assert!(date < midnight);
        assert!(midnight > date);
        assert!(date < noon);
        assert!(prev_evening < date);
        assert_eq!(date.cmp(&date), Ordering::Equal);

        let mut values = vec![noon, date, prev_evening, midnight];
        values.sort();
        assert_eq!(values, [prev_evening, date, midnight, noon]);
    }

    #[test]
    fn parses_date_lists() {
        let values = DateTime::parse_list("20240101,20240108, 20240115").unwrap();
        assert_eq!(values.len(), 3);
        assert!(DateTime::parse_list("20240101,bogus").is_err());
    }

    #[test]
    fn date_property_tags_value_type() {
        let date = DateTime::date(2024, 5, 1).unwrap();
        let mut prop = DateProperty::new("DTSTART", date).unwrap();
        assert_eq!(prop.property().attribute("VALUE"), Some("DATE"));
        assert_eq!(prop.property().value(), "20240501");

        let timed = DateTime::date_time(2024, 5, 1, 9, 30, 0, false).unwrap();
        prop.set(timed);
        assert_eq!(prop.property().attribute("VALUE"), Some("DATE-TIME"));
        assert_eq!(prop.property().value(), "20240501T093000");

        prop.set_tzid(Some("Europe/Paris"));
        assert_eq!(prop.tzid(), Some("Europe/Paris"));
        prop.set(DateTime::date_time(2024, 5, 1, 7, 30, 0, true).unwrap());
        assert_eq!(prop.tzid(), None);
    }

    #[test]
    fn date_property_checks_value_tag_in_strict_mode() {
        let prop = Property::parse_str("DTSTART;VALUE=DATE:20240101T090000", Strictness::Loose)
            .unwrap();
        let loose = DateProperty::from_property(prop.clone(), Strictness::Loose);
        assert!(loose.is_ok());
        let err = DateProperty::from_property(prop, Strictness::Strict).unwrap_err();
        assert!(matches!(err, ValueError::Invalid { .. }));

        let src = "DTSTART;TZID=America/New_York:20240101T090000";
        let prop = Property::parse_str(src, Strictness::Strict).unwrap();
        let prop = DateProperty::from_property(prop, Strictness::Strict).unwrap();
        assert_eq!(prop.tzid(), Some("America/New_York"));
    }

    #[test]
    fn parses_utc_offsets() {
        #[rustfmt::skip]
        let success_cases = [
            ("-0500",   -5 * 3600),
            ("+0100",   3600),
            ("+0530",   5 * 3600 + 30 * 60),
            ("+000015", 15),
            ("+0000",   0),
        ];
        for (src, seconds) in success_cases {
            let offset = UtcOffset::parse(src).unwrap();
            assert_eq!(offset.seconds(), seconds, "{src}");
            assert_eq!(offset.to_string(), src);
        }

        for src in ["0500", "+05", "+05000", "x0500"] {
            let result = UtcOffset::parse(src);
            assert!(matches!(result, Err(ValueError::Format { .. })), "{src}");
        }
        for src in ["+2400", "+0060", "-0000"] {
            let result = UtcOffset::parse(src);
            assert!(matches!(result, Err(ValueError::Invalid { .. })), "{src}");
        }
    }
}
