// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence rule value type as defined in RFC 5545 Section 3.3.10.
//!
//! Only the rule itself lives here; expanding a rule into dates is the job of
//! [`crate::recur`].

use std::fmt::{self, Display};
use std::str::FromStr;

use chumsky::prelude::*;
use jiff::civil::Weekday;

use crate::Strictness;
use crate::error::ValueError;
use crate::keyword::{
    KW_DAY_FR, KW_DAY_MO, KW_DAY_SA, KW_DAY_SU, KW_DAY_TH, KW_DAY_TU, KW_DAY_WE, KW_RRULE_BYDAY,
    KW_RRULE_BYHOUR, KW_RRULE_BYMINUTE, KW_RRULE_BYMONTH, KW_RRULE_BYMONTHDAY, KW_RRULE_BYSECOND,
    KW_RRULE_BYSETPOS, KW_RRULE_BYWEEKNO, KW_RRULE_BYYEARDAY, KW_RRULE_COUNT, KW_RRULE_FREQ,
    KW_RRULE_FREQ_DAILY, KW_RRULE_FREQ_HOURLY, KW_RRULE_FREQ_MINUTELY, KW_RRULE_FREQ_MONTHLY,
    KW_RRULE_FREQ_SECONDLY, KW_RRULE_FREQ_WEEKLY, KW_RRULE_FREQ_YEARLY, KW_RRULE_INTERVAL,
    KW_RRULE_UNTIL, KW_RRULE_WKST,
};
use crate::value::datetime::{DateTime, describe};

const WHAT: &str = "recurrence rule";

/// Recurrence rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    /// Frequency of recurrence
    pub freq: Frequency,
    /// Until date for recurrence
    pub until: Option<DateTime>,
    /// Number of occurrences, the start included
    pub count: Option<u32>,
    /// Interval between recurrences
    pub interval: Option<u32>,
    /// Second specifier
    pub by_second: Vec<u8>,
    /// Minute specifier
    pub by_minute: Vec<u8>,
    /// Hour specifier
    pub by_hour: Vec<u8>,
    /// Day of month specifier
    pub by_month_day: Vec<i8>,
    /// Day of year specifier
    pub by_year_day: Vec<i16>,
    /// Week number specifier
    pub by_week_no: Vec<i8>,
    /// Month specifier
    pub by_month: Vec<u8>,
    /// Day of week specifier
    pub by_day: Vec<WeekDayNum>,
    /// Position within the set of one period
    pub by_set_pos: Vec<i16>,
    /// Start day of week
    pub wkst: Option<WeekDay>,
}

impl RecurrenceRule {
    /// A rule with the given frequency and no other parts.
    #[must_use]
    pub const fn new(freq: Frequency) -> Self {
        Self {
            freq,
            until: None,
            count: None,
            interval: None,
            by_second: Vec::new(),
            by_minute: Vec::new(),
            by_hour: Vec::new(),
            by_month_day: Vec::new(),
            by_year_day: Vec::new(),
            by_week_no: Vec::new(),
            by_month: Vec::new(),
            by_day: Vec::new(),
            by_set_pos: Vec::new(),
            wkst: None,
        }
    }

    /// Parse a rule such as `FREQ=MONTHLY;BYDAY=-1FR;COUNT=3`.
    ///
    /// ```txt
    /// recur           = recur-rule-part *( ";" recur-rule-part )
    ///                 ;
    ///                 ; The rule parts are not ordered in any
    ///                 ; particular sequence.
    ///                 ;
    ///                 ; The FREQ rule part is REQUIRED,
    ///                 ; but MUST NOT occur more than once.
    ///                 ;
    ///                 ; The other rule parts are OPTIONAL,
    ///                 ; but MUST NOT occur more than once.
    /// ```
    ///
    /// Part names and values are case-insensitive. Unknown and repeated
    /// parts are rejected in strict mode; loose mode ignores unknown parts
    /// and lets the last occurrence of a repeated part win.
    ///
    /// ## Errors
    /// Returns [`ValueError::Format`] for text that is not a rule part list,
    /// and [`ValueError::Invalid`] for a missing `FREQ`, a zero `INTERVAL` or
    /// `COUNT`, or a `BY*` value out of range.
    pub fn parse(text: &str, strictness: Strictness) -> Result<Self, ValueError> {
        let text = text.trim().to_ascii_uppercase();
        let mut parts = Vec::new();
        for segment in text.split(';').filter(|s| !s.is_empty()) {
            let Some((name, value)) = segment.split_once('=') else {
                return Err(ValueError::format(
                    WHAT,
                    format!("rule part `{segment}` has no `=`"),
                ));
            };

            match Part::parse(name, value)? {
                Some(part) => parts.push(part),
                None if strictness.is_strict() => {
                    return Err(ValueError::format(
                        WHAT,
                        format!("unknown rule part `{name}`"),
                    ));
                }
                None => tracing::debug!(part = name, "ignoring unknown recurrence rule part"),
            }
        }

        build_from_parts(parts, strictness)
    }

    /// Interval between periods, 1 if not given.
    #[must_use]
    pub fn interval(&self) -> u32 {
        self.interval.unwrap_or(1)
    }

    /// First day of the week, Monday if not given.
    #[must_use]
    pub fn week_start(&self) -> WeekDay {
        self.wkst.unwrap_or(WeekDay::Monday)
    }
}

impl FromStr for RecurrenceRule {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s, Strictness::Loose)
    }
}

/// Regenerates the rule text from its fields, `FREQ` first.
impl Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<T: Display>(
            f: &mut fmt::Formatter<'_>,
            name: &str,
            values: &[T],
        ) -> fmt::Result {
            if values.is_empty() {
                return Ok(());
            }
            write!(f, ";{name}=")?;
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{v}")?;
            }
            Ok(())
        }

        write!(f, "{KW_RRULE_FREQ}={}", self.freq)?;
        if let Some(until) = &self.until {
            write!(f, ";{KW_RRULE_UNTIL}={until}")?;
        }
        if let Some(count) = self.count {
            write!(f, ";{KW_RRULE_COUNT}={count}")?;
        }
        if let Some(interval) = self.interval {
            write!(f, ";{KW_RRULE_INTERVAL}={interval}")?;
        }
        list(f, KW_RRULE_BYSECOND, &self.by_second)?;
        list(f, KW_RRULE_BYMINUTE, &self.by_minute)?;
        list(f, KW_RRULE_BYHOUR, &self.by_hour)?;
        list(f, KW_RRULE_BYDAY, &self.by_day)?;
        list(f, KW_RRULE_BYMONTHDAY, &self.by_month_day)?;
        list(f, KW_RRULE_BYYEARDAY, &self.by_year_day)?;
        list(f, KW_RRULE_BYWEEKNO, &self.by_week_no)?;
        list(f, KW_RRULE_BYMONTH, &self.by_month)?;
        list(f, KW_RRULE_BYSETPOS, &self.by_set_pos)?;
        if let Some(wkst) = self.wkst {
            write!(f, ";{KW_RRULE_WKST}={wkst}")?;
        }
        Ok(())
    }
}

/// Recurrence frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(missing_docs)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Whether one period is shorter than a day.
    #[must_use]
    pub const fn is_sub_daily(self) -> bool {
        matches!(self, Self::Secondly | Self::Minutely | Self::Hourly)
    }
}

impl FromStr for Frequency {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            KW_RRULE_FREQ_SECONDLY => Ok(Self::Secondly),
            KW_RRULE_FREQ_MINUTELY => Ok(Self::Minutely),
            KW_RRULE_FREQ_HOURLY => Ok(Self::Hourly),
            KW_RRULE_FREQ_DAILY => Ok(Self::Daily),
            KW_RRULE_FREQ_WEEKLY => Ok(Self::Weekly),
            KW_RRULE_FREQ_MONTHLY => Ok(Self::Monthly),
            KW_RRULE_FREQ_YEARLY => Ok(Self::Yearly),
            _ => Err(ValueError::format(WHAT, format!("unknown frequency `{s}`"))),
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Secondly => write!(f, "{KW_RRULE_FREQ_SECONDLY}"),
            Frequency::Minutely => write!(f, "{KW_RRULE_FREQ_MINUTELY}"),
            Frequency::Hourly => write!(f, "{KW_RRULE_FREQ_HOURLY}"),
            Frequency::Daily => write!(f, "{KW_RRULE_FREQ_DAILY}"),
            Frequency::Weekly => write!(f, "{KW_RRULE_FREQ_WEEKLY}"),
            Frequency::Monthly => write!(f, "{KW_RRULE_FREQ_MONTHLY}"),
            Frequency::Yearly => write!(f, "{KW_RRULE_FREQ_YEARLY}"),
        }
    }
}

/// Day of week with optional occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekDayNum {
    /// Day of the week
    pub day: WeekDay,
    /// Occurrence within the month or year, negative counts from the end
    pub occurrence: Option<i8>,
}

impl Display for WeekDayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.occurrence {
            write!(f, "{n}")?;
        }
        write!(f, "{}", self.day)
    }
}

/// Day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(missing_docs)]
pub enum WeekDay {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl WeekDay {
    /// The matching `jiff` weekday.
    #[must_use]
    pub const fn to_jiff(self) -> Weekday {
        match self {
            WeekDay::Sunday => Weekday::Sunday,
            WeekDay::Monday => Weekday::Monday,
            WeekDay::Tuesday => Weekday::Tuesday,
            WeekDay::Wednesday => Weekday::Wednesday,
            WeekDay::Thursday => Weekday::Thursday,
            WeekDay::Friday => Weekday::Friday,
            WeekDay::Saturday => Weekday::Saturday,
        }
    }

    /// Convert from a `jiff` weekday.
    #[must_use]
    pub const fn from_jiff(day: Weekday) -> Self {
        match day {
            Weekday::Sunday => WeekDay::Sunday,
            Weekday::Monday => WeekDay::Monday,
            Weekday::Tuesday => WeekDay::Tuesday,
            Weekday::Wednesday => WeekDay::Wednesday,
            Weekday::Thursday => WeekDay::Thursday,
            Weekday::Friday => WeekDay::Friday,
            Weekday::Saturday => WeekDay::Saturday,
        }
    }
}

impl Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekDay::Sunday => write!(f, "{KW_DAY_SU}"),
            WeekDay::Monday => write!(f, "{KW_DAY_MO}"),
            WeekDay::Tuesday => write!(f, "{KW_DAY_TU}"),
            WeekDay::Wednesday => write!(f, "{KW_DAY_WE}"),
            WeekDay::Thursday => write!(f, "{KW_DAY_TH}"),
            WeekDay::Friday => write!(f, "{KW_DAY_FR}"),
            WeekDay::Saturday => write!(f, "{KW_DAY_SA}"),
        }
    }
}

#[derive(Debug, Clone)]
enum Part {
    Freq(Frequency),
    Until(DateTime),
    Count(u32),
    Interval(u32),
    BySecond(Vec<u8>),
    ByMinute(Vec<u8>),
    ByHour(Vec<u8>),
    ByMonthDay(Vec<i8>),
    ByYearDay(Vec<i16>),
    ByWeekNo(Vec<i8>),
    ByMonth(Vec<u8>),
    ByDay(Vec<WeekDayNum>),
    BySetPos(Vec<i16>),
    Wkst(WeekDay),
}

impl Part {
    /// Parse one `name=value` part, `None` for an unknown name.
    ///
    /// ```txt
    /// recur-rule-part = ( "FREQ" "=" freq )
    ///                 / ( "UNTIL" "=" enddate )
    ///                 / ( "COUNT" "=" 1*DIGIT )
    ///                 / ( "INTERVAL" "=" 1*DIGIT )
    ///                 / ( "BYSECOND" "=" byseclist )
    ///                 / ( "BYMINUTE" "=" byminlist )
    ///                 / ( "BYHOUR" "=" byhrlist )
    ///                 / ( "BYDAY" "=" bywdaylist )
    ///                 / ( "BYMONTHDAY" "=" bymodaylist )
    ///                 / ( "BYYEARDAY" "=" byyrdaylist )
    ///                 / ( "BYWEEKNO" "=" bywknolist )
    ///                 / ( "BYMONTH" "=" bymolist )
    ///                 / ( "BYSETPOS" "=" bysplist )
    ///                 / ( "WKST" "=" weekday )
    /// ```
    fn parse(name: &str, value: &str) -> Result<Option<Self>, ValueError> {
        let part = match name {
            KW_RRULE_FREQ => Part::Freq(value.parse()?),
            KW_RRULE_UNTIL => Part::Until(DateTime::parse(value)?),
            KW_RRULE_COUNT => Part::Count(positive(name, value)?),
            KW_RRULE_INTERVAL => Part::Interval(positive(name, value)?),
            KW_RRULE_BYSECOND => Part::BySecond(int_list(name, value, 0, 60, false)?),
            KW_RRULE_BYMINUTE => Part::ByMinute(int_list(name, value, 0, 59, false)?),
            KW_RRULE_BYHOUR => Part::ByHour(int_list(name, value, 0, 23, false)?),
            KW_RRULE_BYDAY => Part::ByDay(weekday_num_list(value)?),
            KW_RRULE_BYMONTHDAY => Part::ByMonthDay(int_list(name, value, -31, 31, true)?),
            KW_RRULE_BYYEARDAY => Part::ByYearDay(int_list(name, value, -366, 366, true)?),
            KW_RRULE_BYWEEKNO => Part::ByWeekNo(int_list(name, value, -53, 53, true)?),
            KW_RRULE_BYMONTH => Part::ByMonth(int_list(name, value, 1, 12, false)?),
            KW_RRULE_BYSETPOS => Part::BySetPos(int_list(name, value, -366, 366, true)?),
            KW_RRULE_WKST => Part::Wkst(parse_with(weekday(), value)?),
            _ => return Ok(None),
        };
        Ok(Some(part))
    }

    const fn name(&self) -> &'static str {
        match self {
            Part::Freq(_) => KW_RRULE_FREQ,
            Part::Until(_) => KW_RRULE_UNTIL,
            Part::Count(_) => KW_RRULE_COUNT,
            Part::Interval(_) => KW_RRULE_INTERVAL,
            Part::BySecond(_) => KW_RRULE_BYSECOND,
            Part::ByMinute(_) => KW_RRULE_BYMINUTE,
            Part::ByHour(_) => KW_RRULE_BYHOUR,
            Part::ByMonthDay(_) => KW_RRULE_BYMONTHDAY,
            Part::ByYearDay(_) => KW_RRULE_BYYEARDAY,
            Part::ByWeekNo(_) => KW_RRULE_BYWEEKNO,
            Part::ByMonth(_) => KW_RRULE_BYMONTH,
            Part::ByDay(_) => KW_RRULE_BYDAY,
            Part::BySetPos(_) => KW_RRULE_BYSETPOS,
            Part::Wkst(_) => KW_RRULE_WKST,
        }
    }
}

fn build_from_parts(
    parts: Vec<Part>,
    strictness: Strictness,
) -> Result<RecurrenceRule, ValueError> {
    let mut seen: Vec<&'static str> = Vec::with_capacity(parts.len());
    let mut freq = None;
    let mut rule = RecurrenceRule::new(Frequency::Yearly);

    for part in parts {
        let name = part.name();
        if seen.contains(&name) {
            if strictness.is_strict() {
                return Err(ValueError::format(
                    WHAT,
                    format!("duplicate rule part {name}"),
                ));
            }
            tracing::debug!(part = name, "recurrence rule part repeated");
        } else {
            seen.push(name);
        }

        match part {
            Part::Freq(f) => freq = Some(f),
            Part::Until(v) => rule.until = Some(v),
            Part::Count(v) => rule.count = Some(v),
            Part::Interval(v) => rule.interval = Some(v),
            Part::BySecond(v) => rule.by_second = v,
            Part::ByMinute(v) => rule.by_minute = v,
            Part::ByHour(v) => rule.by_hour = v,
            Part::ByMonthDay(v) => rule.by_month_day = v,
            Part::ByYearDay(v) => rule.by_year_day = v,
            Part::ByWeekNo(v) => rule.by_week_no = v,
            Part::ByMonth(v) => rule.by_month = v,
            Part::ByDay(v) => rule.by_day = v,
            Part::BySetPos(v) => rule.by_set_pos = v,
            Part::Wkst(v) => rule.wkst = Some(v),
        }
    }

    rule.freq = freq.ok_or_else(|| ValueError::invalid(WHAT, "FREQ is required"))?;

    if strictness.is_strict() {
        if !rule.by_week_no.is_empty() && rule.freq != Frequency::Yearly {
            return Err(ValueError::invalid(
                WHAT,
                "BYWEEKNO is only allowed with FREQ=YEARLY",
            ));
        }

        let ordinal_allowed = matches!(rule.freq, Frequency::Monthly | Frequency::Yearly)
            && !(rule.freq == Frequency::Yearly && !rule.by_week_no.is_empty());
        if !ordinal_allowed && rule.by_day.iter().any(|d| d.occurrence.is_some()) {
            let freq = rule.freq;
            return Err(ValueError::invalid(
                WHAT,
                format!("numeric BYDAY values are not allowed with FREQ={freq}"),
            ));
        }
    }

    Ok(rule)
}

/// `1*DIGIT`, zero rejected.
fn positive(name: &str, value: &str) -> Result<u32, ValueError> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValueError::format(
            WHAT,
            format!("{name} expects digits, found `{value}`"),
        ));
    }
    match lexical::parse::<u32, _>(value) {
        Ok(0) => {
            let reason = format!("{name} must be positive");
            Err(ValueError::invalid(WHAT, reason))
        }
        Ok(n) => Ok(n),
        Err(_) => {
            let reason = format!("{name} `{value}` is too large");
            Err(ValueError::invalid(WHAT, reason))
        }
    }
}

/// Comma-separated `[+/-] 1*DIGIT` list with inclusive bounds.
fn int_list<T>(
    name: &str,
    value: &str,
    min: i32,
    max: i32,
    non_zero: bool,
) -> Result<Vec<T>, ValueError>
where
    T: TryFrom<i32>,
{
    value
        .split(',')
        .map(|item| {
            let digits = item.strip_prefix(['+', '-']).unwrap_or(item);
            if digits.is_empty() || digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(ValueError::format(
                    WHAT,
                    format!("{name} expects a number, found `{item}`"),
                ));
            }

            let n = lexical::parse::<i32, _>(digits).map_err(|e| {
                ValueError::format(WHAT, format!("{name} value `{item}`: {e}"))
            })?;
            let n = if item.starts_with('-') { -n } else { n };
            if n < min || n > max || (non_zero && n == 0) {
                return Err(ValueError::invalid(
                    WHAT,
                    format!("{name} value {n} out of range {min}..={max}"),
                ));
            }
            T::try_from(n).map_err(|_| {
                ValueError::invalid(WHAT, format!("{name} value {n} out of range"))
            })
        })
        .collect()
}

/// ```txt
/// bywdaylist  = ( weekdaynum *("," weekdaynum) )
/// weekdaynum  = [[plus / minus] ordwk] weekday
/// ordwk       = 1*2DIGIT       ;1 to 53
/// ```
fn weekday_num_list(value: &str) -> Result<Vec<WeekDayNum>, ValueError> {
    value
        .split(',')
        .map(|item| {
            let (sign, digits, day) = parse_with(weekday_num(), item)?;
            let occurrence = match digits {
                Some(digits) => {
                    let n = lexical::parse::<i8, _>(digits).map_err(|e| {
                        ValueError::format(WHAT, format!("BYDAY value `{item}`: {e}"))
                    })?;
                    if !(1..=53).contains(&n) {
                        return Err(ValueError::invalid(
                            WHAT,
                            format!("BYDAY ordinal in `{item}` must be within 1..=53"),
                        ));
                    }
                    Some(if sign == Some('-') { -n } else { n })
                }
                None => None,
            };
            Ok(WeekDayNum { day, occurrence })
        })
        .collect()
}

fn parse_with<'src, T>(
    parser: impl Parser<'src, &'src str, T, extra::Err<Rich<'src, char>>>,
    text: &'src str,
) -> Result<T, ValueError> {
    parser
        .parse(text)
        .into_result()
        .map_err(|errs| ValueError::format(WHAT, describe(text, &errs)))
}

type WeekDayNumShape<'src> = (Option<char>, Option<&'src str>, WeekDay);

fn weekday_num<'src>()
-> impl Parser<'src, &'src str, WeekDayNumShape<'src>, extra::Err<Rich<'src, char>>> {
    let ordinal = select! { c @ ('+' | '-') => c }
        .or_not()
        .then(
            text::digits(10)
                .at_least(1)
                .at_most(2)
                .to_slice(),
        )
        .or_not();

    ordinal
        .then(weekday())
        .map(|(ordinal, day)| match ordinal {
            Some((sign, digits)) => (sign, Some(digits), day),
            None => (None, None, day),
        })
}

/// ```txt
/// weekday     = "SU" / "MO" / "TU" / "WE" / "TH" / "FR" / "SA"
/// ```
fn weekday<'src>() -> impl Parser<'src, &'src str, WeekDay, extra::Err<Rich<'src, char>>> + Clone
{
    choice((
        just(KW_DAY_SU).to(WeekDay::Sunday),
        just(KW_DAY_MO).to(WeekDay::Monday),
        just(KW_DAY_TU).to(WeekDay::Tuesday),
        just(KW_DAY_WE).to(WeekDay::Wednesday),
        just(KW_DAY_TH).to(WeekDay::Thursday),
        just(KW_DAY_FR).to(WeekDay::Friday),
        just(KW_DAY_SA).to(WeekDay::Saturday),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(day: WeekDay, occurrence: Option<i8>) -> WeekDayNum {
        WeekDayNum { day, occurrence }
    }

    fn parse(src: &str) -> RecurrenceRule {
        RecurrenceRule::parse(src, Strictness::Strict).unwrap()
    }

    #[test]
    fn parses_rrule_freq_only() {
        #[rustfmt::skip]
        let freqs = [
            ("FREQ=SECONDLY", Frequency::Secondly),
            ("FREQ=MINUTELY", Frequency::Minutely),
            ("FREQ=HOURLY",   Frequency::Hourly),
            ("FREQ=DAILY",    Frequency::Daily),
            ("FREQ=WEEKLY",   Frequency::Weekly),
            ("FREQ=MONTHLY",  Frequency::Monthly),
            ("FREQ=YEARLY",   Frequency::Yearly),
            ("freq=yearly",   Frequency::Yearly),
        ];

        for (src, expected) in freqs {
            let rule = parse(src);
            assert_eq!(rule.freq, expected, "Failed for {src}");
            assert!(rule.until.is_none());
            assert!(rule.count.is_none());
            assert_eq!(rule.interval(), 1);
            assert_eq!(rule.week_start(), WeekDay::Monday);
        }
    }

    #[test]
    fn parses_rrule_parts() {
        let rule = parse("FREQ=DAILY;INTERVAL=2;COUNT=10;UNTIL=19971224T000000Z");
        assert_eq!(rule.interval, Some(2));
        assert_eq!(rule.count, Some(10));
        let until = rule.until.unwrap();
        assert_eq!((until.year(), until.month(), until.day()), (1997, 12, 24));
        assert!(until.is_utc());

        let rule = parse("FREQ=DAILY;UNTIL=19971224");
        assert!(rule.until.unwrap().is_date_only());

        let rule = parse("FREQ=YEARLY;INTERVAL=2;BYMONTH=1;BYDAY=SU;BYHOUR=8,9;BYMINUTE=30");
        assert_eq!(rule.by_month, [1]);
        assert_eq!(rule.by_hour, [8, 9]);
        assert_eq!(rule.by_minute, [30]);
        assert_eq!(rule.by_day, [day(WeekDay::Sunday, None)]);

        let rule = parse("FREQ=MONTHLY;BYMONTHDAY=1,+15,-1;BYSETPOS=-1;WKST=SU");
        assert_eq!(rule.by_month_day, [1, 15, -1]);
        assert_eq!(rule.by_set_pos, [-1]);
        assert_eq!(rule.wkst, Some(WeekDay::Sunday));

        let rule = parse("FREQ=YEARLY;BYYEARDAY=1,100,-1;BYWEEKNO=20,-1;BYSECOND=0,60");
        assert_eq!(rule.by_year_day, [1, 100, -1]);
        assert_eq!(rule.by_week_no, [20, -1]);
        assert_eq!(rule.by_second, [0, 60]);
    }

    #[test]
    fn parses_byday_ordinals() {
        let rule = parse("FREQ=MONTHLY;BYDAY=1MO,-1FR,+2WE,TU");
        assert_eq!(
            rule.by_day,
            [
                day(WeekDay::Monday, Some(1)),
                day(WeekDay::Friday, Some(-1)),
                day(WeekDay::Wednesday, Some(2)),
                day(WeekDay::Tuesday, None),
            ]
        );
    }

    #[test]
    fn parts_are_unordered() {
        let rule = parse("COUNT=10;INTERVAL=2;FREQ=DAILY");
        assert_eq!(rule.freq, Frequency::Daily);
        assert_eq!(rule.count, Some(10));
    }

    #[test]
    fn rejects_bad_rules() {
        #[rustfmt::skip]
        let fail_cases = [
            // format errors
            ("FREQ=DAILY;COUNT",           true),
            ("FREQ=FORTNIGHTLY",           true),
            ("FREQ=DAILY;COUNT=ten",       true),
            ("FREQ=DAILY;BYHOUR=9,x",      true),
            ("FREQ=WEEKLY;BYDAY=MO,XX",    true),
            ("FREQ=WEEKLY;BYDAY=+MO",      true),
            ("FREQ=DAILY;UNTIL=1997-12-24", true),
            ("FREQ=DAILY;FOO=BAR",         true),  // unknown part in strict mode
            ("FREQ=DAILY;FREQ=WEEKLY",     true),  // duplicate in strict mode
            ("FREQ=DAILY;COUNT=1;COUNT=2", true),
            // validity errors
            ("INTERVAL=2;COUNT=10",        false), // no FREQ
            ("",                           false),
            ("FREQ=DAILY;INTERVAL=0",      false),
            ("FREQ=DAILY;COUNT=0",         false),
            ("FREQ=DAILY;BYHOUR=24",       false),
            ("FREQ=DAILY;BYMINUTE=60",     false),
            ("FREQ=MONTHLY;BYMONTHDAY=0",  false),
            ("FREQ=MONTHLY;BYMONTHDAY=32", false),
            ("FREQ=YEARLY;BYMONTH=13",     false),
            ("FREQ=YEARLY;BYYEARDAY=367",  false),
            ("FREQ=MONTHLY;BYDAY=0MO",     false),
            ("FREQ=MONTHLY;BYDAY=54MO",    false),
            ("FREQ=MONTHLY;BYWEEKNO=1",    false), // yearly only
            ("FREQ=WEEKLY;BYDAY=1MO",      false), // ordinal needs monthly/yearly
            ("FREQ=DAILY;UNTIL=19970230",  false),
        ];

        for (src, is_format) in fail_cases {
            let err = RecurrenceRule::parse(src, Strictness::Strict).unwrap_err();
            let format = matches!(err, ValueError::Format { .. });
            assert_eq!(format, is_format, "{src}: {err}");
        }
    }

    #[test]
    fn loose_mode_tolerates_unknown_and_repeated_parts() {
        let rule =
            RecurrenceRule::parse("FREQ=DAILY;X-FOO=1;COUNT=1;COUNT=3", Strictness::Loose).unwrap();
        assert_eq!(rule.count, Some(3));

        let rule = RecurrenceRule::parse("FREQ=WEEKLY;BYDAY=1MO", Strictness::Loose).unwrap();
        assert_eq!(rule.by_day[0].occurrence, Some(1));

        // still fatal in loose mode
        assert!(RecurrenceRule::parse("COUNT=3", Strictness::Loose).is_err());
        let result = RecurrenceRule::parse("FREQ=DAILY;INTERVAL=x", Strictness::Loose);
        assert!(result.is_err());
    }

    #[test]
    fn until_and_count_are_both_accepted() {
        let rule = parse("FREQ=DAILY;UNTIL=19971224T000000Z;COUNT=10");
        assert!(rule.until.is_some());
        assert_eq!(rule.count, Some(10));
    }

    #[test]
    fn regenerates_rule_text() {
        #[rustfmt::skip]
        let cases = [
            ("FREQ=DAILY;COUNT=7",                              "FREQ=DAILY;COUNT=7"),
            ("COUNT=7;FREQ=DAILY",                              "FREQ=DAILY;COUNT=7"),
            ("FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1",   "FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1"),
            ("FREQ=YEARLY;BYMONTH=3;BYDAY=-1SU;WKST=SU",        "FREQ=YEARLY;BYDAY=-1SU;BYMONTH=3;WKST=SU"),
            ("freq=weekly;interval=2;until=19971224T000000Z",   "FREQ=WEEKLY;UNTIL=19971224T000000Z;INTERVAL=2"),
            ("FREQ=MONTHLY;BYMONTHDAY=+1,-1",                   "FREQ=MONTHLY;BYMONTHDAY=1,-1"),
        ];

        for (src, expected) in cases {
            let rule = parse(src);
            assert_eq!(rule.to_string(), expected);
            assert_eq!(parse(expected), rule);
        }
    }

    #[test]
    fn weekday_converts_to_jiff() {
        for day in [WeekDay::Sunday, WeekDay::Wednesday, WeekDay::Saturday] {
            assert_eq!(WeekDay::from_jiff(day.to_jiff()), day);
        }
        assert_eq!(WeekDay::Monday.to_jiff(), Weekday::Monday);
    }
}
