// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence expansion as defined in RFC 5545 Section 3.3.10.
//!
//! A rule is expanded period by period: the frequency and interval pick the
//! next year, month, week, day, hour, minute or second, the `BY*` parts
//! expand or limit the instants inside it, and `BYSETPOS` picks positions
//! out of what is left. The anchor (`DTSTART`) counts as the first instance
//! but is never produced.
//!
//! Expansion is lazy and always bounded, see [`ExpandOptions`].

use std::collections::VecDeque;

use jiff::Span;
use jiff::civil::{self, Date, Time, Weekday};

use crate::value::{DateTime, Frequency, RecurrenceRule};

/// Default cap on produced instances.
pub const DEFAULT_MAX_INSTANCES: usize = 10_000;

/// Default number of years past the reference year after which an unbounded
/// expansion stops.
pub const DEFAULT_HORIZON_YEARS: i16 = 100;

const SECONDS_PER_DAY: i64 = 86_400;

/// Bounds applied to every expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Stop after this many produced instances.
    pub max_instances: usize,

    /// Stop once a period starts more than this many years after the
    /// reference year. Only applies to rules without `COUNT` or `UNTIL`.
    pub horizon_years: i16,

    /// Reference year for the horizon, the current year if `None`.
    pub reference_year: Option<i16>,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            max_instances: DEFAULT_MAX_INSTANCES,
            horizon_years: DEFAULT_HORIZON_YEARS,
            reference_year: None,
        }
    }
}

impl ExpandOptions {
    /// Set [`ExpandOptions::max_instances`].
    #[must_use]
    pub const fn with_max_instances(mut self, max_instances: usize) -> Self {
        self.max_instances = max_instances;
        self
    }

    /// Set [`ExpandOptions::reference_year`].
    #[must_use]
    pub const fn with_reference_year(mut self, year: i16) -> Self {
        self.reference_year = Some(year);
        self
    }

    fn horizon_year(&self) -> i16 {
        let reference = self
            .reference_year
            .unwrap_or_else(|| jiff::Zoned::now().year());
        reference.saturating_add(self.horizon_years)
    }
}

impl RecurrenceRule {
    /// Expand with the default bounds into the additional occurrences after
    /// `anchor`, in order.
    #[must_use]
    pub fn expand(&self, anchor: &DateTime) -> Vec<DateTime> {
        self.occurrences(anchor, ExpandOptions::default()).collect()
    }

    /// Lazily expand into the additional occurrences after `anchor`.
    ///
    /// Produced values take the date-only and UTC flags of the anchor.
    #[must_use]
    pub fn occurrences(&self, anchor: &DateTime, options: ExpandOptions) -> Occurrences {
        Occurrences::new(self, *anchor, options)
    }
}

/// Iterator over the occurrences of a rule, see
/// [`RecurrenceRule::occurrences`].
#[derive(Debug, Clone)]
pub struct Occurrences {
    filter: Filter,
    anchor: DateTime,
    until: Option<civil::DateTime>,
    count: Option<u32>,
    max_instances: usize,
    horizon_year: i16,

    cursor: Option<Cursor>,
    pending: VecDeque<civil::DateTime>,
    counted: u32,
    produced: usize,
    last: Option<DateTime>,
}

/// Start of the current period.
#[derive(Debug, Clone, Copy)]
struct Cursor {
    date: Date,
    /// Seconds since midnight, only moves for sub-daily frequencies
    clock: i64,
}

impl Occurrences {
    fn new(rule: &RecurrenceRule, anchor: DateTime, options: ExpandOptions) -> Self {
        let filter = Filter::new(rule, &anchor);
        let start = anchor.civil();
        let date = start.date();
        let clock = seconds_of_day(start.time());
        let mut cursor = match filter.freq {
            Frequency::Yearly => Some(date.first_of_year()),
            Frequency::Monthly => Some(date.first_of_month()),
            Frequency::Weekly => add_days(date, -days_after(filter.wkst, date.weekday())),
            _ => Some(date),
        }
        .map(|date| Cursor { date, clock });
        if !filter.reaches_time_of_day(clock) {
            tracing::debug!("recurrence never reaches an allowed time of day");
            cursor = None;
        }

        let until = rule.until.map(|until| {
            if until.is_date_only() && !anchor.is_date_only() {
                until.civil_date().to_datetime(Time::MAX)
            } else {
                until.civil()
            }
        });

        Self {
            filter,
            anchor,
            until,
            count: rule.count,
            max_instances: options.max_instances,
            horizon_year: options.horizon_year(),
            cursor,
            pending: VecDeque::new(),
            counted: 1,
            produced: 0,
            last: None,
        }
    }

    fn finish(&mut self, reason: &'static str) {
        if self.cursor.is_some() || !self.pending.is_empty() {
            let produced = self.produced;
            tracing::debug!(reason, produced, "recurrence expansion stopped");
        }
        self.cursor = None;
        self.pending.clear();
    }

    /// Rules bounded by `COUNT` or `UNTIL` run to their bound.
    fn past_horizon(&self, year: i16) -> bool {
        self.count.is_none() && self.until.is_none() && year > self.horizon_year
    }

    /// Fill `pending` with the instants of the current period and move the
    /// cursor to the next one.
    fn step(&mut self, cursor: Cursor) {
        if self.past_horizon(cursor.date.year()) {
            self.finish("horizon reached");
            return;
        }

        let next = if self.filter.freq.is_sub_daily() {
            let skip = self.filter.sub_daily_instants(cursor, &mut self.pending);
            self.filter.next_sub_daily(cursor, skip)
        } else {
            self.filter.day_instants(cursor.date, &mut self.pending);
            self.filter.next_period(cursor)
        };

        match next {
            Some(next) => self.cursor = Some(next),
            None => {
                // Ran out of representable dates, drain what is pending first.
                self.cursor = None;
                if self.pending.is_empty() {
                    self.finish("end of calendar");
                }
            }
        }
    }
}

impl Iterator for Occurrences {
    type Item = DateTime;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let Some(instant) = self.pending.pop_front() else {
                let cursor = self.cursor?;
                self.step(cursor);
                continue;
            };

            if self.until.is_some_and(|until| instant > until) {
                self.finish("until reached");
                return None;
            }
            if self.past_horizon(instant.year()) {
                self.finish("horizon reached");
                return None;
            }

            let value =
                DateTime::from_civil(instant, self.anchor.is_date_only(), self.anchor.is_utc());
            if value <= self.anchor || self.last == Some(value) {
                continue;
            }

            if self.count.is_some_and(|count| self.counted >= count) {
                self.finish("count reached");
                return None;
            }
            if self.produced >= self.max_instances {
                self.finish("instance cap reached");
                return None;
            }

            self.counted = self.counted.saturating_add(1);
            self.produced += 1;
            self.last = Some(value);
            return Some(value);
        }
    }
}

/// Which filter rejected a sub-daily instant, so whole spans can be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    Pass,
    Day,
    Hour,
    Minute,
}

/// A rule with the anchor defaults filled in.
#[derive(Debug, Clone)]
struct Filter {
    freq: Frequency,
    interval: i64,
    wkst: Weekday,
    by_month: Vec<i8>,
    by_week_no: Vec<i8>,
    by_year_day: Vec<i16>,
    by_month_day: Vec<i8>,
    by_weekday: Vec<Weekday>,
    by_nth_weekday: Vec<(i8, Weekday)>,
    nth_in_month: bool,
    by_hour: Vec<i8>,
    by_minute: Vec<i8>,
    by_second: Vec<i8>,
    by_set_pos: Vec<i16>,
    /// Times of day for daily and coarser frequencies, sorted
    day_times: Vec<Time>,
}

impl Filter {
    fn new(rule: &RecurrenceRule, anchor: &DateTime) -> Self {
        let freq = rule.freq;
        let start = anchor.civil();

        let mut by_month = to_i8(&rule.by_month);
        let mut by_month_day = rule.by_month_day.clone();
        let mut by_weekday = Vec::new();
        let mut by_nth_weekday = Vec::new();
        let ordinals_apply = matches!(freq, Frequency::Monthly | Frequency::Yearly);
        for day in &rule.by_day {
            match day.occurrence {
                Some(n) if ordinals_apply => by_nth_weekday.push((n, day.day.to_jiff())),
                _ => by_weekday.push(day.day.to_jiff()),
            }
        }

        let no_day_filter = rule.by_week_no.is_empty()
            && rule.by_year_day.is_empty()
            && rule.by_month_day.is_empty()
            && rule.by_day.is_empty();
        if no_day_filter {
            match freq {
                Frequency::Yearly => {
                    if by_month.is_empty() {
                        by_month.push(start.month());
                    }
                    by_month_day.push(start.day());
                }
                Frequency::Monthly => by_month_day.push(start.day()),
                Frequency::Weekly => by_weekday.push(start.weekday()),
                _ => {}
            }
        }

        let mut by_hour = to_i8(&rule.by_hour);
        let mut by_minute = to_i8(&rule.by_minute);
        let mut by_second = to_i8(&rule.by_second);
        if by_hour.is_empty() && !freq.is_sub_daily() {
            by_hour.push(start.hour());
        }
        if by_minute.is_empty() && !matches!(freq, Frequency::Minutely | Frequency::Secondly) {
            by_minute.push(start.minute());
        }
        if by_second.is_empty() && freq != Frequency::Secondly {
            by_second.push(start.second());
        }

        let mut day_times = Vec::new();
        for &h in &by_hour {
            for &m in &by_minute {
                // second 60 has no civil representation
                day_times.extend(by_second.iter().filter_map(|&s| Time::new(h, m, s, 0).ok()));
            }
        }
        day_times.sort_unstable();
        day_times.dedup();

        Self {
            freq,
            interval: i64::from(rule.interval().max(1)),
            wkst: rule.week_start().to_jiff(),
            nth_in_month: freq == Frequency::Monthly || !by_month.is_empty(),
            by_month,
            by_week_no: if freq == Frequency::Yearly {
                rule.by_week_no.clone()
            } else {
                Vec::new()
            },
            by_year_day: rule.by_year_day.clone(),
            by_month_day,
            by_weekday,
            by_nth_weekday,
            by_hour,
            by_minute,
            by_second,
            by_set_pos: rule.by_set_pos.clone(),
            day_times,
        }
    }

    /// Instants of one daily-or-coarser period, `BYSETPOS` applied.
    fn day_instants(&self, start: Date, out: &mut VecDeque<civil::DateTime>) {
        let len = match self.freq {
            Frequency::Yearly => i64::from(start.days_in_year()),
            Frequency::Monthly => i64::from(start.days_in_month()),
            Frequency::Weekly => 7,
            _ => 1,
        };

        let mut set = Vec::new();
        let mut day = Some(start);
        for _ in 0..len {
            let Some(d) = day else { break };
            if self.matches_day(d) {
                set.extend(self.day_times.iter().map(|&t| d.to_datetime(t)));
            }
            day = d.tomorrow().ok();
        }
        out.extend(self.select_positions(set));
    }

    /// Instants of one sub-daily period, `BYSETPOS` applied. Returns which
    /// filter rejected the period, if any.
    fn sub_daily_instants(&self, cursor: Cursor, out: &mut VecDeque<civil::DateTime>) -> Skip {
        if !self.matches_day(cursor.date) {
            return Skip::Day;
        }

        let (h, m, s) = split_clock(cursor.clock);
        if !contains_or_empty(&self.by_hour, h) {
            return Skip::Hour;
        }

        let mut times = Vec::new();
        match self.freq {
            Frequency::Hourly => {
                for &m in &self.by_minute {
                    let valid = self
                        .by_second
                        .iter()
                        .filter_map(|&s| Time::new(h, m, s, 0).ok());
                    times.extend(valid);
                }
            }
            Frequency::Minutely => {
                if !contains_or_empty(&self.by_minute, m) {
                    return Skip::Minute;
                }
                let valid = self
                    .by_second
                    .iter()
                    .filter_map(|&s| Time::new(h, m, s, 0).ok());
                times.extend(valid);
            }
            _ => {
                if !contains_or_empty(&self.by_minute, m) {
                    return Skip::Minute;
                }
                if contains_or_empty(&self.by_second, s) {
                    times.extend(Time::new(h, m, s, 0).ok());
                }
            }
        }
        times.sort_unstable();
        times.dedup();

        let set = times
            .into_iter()
            .map(|t| cursor.date.to_datetime(t))
            .collect();
        out.extend(self.select_positions(set));
        Skip::Pass
    }

    fn next_period(&self, cursor: Cursor) -> Option<Cursor> {
        let date = cursor.date;
        let date = match self.freq {
            Frequency::Yearly => {
                let year = i16::try_from(i64::from(date.year()) + self.interval).ok()?;
                Date::new(year, 1, 1).ok()?
            }
            Frequency::Monthly => {
                let months =
                    i64::from(date.year()) * 12 + i64::from(date.month() - 1) + self.interval;
                let year = i16::try_from(months.div_euclid(12)).ok()?;
                let month = i8::try_from(months.rem_euclid(12) + 1).ok()?;
                Date::new(year, month, 1).ok()?
            }
            Frequency::Weekly => add_days(date, 7 * self.interval)?,
            _ => add_days(date, self.interval)?,
        };
        Some(Cursor { date, ..cursor })
    }

    /// Advance a sub-daily cursor, jumping over the rest of a rejected day,
    /// hour or minute while keeping the interval phase.
    fn next_sub_daily(&self, cursor: Cursor, skip: Skip) -> Option<Cursor> {
        let unit = match self.freq {
            Frequency::Hourly => 3600,
            Frequency::Minutely => 60,
            _ => 1,
        };
        let step = unit * self.interval;

        let mut clock = cursor.clock;
        let span_end = match skip {
            Skip::Pass => None,
            Skip::Day => Some(SECONDS_PER_DAY - 1),
            Skip::Hour => Some(clock - clock % 3600 + 3599),
            Skip::Minute => Some(clock - clock % 60 + 59),
        };
        if let Some(end) = span_end {
            clock += (end - clock) / step * step;
        }
        clock = clock.checked_add(step)?;

        let date = add_days(cursor.date, clock.div_euclid(SECONDS_PER_DAY))?;
        Some(Cursor {
            date,
            clock: clock.rem_euclid(SECONDS_PER_DAY),
        })
    }

    /// Whether some clock reachable from `clock` in interval steps passes
    /// the time-of-day filters. Day rollover keeps the phase, so one day of
    /// candidates decides it.
    fn reaches_time_of_day(&self, clock: i64) -> bool {
        let unit = match self.freq {
            Frequency::Hourly => 3600,
            Frequency::Minutely => 60,
            Frequency::Secondly => 1,
            _ => return true,
        };
        // second 60 has no civil representation
        if self.freq != Frequency::Secondly && !self.by_second.iter().any(|&s| s < 60) {
            return false;
        }

        let by_minute = self.freq != Frequency::Hourly;
        let by_second = self.freq == Frequency::Secondly;
        let phase = gcd(unit * self.interval, SECONDS_PER_DAY);
        let mut candidate = clock.rem_euclid(phase);
        while candidate < SECONDS_PER_DAY {
            let (h, m, s) = split_clock(candidate);
            let minute_ok = !by_minute || contains_or_empty(&self.by_minute, m);
            let second_ok = !by_second || contains_or_empty(&self.by_second, s);
            if contains_or_empty(&self.by_hour, h) && minute_ok && second_ok {
                return true;
            }
            candidate += phase;
        }
        false
    }

    fn matches_day(&self, d: Date) -> bool {
        if !self.by_month.is_empty() && !self.by_month.contains(&d.month()) {
            return false;
        }

        if !self.by_week_no.is_empty() {
            let Some((n, neg)) = week_number(d, self.wkst) else {
                return false;
            };
            if !self.by_week_no.iter().any(|&w| w == n || w == neg) {
                return false;
            }
        }

        if !self.by_year_day.is_empty() {
            let n = d.day_of_year();
            let neg = n - d.days_in_year() - 1;
            if !self.by_year_day.iter().any(|&y| y == n || y == neg) {
                return false;
            }
        }

        if !self.by_month_day.is_empty() {
            let n = d.day();
            let neg = n - d.days_in_month() - 1;
            if !self.by_month_day.iter().any(|&m| m == n || m == neg) {
                return false;
            }
        }

        if self.by_weekday.is_empty() && self.by_nth_weekday.is_empty() {
            return true;
        }
        self.by_weekday.contains(&d.weekday()) || self.matches_nth_weekday(d)
    }

    /// Whether `d` is the n-th (or n-th from the end) of its weekday within
    /// its month or year.
    fn matches_nth_weekday(&self, d: Date) -> bool {
        let (index, len) = if self.nth_in_month {
            (i16::from(d.day()) - 1, i16::from(d.days_in_month()))
        } else {
            (d.day_of_year() - 1, d.days_in_year())
        };
        let from_start = index / 7 + 1;
        let from_end = -((len - 1 - index) / 7 + 1);

        self.by_nth_weekday.iter().any(|&(n, weekday)| {
            let n = i16::from(n);
            weekday == d.weekday() && (n == from_start || n == from_end)
        })
    }

    fn select_positions(&self, set: Vec<civil::DateTime>) -> Vec<civil::DateTime> {
        if self.by_set_pos.is_empty() {
            return set;
        }

        let len = i64::try_from(set.len()).unwrap_or(i64::MAX);
        let mut picked: Vec<_> = self
            .by_set_pos
            .iter()
            .filter_map(|&pos| {
                let pos = i64::from(pos);
                let index = if pos > 0 { pos - 1 } else { len + pos };
                let index = usize::try_from(index).ok()?;
                set.get(index).copied()
            })
            .collect();
        picked.sort_unstable();
        picked.dedup();
        picked
    }
}

/// Week number of `d` and the same week counted from the end of its
/// week-numbering year. Week 1 is the first week with at least four days in
/// the year.
fn week_number(d: Date, wkst: Weekday) -> Option<(i8, i8)> {
    let mut year = d.year();
    let mut start = first_week_start(year, wkst)?;
    if d < start {
        year -= 1;
        start = first_week_start(year, wkst)?;
    } else {
        let next = first_week_start(year + 1, wkst)?;
        if d >= next {
            year += 1;
            start = next;
        }
    }

    let next_start = first_week_start(year + 1, wkst)?;
    let weeks = days_between(start, next_start) / 7;
    let n = days_between(start, d) / 7 + 1;
    Some((i8::try_from(n).ok()?, i8::try_from(n - weeks - 1).ok()?))
}

fn first_week_start(year: i16, wkst: Weekday) -> Option<Date> {
    let jan1 = Date::new(year, 1, 1).ok()?;
    let offset = days_after(wkst, jan1.weekday());
    if offset <= 3 {
        add_days(jan1, -offset)
    } else {
        add_days(jan1, 7 - offset)
    }
}

/// Days from `from` forward to `to`, within 0..7.
fn days_after(from: Weekday, to: Weekday) -> i64 {
    i64::from(to.to_monday_zero_offset() - from.to_monday_zero_offset()).rem_euclid(7)
}

fn days_between(from: Date, to: Date) -> i64 {
    to.since(from).map_or(0, |span| i64::from(span.get_days()))
}

fn add_days(date: Date, days: i64) -> Option<Date> {
    let span = Span::new().try_days(days).ok()?;
    date.checked_add(span).ok()
}

fn seconds_of_day(t: Time) -> i64 {
    i64::from(t.hour()) * 3600 + i64::from(t.minute()) * 60 + i64::from(t.second())
}

fn split_clock(clock: i64) -> (i8, i8, i8) {
    let part = |n: i64| i8::try_from(n).unwrap_or_default();
    (part(clock / 3600), part(clock / 60 % 60), part(clock % 60))
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 { a } else { gcd(b, a % b) }
}

fn contains_or_empty(values: &[i8], value: i8) -> bool {
    values.is_empty() || values.contains(&value)
}

fn to_i8(values: &[u8]) -> Vec<i8> {
    values
        .iter()
        .filter_map(|&v| i8::try_from(v).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::Strictness;
    use crate::value::WeekDay;

    fn rule(src: &str) -> RecurrenceRule {
        RecurrenceRule::parse(src, Strictness::Strict).unwrap()
    }

    fn anchor(src: &str) -> DateTime {
        DateTime::parse(src).unwrap()
    }

    fn expand(rule_src: &str, anchor_src: &str, take: usize) -> Vec<String> {
        rule(rule_src)
            .occurrences(&anchor(anchor_src), ExpandOptions::default())
            .take(take)
            .map(|d| d.to_string())
            .collect()
    }

    #[test]
    fn daily_count_excludes_anchor() {
        let dates = rule("FREQ=DAILY;COUNT=7").expand(&anchor("20240101"));
        let dates: Vec<_> = dates.iter().map(ToString::to_string).collect();
        assert_eq!(
            dates,
            ["20240102", "20240103", "20240104", "20240105", "20240106", "20240107"]
        );
    }

    #[test]
    fn count_of_one_yields_nothing() {
        assert!(rule("FREQ=DAILY;COUNT=1").expand(&anchor("20240101")).is_empty());
    }

    #[test]
    fn unbounded_rule_stops_at_instance_cap() {
        let dates = rule("FREQ=DAILY").expand(&anchor("20240101T090000"));
        assert_eq!(dates.len(), DEFAULT_MAX_INSTANCES);
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn unbounded_rule_stops_at_horizon() {
        let options = ExpandOptions::default().with_reference_year(2000);
        let dates: Vec<_> = rule("FREQ=YEARLY")
            .occurrences(&anchor("20000101"), options)
            .collect();
        assert_eq!(dates.len(), 100);
        assert_eq!(dates.last().map(DateTime::year), Some(2100));
    }

    #[test]
    fn impossible_rule_terminates() {
        let options = ExpandOptions::default().with_reference_year(2024);
        let cases = [
            ("FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=30", "20240101"),
            ("FREQ=SECONDLY;BYMONTH=2;BYMONTHDAY=30", "20240101T000000"),
        ];
        for (src, start) in cases {
            let rule = RecurrenceRule::parse(src, Strictness::Loose).unwrap();
            let occurrences = rule.occurrences(&anchor(start), options);
            assert_eq!(occurrences.count(), 0, "{src}");
        }
    }

    #[test]
    fn until_is_inclusive() {
        assert_eq!(
            expand("FREQ=DAILY;UNTIL=20240103T090000", "20240101T090000", 10),
            ["20240102T090000", "20240103T090000"]
        );
        // date-only until covers the whole day
        assert_eq!(
            expand("FREQ=DAILY;UNTIL=20240103", "20240101T090000", 10),
            ["20240102T090000", "20240103T090000"]
        );
        assert_eq!(
            expand("FREQ=DAILY;UNTIL=20240103", "20240101", 10),
            ["20240102", "20240103"]
        );
    }

    #[test]
    fn until_and_count_stop_at_first_bound() {
        assert_eq!(
            expand("FREQ=DAILY;UNTIL=20240110;COUNT=3", "20240101", 10),
            ["20240102", "20240103"]
        );
        assert_eq!(
            expand("FREQ=DAILY;UNTIL=20240103;COUNT=10", "20240101", 10),
            ["20240102", "20240103"]
        );
    }

    #[test]
    fn bounded_rule_ignores_horizon() {
        let options = ExpandOptions::default().with_reference_year(2024);
        let cases: [(&str, &[&str]); 3] = [
            ("FREQ=DAILY;COUNT=3", &["22000102", "22000103"]),
            ("FREQ=DAILY;UNTIL=22000103", &["22000102", "22000103"]),
            ("FREQ=DAILY", &[]),
        ];
        for (src, expected) in cases {
            let dates: Vec<_> = rule(src)
                .occurrences(&anchor("22000101"), options)
                .map(|d| d.to_string())
                .collect();
            assert_eq!(dates, expected, "{src}");
        }
    }

    #[test]
    fn instance_cap_applies_to_counted_rules() {
        let options = ExpandOptions::default().with_max_instances(10);
        let dates = rule("FREQ=DAILY;COUNT=50").occurrences(&anchor("20240101"), options);
        assert_eq!(dates.count(), 10);
    }

    #[test]
    fn unreachable_time_of_day_ends_immediately() {
        let options = ExpandOptions::default().with_reference_year(2024);
        let cases = [
            "FREQ=SECONDLY;INTERVAL=2;BYSECOND=1",
            "FREQ=SECONDLY;INTERVAL=60;BYSECOND=30",
            "FREQ=SECONDLY;INTERVAL=2;BYSECOND=1;COUNT=5",
            "FREQ=MINUTELY;INTERVAL=2;BYMINUTE=1",
            "FREQ=HOURLY;INTERVAL=2;BYHOUR=1",
        ];
        for src in cases {
            let started = Instant::now();
            let occurrences = rule(src).occurrences(&anchor("20240101T000000"), options);
            assert_eq!(occurrences.count(), 0, "{src}");
            assert!(started.elapsed() < Duration::from_secs(1), "{src}");
        }
    }

    #[test]
    fn sparse_time_of_day_is_reached() {
        let cases: [(&str, &[&str]); 3] = [
            (
                "FREQ=SECONDLY;INTERVAL=2;BYSECOND=2;COUNT=3",
                &["20240101T000002", "20240101T000102"],
            ),
            (
                "FREQ=MINUTELY;INTERVAL=90;BYHOUR=1;COUNT=2",
                &["20240101T013000"],
            ),
            (
                "FREQ=HOURLY;INTERVAL=5;BYHOUR=1;COUNT=2",
                &["20240102T010000"],
            ),
        ];
        for (src, expected) in cases {
            assert_eq!(expand(src, "20240101T000000", 10), expected, "{src}");
        }
    }

    #[test]
    fn every_other_week_on_three_days() {
        // RFC 5545 Section 3.8.5.3
        let dates = expand(
            "FREQ=WEEKLY;INTERVAL=2;UNTIL=19971224T000000Z;WKST=SU;BYDAY=MO,WE,FR",
            "19970901T090000",
            100,
        );
        assert_eq!(dates.len(), 24);
        assert_eq!(dates.first().map(String::as_str), Some("19970903T090000"));
        assert_eq!(dates.get(6).map(String::as_str), Some("19971001T090000"));
        assert_eq!(dates.last().map(String::as_str), Some("19971222T090000"));
    }

    #[test]
    fn weekly_defaults_to_anchor_weekday() {
        assert_eq!(
            expand("FREQ=WEEKLY;COUNT=3", "20240103", 10),
            ["20240110", "20240117"]
        );
    }

    #[test]
    fn monthly_skips_short_months() {
        assert_eq!(
            expand("FREQ=MONTHLY;COUNT=4", "20240131", 10),
            ["20240331", "20240531", "20240731"]
        );
        assert_eq!(
            expand("FREQ=MONTHLY;BYMONTHDAY=-1;COUNT=4", "20240131", 10),
            ["20240229", "20240331", "20240430"]
        );
    }

    #[test]
    fn yearly_on_leap_day() {
        assert_eq!(
            expand("FREQ=YEARLY;COUNT=3", "20240229", 10),
            ["20280229", "20320229"]
        );
    }

    #[test]
    fn byday_ordinals() {
        // RFC 5545 Section 3.8.5.3
        #[rustfmt::skip]
        let cases = [
            ("FREQ=MONTHLY;COUNT=10;BYDAY=1FR", "19970905T090000", vec![
                "19971003T090000", "19971107T090000", "19971205T090000",
                "19980102T090000", "19980206T090000", "19980306T090000",
                "19980403T090000", "19980501T090000", "19980605T090000",
            ]),
            ("FREQ=YEARLY;BYDAY=20MO", "19970519T090000", vec![
                "19980518T090000", "19990517T090000",
            ]),
            ("FREQ=YEARLY;BYMONTH=10;BYDAY=-1SU", "19671029T020000", vec![
                "19681027T020000", "19691026T020000",
            ]),
            ("FREQ=YEARLY;BYMONTH=3;BYDAY=TH", "19970313T090000", vec![
                "19970320T090000", "19970327T090000", "19980305T090000",
            ]),
        ];

        for (rule, anchor, expected) in cases {
            assert_eq!(expand(rule, anchor, expected.len()), expected, "{rule}");
        }
    }

    #[test]
    fn bysetpos_picks_from_each_period() {
        let third = "FREQ=MONTHLY;COUNT=3;BYDAY=TU,WE,TH;BYSETPOS=3";
        assert_eq!(
            expand(third, "19970904T090000", 10),
            ["19971007T090000", "19971106T090000"]
        );
        let second_to_last = "FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-2";
        assert_eq!(
            expand(second_to_last, "19970929T090000", 6),
            [
                "19971030T090000",
                "19971127T090000",
                "19971230T090000",
                "19980129T090000",
                "19980226T090000",
                "19980330T090000",
            ]
        );
    }

    #[test]
    fn byweekno_uses_week_start() {
        assert_eq!(
            expand("FREQ=YEARLY;BYWEEKNO=20;BYDAY=MO", "19970512T090000", 2),
            ["19980511T090000", "19990517T090000"]
        );
    }

    #[test]
    fn friday_the_thirteenth() {
        assert_eq!(
            expand("FREQ=MONTHLY;BYDAY=FR;BYMONTHDAY=13", "19970902T090000", 3),
            ["19980213T090000", "19980313T090000", "19981113T090000"]
        );
    }

    #[test]
    fn sub_daily_frequencies() {
        let hourly = "FREQ=HOURLY;INTERVAL=3;UNTIL=19970902T170000Z";
        assert_eq!(
            expand(hourly, "19970902T090000Z", 10),
            ["19970902T120000Z", "19970902T150000Z"]
        );

        let daily = expand(
            "FREQ=DAILY;BYHOUR=9,10,11,12,13,14,15,16;BYMINUTE=0,20,40",
            "19970902T090000",
            50,
        );
        let minutely = expand(
            "FREQ=MINUTELY;INTERVAL=20;BYHOUR=9,10,11,12,13,14,15,16",
            "19970902T090000",
            50,
        );
        assert_eq!(daily, minutely);
        assert_eq!(daily[0], "19970902T092000");
        assert_eq!(daily[23], "19970903T090000");
    }

    #[test]
    fn date_only_anchor_dedupes_sub_daily() {
        assert_eq!(
            expand("FREQ=HOURLY;COUNT=100", "20240101", 3),
            ["20240102", "20240103", "20240104"]
        );
    }

    #[test]
    fn week_numbers() {
        let monday = WeekDay::Monday.to_jiff();
        let d = |y, m, d| Date::new(y, m, d).unwrap();
        assert_eq!(week_number(d(2024, 12, 30), monday), Some((1, -52)));
        assert_eq!(week_number(d(2021, 1, 3), monday), Some((53, -1)));
        assert_eq!(week_number(d(1998, 5, 11), monday), Some((20, -34)));
    }

}
