// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Descriptive properties shared by events, to-dos and journals.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::Strictness;
use crate::component::{ComponentKind, Context, RawProperty};
use crate::error::{ErrorKind, ValueError};
use crate::keyword::{
    KW_ATTACH, KW_BINARY, KW_CATEGORIES, KW_CLASS, KW_CLASS_CONFIDENTIAL, KW_CLASS_PRIVATE,
    KW_CLASS_PUBLIC, KW_CREATED, KW_DATE, KW_DATETIME, KW_DESCRIPTION, KW_DTSTAMP, KW_DTSTART,
    KW_ENCODING, KW_ENCODING_BASE64, KW_EXDATE, KW_LAST_MODIFIED, KW_PERIOD, KW_RDATE, KW_RRULE,
    KW_SEQUENCE, KW_STATUS, KW_SUMMARY, KW_UID, KW_VALUE,
};
use crate::property::Property;
use crate::recur::ExpandOptions;
use crate::value::{
    DateProperty, DateTime, Period, RecurrenceRule, check_value_type, parse_integer,
    split_text_list, unescape_text,
};

/// Properties common to `VEVENT`, `VTODO` and `VJOURNAL`.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptive {
    /// Unique identifier, generated when the input has none
    pub uid: String,

    /// Revision sequence number, 0 when absent
    pub sequence: u32,

    /// Creation time of this iCalendar object
    pub dt_stamp: Option<DateTime>,

    /// Start, the anchor of any recurrence
    pub dt_start: Option<DateProperty>,

    /// Creation time in the calendar store
    pub created: Option<DateTime>,

    /// Last revision time
    pub last_modified: Option<DateTime>,

    /// Short summary
    pub summary: Option<String>,

    /// Full description
    pub description: Option<String>,

    /// Access classification
    pub class: Option<Classification>,

    /// Categories from every `CATEGORIES` property, in order
    pub categories: Vec<String>,

    /// Status, checked against the component kind
    pub status: Option<Status>,

    /// Recurrence rule
    pub rrule: Option<RecurrenceRule>,

    /// Recurrence dates
    pub rdates: Vec<DateList>,

    /// Exception dates
    pub exdates: Vec<DateList>,

    /// Attachments, kept as raw properties
    pub attachments: Vec<Property>,

    /// Properties the component does not model
    pub extra: Vec<Property>,
}

impl Descriptive {
    /// Create an empty set of properties with a fresh UID.
    #[must_use]
    pub fn new() -> Self {
        Self::with_uid(uuid::Uuid::new_v4().to_string())
    }

    /// Create an empty set of properties with the given UID.
    #[must_use]
    pub fn with_uid(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            sequence: 0,
            dt_stamp: None,
            dt_start: None,
            created: None,
            last_modified: None,
            summary: None,
            description: None,
            class: None,
            categories: Vec::new(),
            status: None,
            rrule: None,
            rdates: Vec::new(),
            exdates: Vec::new(),
            attachments: Vec::new(),
            extra: Vec::new(),
        }
    }

    /// The start value, if any.
    #[must_use]
    pub fn start(&self) -> Option<&DateTime> {
        self.dt_start.as_ref().map(DateProperty::value)
    }

    /// Additional occurrences after the start.
    ///
    /// Merges the `RRULE` expansion with the `RDATE` starts and removes the
    /// `EXDATE`s. A date-only exception removes every occurrence on that day.
    /// The start itself is never included. Empty without a start.
    #[must_use]
    pub fn occurrences(&self, options: ExpandOptions) -> Vec<DateTime> {
        let Some(anchor) = self.start().copied() else {
            return Vec::new();
        };

        let mut dates: Vec<DateTime> = match &self.rrule {
            Some(rule) => rule.occurrences(&anchor, options).collect(),
            None => Vec::new(),
        };
        dates.extend(
            self.rdates
                .iter()
                .flat_map(|list| list.values.iter().map(RecurrenceDate::start)),
        );

        let excluded: Vec<DateTime> = self
            .exdates
            .iter()
            .flat_map(|list| list.values.iter().map(RecurrenceDate::start))
            .collect();

        dates.retain(|d| *d != anchor && !excluded.iter().any(|ex| excludes(ex, d)));
        dates.sort();
        dates.dedup();
        dates.truncate(options.max_instances);
        dates
    }
}

impl Default for Descriptive {
    fn default() -> Self {
        Self::new()
    }
}

fn excludes(exception: &DateTime, date: &DateTime) -> bool {
    if exception.is_date_only() {
        exception.civil_date() == date.civil_date()
    } else {
        exception == date
    }
}

/// Collects the descriptive properties of one component.
#[derive(Debug)]
pub(crate) struct DescriptiveBuilder {
    kind: ComponentKind,
    uid: Option<String>,
    sequence: Option<u32>,
    dt_stamp: Option<DateTime>,
    dt_start: Option<DateProperty>,
    created: Option<DateTime>,
    last_modified: Option<DateTime>,
    summary: Option<String>,
    description: Option<String>,
    class: Option<Classification>,
    categories: Vec<String>,
    status: Option<Status>,
    rrule: Option<RecurrenceRule>,
    rdates: Vec<DateList>,
    exdates: Vec<DateList>,
    attachments: Vec<Property>,
}

impl DescriptiveBuilder {
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            uid: None,
            sequence: None,
            dt_stamp: None,
            dt_start: None,
            created: None,
            last_modified: None,
            summary: None,
            description: None,
            class: None,
            categories: Vec::new(),
            status: None,
            rrule: None,
            rdates: Vec::new(),
            exdates: Vec::new(),
            attachments: Vec::new(),
        }
    }

    /// Consume a descriptive property, handing back anything else.
    pub fn accept(&mut self, prop: RawProperty, cx: &mut Context<'_, '_>) -> Option<RawProperty> {
        match prop.name() {
            KW_UID => {
                let value = Some(unescape_text(prop.value()));
                cx.once(&mut self.uid, &prop, value);
            }
            KW_SEQUENCE => {
                let value = cx.check(&prop, parse_sequence(prop.value()));
                cx.once(&mut self.sequence, &prop, value);
            }
            KW_DTSTAMP => {
                let value = utc_stamp(&prop, cx);
                cx.once(&mut self.dt_stamp, &prop, value);
            }
            KW_CREATED => {
                let value = utc_stamp(&prop, cx);
                cx.once(&mut self.created, &prop, value);
            }
            KW_LAST_MODIFIED => {
                let value = utc_stamp(&prop, cx);
                cx.once(&mut self.last_modified, &prop, value);
            }
            KW_DTSTART => {
                let result = DateProperty::from_property(prop.property.clone(), cx.strictness());
                let value = cx.check(&prop, result);
                cx.once(&mut self.dt_start, &prop, value);
            }
            KW_SUMMARY => {
                let value = Some(unescape_text(prop.value()));
                cx.once(&mut self.summary, &prop, value);
            }
            KW_DESCRIPTION => {
                let value = Some(unescape_text(prop.value()));
                cx.once(&mut self.description, &prop, value);
            }
            KW_CLASS => {
                let value = cx.check(&prop, prop.value().parse());
                cx.once(&mut self.class, &prop, value);
            }
            KW_CATEGORIES => self.categories.extend(split_text_list(prop.value())),
            KW_STATUS => {
                let value = self.status(&prop, cx);
                cx.once(&mut self.status, &prop, value);
            }
            KW_RRULE => {
                let value = cx.check(&prop, RecurrenceRule::parse(prop.value(), cx.strictness()));
                cx.once(&mut self.rrule, &prop, value);
            }
            KW_RDATE => {
                let result = DateList::parse(prop.property.clone(), true, cx.strictness());
                if let Some(list) = cx.check(&prop, result) {
                    self.rdates.push(list);
                }
            }
            KW_EXDATE => {
                let result = DateList::parse(prop.property.clone(), false, cx.strictness());
                if let Some(list) = cx.check(&prop, result) {
                    self.exdates.push(list);
                }
            }
            KW_ATTACH => {
                let binary = prop
                    .property
                    .attribute(KW_VALUE)
                    .is_some_and(|v| v.eq_ignore_ascii_case(KW_BINARY));
                let base64 = prop
                    .property
                    .attribute(KW_ENCODING)
                    .is_some_and(|v| v.eq_ignore_ascii_case(KW_ENCODING_BASE64));
                if binary && !base64 {
                    let message = "binary ATTACH requires ENCODING=BASE64";
                    cx.strict(&prop, ErrorKind::Validity, message);
                }
                self.attachments.push(prop.property);
            }
            _ => return Some(prop),
        }
        None
    }

    fn status(&self, prop: &RawProperty, cx: &mut Context<'_, '_>) -> Option<Status> {
        let text = prop.value().trim();
        let parsed = text
            .parse::<Status>()
            .map_err(|_| ValueError::invalid("status", format!("unknown status `{text}`")));
        let status = cx.check(prop, parsed)?;
        if status.allowed_in(self.kind) {
            return Some(status);
        }

        let message = format!("STATUS:{status} is not allowed in {}", self.kind);
        if cx.strict(prop, ErrorKind::Validity, message) {
            None
        } else {
            Some(status)
        }
    }

    /// Apply the defaults: a generated UID and sequence 0.
    pub fn finish(self, extra: Vec<Property>) -> Descriptive {
        Descriptive {
            uid: self
                .uid
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            sequence: self.sequence.unwrap_or_default(),
            dt_stamp: self.dt_stamp,
            dt_start: self.dt_start,
            created: self.created,
            last_modified: self.last_modified,
            summary: self.summary,
            description: self.description,
            class: self.class,
            categories: self.categories,
            status: self.status,
            rrule: self.rrule,
            rdates: self.rdates,
            exdates: self.exdates,
            attachments: self.attachments,
            extra,
        }
    }
}

fn parse_sequence(text: &str) -> Result<u32, ValueError> {
    let n = parse_integer(text)?;
    u32::try_from(n).map_err(|_| ValueError::invalid("sequence", format!("{n} is negative")))
}

/// Parse a timestamp that RFC 5545 requires in UTC; other forms are a strict
/// error but kept.
pub(crate) fn utc_stamp(prop: &RawProperty, cx: &mut Context<'_, '_>) -> Option<DateTime> {
    let value = cx.check(prop, DateTime::parse(prop.value()))?;
    if !value.is_utc() {
        cx.strict(
            prop,
            ErrorKind::Validity,
            format!("{} must be a UTC date-time", prop.name()),
        );
    }
    Some(value)
}

/// Status values of events, to-dos and journals.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "SCREAMING-KEBAB-CASE", ascii_case_insensitive)]
#[expect(missing_docs)]
pub enum Status {
    Tentative,
    Confirmed,
    Cancelled,
    NeedsAction,
    Completed,
    InProcess,
    Draft,
    Final,
}

impl Status {
    /// Whether the status may be used by a component of the given kind.
    #[must_use]
    pub const fn allowed_in(self, kind: ComponentKind) -> bool {
        match kind {
            ComponentKind::Event => {
                matches!(self, Self::Tentative | Self::Confirmed | Self::Cancelled)
            }
            ComponentKind::Todo => matches!(
                self,
                Self::NeedsAction | Self::Completed | Self::InProcess | Self::Cancelled
            ),
            ComponentKind::Journal => matches!(self, Self::Draft | Self::Final | Self::Cancelled),
            _ => false,
        }
    }
}

/// Access classification (`CLASS`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Classification {
    /// Public classification
    #[default]
    Public,

    /// Private classification
    Private,

    /// Confidential classification
    Confidential,

    /// Extension or unregistered value, kept uppercase
    Other(String),
}

impl FromStr for Classification {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValueError::format("class", "empty classification"));
        }

        Ok(match s.to_ascii_uppercase().as_str() {
            KW_CLASS_PUBLIC => Self::Public,
            KW_CLASS_PRIVATE => Self::Private,
            KW_CLASS_CONFIDENTIAL => Self::Confidential,
            other => Self::Other(other.to_owned()),
        })
    }
}

impl AsRef<str> for Classification {
    fn as_ref(&self) -> &str {
        match self {
            Self::Public => KW_CLASS_PUBLIC,
            Self::Private => KW_CLASS_PRIVATE,
            Self::Confidential => KW_CLASS_CONFIDENTIAL,
            Self::Other(s) => s,
        }
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.as_ref().fmt(f)
    }
}

/// One value of an `RDATE` or `EXDATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceDate {
    /// A date or date-time
    Date(DateTime),

    /// A period, `RDATE;VALUE=PERIOD` only
    Period(Period),
}

impl RecurrenceDate {
    /// The instant the value starts at.
    #[must_use]
    pub const fn start(&self) -> DateTime {
        match self {
            Self::Date(date) => *date,
            Self::Period(period) => period.start(),
        }
    }
}

impl Display for RecurrenceDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => date.fmt(f),
            Self::Period(period) => period.fmt(f),
        }
    }
}

/// A multi-valued `RDATE` or `EXDATE` property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateList {
    /// The property, with its `TZID` and `VALUE` attributes
    pub property: Property,

    /// Parsed values, in order
    pub values: Vec<RecurrenceDate>,
}

impl DateList {
    /// Parse the comma-separated values of a property.
    ///
    /// `VALUE=PERIOD` is only accepted when `allow_period` is set.
    ///
    /// ## Errors
    /// Fails with the error of the first value that does not parse, or with
    /// [`ValueError::Invalid`] for a disallowed or mismatching `VALUE`.
    pub fn parse(
        property: Property,
        allow_period: bool,
        strictness: Strictness,
    ) -> Result<Self, ValueError> {
        let periods = property
            .attribute(KW_VALUE)
            .is_some_and(|v| v.eq_ignore_ascii_case(KW_PERIOD));

        let values = if periods {
            if !allow_period {
                return Err(ValueError::invalid(
                    "date list",
                    format!("VALUE=PERIOD is not allowed in {}", property.name()),
                ));
            }
            Period::parse_list(property.value())?
                .into_iter()
                .map(RecurrenceDate::Period)
                .collect()
        } else {
            let dates = DateTime::parse_list(property.value())?;
            for date in &dates {
                check_value_type(&property, &[date.value_type()], strictness)?;
            }
            dates.into_iter().map(RecurrenceDate::Date).collect()
        };

        Ok(Self { property, values })
    }

    /// Build a list of dates, tagging `VALUE` from the first value.
    ///
    /// ## Errors
    /// Returns [`ValueError::Format`] if the property name is not valid.
    pub fn from_dates(name: &str, dates: &[DateTime]) -> Result<Self, ValueError> {
        let value = dates
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let mut property = Property::new(name, value)?;
        let tag = if dates.first().is_some_and(DateTime::is_date_only) {
            KW_DATE
        } else {
            KW_DATETIME
        };
        property.set_attribute(KW_VALUE, tag);
        Ok(Self {
            property,
            values: dates.iter().copied().map(RecurrenceDate::Date).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i16, m: i8, d: i8) -> DateTime {
        DateTime::date(y, m, d).unwrap()
    }

    fn list(text: &str, allow_period: bool) -> Result<DateList, ValueError> {
        let prop = Property::parse_str(text, Strictness::Strict).unwrap();
        DateList::parse(prop, allow_period, Strictness::Strict)
    }

    #[test]
    fn parses_status_per_kind() {
        #[rustfmt::skip]
        let cases = [
            ("CONFIRMED",    ComponentKind::Event,   true),
            ("needs-action", ComponentKind::Todo,    true),
            ("IN-PROCESS",   ComponentKind::Todo,    true),
            ("FINAL",        ComponentKind::Journal, true),
            ("CANCELLED",    ComponentKind::Journal, true),
            ("DRAFT",        ComponentKind::Event,   false),
            ("TENTATIVE",    ComponentKind::Todo,    false),
        ];
        for (src, kind, allowed) in cases {
            let status: Status = src.parse().unwrap();
            assert_eq!(status.allowed_in(kind), allowed, "{src} in {kind}");
        }
        assert_eq!(Status::NeedsAction.to_string(), "NEEDS-ACTION");
        assert!("DONE".parse::<Status>().is_err());
    }

    #[test]
    fn parses_classification() {
        let public: Classification = "public".parse().unwrap();
        assert_eq!(public, Classification::Public);
        assert_eq!(
            "x-secret".parse::<Classification>().unwrap(),
            Classification::Other("X-SECRET".to_string())
        );
        assert_eq!(Classification::Confidential.to_string(), "CONFIDENTIAL");
        assert!("".parse::<Classification>().is_err());
    }

    #[test]
    fn parses_date_lists() {
        let dates = list("EXDATE:19960402T010000Z,19960403T010000Z", false).unwrap();
        assert_eq!(dates.values.len(), 2);

        let periods = list(
            "RDATE;VALUE=PERIOD:19960403T020000Z/19960403T040000Z,19960404T010000Z/PT3H",
            true,
        )
        .unwrap();
        assert_eq!(periods.values.len(), 2);
        assert_eq!(
            periods.values[1].start(),
            DateTime::date_time(1996, 4, 4, 1, 0, 0, true).unwrap()
        );

        let periods = list("EXDATE;VALUE=PERIOD:19960403T020000Z/PT1H", false);
        assert!(periods.is_err());
        assert!(list("EXDATE;VALUE=DATE:19960402T010000Z", false).is_err());
        assert!(list("RDATE:19960402,bogus", true).is_err());
    }

    #[test]
    fn occurrences_merge_rdates_and_drop_exdates() {
        let mut props = Descriptive::with_uid("1");
        props.dt_start = Some(DateProperty::new(KW_DTSTART, date(2024, 1, 1)).unwrap());
        props.rrule = Some("FREQ=DAILY;COUNT=5".parse().unwrap());
        let rdates = [date(2024, 2, 1), date(2024, 1, 3)];
        let exdates = [date(2024, 1, 2), date(2024, 1, 1)];
        props.rdates = vec![DateList::from_dates(KW_RDATE, &rdates).unwrap()];
        props.exdates = vec![DateList::from_dates(KW_EXDATE, &exdates).unwrap()];

        let got = props.occurrences(ExpandOptions::default());
        assert_eq!(
            got,
            [date(2024, 1, 3), date(2024, 1, 4), date(2024, 1, 5), date(2024, 2, 1)]
        );
    }

    #[test]
    fn date_only_exdate_removes_the_whole_day() {
        let start = DateTime::date_time(2024, 1, 1, 9, 0, 0, false).unwrap();
        let mut props = Descriptive::with_uid("1");
        props.dt_start = Some(DateProperty::new(KW_DTSTART, start).unwrap());
        props.rrule = Some("FREQ=HOURLY;INTERVAL=12;COUNT=4".parse().unwrap());
        let exdate = DateList::from_dates(KW_EXDATE, &[date(2024, 1, 2)]).unwrap();
        props.exdates = vec![exdate];

        let got = props.occurrences(ExpandOptions::default());
        let evening = DateTime::date_time(2024, 1, 1, 21, 0, 0, false).unwrap();
        assert_eq!(got, [evening]);
    }

    #[test]
    fn occurrences_need_a_start() {
        let mut props = Descriptive::new();
        props.rrule = Some("FREQ=DAILY".parse().unwrap());
        assert!(props.occurrences(ExpandOptions::default()).is_empty());
        assert_eq!(props.uid.len(), 36);
    }
}
