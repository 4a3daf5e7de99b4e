// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Event component (VEVENT).

use crate::component::valarm::build_alarms;
use crate::component::{
    BuildComponent, Component, ComponentKind, Context, Descriptive, DescriptiveBuilder,
    RawComponent, VAlarm,
};
use crate::error::ValueError;
use crate::keyword::{
    KW_ATTENDEE, KW_COMMENT, KW_CONTACT, KW_DTEND, KW_DURATION, KW_GEO, KW_LOCATION,
    KW_ORGANIZER, KW_PRIORITY, KW_RECURRENCE_ID, KW_RELATED_TO, KW_REQUEST_STATUS, KW_RESOURCES,
    KW_TRANSP, KW_URL,
};
use crate::recur::ExpandOptions;
use crate::value::{DateProperty, DateTime, Duration, parse_integer, unescape_text};

/// Event component (VEVENT)
#[derive(Debug, Clone, PartialEq)]
pub struct VEvent {
    /// Identity, summary, start and recurrence
    pub descriptive: Descriptive,

    /// End of the event
    pub dt_end: Option<DateProperty>,

    /// Duration of the event (alternative to `dt_end`)
    pub duration: Option<Duration>,

    /// Location of the event
    pub location: Option<String>,

    /// Priority (1-9, 1 is highest, 0 undefined)
    pub priority: Option<u8>,

    /// Time transparency
    pub transparency: Option<TimeTransparency>,

    /// Alarms
    pub alarms: Vec<VAlarm>,
}

impl VEvent {
    /// Create an event around a set of descriptive properties.
    #[must_use]
    pub const fn new(descriptive: Descriptive) -> Self {
        Self {
            descriptive,
            dt_end: None,
            duration: None,
            location: None,
            priority: None,
            transparency: None,
            alarms: Vec::new(),
        }
    }

    /// End of the event, from `DTEND` or from `DTSTART` plus `DURATION`.
    #[must_use]
    pub fn end(&self) -> Option<DateTime> {
        if let Some(end) = &self.dt_end {
            return Some(*end.value());
        }
        end_from_duration(self.descriptive.start()?, self.duration?)
    }

    /// Additional occurrences after the start, see
    /// [`Descriptive::occurrences`].
    #[must_use]
    pub fn occurrences(&self, options: ExpandOptions) -> Vec<DateTime> {
        self.descriptive.occurrences(options)
    }
}

pub(crate) fn end_from_duration(start: &DateTime, duration: Duration) -> Option<DateTime> {
    let end = start.civil().checked_add(duration.signed_duration()).ok()?;
    let date_only = start.is_date_only() && duration.seconds() % 86_400 == 0;
    Some(DateTime::from_civil(end, date_only, start.is_utc()))
}

impl Component for VEvent {
    const KIND: ComponentKind = ComponentKind::Event;

    fn validate(&self) -> Result<(), &'static str> {
        if self.dt_end.is_some() && self.duration.is_some() {
            return Err("DTEND and DURATION are mutually exclusive");
        }
        let ends_early = (self.descriptive.start())
            .zip(self.dt_end.as_ref())
            .is_some_and(|(start, end)| end.value() < start);
        if ends_early {
            return Err("DTEND is before DTSTART");
        }
        Ok(())
    }
}

const KNOWN: &[&str] = &[
    KW_ATTENDEE,
    KW_COMMENT,
    KW_CONTACT,
    KW_GEO,
    KW_ORGANIZER,
    KW_RECURRENCE_ID,
    KW_RELATED_TO,
    KW_REQUEST_STATUS,
    KW_RESOURCES,
    KW_URL,
];

impl BuildComponent for VEvent {
    fn build(raw: RawComponent, cx: &mut Context<'_, '_>) -> Option<Self> {
        let mut common = DescriptiveBuilder::new(Self::KIND);
        let mut dt_end = None;
        let mut duration = None;
        let mut location = None;
        let mut priority = None;
        let mut transparency = None;
        let mut extra = Vec::new();

        for prop in raw.properties {
            let Some(prop) = common.accept(prop, cx) else {
                continue;
            };
            match prop.name() {
                KW_DTEND => {
                    let result =
                        DateProperty::from_property(prop.property.clone(), cx.strictness());
                    let value = cx.check(&prop, result);
                    cx.once(&mut dt_end, &prop, value);
                }
                KW_DURATION => {
                    let value = cx.check(&prop, Duration::parse(prop.value()));
                    cx.once(&mut duration, &prop, value);
                }
                KW_LOCATION => {
                    let value = Some(unescape_text(prop.value()));
                    cx.once(&mut location, &prop, value);
                }
                KW_PRIORITY => {
                    let value = cx.check(&prop, parse_priority(prop.value()));
                    cx.once(&mut priority, &prop, value);
                }
                KW_TRANSP => {
                    let text = prop.value().trim();
                    let parsed = text.parse::<TimeTransparency>().map_err(|_| {
                        ValueError::invalid("transparency", format!("unknown value `{text}`"))
                    });
                    let value = cx.check(&prop, parsed);
                    cx.once(&mut transparency, &prop, value);
                }
                _ => cx.extra(&mut extra, prop, KNOWN, Self::KIND),
            }
        }

        Some(Self {
            descriptive: common.finish(extra),
            dt_end,
            duration,
            location,
            priority,
            transparency,
            alarms: build_alarms(raw.children, Self::KIND, cx),
        })
    }
}

/// Parse a `PRIORITY` value, 0 to 9.
pub(crate) fn parse_priority(text: &str) -> Result<u8, ValueError> {
    let n = parse_integer(text)?;
    u8::try_from(n)
        .ok()
        .filter(|p| *p <= 9)
        .ok_or_else(|| ValueError::invalid("priority", format!("{n} is not in 0..=9")))
}

/// Time transparency (`TRANSP`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum TimeTransparency {
    /// Blocks time on free/busy lookups
    #[default]
    Opaque,

    /// Does not block time
    Transparent,
}
