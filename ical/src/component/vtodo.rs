// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! To-do component (VTODO).

use crate::component::properties::utc_stamp;
use crate::component::valarm::build_alarms;
use crate::component::vevent::{end_from_duration, parse_priority};
use crate::component::{
    BuildComponent, Component, ComponentKind, Context, Descriptive, DescriptiveBuilder,
    RawComponent, VAlarm,
};
use crate::error::ValueError;
use crate::keyword::{
    KW_ATTENDEE, KW_COMMENT, KW_COMPLETED, KW_CONTACT, KW_DUE, KW_DURATION, KW_GEO, KW_LOCATION,
    KW_ORGANIZER, KW_PERCENT_COMPLETE, KW_PRIORITY, KW_RECURRENCE_ID, KW_RELATED_TO,
    KW_REQUEST_STATUS, KW_RESOURCES, KW_URL,
};
use crate::recur::ExpandOptions;
use crate::value::{DateProperty, DateTime, Duration, parse_integer, unescape_text};

/// To-do component (VTODO)
#[derive(Debug, Clone, PartialEq)]
pub struct VTodo {
    /// Identity, summary, start and recurrence
    pub descriptive: Descriptive,

    /// Due date
    pub due: Option<DateProperty>,

    /// Duration from the start (alternative to `due`)
    pub duration: Option<Duration>,

    /// Completion time
    pub completed: Option<DateTime>,

    /// Percent complete (0-100)
    pub percent_complete: Option<u8>,

    /// Priority (1-9, 1 is highest, 0 undefined)
    pub priority: Option<u8>,

    /// Location
    pub location: Option<String>,

    /// Alarms
    pub alarms: Vec<VAlarm>,
}

impl VTodo {
    /// Create a to-do around a set of descriptive properties.
    #[must_use]
    pub const fn new(descriptive: Descriptive) -> Self {
        Self {
            descriptive,
            due: None,
            duration: None,
            completed: None,
            percent_complete: None,
            priority: None,
            location: None,
            alarms: Vec::new(),
        }
    }

    /// Due time, from `DUE` or from `DTSTART` plus `DURATION`.
    #[must_use]
    pub fn due(&self) -> Option<DateTime> {
        if let Some(due) = &self.due {
            return Some(*due.value());
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

impl Component for VTodo {
    const KIND: ComponentKind = ComponentKind::Todo;

    fn validate(&self) -> Result<(), &'static str> {
        if self.due.is_some() && self.duration.is_some() {
            return Err("DUE and DURATION are mutually exclusive");
        }
        if self.duration.is_some() && self.descriptive.dt_start.is_none() {
            return Err("DURATION requires DTSTART");
        }
        let due_early = (self.descriptive.start())
            .zip(self.due.as_ref())
            .is_some_and(|(start, due)| due.value() < start);
        if due_early {
            return Err("DUE is before DTSTART");
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

impl BuildComponent for VTodo {
    fn build(raw: RawComponent, cx: &mut Context<'_, '_>) -> Option<Self> {
        let mut common = DescriptiveBuilder::new(Self::KIND);
        let mut due = None;
        let mut duration = None;
        let mut completed = None;
        let mut percent_complete = None;
        let mut priority = None;
        let mut location = None;
        let mut extra = Vec::new();

        for prop in raw.properties {
            let Some(prop) = common.accept(prop, cx) else {
                continue;
            };
            match prop.name() {
                KW_DUE => {
                    let result =
                        DateProperty::from_property(prop.property.clone(), cx.strictness());
                    let value = cx.check(&prop, result);
                    cx.once(&mut due, &prop, value);
                }
                KW_DURATION => {
                    let value = cx.check(&prop, Duration::parse(prop.value()));
                    cx.once(&mut duration, &prop, value);
                }
                KW_COMPLETED => {
                    let value = utc_stamp(&prop, cx);
                    cx.once(&mut completed, &prop, value);
                }
                KW_PERCENT_COMPLETE => {
                    let value = cx.check(&prop, parse_percent(prop.value()));
                    cx.once(&mut percent_complete, &prop, value);
                }
                KW_PRIORITY => {
                    let value = cx.check(&prop, parse_priority(prop.value()));
                    cx.once(&mut priority, &prop, value);
                }
                KW_LOCATION => {
                    let value = Some(unescape_text(prop.value()));
                    cx.once(&mut location, &prop, value);
                }
                _ => cx.extra(&mut extra, prop, KNOWN, Self::KIND),
            }
        }

        Some(Self {
            descriptive: common.finish(extra),
            due,
            duration,
            completed,
            percent_complete,
            priority,
            location,
            alarms: build_alarms(raw.children, Self::KIND, cx),
        })
    }
}

fn parse_percent(text: &str) -> Result<u8, ValueError> {
    let n = parse_integer(text)?;
    u8::try_from(n)
        .ok()
        .filter(|p| *p <= 100)
        .ok_or_else(|| ValueError::invalid("percent-complete", format!("{n} is not in 0..=100")))
}
