// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Component formatting for iCalendar components.

use std::io::{self, Write};

use crate::calendar::{CalendarHeader, ICalendar};
use crate::component::{
    AlarmTrigger, Component, Descriptive, Observance, VAlarm, VEvent, VFreeBusy, VJournal,
    VTimeZone, VTodo,
};
use crate::formatter::Formatter;
use crate::keyword::{
    KW_ACTION, KW_BEGIN, KW_CALSCALE, KW_CATEGORIES, KW_CLASS, KW_COMPLETED, KW_CREATED,
    KW_DATETIME, KW_DESCRIPTION, KW_DTSTAMP, KW_DTSTART, KW_DURATION, KW_END, KW_FBTYPE,
    KW_FBTYPE_BUSY, KW_FREEBUSY, KW_LAST_MODIFIED, KW_LOCATION, KW_METHOD, KW_PERCENT_COMPLETE,
    KW_PRIORITY, KW_PRODID, KW_RELATED, KW_RELATED_END, KW_REPEAT, KW_RRULE, KW_SEQUENCE, KW_STATUS,
    KW_SUMMARY, KW_TRANSP, KW_TRIGGER, KW_TZID, KW_TZNAME, KW_TZOFFSETFROM, KW_TZOFFSETTO, KW_TZURL,
    KW_UID, KW_VALUE, KW_VCALENDAR, KW_VERSION,
};
use crate::property::Property;
use crate::value::{escape_text, join_text_list};

/// Conversion of a component into the properties it is written as.
///
/// Nested components (alarms, observances) are not included; they are
/// written as blocks of their own.
pub trait ToProperties {
    /// The properties, in output order.
    fn to_properties(&self) -> Vec<Property>;
}

fn text(name: &'static str, value: &str) -> Property {
    Property::named(name, escape_text(value))
}

fn push_text(props: &mut Vec<Property>, name: &'static str, value: Option<&String>) {
    if let Some(value) = value {
        props.push(text(name, value));
    }
}

fn push_display(props: &mut Vec<Property>, name: &'static str, value: Option<impl ToString>) {
    if let Some(value) = value {
        props.push(Property::named(name, value.to_string()));
    }
}

impl ToProperties for CalendarHeader {
    fn to_properties(&self) -> Vec<Property> {
        let mut props = Vec::new();
        push_display(&mut props, KW_PRODID, self.prod_id.as_ref());
        push_display(&mut props, KW_VERSION, self.version.as_ref());
        push_display(&mut props, KW_CALSCALE, self.cal_scale.as_ref());
        push_display(&mut props, KW_METHOD, self.method.as_ref());
        props.extend(self.extra.iter().cloned());
        props
    }
}

impl ToProperties for Descriptive {
    fn to_properties(&self) -> Vec<Property> {
        let mut props = vec![text(KW_UID, &self.uid)];
        push_display(&mut props, KW_DTSTAMP, self.dt_stamp.as_ref());
        if let Some(start) = &self.dt_start {
            props.push(start.property().clone());
        }
        if self.sequence > 0 {
            props.push(Property::named(KW_SEQUENCE, self.sequence.to_string()));
        }
        push_display(&mut props, KW_CREATED, self.created.as_ref());
        push_display(&mut props, KW_LAST_MODIFIED, self.last_modified.as_ref());
        push_text(&mut props, KW_SUMMARY, self.summary.as_ref());
        push_text(&mut props, KW_DESCRIPTION, self.description.as_ref());
        push_display(&mut props, KW_CLASS, self.class.as_ref());
        if !self.categories.is_empty() {
            let categories = join_text_list(&self.categories);
            props.push(Property::named(KW_CATEGORIES, categories));
        }
        push_display(&mut props, KW_STATUS, self.status.as_ref());
        push_display(&mut props, KW_RRULE, self.rrule.as_ref());
        props.extend(self.rdates.iter().map(|list| list.property.clone()));
        props.extend(self.exdates.iter().map(|list| list.property.clone()));
        props.extend(self.attachments.iter().cloned());
        props.extend(self.extra.iter().cloned());
        props
    }
}

impl ToProperties for VEvent {
    fn to_properties(&self) -> Vec<Property> {
        let mut props = self.descriptive.to_properties();
        if let Some(end) = &self.dt_end {
            props.push(end.property().clone());
        }
        push_display(&mut props, KW_DURATION, self.duration.as_ref());
        push_text(&mut props, KW_LOCATION, self.location.as_ref());
        push_display(&mut props, KW_PRIORITY, self.priority);
        push_display(&mut props, KW_TRANSP, self.transparency);
        props
    }
}

impl ToProperties for VTodo {
    fn to_properties(&self) -> Vec<Property> {
        let mut props = self.descriptive.to_properties();
        if let Some(due) = &self.due {
            props.push(due.property().clone());
        }
        push_display(&mut props, KW_DURATION, self.duration.as_ref());
        push_display(&mut props, KW_COMPLETED, self.completed.as_ref());
        push_display(&mut props, KW_PERCENT_COMPLETE, self.percent_complete);
        push_display(&mut props, KW_PRIORITY, self.priority);
        push_text(&mut props, KW_LOCATION, self.location.as_ref());
        props
    }
}

impl ToProperties for VJournal {
    fn to_properties(&self) -> Vec<Property> {
        let mut props = self.descriptive.to_properties();
        props.extend(self.descriptions.iter().map(|d| text(KW_DESCRIPTION, d)));
        props
    }
}

impl ToProperties for VAlarm {
    fn to_properties(&self) -> Vec<Property> {
        let trigger = match &self.trigger {
            AlarmTrigger::Relative {
                offset,
                related_end,
            } => {
                let prop = Property::named(KW_TRIGGER, offset.to_string());
                if *related_end {
                    prop.with_attribute(KW_RELATED, KW_RELATED_END)
                } else {
                    prop
                }
            }
            AlarmTrigger::Absolute(at) => {
                Property::named(KW_TRIGGER, at.to_string()).with_attribute(KW_VALUE, KW_DATETIME)
            }
        };

        let mut props = vec![Property::named(KW_ACTION, self.action.to_string()), trigger];
        push_display(&mut props, KW_REPEAT, self.repeat);
        push_display(&mut props, KW_DURATION, self.duration.as_ref());
        push_text(&mut props, KW_DESCRIPTION, self.description.as_ref());
        push_text(&mut props, KW_SUMMARY, self.summary.as_ref());
        props.extend(self.attachments.iter().cloned());
        props.extend(self.extra.iter().cloned());
        props
    }
}

impl ToProperties for VTimeZone {
    fn to_properties(&self) -> Vec<Property> {
        let mut props = vec![Property::named(KW_TZID, self.tz_id.clone())];
        push_display(&mut props, KW_LAST_MODIFIED, self.last_modified.as_ref());
        push_display(&mut props, KW_TZURL, self.tz_url.as_ref());
        props.extend(self.extra.iter().cloned());
        props
    }
}

impl ToProperties for Observance {
    fn to_properties(&self) -> Vec<Property> {
        let mut props = vec![
            Property::named(KW_DTSTART, self.dt_start.to_string()),
            Property::named(KW_TZOFFSETFROM, self.offset_from.to_string()),
            Property::named(KW_TZOFFSETTO, self.offset_to.to_string()),
        ];
        props.extend(self.names.iter().map(|name| text(KW_TZNAME, name)));
        push_display(&mut props, KW_RRULE, self.rrule.as_ref());
        props.extend(self.rdates.iter().map(|list| list.property.clone()));
        props.extend(self.extra.iter().cloned());
        props
    }
}

impl ToProperties for VFreeBusy {
    fn to_properties(&self) -> Vec<Property> {
        let mut props = vec![text(KW_UID, &self.uid)];
        push_display(&mut props, KW_DTSTAMP, self.dt_stamp.as_ref());
        if let Some(start) = &self.dt_start {
            props.push(start.property().clone());
        }
        if let Some(end) = &self.dt_end {
            props.push(end.property().clone());
        }
        for fb in &self.free_busy {
            let periods = fb
                .periods
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            let prop = Property::named(KW_FREEBUSY, periods);
            props.push(if fb.fb_type == KW_FBTYPE_BUSY {
                prop
            } else {
                prop.with_attribute(KW_FBTYPE, &fb.fb_type)
            });
        }
        props.extend(self.extra.iter().cloned());
        props
    }
}

/// Format an `ICalendar` component.
pub fn write_icalendar<W: Write>(f: &mut Formatter<W>, calendar: &ICalendar) -> io::Result<()> {
    with_block(f, KW_VCALENDAR, |f| {
        write_properties(f, &calendar.header.to_properties())?;

        for tz in &calendar.timezones {
            write_vtimezone(f, tz)?;
        }
        for event in &calendar.events {
            write_with_alarms(f, event, &event.alarms)?;
        }
        for todo in &calendar.todos {
            write_with_alarms(f, todo, &todo.alarms)?;
        }
        for journal in &calendar.journals {
            write_with_alarms(f, journal, &[])?;
        }
        for fb in &calendar.free_busy {
            write_with_alarms(f, fb, &[])?;
        }
        Ok(())
    })
}

fn write_with_alarms<W: Write, C: Component + ToProperties>(
    f: &mut Formatter<W>,
    component: &C,
    alarms: &[VAlarm],
) -> io::Result<()> {
    with_block(f, C::KIND.name(), |f| {
        write_properties(f, &component.to_properties())?;
        for alarm in alarms {
            with_block(f, VAlarm::KIND.name(), |f| {
                write_properties(f, &alarm.to_properties())
            })?;
        }
        Ok(())
    })
}

fn write_vtimezone<W: Write>(f: &mut Formatter<W>, tz: &VTimeZone) -> io::Result<()> {
    with_block(f, VTimeZone::KIND.name(), |f| {
        write_properties(f, &tz.to_properties())?;
        for observance in &tz.observances {
            with_block(f, observance.kind.component().name(), |f| {
                write_properties(f, &observance.to_properties())
            })?;
        }
        Ok(())
    })
}

fn write_properties<W: Write>(f: &mut Formatter<W>, props: &[Property]) -> io::Result<()> {
    props.iter().try_for_each(|prop| f.write_property(prop))
}

/// Write `BEGIN:<name>`, the body, then `END:<name>`.
fn with_block<W: Write, F>(f: &mut Formatter<W>, name: &str, body: F) -> io::Result<()>
where
    F: FnOnce(&mut Formatter<W>) -> io::Result<()>,
{
    f.write_line(&format!("{KW_BEGIN}:{name}"))?;
    body(f)?;
    f.write_line(&format!("{KW_END}:{name}"))
}
