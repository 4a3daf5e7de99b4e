// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! iCalendar container types.

use crate::component::{VEvent, VFreeBusy, VJournal, VTimeZone, VTodo};
use crate::keyword::KW_VERSION_2_0;
use crate::property::Property;

/// Default product identifier written by [`ICalendar::new`].
pub const DEFAULT_PROD_ID: &str = "-//yzx9.xyz//calendula//EN";

/// Calendar-level properties of a `VCALENDAR`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CalendarHeader {
    /// Version of the iCalendar specification, `2.0`
    pub version: Option<String>,

    /// Product identifier that generated the data
    pub prod_id: Option<String>,

    /// Calendar scale, `GREGORIAN` when absent
    pub cal_scale: Option<String>,

    /// iTIP method, e.g. `PUBLISH`
    pub method: Option<String>,

    /// Other calendar-level properties, kept for round-trip
    pub extra: Vec<Property>,
}

/// Main iCalendar object, one `VCALENDAR` with its components grouped by
/// kind.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ICalendar {
    /// Calendar-level properties
    pub header: CalendarHeader,

    /// Time zones
    pub timezones: Vec<VTimeZone>,

    /// Events
    pub events: Vec<VEvent>,

    /// To-dos
    pub todos: Vec<VTodo>,

    /// Journals
    pub journals: Vec<VJournal>,

    /// Free/busy information
    pub free_busy: Vec<VFreeBusy>,
}

impl ICalendar {
    /// Create an empty calendar with the default `PRODID` and `VERSION`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            header: CalendarHeader {
                version: Some(KW_VERSION_2_0.to_owned()),
                prod_id: Some(DEFAULT_PROD_ID.to_owned()),
                ..CalendarHeader::default()
            },
            ..Self::default()
        }
    }

    /// Number of top-level components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timezones.len()
            + self.events.len()
            + self.todos.len()
            + self.journals.len()
            + self.free_busy.len()
    }

    /// Whether the calendar has no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find a time zone by its identifier.
    #[must_use]
    pub fn timezone(&self, tz_id: &str) -> Option<&VTimeZone> {
        self.timezones.iter().find(|tz| tz.tz_id == tz_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Descriptive;

    #[test]
    fn new_calendar_has_required_properties() {
        let calendar = ICalendar::new();
        assert_eq!(calendar.header.version.as_deref(), Some("2.0"));
        assert_eq!(calendar.header.prod_id.as_deref(), Some(DEFAULT_PROD_ID));
        assert!(calendar.is_empty());
    }

    #[test]
    fn counts_and_finds_components() {
        let mut calendar = ICalendar::new();
        calendar.events.push(VEvent::new(Descriptive::new()));
        calendar.todos.push(VTodo::new(Descriptive::new()));
        calendar.timezones.push(VTimeZone::new("Europe/Berlin"));
        assert_eq!(calendar.len(), 3);
        assert!(calendar.timezone("Europe/Berlin").is_some());
        assert!(calendar.timezone("Europe/Paris").is_none());
    }
}
