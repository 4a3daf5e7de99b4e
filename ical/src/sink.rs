// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Receivers of the components produced by the assembler.

use crate::calendar::{CalendarHeader, ICalendar};
use crate::component::{VEvent, VFreeBusy, VJournal, VTimeZone, VTodo};

/// Receives every valid component, in input order.
///
/// Every method has an empty default so a sink only implements the kinds it
/// cares about. Several sinks may be registered; each sees every component.
pub trait ComponentSink {
    /// A time zone.
    fn store_timezone(&mut self, timezone: &VTimeZone) {
        let _ = timezone;
    }

    /// An event.
    fn store_event(&mut self, event: &VEvent) {
        let _ = event;
    }

    /// A to-do.
    fn store_todo(&mut self, todo: &VTodo) {
        let _ = todo;
    }

    /// A journal.
    fn store_journal(&mut self, journal: &VJournal) {
        let _ = journal;
    }

    /// Free/busy information.
    fn store_freebusy(&mut self, freebusy: &VFreeBusy) {
        let _ = freebusy;
    }

    /// The calendar-level properties, once the stream is finished.
    fn store_header(&mut self, header: &CalendarHeader) {
        let _ = header;
    }
}

impl<T: ComponentSink + ?Sized> ComponentSink for &mut T {
    fn store_timezone(&mut self, timezone: &VTimeZone) {
        (**self).store_timezone(timezone);
    }

    fn store_event(&mut self, event: &VEvent) {
        (**self).store_event(event);
    }

    fn store_todo(&mut self, todo: &VTodo) {
        (**self).store_todo(todo);
    }

    fn store_journal(&mut self, journal: &VJournal) {
        (**self).store_journal(journal);
    }

    fn store_freebusy(&mut self, freebusy: &VFreeBusy) {
        (**self).store_freebusy(freebusy);
    }

    fn store_header(&mut self, header: &CalendarHeader) {
        (**self).store_header(header);
    }
}

/// A sink that assembles an owned [`ICalendar`].
#[derive(Debug, Clone, Default)]
pub struct CalendarCollector {
    calendar: ICalendar,
}

impl CalendarCollector {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The calendar collected so far.
    #[must_use]
    pub const fn calendar(&self) -> &ICalendar {
        &self.calendar
    }

    /// Take the collected calendar.
    #[must_use]
    pub fn into_calendar(self) -> ICalendar {
        self.calendar
    }
}

impl ComponentSink for CalendarCollector {
    fn store_timezone(&mut self, timezone: &VTimeZone) {
        self.calendar.timezones.push(timezone.clone());
    }

    fn store_event(&mut self, event: &VEvent) {
        self.calendar.events.push(event.clone());
    }

    fn store_todo(&mut self, todo: &VTodo) {
        self.calendar.todos.push(todo.clone());
    }

    fn store_journal(&mut self, journal: &VJournal) {
        self.calendar.journals.push(journal.clone());
    }

    fn store_freebusy(&mut self, freebusy: &VFreeBusy) {
        self.calendar.free_busy.push(freebusy.clone());
    }

    fn store_header(&mut self, header: &CalendarHeader) {
        self.calendar.header = header.clone();
    }
}
