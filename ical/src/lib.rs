// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Parse, represent, expand and write iCalendar (RFC 5545) data.
//!
//! ```
//! use calendula_ical::{ExpandOptions, Strictness, parse_str};
//!
//! let src = "BEGIN:VCALENDAR\r\n\
//!            VERSION:2.0\r\n\
//!            PRODID:-//Example//EN\r\n\
//!            BEGIN:VEVENT\r\n\
//!            UID:standup\r\n\
//!            DTSTART:20240101T090000Z\r\n\
//!            RRULE:FREQ=DAILY;COUNT=3\r\n\
//!            END:VEVENT\r\n\
//!            END:VCALENDAR\r\n";
//!
//! let (calendar, errors) = parse_str(src, Strictness::Strict);
//! assert!(errors.is_empty());
//!
//! let event = &calendar.events[0];
//! assert_eq!(event.occurrences(ExpandOptions::default()).len(), 2);
//! ```

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::option_option,
    clippy::similar_names,
    clippy::single_match_else,
    clippy::match_bool
)]

mod assembler;
mod calendar;
mod component;
mod error;
pub mod formatter;
pub mod keyword;
mod property;
mod recur;
mod sink;
mod strictness;
pub mod syntax;
pub mod value;

pub use crate::assembler::{Assembler, Parser, parse_reader, parse_str};
pub use crate::calendar::{CalendarHeader, DEFAULT_PROD_ID, ICalendar};
pub use crate::component::{
    AlarmAction, AlarmTrigger, Classification, Component, ComponentKind, DateList, Descriptive,
    FreeBusy, Observance, ObservanceKind, RecurrenceDate, Status, TimeTransparency, VAlarm,
    VEvent, VFreeBusy, VJournal, VTimeZone, VTodo,
};
pub use crate::error::{ErrorKind, ErrorListener, ErrorReporter, ParseError, ValueError};
pub use crate::formatter::{Formatter, ToProperties, format_calendar};
pub use crate::property::Property;
pub use crate::recur::{DEFAULT_HORIZON_YEARS, DEFAULT_MAX_INSTANCES, ExpandOptions, Occurrences};
pub use crate::sink::{CalendarCollector, ComponentSink};
pub use crate::strictness::Strictness;
pub use crate::value::{
    DateProperty, DateTime, Duration, Frequency, Period, RecurrenceRule, UtcOffset, WeekDay,
    WeekDayNum,
};
