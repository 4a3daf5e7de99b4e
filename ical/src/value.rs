// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Typed property values as defined in RFC 5545 Section 3.3.
//!
//! Each constructor takes the raw value string of a [`crate::Property`] and
//! fails with a [`crate::ValueError`] that tells malformed text apart from an
//! impossible value.

mod datetime;
mod duration;
mod numeric;
mod period;
mod rrule;
mod text;

pub use datetime::{DateProperty, DateTime, UtcOffset};
pub(crate) use datetime::check_value_type;
pub use duration::Duration;
pub use numeric::{parse_float, parse_integer};
pub use period::Period;
pub use rrule::{Frequency, RecurrenceRule, WeekDay, WeekDayNum};
pub use text::{escape_text, join_text_list, split_text_list, unescape_text};
