// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Period value type parser as defined in RFC 5545 Section 3.3.9.

use std::fmt::{self, Display};

use crate::error::ValueError;
use crate::value::datetime::DateTime;
use crate::value::duration::Duration;

/// Period of Time value defined in RFC 5545 Section 3.3.9
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Explicit period with start and end date-time
    ///
    /// Format: `date-time "/" date-time`
    Explicit {
        /// Start date-time
        start: DateTime,

        /// End date-time
        end: DateTime,
    },

    /// Period with start date-time and duration
    ///
    /// Format: `date-time "/" dur-value`
    Duration {
        /// Start date-time
        start: DateTime,

        /// Duration
        duration: Duration,
    },
}

impl Period {
    /// Parse `start/end` or `start/duration`.
    ///
    /// ```txt
    /// period     = period-explicit / period-start
    ///
    /// period-explicit = date-time "/" date-time
    /// ; The start MUST be before the end.
    ///
    /// period-start = date-time "/" dur-value
    /// ; The duration MUST be positive.
    /// ```
    ///
    /// ## Errors
    /// Returns [`ValueError::Format`] when the `/` separator is missing or a
    /// part does not parse, and [`ValueError::Invalid`] for a date-only start,
    /// an end not after the start, or a negative duration.
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let Some((start, end)) = text.trim().split_once('/') else {
            let reason = format!("`{text}`: missing `/`");
            return Err(ValueError::format("period", reason));
        };

        let start = DateTime::parse(start)?;
        if start.is_date_only() {
            return Err(ValueError::invalid("period", "start must be a date-time"));
        }

        if end.starts_with(['P', '+', '-']) {
            let duration = Duration::parse(end)?;
            if duration.seconds() < 0 {
                return Err(ValueError::invalid("period", "duration must be positive"));
            }
            Ok(Self::Duration { start, duration })
        } else {
            let end = DateTime::parse(end)?;
            if end.is_date_only() || end <= start {
                return Err(ValueError::invalid(
                    "period",
                    format!("end {end} must be a date-time after start {start}"),
                ));
            }
            Ok(Self::Explicit { start, end })
        }
    }

    /// Parse a comma-separated list of periods.
    ///
    /// ## Errors
    /// Fails with the error of the first element that does not parse.
    pub fn parse_list(text: &str) -> Result<Vec<Self>, ValueError> {
        text.split(',').map(Self::parse).collect()
    }

    /// Start of the period.
    #[must_use]
    pub const fn start(&self) -> DateTime {
        match self {
            Self::Explicit { start, .. } | Self::Duration { start, .. } => *start,
        }
    }

    /// End of the period, computing it from the duration if needed.
    #[must_use]
    pub fn end(&self) -> Option<DateTime> {
        match self {
            Self::Explicit { end, .. } => Some(*end),
            Self::Duration { start, duration } => start
                .civil()
                .checked_add(duration.signed_duration())
                .ok()
                .map(|end| DateTime::from_civil(end, false, start.is_utc())),
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit { start, end } => write!(f, "{start}/{end}"),
            Self::Duration { start, duration } => write!(f, "{start}/{duration}"),
        }
    }
}
