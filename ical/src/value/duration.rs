// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Duration value type parser as defined in RFC 5545 Section 3.3.6.

use std::fmt::{self, Display};

use chumsky::prelude::*;

use crate::error::ValueError;
use crate::value::datetime::describe;

const SECONDS_PER_WEEK: i64 = 7 * SECONDS_PER_DAY;
const SECONDS_PER_DAY: i64 = 24 * 3600;

/// Duration value, stored as a signed number of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration {
    seconds: i64,
}

impl Duration {
    /// Create a duration from a signed number of seconds.
    #[must_use]
    pub const fn from_seconds(seconds: i64) -> Self {
        Self { seconds }
    }

    /// Parse a duration such as `P15DT5H0M20S`, `-PT15M` or `P7W`.
    ///
    /// ## Errors
    /// Returns [`ValueError::Format`] if the leading `P` is missing, a unit
    /// letter is unknown or misplaced, digits are left without a unit, or the
    /// total is zero.
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let duration = Self::parse_offset(text)?;
        if duration.seconds == 0 {
            return Err(ValueError::format(
                "duration",
                format!("`{text}`: no duration found"),
            ));
        }
        Ok(duration)
    }

    /// Parse a duration used as an offset, where zero (`PT0S`) is allowed,
    /// e.g. an alarm `TRIGGER`.
    ///
    /// ## Errors
    /// Same as [`Duration::parse`], except that a zero total is accepted.
    pub fn parse_offset(text: &str) -> Result<Self, ValueError> {
        let seconds = duration()
            .parse(text.trim())
            .into_result()
            .map_err(|errs| ValueError::format("duration", describe(text, &errs)))?;
        Ok(Self { seconds })
    }

    /// Signed number of seconds.
    #[must_use]
    pub const fn seconds(self) -> i64 {
        self.seconds
    }

    /// The duration as a `jiff` signed duration.
    #[must_use]
    pub const fn signed_duration(self) -> jiff::SignedDuration {
        jiff::SignedDuration::from_secs(self.seconds)
    }
}

/// Canonical form: whole weeks as `nW`, otherwise days and a time part.
impl Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.seconds < 0 {
            write!(f, "-")?;
        }
        write!(f, "P")?;

        let total = self.seconds.unsigned_abs();
        let week = SECONDS_PER_WEEK.unsigned_abs();
        if total != 0 && total % week == 0 {
            return write!(f, "{}W", total / week);
        }

        let day = SECONDS_PER_DAY.unsigned_abs();
        let (days, rest) = (total / day, total % day);
        if days > 0 {
            write!(f, "{days}D")?;
        }
        if rest > 0 || days == 0 {
            write!(f, "T")?;
            let (h, m, s) = (rest / 3600, rest / 60 % 60, rest % 60);
            if h > 0 {
                write!(f, "{h}H")?;
            }
            if m > 0 {
                write!(f, "{m}M")?;
            }
            if s > 0 || rest == 0 {
                write!(f, "{s}S")?;
            }
        }
        Ok(())
    }
}

/// Format Definition:  This value type is defined by the following notation:
///
/// ```txt
/// dur-value  = (["+"] / "-") "P" *(dur-week / dur-day) ["T" 1*(dur-hour / dur-minute / dur-second)]
///
/// dur-week   = 1*DIGIT "W"
/// dur-day    = 1*DIGIT "D"
/// dur-hour   = 1*DIGIT "H"
/// dur-minute = 1*DIGIT "M"
/// dur-second = 1*DIGIT "S"
/// ```
///
/// This accepts the RFC grammar plus combinations such as `P1W2D` that some
/// producers emit.
fn duration<'src>() -> impl Parser<'src, &'src str, i64, extra::Err<Rich<'src, char>>> {
    let date = choice((unit('W', SECONDS_PER_WEEK), unit('D', SECONDS_PER_DAY)))
        .repeated()
        .collect::<Vec<_>>();

    let time = just('T')
        .ignore_then(
            choice((unit('H', 3600), unit('M', 60), unit('S', 1)))
                .repeated()
                .at_least(1)
                .collect::<Vec<_>>(),
        )
        .or_not()
        .map(Option::unwrap_or_default);

    let sign = select! { c @ ('+' | '-') => c }
        .or_not()
        .map(|sign| if matches!(sign, Some('-')) { -1 } else { 1 });

    sign.then_ignore(just('P'))
        .then(date)
        .then(time)
        .try_map(|((sign, date), time), span| {
            date.into_iter()
                .chain(time)
                .try_fold(0_i64, |acc, n| acc.checked_add(n))
                .map(|total| sign * total)
                .ok_or_else(|| Rich::custom(span, "duration out of range"))
        })
}

/// `1*DIGIT` followed by the unit letter, scaled to seconds.
fn unit<'src>(
    letter: char,
    seconds: i64,
) -> impl Parser<'src, &'src str, i64, extra::Err<Rich<'src, char>>> + Clone {
    text::digits(10)
        .at_least(1)
        .to_slice()
        .then_ignore(just(letter))
        .try_map(move |digits: &str, span| {
            lexical::parse::<i64, _>(digits)
                .ok()
                .and_then(|n| n.checked_mul(seconds))
                .ok_or_else(|| Rich::custom(span, "duration out of range"))
        })
}
