// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Alarm component (VALARM), nested in events and to-dos.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::Strictness;
use crate::component::{BuildComponent, Component, ComponentKind, Context, RawComponent};
use crate::error::{ErrorKind, ValueError};
use crate::keyword::{
    KW_ACTION, KW_ACTION_AUDIO, KW_ACTION_DISPLAY, KW_ACTION_EMAIL, KW_ATTACH, KW_ATTENDEE,
    KW_DATETIME, KW_DESCRIPTION, KW_DURATION, KW_DURATION_TYPE, KW_RELATED, KW_RELATED_END,
    KW_REPEAT, KW_SUMMARY, KW_TRIGGER, KW_VALUE,
};
use crate::property::Property;
use crate::value::{DateTime, Duration, check_value_type, parse_integer, unescape_text};

/// Alarm component (VALARM)
#[derive(Debug, Clone, PartialEq)]
pub struct VAlarm {
    /// Action to perform when the alarm triggers
    pub action: AlarmAction,

    /// When the alarm triggers
    pub trigger: AlarmTrigger,

    /// Number of additional repetitions
    pub repeat: Option<u32>,

    /// Delay between repetitions
    pub duration: Option<Duration>,

    /// Text shown by a display alarm, or the body of an email alarm
    pub description: Option<String>,

    /// Subject of an email alarm
    pub summary: Option<String>,

    /// Sound or attachment, kept as raw properties
    pub attachments: Vec<Property>,

    /// Properties the component does not model
    pub extra: Vec<Property>,
}

impl VAlarm {
    /// Create an alarm with only the required properties.
    #[must_use]
    pub const fn new(action: AlarmAction, trigger: AlarmTrigger) -> Self {
        Self {
            action,
            trigger,
            repeat: None,
            duration: None,
            description: None,
            summary: None,
            attachments: Vec::new(),
            extra: Vec::new(),
        }
    }
}

impl Component for VAlarm {
    const KIND: ComponentKind = ComponentKind::Alarm;

    fn validate(&self) -> Result<(), &'static str> {
        if self.repeat.is_some() != self.duration.is_some() {
            return Err("REPEAT and DURATION must occur together");
        }
        Ok(())
    }
}

const KNOWN: &[&str] = &[KW_ATTENDEE];

impl BuildComponent for VAlarm {
    fn build(raw: RawComponent, cx: &mut Context<'_, '_>) -> Option<Self> {
        let mut action = None;
        let mut trigger = None;
        let mut repeat = None;
        let mut duration = None;
        let mut description = None;
        let mut summary = None;
        let mut attachments = Vec::new();
        let mut extra = Vec::new();

        for prop in raw.properties {
            match prop.name() {
                KW_ACTION => {
                    let value = cx.check(&prop, prop.value().parse());
                    cx.once(&mut action, &prop, value);
                }
                KW_TRIGGER => {
                    let result = AlarmTrigger::parse(&prop.property, cx.strictness());
                    let value = cx.check(&prop, result);
                    cx.once(&mut trigger, &prop, value);
                }
                KW_REPEAT => {
                    let value = cx.check(&prop, parse_repeat(prop.value()));
                    cx.once(&mut repeat, &prop, value);
                }
                KW_DURATION => {
                    let value = cx.check(&prop, Duration::parse(prop.value()));
                    cx.once(&mut duration, &prop, value);
                }
                KW_DESCRIPTION => {
                    let value = Some(unescape_text(prop.value()));
                    cx.once(&mut description, &prop, value);
                }
                KW_SUMMARY => {
                    let value = Some(unescape_text(prop.value()));
                    cx.once(&mut summary, &prop, value);
                }
                KW_ATTACH => attachments.push(prop.property),
                _ => cx.extra(&mut extra, prop, KNOWN, Self::KIND),
            }
        }

        for child in &raw.children {
            cx.unexpected_child(child, Self::KIND);
        }

        let Some(action) = action else {
            cx.missing(raw.line, Self::KIND, KW_ACTION);
            return None;
        };
        let Some(trigger) = trigger else {
            cx.missing(raw.line, Self::KIND, KW_TRIGGER);
            return None;
        };

        let alarm = Self {
            action,
            trigger,
            repeat,
            duration,
            description,
            summary,
            attachments,
            extra,
        };
        if let Err(reason) = alarm.validate() {
            cx.strict_at(raw.line, ErrorKind::Validity, reason);
        }
        Some(alarm)
    }
}

/// Build the `VALARM` children of an event or to-do, reporting any other
/// child.
pub(crate) fn build_alarms(
    children: Vec<RawComponent>,
    parent: ComponentKind,
    cx: &mut Context<'_, '_>,
) -> Vec<VAlarm> {
    let mut alarms = Vec::new();
    for child in children {
        if child.kind() == Some(ComponentKind::Alarm) {
            alarms.extend(VAlarm::build(child, cx));
        } else {
            cx.unexpected_child(&child, parent);
        }
    }
    alarms
}

fn parse_repeat(text: &str) -> Result<u32, ValueError> {
    let n = parse_integer(text)?;
    u32::try_from(n).map_err(|_| ValueError::invalid("repeat", format!("{n} is negative")))
}

/// Alarm action (`ACTION`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmAction {
    /// Play a sound
    Audio,

    /// Show a message
    Display,

    /// Send an email
    Email,

    /// Extension or deprecated value such as `PROCEDURE`, kept uppercase
    Other(String),
}

impl FromStr for AlarmAction {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValueError::format("action", "empty action"));
        }

        Ok(match s.to_ascii_uppercase().as_str() {
            KW_ACTION_AUDIO => Self::Audio,
            KW_ACTION_DISPLAY => Self::Display,
            KW_ACTION_EMAIL => Self::Email,
            other => Self::Other(other.to_owned()),
        })
    }
}

impl AsRef<str> for AlarmAction {
    fn as_ref(&self) -> &str {
        match self {
            Self::Audio => KW_ACTION_AUDIO,
            Self::Display => KW_ACTION_DISPLAY,
            Self::Email => KW_ACTION_EMAIL,
            Self::Other(s) => s,
        }
    }
}

impl Display for AlarmAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.as_ref().fmt(f)
    }
}

/// When an alarm triggers (`TRIGGER`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmTrigger {
    /// Offset from the start, or from the end with `RELATED=END`
    Relative {
        /// Offset, zero allowed
        offset: Duration,

        /// Whether the offset is relative to the end
        related_end: bool,
    },

    /// Fixed UTC instant
    Absolute(DateTime),
}

impl AlarmTrigger {
    /// Parse a `TRIGGER` property.
    ///
    /// ## Errors
    /// Fails with the error of the duration or date-time parser, or with
    /// [`ValueError::Invalid`] for a strict-mode `VALUE` other than
    /// `DURATION` or `DATE-TIME`.
    pub fn parse(property: &Property, strictness: Strictness) -> Result<Self, ValueError> {
        check_value_type(property, &[KW_DURATION_TYPE, KW_DATETIME], strictness)?;

        let absolute = property
            .attribute(KW_VALUE)
            .is_some_and(|v| v.eq_ignore_ascii_case(KW_DATETIME));
        if absolute {
            let value = DateTime::parse(property.value())?;
            if strictness.is_strict() && !value.is_utc() {
                let reason = "absolute trigger must be UTC";
                return Err(ValueError::invalid("trigger", reason));
            }
            return Ok(Self::Absolute(value));
        }

        let offset = Duration::parse_offset(property.value())?;
        let related_end = property
            .attribute(KW_RELATED)
            .is_some_and(|v| v.eq_ignore_ascii_case(KW_RELATED_END));
        Ok(Self::Relative {
            offset,
            related_end,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::build_str;

    fn build(text: &str, strictness: Strictness) -> (Option<VAlarm>, usize) {
        let (alarm, errors) = build_str::<VAlarm>(text, strictness);
        (alarm, errors.len())
    }

    #[test]
    fn builds_display_alarm() {
        let (alarm, errors) = build(
            "BEGIN:VALARM\r\n\
             ACTION:DISPLAY\r\n\
             TRIGGER;RELATED=END:-PT15M\r\n\
             REPEAT:2\r\n\
             DURATION:PT5M\r\n\
             DESCRIPTION:Wake up\\, now\r\n\
             END:VALARM\r\n",
            Strictness::Strict,
        );
        let alarm = alarm.unwrap();
        assert_eq!(errors, 0);
        assert_eq!(alarm.action, AlarmAction::Display);
        assert_eq!(
            alarm.trigger,
            AlarmTrigger::Relative {
                offset: Duration::from_seconds(-900),
                related_end: true
            }
        );
        assert_eq!(alarm.repeat, Some(2));
        assert_eq!(alarm.description.as_deref(), Some("Wake up, now"));
        assert!(alarm.is_valid());
    }

    #[test]
    fn zero_and_absolute_triggers() {
        let (alarm, _) = build(
            "BEGIN:VALARM\r\nACTION:AUDIO\r\nTRIGGER:PT0S\r\nEND:VALARM\r\n",
            Strictness::Strict,
        );
        assert!(matches!(
            alarm.unwrap().trigger,
            AlarmTrigger::Relative {
                related_end: false,
                ..
            }
        ));

        let (alarm, _) = build(
            "BEGIN:VALARM\r\nACTION:AUDIO\r\nTRIGGER;VALUE=DATE-TIME:19970317T133000Z\r\nEND:VALARM\r\n",
            Strictness::Strict,
        );
        assert_eq!(
            alarm.unwrap().trigger,
            AlarmTrigger::Absolute(DateTime::date_time(1997, 3, 17, 13, 30, 0, true).unwrap())
        );
    }

    #[test]
    fn missing_required_properties_drop_the_alarm() {
        #[rustfmt::skip]
        let fail_cases = [
            "BEGIN:VALARM\r\nTRIGGER:-PT5M\r\nEND:VALARM\r\n",
            "BEGIN:VALARM\r\nACTION:DISPLAY\r\nEND:VALARM\r\n",
            "BEGIN:VALARM\r\nACTION:DISPLAY\r\nTRIGGER:soon\r\nEND:VALARM\r\n",
        ];
        for src in fail_cases {
            for strictness in [Strictness::Strict, Strictness::Loose] {
                let (alarm, errors) = build(src, strictness);
                assert!(alarm.is_none(), "{src}");
                assert!(errors >= 1, "{src}");
            }
        }
    }

    #[test]
    fn unpaired_repeat_is_strict_error() {
        let src = "BEGIN:VALARM\r\nACTION:DISPLAY\r\nTRIGGER:-PT5M\r\nREPEAT:3\r\nEND:VALARM\r\n";

        let (alarm, errors) = build(src, Strictness::Strict);
        assert_eq!(errors, 1);
        assert!(!alarm.unwrap().is_valid());

        let (alarm, errors) = build(src, Strictness::Loose);
        assert_eq!(errors, 0);
        assert!(alarm.is_some());
    }

    #[test]
    fn unknown_properties_depend_on_strictness() {
        let src = "BEGIN:VALARM\r\nACTION:DISPLAY\r\nTRIGGER:-PT5M\r\nX-WR-ALARMUID:1\r\nFOO:bar\r\nEND:VALARM\r\n";

        let (alarm, errors) = build(src, Strictness::Strict);
        assert_eq!(errors, 1);
        assert_eq!(alarm.unwrap().extra.len(), 1);

        let (alarm, errors) = build(src, Strictness::Loose);
        assert_eq!(errors, 0);
        assert_eq!(alarm.unwrap().extra.len(), 2);
    }
}
