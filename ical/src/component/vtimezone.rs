// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Time zone component (VTIMEZONE) with its STANDARD and DAYLIGHT
//! observances.
//!
//! Observances are stored as written; they are never resolved against a
//! time zone database.

use crate::component::properties::utc_stamp;
use crate::component::{
    BuildComponent, Component, ComponentKind, Context, DateList, RawComponent,
};
use crate::error::ErrorKind;
use crate::keyword::{
    KW_COMMENT, KW_DTSTART, KW_LAST_MODIFIED, KW_RDATE, KW_RRULE, KW_TZID, KW_TZNAME,
    KW_TZOFFSETFROM, KW_TZOFFSETTO, KW_TZURL,
};
use crate::property::Property;
use crate::value::{DateTime, RecurrenceRule, UtcOffset, unescape_text};

/// Time zone component (VTIMEZONE)
#[derive(Debug, Clone, PartialEq)]
pub struct VTimeZone {
    /// Time zone identifier referenced by `TZID` attributes
    pub tz_id: String,

    /// Last revision time
    pub last_modified: Option<DateTime>,

    /// Location of a published definition
    pub tz_url: Option<String>,

    /// Standard and daylight observances, in order
    pub observances: Vec<Observance>,

    /// Properties the component does not model
    pub extra: Vec<Property>,
}

impl VTimeZone {
    /// Create a time zone without observances.
    #[must_use]
    pub fn new(tz_id: impl Into<String>) -> Self {
        Self {
            tz_id: tz_id.into(),
            last_modified: None,
            tz_url: None,
            observances: Vec::new(),
            extra: Vec::new(),
        }
    }
}

impl Component for VTimeZone {
    const KIND: ComponentKind = ComponentKind::TimeZone;

    fn validate(&self) -> Result<(), &'static str> {
        if self.tz_id.trim().is_empty() {
            return Err("TZID is empty");
        }
        if self.observances.is_empty() {
            return Err("VTIMEZONE needs a STANDARD or DAYLIGHT observance");
        }
        Ok(())
    }
}

impl BuildComponent for VTimeZone {
    fn build(raw: RawComponent, cx: &mut Context<'_, '_>) -> Option<Self> {
        let mut tz_id = None;
        let mut last_modified = None;
        let mut tz_url = None;
        let mut extra = Vec::new();

        for prop in raw.properties {
            match prop.name() {
                KW_TZID => {
                    let value = Some(prop.value().trim().to_owned());
                    cx.once(&mut tz_id, &prop, value);
                }
                KW_LAST_MODIFIED => {
                    let value = utc_stamp(&prop, cx);
                    cx.once(&mut last_modified, &prop, value);
                }
                KW_TZURL => {
                    let value = Some(prop.value().trim().to_owned());
                    cx.once(&mut tz_url, &prop, value);
                }
                _ => cx.extra(&mut extra, prop, &[], Self::KIND),
            }
        }

        let mut observances = Vec::new();
        for child in raw.children {
            match child.kind() {
                Some(kind @ (ComponentKind::Standard | ComponentKind::Daylight)) => {
                    let kind = if kind == ComponentKind::Standard {
                        ObservanceKind::Standard
                    } else {
                        ObservanceKind::Daylight
                    };
                    observances.extend(Observance::build(child, kind, cx));
                }
                _ => cx.unexpected_child(&child, Self::KIND),
            }
        }

        let Some(tz_id) = tz_id else {
            cx.missing(raw.line, Self::KIND, KW_TZID);
            return None;
        };

        Some(Self {
            tz_id,
            last_modified,
            tz_url,
            observances,
            extra,
        })
    }
}

/// Whether an observance describes standard or daylight saving time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObservanceKind {
    /// `STANDARD`
    Standard,

    /// `DAYLIGHT`
    Daylight,
}

impl ObservanceKind {
    /// The matching component kind.
    #[must_use]
    pub const fn component(self) -> ComponentKind {
        match self {
            Self::Standard => ComponentKind::Standard,
            Self::Daylight => ComponentKind::Daylight,
        }
    }
}

/// A `STANDARD` or `DAYLIGHT` sub-component.
#[derive(Debug, Clone, PartialEq)]
pub struct Observance {
    /// Standard or daylight
    pub kind: ObservanceKind,

    /// First onset, in local time
    pub dt_start: DateTime,

    /// Offset in use before the onset
    pub offset_from: UtcOffset,

    /// Offset in use after the onset
    pub offset_to: UtcOffset,

    /// Customary names, e.g. `CET`
    pub names: Vec<String>,

    /// Rule for later onsets
    pub rrule: Option<RecurrenceRule>,

    /// Additional onsets
    pub rdates: Vec<DateList>,

    /// Properties the component does not model
    pub extra: Vec<Property>,
}

impl Observance {
    fn build(raw: RawComponent, kind: ObservanceKind, cx: &mut Context<'_, '_>) -> Option<Self> {
        let component = kind.component();
        let mut dt_start = None;
        let mut offset_from = None;
        let mut offset_to = None;
        let mut names = Vec::new();
        let mut rrule = None;
        let mut rdates = Vec::new();
        let mut extra = Vec::new();

        for prop in raw.properties {
            match prop.name() {
                KW_DTSTART => {
                    let value = cx.check(&prop, DateTime::parse(prop.value()));
                    if value.is_some_and(|v| v.is_utc() || v.is_date_only()) {
                        cx.strict(
                            &prop,
                            ErrorKind::Validity,
                            "observance DTSTART must be a local date-time",
                        );
                    }
                    cx.once(&mut dt_start, &prop, value);
                }
                KW_TZOFFSETFROM => {
                    let value = cx.check(&prop, UtcOffset::parse(prop.value()));
                    cx.once(&mut offset_from, &prop, value);
                }
                KW_TZOFFSETTO => {
                    let value = cx.check(&prop, UtcOffset::parse(prop.value()));
                    cx.once(&mut offset_to, &prop, value);
                }
                KW_TZNAME => names.push(unescape_text(prop.value())),
                KW_RRULE => {
                    let result = RecurrenceRule::parse(prop.value(), cx.strictness());
                    let value = cx.check(&prop, result);
                    cx.once(&mut rrule, &prop, value);
                }
                KW_RDATE => {
                    let result = DateList::parse(prop.property.clone(), true, cx.strictness());
                    if let Some(list) = cx.check(&prop, result) {
                        rdates.push(list);
                    }
                }
                _ => cx.extra(&mut extra, prop, &[KW_COMMENT], component),
            }
        }

        for child in &raw.children {
            cx.unexpected_child(child, component);
        }

        let required = [
            (dt_start.is_none(), KW_DTSTART),
            (offset_from.is_none(), KW_TZOFFSETFROM),
            (offset_to.is_none(), KW_TZOFFSETTO),
        ];
        for (missing, name) in required {
            if missing {
                cx.missing(raw.line, component, name);
            }
        }

        Some(Self {
            kind,
            dt_start: dt_start?,
            offset_from: offset_from?,
            offset_to: offset_to?,
            names,
            rrule,
            rdates,
            extra,
        })
    }
}
