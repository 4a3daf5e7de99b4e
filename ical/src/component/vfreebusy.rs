// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Free/busy component (VFREEBUSY).

use crate::component::properties::utc_stamp;
use crate::component::{BuildComponent, Component, ComponentKind, Context, RawComponent};
use crate::keyword::{
    KW_ATTENDEE, KW_COMMENT, KW_CONTACT, KW_DTEND, KW_DTSTAMP, KW_DTSTART, KW_FBTYPE,
    KW_FBTYPE_BUSY, KW_FREEBUSY, KW_ORGANIZER, KW_REQUEST_STATUS, KW_UID, KW_URL,
};
use crate::property::Property;
use crate::value::{DateProperty, DateTime, Period, unescape_text};

/// Free/busy component (VFREEBUSY)
#[derive(Debug, Clone, PartialEq)]
pub struct VFreeBusy {
    /// Unique identifier, generated when the input has none
    pub uid: String,

    /// Creation time of this iCalendar object
    pub dt_stamp: Option<DateTime>,

    /// Start of the covered range
    pub dt_start: Option<DateProperty>,

    /// End of the covered range
    pub dt_end: Option<DateProperty>,

    /// Busy and free time, one entry per `FREEBUSY` property
    pub free_busy: Vec<FreeBusy>,

    /// Properties the component does not model
    pub extra: Vec<Property>,
}

/// One `FREEBUSY` property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeBusy {
    /// `FBTYPE`, uppercase, `BUSY` when absent
    pub fb_type: String,

    /// Periods covered
    pub periods: Vec<Period>,
}

impl VFreeBusy {
    /// Create an empty free/busy component with a fresh UID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            uid: uuid::Uuid::new_v4().to_string(),
            dt_stamp: None,
            dt_start: None,
            dt_end: None,
            free_busy: Vec::new(),
            extra: Vec::new(),
        }
    }

    /// Every busy period, whatever its `FBTYPE` flavour.
    pub fn busy_periods(&self) -> impl Iterator<Item = &Period> {
        self.free_busy
            .iter()
            .filter(|fb| fb.fb_type != "FREE")
            .flat_map(|fb| fb.periods.iter())
    }
}

impl Default for VFreeBusy {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for VFreeBusy {
    const KIND: ComponentKind = ComponentKind::FreeBusy;

    fn validate(&self) -> Result<(), &'static str> {
        let inverted = (self.dt_start.as_ref())
            .zip(self.dt_end.as_ref())
            .is_some_and(|(start, end)| end.value() < start.value());
        if inverted {
            return Err("DTEND is before DTSTART");
        }
        Ok(())
    }
}

const KNOWN: &[&str] = &[
    KW_ATTENDEE,
    KW_COMMENT,
    KW_CONTACT,
    KW_ORGANIZER,
    KW_REQUEST_STATUS,
    KW_URL,
];

impl BuildComponent for VFreeBusy {
    fn build(raw: RawComponent, cx: &mut Context<'_, '_>) -> Option<Self> {
        let mut uid = None;
        let mut dt_stamp = None;
        let mut dt_start = None;
        let mut dt_end = None;
        let mut free_busy = Vec::new();
        let mut extra = Vec::new();

        for prop in raw.properties {
            match prop.name() {
                KW_UID => {
                    let value = Some(unescape_text(prop.value()));
                    cx.once(&mut uid, &prop, value);
                }
                KW_DTSTAMP => {
                    let value = utc_stamp(&prop, cx);
                    cx.once(&mut dt_stamp, &prop, value);
                }
                KW_DTSTART => {
                    let result =
                        DateProperty::from_property(prop.property.clone(), cx.strictness());
                    let value = cx.check(&prop, result);
                    cx.once(&mut dt_start, &prop, value);
                }
                KW_DTEND => {
                    let result =
                        DateProperty::from_property(prop.property.clone(), cx.strictness());
                    let value = cx.check(&prop, result);
                    cx.once(&mut dt_end, &prop, value);
                }
                KW_FREEBUSY => {
                    if let Some(periods) = cx.check(&prop, Period::parse_list(prop.value())) {
                        let fb_type = prop
                            .property
                            .attribute(KW_FBTYPE)
                            .unwrap_or(KW_FBTYPE_BUSY)
                            .to_ascii_uppercase();
                        free_busy.push(FreeBusy { fb_type, periods });
                    }
                }
                _ => cx.extra(&mut extra, prop, KNOWN, Self::KIND),
            }
        }

        for child in &raw.children {
            cx.unexpected_child(child, Self::KIND);
        }

        Some(Self {
            uid: uid.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            dt_stamp,
            dt_start,
            dt_end,
            free_busy,
            extra,
        })
    }
}
