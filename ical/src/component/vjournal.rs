// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Journal component (VJOURNAL).

use crate::component::{
    BuildComponent, Component, ComponentKind, Context, Descriptive, DescriptiveBuilder,
    RawComponent,
};
use crate::keyword::{
    KW_ATTENDEE, KW_COMMENT, KW_CONTACT, KW_DESCRIPTION, KW_ORGANIZER, KW_RECURRENCE_ID,
    KW_RELATED_TO, KW_REQUEST_STATUS, KW_URL,
};
use crate::value::unescape_text;

/// Journal component (VJOURNAL)
///
/// Unlike events and to-dos a journal may carry several `DESCRIPTION`s, so
/// they are kept in [`VJournal::descriptions`] and
/// [`Descriptive::description`] stays empty.
#[derive(Debug, Clone, PartialEq)]
pub struct VJournal {
    /// Identity, summary, start and recurrence
    pub descriptive: Descriptive,

    /// Journal entries, in order
    pub descriptions: Vec<String>,
}

impl VJournal {
    /// Create a journal around a set of descriptive properties.
    #[must_use]
    pub const fn new(descriptive: Descriptive) -> Self {
        Self {
            descriptive,
            descriptions: Vec::new(),
        }
    }

    /// The first entry.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.descriptions.first().map(String::as_str)
    }
}

impl Component for VJournal {
    const KIND: ComponentKind = ComponentKind::Journal;

    fn validate(&self) -> Result<(), &'static str> {
        Ok(())
    }
}

const KNOWN: &[&str] = &[
    KW_ATTENDEE,
    KW_COMMENT,
    KW_CONTACT,
    KW_ORGANIZER,
    KW_RECURRENCE_ID,
    KW_RELATED_TO,
    KW_REQUEST_STATUS,
    KW_URL,
];

impl BuildComponent for VJournal {
    fn build(raw: RawComponent, cx: &mut Context<'_, '_>) -> Option<Self> {
        let mut common = DescriptiveBuilder::new(Self::KIND);
        let mut descriptions = Vec::new();
        let mut extra = Vec::new();

        for prop in raw.properties {
            if prop.name() == KW_DESCRIPTION {
                descriptions.push(unescape_text(prop.value()));
                continue;
            }
            if let Some(prop) = common.accept(prop, cx) {
                cx.extra(&mut extra, prop, KNOWN, Self::KIND);
            }
        }

        for child in &raw.children {
            cx.unexpected_child(child, Self::KIND);
        }

        Some(Self {
            descriptive: common.finish(extra),
            descriptions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Strictness;
    use crate::component::{Status, build_str};

    #[test]
    fn keeps_every_description() {
        let (journal, errors) = build_str::<VJournal>(
            "BEGIN:VJOURNAL\r\n\
             UID:19970901T130000Z-123405@example.com\r\n\
             DTSTAMP:19970901T130000Z\r\n\
             DTSTART;VALUE=DATE:19970317\r\n\
             SUMMARY:Staff meeting minutes\r\n\
             DESCRIPTION:1. Staff meeting: Participants include Joe\\, Lisa\\, and Bob.\r\n\
             DESCRIPTION:2. Telephone conference\r\n\
             STATUS:FINAL\r\n\
             END:VJOURNAL\r\n",
            Strictness::Strict,
        );
        let journal = journal.unwrap();
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(journal.descriptions.len(), 2);
        assert_eq!(
            journal.description(),
            Some("1. Staff meeting: Participants include Joe, Lisa, and Bob.")
        );
        assert_eq!(journal.descriptive.description, None);
        assert_eq!(journal.descriptive.status, Some(Status::Final));
        assert!(journal.is_valid());
    }

    #[test]
    fn empty_journal_is_valid() {
        let (journal, errors) =
            build_str::<VJournal>("BEGIN:VJOURNAL\r\nEND:VJOURNAL\r\n", Strictness::Strict);
        assert!(errors.is_empty());
        assert!(journal.unwrap().is_valid());
    }

    #[test]
    fn alarms_are_not_allowed() {
        let src = "BEGIN:VJOURNAL\r\nBEGIN:VALARM\r\nACTION:AUDIO\r\nTRIGGER:PT0S\r\nEND:VALARM\r\nEND:VJOURNAL\r\n";
        let (_, errors) = build_str::<VJournal>(src, Strictness::Strict);
        assert_eq!(errors.len(), 1);
        let (_, errors) = build_str::<VJournal>(src, Strictness::Loose);
        assert!(errors.is_empty());
    }
}
