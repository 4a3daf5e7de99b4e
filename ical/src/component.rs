// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Typed calendar components.
//!
//! Components are built in two steps. The buffered lines of one
//! `BEGIN`/`END` block are first parsed into a [`RawComponent`] tree of
//! properties, then each typed component consumes the properties it knows.
//! A property whose value does not parse is reported and left out; it never
//! discards the rest of the component.

mod properties;
mod valarm;
mod vevent;
mod vfreebusy;
mod vjournal;
mod vtimezone;
mod vtodo;

use std::fmt::{self, Display};

pub use properties::{Classification, DateList, Descriptive, RecurrenceDate, Status};
pub use valarm::{AlarmAction, AlarmTrigger, VAlarm};
pub use vevent::{TimeTransparency, VEvent};
pub use vfreebusy::{FreeBusy, VFreeBusy};
pub use vjournal::VJournal;
pub use vtimezone::{Observance, ObservanceKind, VTimeZone};
pub use vtodo::VTodo;

pub(crate) use properties::DescriptiveBuilder;

use crate::Strictness;
use crate::error::{ErrorKind, ErrorReporter, ParseError, ValueError};
use crate::keyword::{
    KW_BEGIN, KW_DAYLIGHT, KW_END, KW_STANDARD, KW_VALARM, KW_VCALENDAR, KW_VEVENT, KW_VFREEBUSY,
    KW_VJOURNAL, KW_VTIMEZONE, KW_VTODO,
};
use crate::property::Property;
use crate::syntax::LogicalLine;

/// Kinds of component this crate models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(missing_docs)]
pub enum ComponentKind {
    Calendar,
    Event,
    Todo,
    Journal,
    TimeZone,
    FreeBusy,
    Alarm,
    Standard,
    Daylight,
}

impl ComponentKind {
    /// Look up a component name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name.trim().to_ascii_uppercase().as_str() {
            KW_VCALENDAR => Self::Calendar,
            KW_VEVENT => Self::Event,
            KW_VTODO => Self::Todo,
            KW_VJOURNAL => Self::Journal,
            KW_VTIMEZONE => Self::TimeZone,
            KW_VFREEBUSY => Self::FreeBusy,
            KW_VALARM => Self::Alarm,
            KW_STANDARD => Self::Standard,
            KW_DAYLIGHT => Self::Daylight,
            _ => return None,
        };
        Some(kind)
    }

    /// The component name as written in `BEGIN`/`END`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Calendar => KW_VCALENDAR,
            Self::Event => KW_VEVENT,
            Self::Todo => KW_VTODO,
            Self::Journal => KW_VJOURNAL,
            Self::TimeZone => KW_VTIMEZONE,
            Self::FreeBusy => KW_VFREEBUSY,
            Self::Alarm => KW_VALARM,
            Self::Standard => KW_STANDARD,
            Self::Daylight => KW_DAYLIGHT,
        }
    }

    /// Whether the component may appear directly inside `VCALENDAR`.
    #[must_use]
    pub const fn is_top_level(self) -> bool {
        matches!(
            self,
            Self::Event | Self::Todo | Self::Journal | Self::TimeZone | Self::FreeBusy
        )
    }
}

impl Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Behaviour shared by every typed component.
pub trait Component {
    /// The kind of this component.
    const KIND: ComponentKind;

    /// Check the minimum requirements of the component, returning the first
    /// violation.
    ///
    /// ## Errors
    /// A short description of what is missing or inconsistent.
    fn validate(&self) -> Result<(), &'static str>;

    /// Whether [`Component::validate`] passes.
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Construction of a component from its raw tree.
///
/// Returns `None` when a required property is missing; the builder reports
/// that before returning.
pub(crate) trait BuildComponent: Component + Sized {
    fn build(raw: RawComponent, cx: &mut Context<'_, '_>) -> Option<Self>;
}

/// A property together with the line it came from.
#[derive(Debug, Clone)]
pub(crate) struct RawProperty {
    pub line: usize,
    pub text: String,
    pub property: Property,
}

impl RawProperty {
    pub fn name(&self) -> &str {
        self.property.name()
    }

    pub fn value(&self) -> &str {
        self.property.value()
    }
}

/// One `BEGIN`/`END` block with its properties and nested blocks.
#[derive(Debug, Clone)]
pub(crate) struct RawComponent {
    pub name: String,
    pub line: usize,
    pub properties: Vec<RawProperty>,
    pub children: Vec<RawComponent>,
}

impl RawComponent {
    fn new(name: &str, line: usize) -> Self {
        Self {
            name: name.trim().to_ascii_uppercase(),
            line,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> Option<ComponentKind> {
        ComponentKind::from_name(&self.name)
    }

    /// Parse the buffered lines of one block, starting with its `BEGIN`.
    ///
    /// Blocks left open at the end of the buffer are closed implicitly.
    pub fn from_lines(lines: &[LogicalLine], reporter: &mut ErrorReporter<'_>) -> Option<Self> {
        let strictness = reporter.strictness();
        let mut stack: Vec<RawComponent> = Vec::new();
        let mut root = None;

        for line in lines {
            if line.is_blank() {
                reporter.structural(line.number, "blank line inside component", "");
                continue;
            }

            let property = match Property::parse(line, strictness) {
                Ok(property) => property,
                Err(err) => {
                    reporter.value(line.number, &line.text, &err);
                    continue;
                }
            };

            match property.name() {
                KW_BEGIN => stack.push(RawComponent::new(property.value(), line.number)),
                KW_END => {
                    let name = property.value().trim();
                    let Some(depth) = stack
                        .iter()
                        .rposition(|open| open.name.eq_ignore_ascii_case(name))
                    else {
                        reporter.structural(
                            line.number,
                            format!("unexpected END:{name}"),
                            &line.text,
                        );
                        continue;
                    };

                    // an END of an enclosing block closes everything nested in it
                    while stack.len() > depth + 1 {
                        if let Some(open) = stack.pop() {
                            let message = format!("missing END:{}", open.name);
                            reporter.structural(open.line, message, "");
                            if let Some(parent) = stack.last_mut() {
                                parent.children.push(open);
                            }
                        }
                    }

                    if let Some(done) = stack.pop() {
                        match stack.last_mut() {
                            Some(parent) => parent.children.push(done),
                            None => {
                                root = Some(done);
                                break;
                            }
                        }
                    }
                }
                _ => match stack.last_mut() {
                    Some(top) => top.properties.push(RawProperty {
                        line: line.number,
                        text: line.text.clone(),
                        property,
                    }),
                    None => {
                        let message = "property outside of a component";
                        reporter.structural(line.number, message, &line.text);
                    }
                },
            }
        }

        while let Some(open) = stack.pop() {
            reporter.structural(open.line, format!("missing END:{}", open.name), "");
            match stack.last_mut() {
                Some(parent) => parent.children.push(open),
                None => root = Some(open),
            }
        }
        root
    }
}

/// Error sink and strictness handed to component builders.
pub(crate) struct Context<'r, 'a> {
    reporter: &'r mut ErrorReporter<'a>,
}

impl<'r, 'a> Context<'r, 'a> {
    pub fn new(reporter: &'r mut ErrorReporter<'a>) -> Self {
        Self { reporter }
    }

    pub fn strictness(&self) -> Strictness {
        self.reporter.strictness()
    }

    /// Unwrap a value constructor result, reporting the failure.
    pub fn check<T>(&mut self, prop: &RawProperty, result: Result<T, ValueError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.reporter.value(prop.line, &prop.text, &err);
                None
            }
        }
    }

    /// Report a violation that only counts in strict mode.
    pub fn strict(
        &mut self,
        prop: &RawProperty,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> bool {
        self.reporter.strict(prop.line, kind, message, &prop.text)
    }

    /// Report a violation of the whole component, strict mode only.
    pub fn strict_at(&mut self, line: usize, kind: ErrorKind, message: impl Into<String>) -> bool {
        self.reporter.strict(line, kind, message, "")
    }

    /// Report a structural violation at a line, strict mode only.
    pub fn structural(&mut self, line: usize, message: impl Into<String>) {
        self.reporter.structural(line, message, "");
    }

    /// Report a validity error in both modes.
    pub fn invalid(&mut self, line: usize, message: impl Into<String>) {
        self.reporter
            .report(ParseError::new(line, ErrorKind::Validity, message, ""));
    }

    /// Store a value for a property that may occur only once.
    ///
    /// A repeated property is a strict-mode error; the first value is kept.
    pub fn once<T>(&mut self, slot: &mut Option<T>, prop: &RawProperty, value: Option<T>) {
        if slot.is_some() {
            self.strict(
                prop,
                ErrorKind::Validity,
                format!("{} may occur only once", prop.name()),
            );
            return;
        }
        if value.is_some() {
            *slot = value;
        }
    }

    /// Keep a property the component does not model.
    ///
    /// Extension (`X-`) properties and the names in `known` are kept as-is.
    /// Anything else is a strict-mode error and is then dropped.
    pub fn extra(
        &mut self,
        extra: &mut Vec<Property>,
        prop: RawProperty,
        known: &[&str],
        kind: ComponentKind,
    ) {
        let name = prop.name();
        let allowed = name.starts_with("X-") || known.contains(&name);
        if !allowed
            && self.strict(
                &prop,
                ErrorKind::Validity,
                format!("property {name} is not allowed in {kind}"),
            )
        {
            return;
        }
        extra.push(prop.property);
    }

    /// Report a child component the parent does not allow.
    pub fn unexpected_child(&mut self, child: &RawComponent, parent: ComponentKind) {
        self.structural(
            child.line,
            format!("component {} is not allowed in {parent}", child.name),
        );
    }

    /// Report a missing required property; the component is dropped.
    pub fn missing(&mut self, raw_line: usize, kind: ComponentKind, property: &str) {
        let message = format!("{kind} is missing required property {property}");
        self.invalid(raw_line, message);
    }
}

/// Build one component from its wire text.
#[cfg(test)]
pub(crate) fn build_str<T: BuildComponent>(
    text: &str,
    strictness: Strictness,
) -> (Option<T>, Vec<ParseError>) {
    let lines = crate::syntax::unfold(text);
    let mut reporter = ErrorReporter::new(strictness);
    let built = RawComponent::from_lines(&lines, &mut reporter)
        .and_then(|raw| T::build(raw, &mut Context::new(&mut reporter)));
    (built, reporter.into_errors())
}
