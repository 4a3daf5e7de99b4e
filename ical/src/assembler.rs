// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Streaming component assembly.
//!
//! The [`Assembler`] consumes logical lines one at a time:
//!
//! ```txt
//! None --BEGIN:VCALENDAR--> Calendar --BEGIN:<TYPE>--> Component(TYPE)
//!                            ^   |                          |
//!                            |   +--END:VCALENDAR--> Done   |
//!                            +--------END:<TYPE>------------+
//! ```
//!
//! Lines of a component are buffered until its `END`, then the component is
//! built, validated and handed to every registered [`ComponentSink`].

use std::io::{self, BufRead};

use tracing::{debug, trace};

use crate::Strictness;
use crate::calendar::{CalendarHeader, ICalendar};
use crate::component::{
    BuildComponent, Component, ComponentKind, Context, RawComponent, VEvent, VFreeBusy, VJournal,
    VTimeZone, VTodo,
};
use crate::error::{ErrorKind, ErrorListener, ErrorReporter, ParseError};
use crate::keyword::{
    KW_BEGIN, KW_CALSCALE, KW_CALSCALE_GREGORIAN, KW_END, KW_METHOD, KW_PRODID, KW_VCALENDAR,
    KW_VERSION, KW_VERSION_2_0,
};
use crate::property::Property;
use crate::sink::{CalendarCollector, ComponentSink};
use crate::syntax::{LogicalLine, LogicalLines};

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    None,
    Calendar,
    Component(ComponentKind),
    Skipping { name: String, depth: usize },
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker<'l> {
    Begin(&'l str),
    End(&'l str),
}

impl<'l> Marker<'l> {
    /// Recognize `BEGIN:` and `END:` lines without a full property parse.
    fn of(line: &'l LogicalLine) -> Option<Self> {
        let (head, value) = line.text.split_once(':')?;
        let name = head.split(';').next().unwrap_or_default().trim();
        let value = value.trim();
        if name.eq_ignore_ascii_case(KW_BEGIN) {
            Some(Self::Begin(value))
        } else if name.eq_ignore_ascii_case(KW_END) {
            Some(Self::End(value))
        } else {
            None
        }
    }
}

/// Line-by-line state machine that turns logical lines into components.
pub struct Assembler<'a> {
    state: State,
    buffer: Vec<LogicalLine>,
    open: Vec<String>,
    header: CalendarHeader,
    reporter: ErrorReporter<'a>,
    sinks: Vec<Box<dyn ComponentSink + 'a>>,
    seen_calendar: bool,
    bare_line_feed: bool,
    last_line: usize,
}

impl<'a> Assembler<'a> {
    /// Create an assembler without sinks or listeners.
    #[must_use]
    pub fn new(strictness: Strictness) -> Self {
        Self {
            state: State::None,
            buffer: Vec::new(),
            open: Vec::new(),
            header: CalendarHeader::default(),
            reporter: ErrorReporter::new(strictness),
            sinks: Vec::new(),
            seen_calendar: false,
            bare_line_feed: false,
            last_line: 0,
        }
    }

    /// Register a sink; every valid component is handed to every sink in
    /// registration order.
    pub fn add_sink(&mut self, sink: impl ComponentSink + 'a) {
        self.sinks.push(Box::new(sink));
    }

    /// Register an error listener.
    pub fn add_listener(&mut self, listener: impl ErrorListener + 'a) {
        self.reporter.add_listener(listener);
    }

    /// Errors reported so far.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        self.reporter.errors()
    }

    /// Whether `END:VCALENDAR` has been seen.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Consume one logical line.
    ///
    /// Bare line feeds are a strict-mode format error, reported once per
    /// stream at the first line that has one.
    pub fn feed(&mut self, line: LogicalLine) {
        self.last_line = line.number;
        if line.bare_line_feed && !self.bare_line_feed {
            self.bare_line_feed = true;
            self.reporter
                .strict(line.number, ErrorKind::Format, "bare line feed", &line.text);
        }

        match self.state.clone() {
            State::None => self.feed_none(&line),
            State::Calendar => self.feed_calendar(line),
            State::Component(kind) => self.feed_component(kind, line),
            State::Skipping { name, depth } => self.feed_skipping(name, depth, &line),
            State::Done => {
                if !line.is_blank() {
                    self.reporter.structural(
                        line.number,
                        "content after END:VCALENDAR",
                        &line.text,
                    );
                }
            }
        }
    }

    fn transition(&mut self, state: State, line: usize) {
        trace!(from = ?self.state, to = ?state, line, "assembler transition");
        self.state = state;
    }

    fn feed_none(&mut self, line: &LogicalLine) {
        if line.is_blank() {
            return;
        }

        match Marker::of(line) {
            Some(Marker::Begin(name)) if name.eq_ignore_ascii_case(KW_VCALENDAR) => {
                self.seen_calendar = true;
                self.transition(State::Calendar, line.number);
            }
            _ => {
                self.reporter
                    .structural(line.number, "expected BEGIN:VCALENDAR", &line.text);
            }
        }
    }

    fn feed_calendar(&mut self, line: LogicalLine) {
        if line.is_blank() {
            self.reporter
                .structural(line.number, "blank line inside VCALENDAR", "");
            return;
        }

        match Marker::of(&line) {
            Some(Marker::Begin(name)) => {
                match ComponentKind::from_name(name).filter(|kind| kind.is_top_level()) {
                    Some(kind) => {
                        self.open.push(name.to_ascii_uppercase());
                        self.buffer.push(line.clone());
                        self.transition(State::Component(kind), line.number);
                    }
                    None => {
                        self.reporter.structural(
                            line.number,
                            format!("component {name} is not supported in VCALENDAR"),
                            &line.text,
                        );
                        let name = name.to_ascii_uppercase();
                        self.transition(State::Skipping { name, depth: 1 }, line.number);
                    }
                }
            }
            Some(Marker::End(name)) if name.eq_ignore_ascii_case(KW_VCALENDAR) => {
                self.transition(State::Done, line.number);
            }
            Some(Marker::End(name)) => {
                self.reporter.structural(
                    line.number,
                    format!("unexpected END:{name}"),
                    &line.text,
                );
            }
            None => self.calendar_property(&line),
        }
    }

    fn calendar_property(&mut self, line: &LogicalLine) {
        let prop = match Property::parse(line, self.reporter.strictness()) {
            Ok(prop) => prop,
            Err(err) => {
                self.reporter.value(line.number, &line.text, &err);
                return;
            }
        };

        let value = prop.value().trim().to_owned();
        let (slot, expected) = match prop.name() {
            KW_VERSION => (&mut self.header.version, Some(KW_VERSION_2_0)),
            KW_PRODID => (&mut self.header.prod_id, None),
            KW_CALSCALE => (&mut self.header.cal_scale, Some(KW_CALSCALE_GREGORIAN)),
            KW_METHOD => (&mut self.header.method, None),
            name => {
                if !name.starts_with("X-") {
                    self.reporter.strict(
                        line.number,
                        ErrorKind::Validity,
                        format!("property {name} is not allowed in VCALENDAR"),
                        &line.text,
                    );
                }
                self.header.extra.push(prop);
                return;
            }
        };

        if slot.is_some() {
            self.reporter.structural(
                line.number,
                format!("{} may occur only once", prop.name()),
                &line.text,
            );
            return;
        }
        if let Some(expected) = expected.filter(|e| !e.eq_ignore_ascii_case(&value)) {
            self.reporter.strict(
                line.number,
                ErrorKind::Validity,
                format!("{} must be {expected}", prop.name()),
                &line.text,
            );
        }
        *slot = Some(value);
    }

    fn feed_component(&mut self, kind: ComponentKind, line: LogicalLine) {
        let marker = Marker::of(&line);
        match marker {
            Some(Marker::Begin(name)) => {
                self.open.push(name.to_ascii_uppercase());
            }
            Some(Marker::End(name)) if name.eq_ignore_ascii_case(KW_VCALENDAR) => {
                let number = line.number;
                self.complete(kind);
                self.transition(State::Done, number);
                return;
            }
            Some(Marker::End(name)) => {
                if let Some(depth) = self.open.iter().rposition(|o| o.eq_ignore_ascii_case(name)) {
                    self.open.truncate(depth);
                }
                if self.open.is_empty() {
                    let number = line.number;
                    self.buffer.push(line);
                    self.complete(kind);
                    self.transition(State::Calendar, number);
                    return;
                }
            }
            None => {}
        }
        self.buffer.push(line);
    }

    fn feed_skipping(&mut self, name: String, depth: usize, line: &LogicalLine) {
        let depth = match Marker::of(line) {
            Some(Marker::Begin(_)) => depth + 1,
            Some(Marker::End(end)) if end.eq_ignore_ascii_case(KW_VCALENDAR) => {
                self.reporter
                    .structural(line.number, format!("missing END:{name}"), "");
                self.transition(State::Done, line.number);
                return;
            }
            Some(Marker::End(_)) => depth - 1,
            None => depth,
        };

        if depth == 0 {
            trace!(component = name, "skipped unsupported component");
            self.transition(State::Calendar, line.number);
        } else {
            self.state = State::Skipping { name, depth };
        }
    }

    /// Build the buffered component and dispatch it.
    fn complete(&mut self, kind: ComponentKind) {
        let raw = RawComponent::from_lines(&self.buffer, &mut self.reporter);
        self.buffer.clear();
        self.open.clear();
        let Some(raw) = raw else {
            return;
        };

        match kind {
            ComponentKind::Event => {
                if let Some(event) = self.build::<VEvent>(raw) {
                    self.sinks.iter_mut().for_each(|s| s.store_event(&event));
                }
            }
            ComponentKind::Todo => {
                if let Some(todo) = self.build::<VTodo>(raw) {
                    self.sinks.iter_mut().for_each(|s| s.store_todo(&todo));
                }
            }
            ComponentKind::Journal => {
                if let Some(journal) = self.build::<VJournal>(raw) {
                    for sink in &mut self.sinks {
                        sink.store_journal(&journal);
                    }
                }
            }
            ComponentKind::TimeZone => {
                if let Some(tz) = self.build::<VTimeZone>(raw) {
                    self.sinks.iter_mut().for_each(|s| s.store_timezone(&tz));
                }
            }
            ComponentKind::FreeBusy => {
                if let Some(fb) = self.build::<VFreeBusy>(raw) {
                    self.sinks.iter_mut().for_each(|s| s.store_freebusy(&fb));
                }
            }
            ComponentKind::Calendar
            | ComponentKind::Alarm
            | ComponentKind::Standard
            | ComponentKind::Daylight => {}
        }
    }

    fn build<T: BuildComponent>(&mut self, raw: RawComponent) -> Option<T> {
        let line = raw.line;
        let component = T::build(raw, &mut Context::new(&mut self.reporter))?;
        if let Err(reason) = component.validate() {
            self.reporter.report(ParseError::new(
                line,
                ErrorKind::Validity,
                format!("invalid {}: {reason}", T::KIND),
                "",
            ));
            return None;
        }

        debug!(kind = %T::KIND, line, sinks = self.sinks.len(), "dispatching component");
        Some(component)
    }

    /// Finish the stream: close what is still open, check the required
    /// calendar properties, hand the header to the sinks and return every
    /// reported error.
    #[must_use]
    pub fn finish(mut self) -> Vec<ParseError> {
        let line = self.last_line;
        match self.state.clone() {
            State::None => {
                self.reporter
                    .structural(line, "missing BEGIN:VCALENDAR", "");
            }
            State::Component(kind) => {
                self.complete(kind);
                self.reporter.structural(line, "missing END:VCALENDAR", "");
            }
            State::Calendar | State::Skipping { .. } => {
                self.reporter.structural(line, "missing END:VCALENDAR", "");
            }
            State::Done => {}
        }

        if self.seen_calendar {
            if self.header.version.is_none() {
                self.reporter
                    .structural(line, "missing required property VERSION", "");
            }
            if self.header.prod_id.is_none() {
                self.reporter
                    .structural(line, "missing required property PRODID", "");
            }
        }

        for sink in &mut self.sinks {
            sink.store_header(&self.header);
        }
        debug!(errors = self.reporter.errors().len(), "assembler finished");
        self.reporter.into_errors()
    }
}

impl std::fmt::Debug for Assembler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assembler")
            .field("state", &self.state)
            .field("buffer", &self.buffer.len())
            .field("header", &self.header)
            .field("reporter", &self.reporter)
            .field("sinks", &self.sinks.len())
            .finish_non_exhaustive()
    }
}

/// Entry point for parsing a whole stream.
#[derive(Debug)]
pub struct Parser<'a> {
    assembler: Assembler<'a>,
}

impl<'a> Parser<'a> {
    /// Create a parser for the given strictness.
    #[must_use]
    pub fn new(strictness: Strictness) -> Self {
        Self {
            assembler: Assembler::new(strictness),
        }
    }

    /// Register a sink.
    #[must_use]
    pub fn with_sink(mut self, sink: impl ComponentSink + 'a) -> Self {
        self.assembler.add_sink(sink);
        self
    }

    /// Register an error listener.
    #[must_use]
    pub fn with_listener(mut self, listener: impl ErrorListener + 'a) -> Self {
        self.assembler.add_listener(listener);
        self
    }

    /// The underlying assembler, for line-at-a-time feeding.
    #[must_use]
    pub fn into_assembler(self) -> Assembler<'a> {
        self.assembler
    }

    /// Parse a buffered source to its end.
    ///
    /// ## Errors
    /// Returns the first I/O error of the source; parse problems are
    /// returned in the `Ok` list instead.
    pub fn parse_reader<R: BufRead>(self, reader: R) -> io::Result<Vec<ParseError>> {
        let mut assembler = self.assembler;
        for line in LogicalLines::new(reader) {
            assembler.feed(line?);
        }
        Ok(assembler.finish())
    }

    /// Parse an in-memory string.
    #[must_use]
    pub fn parse_str(self, text: &str) -> Vec<ParseError> {
        let mut assembler = self.assembler;
        for line in crate::syntax::unfold(text) {
            assembler.feed(line);
        }
        assembler.finish()
    }
}

/// Parse a string into a calendar, returning every reported error.
#[must_use]
pub fn parse_str(text: &str, strictness: Strictness) -> (ICalendar, Vec<ParseError>) {
    let mut collector = CalendarCollector::new();
    let errors = Parser::new(strictness)
        .with_sink(&mut collector)
        .parse_str(text);
    (collector.into_calendar(), errors)
}

/// Parse a buffered source into a calendar, returning every reported error.
///
/// ## Errors
/// Returns the first I/O error of the source.
pub fn parse_reader<R: BufRead>(
    reader: R,
    strictness: Strictness,
) -> io::Result<(ICalendar, Vec<ParseError>)> {
    let mut collector = CalendarCollector::new();
    let errors = Parser::new(strictness)
        .with_sink(&mut collector)
        .parse_reader(reader)?;
    Ok((collector.into_calendar(), errors))
}
