// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, io, path::PathBuf};

use calendula_ical::{ICalendar, ParseError, Strictness};
use clap::{ArgMatches, Command};
use colored::Colorize;

use crate::arg::CommonArgs;
use crate::config::Config;
use crate::util::{format_parse_error, load_calendar};

#[derive(Debug, Clone)]
pub struct CmdCheck {
    pub file: PathBuf,
    pub strictness: Option<Strictness>,
}

impl CmdCheck {
    pub const NAME: &str = "check";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("lint")
            .about("Parse a calendar file and report every error found")
            .arg(CommonArgs::file())
            .arg(CommonArgs::strict())
            .arg(CommonArgs::loose())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            file: CommonArgs::get_file(matches),
            strictness: CommonArgs::get_strictness(matches),
        }
    }

    /// Fails when any error was reported, after printing them all.
    pub fn run(self, config: &Config) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "checking calendar...");
        let strictness = self.strictness.unwrap_or_else(|| config.strictness());
        let (calendar, errors) = load_calendar(&self.file, strictness)?;

        Self::report(&mut io::stdout().lock(), &calendar, &errors)?;
        match errors.len() {
            0 => Ok(()),
            1 => Err("1 error reported".into()),
            n => Err(format!("{n} errors reported").into()),
        }
    }

    pub fn report(
        out: &mut impl io::Write,
        calendar: &ICalendar,
        errors: &[ParseError],
    ) -> io::Result<()> {
        for error in errors {
            writeln!(out, "{}", format_parse_error(error))?;
        }
        if !errors.is_empty() {
            writeln!(out)?;
        }

        writeln!(out, "{} {}", "Found".bold(), summarize(calendar))?;
        if errors.is_empty() {
            writeln!(out, "{}", "No errors".green())?;
        }
        Ok(())
    }
}

fn summarize(calendar: &ICalendar) -> String {
    let counts = [
        (calendar.timezones.len(), "time zone", "time zones"),
        (calendar.events.len(), "event", "events"),
        (calendar.todos.len(), "to-do", "to-dos"),
        (calendar.journals.len(), "journal", "journals"),
        (calendar.free_busy.len(), "free/busy", "free/busy"),
    ];

    let parts: Vec<String> = counts
        .iter()
        .filter(|(n, _, _)| *n > 0)
        .map(|&(n, one, many)| format!("{n} {}", if n == 1 { one } else { many }))
        .collect();

    if parts.is_empty() {
        "no components".to_owned()
    } else {
        parts.join(", ")
    }
}
