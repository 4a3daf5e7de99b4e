// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, io, path::PathBuf};

use calendula_ical::{DateTime, Descriptive, ExpandOptions, ICalendar, Strictness};
use clap::{ArgMatches, Command, arg, value_parser};
use colored::Colorize;

use crate::arg::CommonArgs;
use crate::config::Config;
use crate::util::{format_parse_error, load_calendar};

#[derive(Debug, Clone)]
pub struct CmdExpand {
    pub file: PathBuf,
    pub limit: Option<usize>,
    pub strictness: Option<Strictness>,
}

impl CmdExpand {
    pub const NAME: &str = "expand";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .about("List the occurrences of every recurring event and to-do")
            .arg(CommonArgs::file())
            .arg(
                arg!(-n --limit <N> "Occurrences to print per component, after the start")
                    .value_parser(value_parser!(usize)),
            )
            .arg(CommonArgs::strict())
            .arg(CommonArgs::loose())
    }

    pub fn from(matches: &ArgMatches) -> Self {
        Self {
            file: CommonArgs::get_file(matches),
            limit: matches.get_one("limit").copied(),
            strictness: CommonArgs::get_strictness(matches),
        }
    }

    pub fn run(self, config: &Config) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "expanding recurrences...");
        let strictness = self.strictness.unwrap_or_else(|| config.strictness());
        let limit = self.limit.unwrap_or(config.expand_limit);

        let (calendar, errors) = load_calendar(&self.file, strictness)?;
        for error in &errors {
            eprintln!("{}", format_parse_error(error));
        }

        let mut stdout = io::stdout().lock();
        Self::expand(&mut stdout, &calendar, limit, ExpandOptions::default())?;
        Ok(())
    }

    pub fn expand(
        out: &mut impl io::Write,
        calendar: &ICalendar,
        limit: usize,
        options: ExpandOptions,
    ) -> io::Result<()> {
        let recurring = calendar
            .events
            .iter()
            .map(|a| &a.descriptive)
            .chain(calendar.todos.iter().map(|a| &a.descriptive))
            .filter(|a| a.rrule.is_some() || !a.rdates.is_empty());

        let mut flag = true;
        for descriptive in recurring {
            let Some(start) = descriptive.dt_start.as_ref() else {
                tracing::debug!(uid = %descriptive.uid, "recurring component without start");
                continue;
            };

            if !flag {
                writeln!(out)?;
            }
            flag = false;

            writeln!(out, "{} {}", "►".green(), title(descriptive).bold())?;
            let tz = start.tzid().map(|a| format!(" ({a})")).unwrap_or_default();
            writeln!(out, "  {}{tz} {}", human(start.value()), "start".italic())?;

            let dates = descriptive.occurrences(options);
            for date in dates.iter().take(limit) {
                writeln!(out, "  {}{tz}", human(date))?;
            }
            if dates.len() > limit {
                let rest = dates.len() - limit;
                writeln!(out, "  {}", format!("... {rest} more").dimmed())?;
            }
        }

        if flag {
            writeln!(out, "No recurring events or to-dos")?;
        }
        Ok(())
    }
}

fn title(descriptive: &Descriptive) -> String {
    match &descriptive.summary {
        Some(summary) => format!("{summary} <{}>", descriptive.uid),
        None => format!("<{}>", descriptive.uid),
    }
}

/// `2024-01-31`, `2024-01-31 09:00:00` or `2024-01-31 09:00:00Z`.
fn human(date: &DateTime) -> String {
    let day = format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day());
    if date.is_date_only() {
        return day;
    }

    let z = if date.is_utc() { "Z" } else { "" };
    format!(
        "{day} {:02}:{:02}:{:02}{z}",
        date.hour(),
        date.minute(),
        date.second()
    )
}
