// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, io, path::PathBuf};

use calendula_ical::{Formatter, Strictness};
use clap::{ArgMatches, Command};

use crate::arg::CommonArgs;
use crate::config::Config;
use crate::util::{format_parse_error, load_calendar};

#[derive(Debug, Clone)]
pub struct CmdFormat {
    pub file: PathBuf,
    pub strictness: Option<Strictness>,
}

impl CmdFormat {
    pub const NAME: &str = "format";

    pub fn command() -> Command {
        Command::new(Self::NAME)
            .alias("fmt")
            .about("Parse a calendar file and write it back normalized to standard output")
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

    /// Errors go to standard error; whatever survived parsing is written.
    pub fn run(self, config: &Config) -> Result<(), Box<dyn Error>> {
        tracing::debug!(?self, "formatting calendar...");
        let strictness = self.strictness.unwrap_or_else(|| config.strictness());
        let (calendar, errors) = load_calendar(&self.file, strictness)?;
        for error in &errors {
            eprintln!("{}", format_parse_error(error));
        }

        let mut formatter = Formatter::new(io::stdout().lock());
        formatter.write(&calendar)?;
        Ok(())
    }
}
