// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use calendula_ical::Strictness;
use clap::{Arg, ArgAction, ArgMatches, ValueHint, arg, value_parser};

#[derive(Debug, Clone, Copy)]
pub struct CommonArgs;

impl CommonArgs {
    pub fn file() -> Arg {
        arg!(file: <FILE> "Path to the iCalendar file, `-` for standard input")
            .value_parser(value_parser!(PathBuf))
            .value_hint(ValueHint::FilePath)
    }

    pub fn get_file(matches: &ArgMatches) -> PathBuf {
        matches
            .get_one::<PathBuf>("file")
            .cloned()
            .unwrap_or_else(|| PathBuf::from("-"))
    }

    pub fn strict() -> Arg {
        arg!(--strict "Report every deviation from RFC 5545")
            .action(ArgAction::SetTrue)
            .conflicts_with("loose")
    }

    pub fn loose() -> Arg {
        arg!(--loose "Report only malformed and impossible values").action(ArgAction::SetTrue)
    }

    /// The mode chosen on the command line, if any.
    pub fn get_strictness(matches: &ArgMatches) -> Option<Strictness> {
        if matches.get_flag("strict") {
            Some(Strictness::Strict)
        } else if matches.get_flag("loose") {
            Some(Strictness::Loose)
        } else {
            None
        }
    }
}
