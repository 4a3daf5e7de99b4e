// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Command-line front-end of `calendula-ical`.

mod arg;
mod cli;
mod cmd_check;
mod cmd_expand;
mod cmd_format;
mod cmd_generate_completion;
mod config;
mod util;

pub use crate::cli::{Cli, Commands, run};
pub use crate::config::{Config, parse_config};
