// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Calendula - check, format and expand iCalendar files

use std::process::ExitCode;

fn main() -> ExitCode {
    calendula_cli::run()
}
