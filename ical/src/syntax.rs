// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Text-level syntax of iCalendar streams: line framing and content-line scanning.

pub mod framer;
pub mod lexer;
pub mod scanner;

pub use crate::syntax::framer::{LogicalLine, LogicalLines, MAX_LINE_CHARS, fold, unfold};
pub use crate::syntax::scanner::{
    ContentLine, ContentLineError, ParameterErrorKind, ScannedParameter, ScannedParameterValue,
    scan_content_line,
};
