// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Validation strictness shared by every parser in the crate.

/// How much non-conforming input is tolerated.
///
/// Chosen once when a parser is constructed and consulted by every component
/// and value parser.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Strictness {
    /// Every RFC 5545 violation is reported.
    Strict,

    /// Recoverable violations are silently tolerated.
    #[default]
    Loose,
}

impl Strictness {
    /// Whether this is [`Strictness::Strict`].
    #[must_use]
    pub const fn is_strict(self) -> bool {
        matches!(self, Self::Strict)
    }
}
