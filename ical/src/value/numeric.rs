// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Integer and float values as defined in RFC 5545 Sections 3.3.7 and 3.3.8.

use chumsky::prelude::*;

use crate::error::ValueError;
use crate::value::datetime::describe;

/// Parse an INTEGER value.
///
/// ```txt
/// integer    = (["+"] / "-") 1*DIGIT
/// ```
///
/// ## Errors
/// Returns [`ValueError::Format`] if the text is not a signed digit run, and
/// [`ValueError::Invalid`] if it does not fit in 32 bits.
pub fn parse_integer(text: &str) -> Result<i32, ValueError> {
    let text = text.trim();
    let (negative, digits) = integer()
        .parse(text)
        .into_result()
        .map_err(|errs| ValueError::format("integer", describe(text, &errs)))?;

    let n = lexical::parse::<i64, _>(digits)
        .map_err(|e| ValueError::invalid("integer", format!("`{text}`: {e}")))?;
    let n = if negative { -n } else { n };
    i32::try_from(n).map_err(|_| ValueError::invalid("integer", format!("{n} out of range")))
}

/// Parse a FLOAT value.
///
/// ```txt
/// float      = (["+"] / "-") 1*DIGIT ["." 1*DIGIT]
/// ```
///
/// ## Errors
/// Returns [`ValueError::Format`] if the text does not match the grammar.
pub fn parse_float(text: &str) -> Result<f64, ValueError> {
    let text = text.trim();
    let slice = float()
        .parse(text)
        .into_result()
        .map_err(|errs| ValueError::format("float", describe(text, &errs)))?;

    lexical::parse::<f64, _>(slice.trim_start_matches('+'))
        .map_err(|e| ValueError::format("float", format!("`{text}`: {e}")))
}

fn integer<'src>() -> impl Parser<'src, &'src str, (bool, &'src str), extra::Err<Rich<'src, char>>>
{
    select! { c @ ('+' | '-') => c == '-' }
        .or_not()
        .map(Option::unwrap_or_default)
        .then(text::digits(10).at_least(1).to_slice())
}

fn float<'src>() -> impl Parser<'src, &'src str, &'src str, extra::Err<Rich<'src, char>>> {
    one_of("+-")
        .or_not()
        .then(text::digits(10).at_least(1))
        .then(just('.').then(text::digits(10).at_least(1)).or_not())
        .to_slice()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_integers() {
        #[rustfmt::skip]
        let success_cases = [
            ("1234567890",  1_234_567_890),
            ("-1234567890", -1_234_567_890),
            ("+1234567890", 1_234_567_890),
            ("432109876",   432_109_876),
            (" 0 ",         0),
        ];
        for (src, expected) in success_cases {
            assert_eq!(parse_integer(src).unwrap(), expected, "{src}");
        }

        let err = parse_integer("12a").unwrap_err();
        assert!(matches!(err, ValueError::Format { .. }));
        let err = parse_integer("9999999999").unwrap_err();
        assert!(matches!(err, ValueError::Invalid { .. }));
    }

    #[test]
    fn parses_floats() {
        #[rustfmt::skip]
        let success_cases = [
            ("1000000.0000001", 1_000_000.000_000_1),
            ("1.333",           1.333),
            ("-3.14",           -3.14),
            ("+2",              2.0),
        ];
        for (src, expected) in success_cases {
            let got = parse_float(src).unwrap();
            assert!((got - expected).abs() < 1e-9, "{src}: {got}");
        }

        for src in ["", "1.", ".5", "1,5", "abc"] {
            assert!(parse_float(src).is_err(), "{src}");
        }
    }
}
