/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

/// Parse the leading decimal integer of `s`, with optional sign.
///
/// Leading whitespace is skipped and anything after the digits is ignored.
/// Returns `None` if there is no digit at all. Values saturate at the `i64`
/// bounds.
pub(crate) fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut found = false;
    for c in digits.bytes() {
        if !c.is_ascii_digit() {
            break;
        }
        found = true;
        value = value.saturating_mul(10).saturating_add(i64::from(c - b'0'));
    }

    if !found {
        None
    } else if negative {
        Some(-value)
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_int() {
        assert_eq!(parse_leading_int("12"), Some(12));
        assert_eq!(parse_leading_int(" +7"), Some(7));
        assert_eq!(parse_leading_int("-3x"), Some(-3));
        assert_eq!(parse_leading_int("5-7"), Some(5));
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int("+"), None);
        assert_eq!(parse_leading_int("99999999999999999999999"), Some(i64::MAX));
    }
}
