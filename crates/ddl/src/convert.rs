// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Text to number conversion used when reading schema attributes.
//!
//! Integers accept decimal or `0x`-prefixed hexadecimal; surrounding
//! whitespace is ignored. Failures are reported as [`ConversionError`].

use thiserror::Error;

/// Failed text to number conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert '{text}' to {target}")]
pub struct ConversionError {
    /// Offending input.
    pub text: String,
    /// Requested numeric type.
    pub target: &'static str,
}

/// Numeric types that can be parsed from schema text.
pub trait Numeric: Sized {
    /// Type name used in error messages.
    const NAME: &'static str;

    /// Parse trimmed text, `None` on failure.
    fn parse_text(text: &str) -> Option<Self>;
}

macro_rules! impl_numeric_int {
    ($($ty:ty),*) => {
        $(
            impl Numeric for $ty {
                const NAME: &'static str = stringify!($ty);

                fn parse_text(text: &str) -> Option<Self> {
                    let (negative, digits) = match text.strip_prefix('-') {
                        Some(rest) => (true, rest),
                        None => (false, text.strip_prefix('+').unwrap_or(text)),
                    };
                    let hex = digits
                        .strip_prefix("0x")
                        .or_else(|| digits.strip_prefix("0X"));
                    match hex {
                        Some(hex_digits) => {
                            let magnitude = i128::from_str_radix(hex_digits, 16).ok()?;
                            let value = if negative { -magnitude } else { magnitude };
                            <$ty>::try_from(value).ok()
                        }
                        None => text.parse::<$ty>().ok(),
                    }
                }
            }
        )*
    };
}

impl_numeric_int!(i8, u8, i16, u16, i32, u32, i64, u64, usize);

impl Numeric for f32 {
    const NAME: &'static str = "f32";

    fn parse_text(text: &str) -> Option<Self> {
        text.parse().ok()
    }
}

impl Numeric for f64 {
    const NAME: &'static str = "f64";

    fn parse_text(text: &str) -> Option<Self> {
        text.parse().ok()
    }
}

/// Convert `text` to `T`.
pub fn string_to_number<T: Numeric>(text: &str) -> Result<T, ConversionError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ConversionError {
            text: text.to_string(),
            target: T::NAME,
        });
    }
    T::parse_text(trimmed).ok_or_else(|| ConversionError {
        text: text.to_string(),
        target: T::NAME,
    })
}

/// True when `text` converts to `T`.
pub fn is_numeric<T: Numeric>(text: &str) -> bool {
    string_to_number::<T>(text).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_and_hex() {
        assert_eq!(string_to_number::<u32>(" 42 "), Ok(42));
        assert_eq!(string_to_number::<u16>("0x1F"), Ok(31));
        assert_eq!(string_to_number::<i8>("-0x80"), Ok(-128));
        assert_eq!(string_to_number::<i64>("-17"), Ok(-17));
        assert_eq!(string_to_number::<f64>("2.5"), Ok(2.5));
    }

    #[test]
    fn test_rejects_out_of_range_and_garbage() {
        let err = string_to_number::<u8>("256").expect_err("out of range");
        assert_eq!(err.target, "u8");
        assert!(string_to_number::<u32>("").is_err());
        assert!(string_to_number::<u32>("twelve").is_err());
        assert!(!is_numeric::<usize>("-1"));
        assert!(is_numeric::<usize>("16"));
    }
}
