use std::fmt;

use serde_json::Number;

/// A JSON number reduced to `sign * digits * 10^exponent`.
///
/// `digits` carries no leading or trailing zeros; trailing zeros are folded
/// into `exponent`. Zero is always `(false, "", 0)` so `-0` and `0.000` agree
/// with `0`. Two numbers are numerically equal iff their canonical forms are
/// equal, regardless of how the source text spelled them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalDecimal {
    negative: bool,
    digits: String,
    exponent: i64,
}

impl CanonicalDecimal {
    /// Parses JSON number text (`-12.5e3`, `1E-7`, `0.10`, ...).
    ///
    /// Returns `None` when the text is not a decimal number or its exponent
    /// does not fit in an `i64`.
    ///
    /// # Example
    ///
    /// ```
    /// use json_delta_util::CanonicalDecimal;
    ///
    /// let a = CanonicalDecimal::parse("1.50").unwrap();
    /// let b = CanonicalDecimal::parse("15e-1").unwrap();
    /// assert_eq!(a, b);
    /// assert!(CanonicalDecimal::parse("NaN").is_none());
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let (negative, rest) = match text.as_bytes().first()? {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };
        let (mantissa, exp) = match rest.find(['e', 'E']) {
            Some(at) => (&rest[..at], rest[at + 1..].parse::<i64>().ok()?),
            None => (rest, 0),
        };
        let (int_part, frac_part) = match mantissa.split_once('.') {
            Some((i, f)) => (i, f),
            None => (mantissa, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }

        let frac_len = i64::try_from(frac_part.len()).ok()?;
        let mut exponent = exp.checked_sub(frac_len)?;
        let joined: String = int_part.chars().chain(frac_part.chars()).collect();
        let significant = joined.trim_start_matches('0');
        if significant.is_empty() {
            return Some(Self::zero());
        }
        let trimmed = significant.trim_end_matches('0');
        let folded = i64::try_from(significant.len() - trimmed.len()).ok()?;
        exponent = exponent.checked_add(folded)?;

        Some(Self {
            negative,
            digits: trimmed.to_string(),
            exponent,
        })
    }

    /// Canonical form of a `serde_json` number.
    ///
    /// Integers take a direct path; floats go through their shortest
    /// round-trip text. Returns `None` only for text that serde_json itself
    /// would never produce.
    pub fn from_number(n: &Number) -> Option<Self> {
        if let Some(i) = n.as_i64() {
            return Some(Self::from_integer(i < 0, i.unsigned_abs()));
        }
        if let Some(u) = n.as_u64() {
            return Some(Self::from_integer(false, u));
        }
        Self::parse(&n.to_string())
    }

    pub fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    fn zero() -> Self {
        Self {
            negative: false,
            digits: String::new(),
            exponent: 0,
        }
    }

    fn from_integer(negative: bool, magnitude: u64) -> Self {
        if magnitude == 0 {
            return Self::zero();
        }
        let mut digits = magnitude.to_string();
        let mut exponent = 0i64;
        while digits.ends_with('0') {
            digits.pop();
            exponent += 1;
        }
        Self {
            negative,
            digits,
            exponent,
        }
    }
}

impl fmt::Display for CanonicalDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        if self.negative {
            f.write_str("-")?;
        }
        write!(f, "{}e{}", self.digits, self.exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(text: &str) -> CanonicalDecimal {
        CanonicalDecimal::parse(text).expect("valid number")
    }

    #[test]
    fn integer_and_float_spellings_agree() {
        assert_eq!(canon("1"), canon("1.0"));
        assert_eq!(canon("1"), canon("1e0"));
        assert_eq!(canon("1"), canon("10e-1"));
        assert_eq!(canon("100"), canon("1e2"));
        assert_eq!(canon("0.5"), canon("5E-1"));
    }

    #[test]
    fn zero_ignores_sign_and_scale() {
        assert_eq!(canon("0"), canon("-0"));
        assert_eq!(canon("0"), canon("0.000e12"));
        assert!(canon("-0.0").is_zero());
    }

    #[test]
    fn sign_matters_for_non_zero() {
        assert_ne!(canon("1"), canon("-1"));
    }

    #[test]
    fn different_values_differ() {
        assert_ne!(canon("1.5"), canon("1.05"));
        assert_ne!(canon("12"), canon("21"));
    }

    #[test]
    fn rejects_non_numbers() {
        assert!(CanonicalDecimal::parse("").is_none());
        assert!(CanonicalDecimal::parse("-").is_none());
        assert!(CanonicalDecimal::parse(".").is_none());
        assert!(CanonicalDecimal::parse("1x").is_none());
        assert!(CanonicalDecimal::parse("1e").is_none());
        assert!(CanonicalDecimal::parse("inf").is_none());
    }

    #[test]
    fn from_number_matches_parse() {
        let n: Number = serde_json::from_str("2.50").unwrap();
        assert_eq!(CanonicalDecimal::from_number(&n), Some(canon("25e-1")));
        let n = Number::from(-1200i64);
        assert_eq!(CanonicalDecimal::from_number(&n), Some(canon("-1.2e3")));
        let n = Number::from(u64::MAX);
        assert_eq!(
            CanonicalDecimal::from_number(&n),
            Some(canon("18446744073709551615"))
        );
    }

    #[test]
    fn display_is_scientific() {
        assert_eq!(canon("-1.50").to_string(), "-15e-1");
        assert_eq!(canon("0.0").to_string(), "0");
    }
}
