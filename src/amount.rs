/// Arbitrary-precision token amounts
///
/// Ledger amounts are stored as decimal strings and routinely exceed the
/// range of u64 and the exact range of f64. All sums, differences and share
/// ratios go through `Amount` (an unbounded integer) and `BigDecimal`; a float
/// only appears in `share_percent`, at the output boundary.
use bigdecimal::num_bigint::BigInt;
use bigdecimal::{BigDecimal, Signed, ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;
use thiserror::Error;

/// Digits kept after the decimal point before converting a share to f64
const SHARE_SCALE: i64 = 12;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid amount '{input}': {reason}")]
pub struct AmountParseError {
    pub input: String,
    pub reason: &'static str,
}

/// Non-negative unbounded integer amount in raw token units
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(BigInt);

impl Amount {
    pub fn zero() -> Self {
        Amount(BigInt::zero())
    }

    /// Parse a stored decimal string.
    ///
    /// The ingestion engine omits zero values, so an empty string reads as zero.
    /// Signs, decimal points and anything other than ASCII digits are rejected.
    pub fn parse(input: &str) -> Result<Self, AmountParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(Amount::zero());
        }
        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AmountParseError {
                input: input.to_string(),
                reason: "expected unsigned decimal digits",
            });
        }
        BigInt::from_str(trimmed)
            .map(Amount)
            .map_err(|_| AmountParseError {
                input: input.to_string(),
                reason: "not a decimal integer",
            })
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Subtraction that refuses to go below zero
    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        let diff = &self.0 - &other.0;
        if diff.is_negative() {
            None
        } else {
            Some(Amount(diff))
        }
    }

    pub fn as_bigint(&self) -> &BigInt {
        &self.0
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(BigInt::from(value))
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add<&Amount> for &Amount {
    type Output = Amount;

    fn add(self, rhs: &Amount) -> Amount {
        Amount(&self.0 + &rhs.0)
    }
}

impl AddAssign<&Amount> for Amount {
    fn add_assign(&mut self, rhs: &Amount) {
        self.0 += &rhs.0;
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Self {
        iter.fold(Amount::zero(), |mut acc, a| {
            acc += a;
            acc
        })
    }
}

// Amounts cross the API as decimal strings so no client parses them into a float.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Amount::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// `part / whole * 100` computed exactly, converted to f64 only at the end.
///
/// A zero `whole` has no meaningful share and yields 0.0.
pub fn share_percent(part: &Amount, whole: &Amount) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    let numerator = BigDecimal::new(part.0.clone() * 100u32, 0);
    let denominator = BigDecimal::new(whole.0.clone(), 0);
    let ratio = (numerator / denominator).with_scale(SHARE_SCALE);
    ratio.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_digits_and_empty() {
        assert_eq!(Amount::parse("").unwrap(), Amount::zero());
        assert_eq!(Amount::parse(" 42 ").unwrap(), Amount::from(42));
        let big = "340282366920938463463374607431768211456000";
        assert_eq!(Amount::parse(big).unwrap().to_string(), big);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["-5", "1.5", "1e9", "abc", "0x10", "+3"] {
            assert!(Amount::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_checked_sub_never_underflows() {
        let max = Amount::from(1_000_000);
        let locked = Amount::from(100_000);
        assert_eq!(max.checked_sub(&locked), Some(Amount::from(900_000)));
        assert_eq!(locked.checked_sub(&max), None);
        assert_eq!(max.checked_sub(&max), Some(Amount::zero()));
    }

    #[test]
    fn test_sum_beyond_u64() {
        let a = Amount::from(u64::MAX);
        let total: Amount = [a.clone(), a.clone(), Amount::from(2)].iter().sum();
        assert_eq!(total.to_string(), "36893488147419103232");
    }

    #[test]
    fn test_share_percent_exact_cases() {
        let max = Amount::from(1_000_000);
        assert_eq!(share_percent(&Amount::from(400_000), &max), 40.0);
        assert_eq!(share_percent(&Amount::from(200_000), &max), 20.0);
        assert_eq!(share_percent(&max, &max), 100.0);
        assert_eq!(share_percent(&Amount::zero(), &max), 0.0);
        assert_eq!(share_percent(&Amount::from(5), &Amount::zero()), 0.0);
    }

    #[test]
    fn test_share_percent_at_large_magnitudes() {
        // 2^100 out of 2^102 is exactly 25%
        let whole = Amount::parse("5070602400912917605986812821504").unwrap();
        let part = Amount::parse("1267650600228229401496703205376").unwrap();
        assert_eq!(share_percent(&part, &whole), 25.0);
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Amount::from(7)).unwrap();
        assert_eq!(json, "\"7\"");
        let back: Amount = serde_json::from_str("\"123\"").unwrap();
        assert_eq!(back, Amount::from(123));
    }
}
