//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  The import reconciles card + cash against a stated total with a       │
//! │  tolerance of 0.01. With floats that comparison is unreliable.         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    "45.00" ──► 4500 cents        tolerance = 1 cent                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//!
//! let card = Money::parse("25.00").unwrap();
//! let cash = Money::from_cents(2000);
//! assert_eq!((card + cash).to_csv_string(), "45.00");
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: differences between amounts may be negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money is Used
/// ```text
/// CSV "total" ──► Money ──► reconcile(card, cash) ──► Sale.total_cents
///                                                        │
/// Sale.*_cents ◄─────────────────────────────────────────┘
///      │
///      └──► Money::to_csv_string() ──► export "45.00"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Largest magnitude `parse` accepts. Summing or subtracting a few
    /// parsed amounts stays inside `i64`.
    pub const MAX_PARSED_CENTS: i64 = i64::MAX / 4;

    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents 10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Parses decimal text (`"45"`, `"45.5"`, `"12.345"`) into cents.
    ///
    /// Fractions beyond two places are rounded half away from zero.
    /// Returns `None` for blank or non-numeric text, and for amounts whose
    /// magnitude exceeds [`Money::MAX_PARSED_CENTS`].
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// assert_eq!(Money::parse("12.345").unwrap().cents(), 1235);
    /// assert_eq!(Money::parse(" 7 ").unwrap().cents(), 700);
    /// assert!(Money::parse("abc").is_none());
    /// assert!(Money::parse("").is_none());
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let value = Decimal::from_str(text).ok()?;
        let cents = value
            .checked_mul(Decimal::ONE_HUNDRED)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()?;

        if cents.checked_abs()? > Self::MAX_PARSED_CENTS {
            return None;
        }

        Some(Money(cents))
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Divides an amount evenly across `quantity` units, rounding to the
    /// nearest cent (half away from zero).
    ///
    /// A zero or negative quantity returns the amount unchanged, so a
    /// product price derived from a row never divides by zero.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let total = Money::from_cents(5000);
    /// assert_eq!(total.per_unit(2).cents(), 2500);
    /// assert_eq!(total.per_unit(3).cents(), 1667);
    /// assert_eq!(total.per_unit(0).cents(), 5000);
    /// ```
    pub fn per_unit(&self, quantity: i64) -> Money {
        if quantity <= 0 {
            return *self;
        }

        let half = quantity / 2;
        let cents = if self.0 >= 0 {
            (self.0 + half) / quantity
        } else {
            (self.0 - half) / quantity
        };

        Money(cents)
    }

    /// Renders the amount as plain two-decimal text (`"45.00"`, `"-3.10"`).
    ///
    /// This is the format used in CSV files, with no currency symbol.
    pub fn to_csv_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.dollars().abs(), self.cents_part())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money in a human-readable format.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_fractional() {
        assert_eq!(Money::parse("45.00").unwrap().cents(), 4500);
        assert_eq!(Money::parse("45").unwrap().cents(), 4500);
        assert_eq!(Money::parse("45.5").unwrap().cents(), 4550);
        assert_eq!(Money::parse("0.01").unwrap().cents(), 1);
        assert_eq!(Money::parse("-3.10").unwrap().cents(), -310);
    }

    #[test]
    fn test_parse_rounds_half_away_from_zero() {
        assert_eq!(Money::parse("0.005").unwrap().cents(), 1);
        assert_eq!(Money::parse("0.004").unwrap().cents(), 0);
        assert_eq!(Money::parse("-0.005").unwrap().cents(), -1);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("").is_none());
        assert!(Money::parse("   ").is_none());
        assert!(Money::parse("twelve").is_none());
        assert!(Money::parse("12,50").is_none());
    }

    #[test]
    fn test_parse_rejects_out_of_range_amounts() {
        assert!(Money::parse("90000000000000000").is_none());
        assert!(Money::parse("-90000000000000000").is_none());
        assert!(Money::parse("1e30").is_none());

        let max = Money::MAX_PARSED_CENTS;
        let at_limit = format!("{}.{:02}", max / 100, max % 100);
        assert_eq!(Money::parse(&at_limit).unwrap().cents(), max);
    }

    #[test]
    fn test_csv_string() {
        assert_eq!(Money::from_cents(4500).to_csv_string(), "45.00");
        assert_eq!(Money::from_cents(5).to_csv_string(), "0.05");
        assert_eq!(Money::from_cents(-310).to_csv_string(), "-3.10");
        assert_eq!(Money::zero().to_csv_string(), "0.00");
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
    }

    #[test]
    fn test_per_unit() {
        assert_eq!(Money::from_cents(4500).per_unit(1).cents(), 4500);
        assert_eq!(Money::from_cents(1000).per_unit(3).cents(), 333);
        assert_eq!(Money::from_cents(2000).per_unit(3).cents(), 667);
        assert_eq!(Money::from_cents(700).per_unit(0).cents(), 700);
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());
        assert!(Money::from_cents(-1).is_negative());
        assert_eq!(Money::from_cents(-550).abs().cents(), 550);
    }
}
