//! # Money Module
//!
//! Monetary values for bizdesk, stored as integer cents.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE DRAWER PROBLEM                                                     │
//! │                                                                         │
//! │  With floats, a register that opens with 100.10 and takes three sales   │
//! │  of 0.10 can report 100.39999999999999 at closing. The closing          │
//! │  snapshot must match the drawer count to the cent.                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    10010 + 10 + 10 + 10 = 10040 cents, exactly                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bizdesk_core::money::Money;
//!
//! let price = Money::from_cents(1000);       // $10.00
//! let line = price.multiply_quantity(2);    // $20.00
//! let total = line + Money::from_cents(500); // $25.00
//! assert_eq!(total.cents(), 2500);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// A monetary value in the smallest currency unit (cents).
///
/// Signed so that differences (balance minus refund) can be computed
/// before the sign is checked. Ledger amounts themselves are always
/// stored as positive magnitudes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use bizdesk_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole currency units.
    ///
    /// ```rust
    /// use bizdesk_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(50).cents(), 5000);
    /// ```
    #[inline]
    pub const fn from_major(units: i64) -> Self {
        Money(units * 100)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole currency units (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// The cents part, always 0-99.
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ```rust
    /// use bizdesk_core::money::Money;
    ///
    /// let line = Money::from_cents(299).multiply_quantity(3);
    /// assert_eq!(line.cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Percentage of this amount, in basis points (1000 = 10%), rounded half up.
    ///
    /// ```rust
    /// use bizdesk_core::money::Money;
    ///
    /// let discount = Money::from_cents(10000).percentage_bps(1000);
    /// assert_eq!(discount.cents(), 1000);
    /// ```
    pub fn percentage_bps(&self, bps: u32) -> Money {
        // i128 keeps large totals from overflowing before the division
        let cents = (self.0 as i128 * bps as i128 + 5000) / 10000;
        Money(cents as i64)
    }

    /// Subtracts, flooring the result at zero.
    #[inline]
    pub fn saturating_sub_floor(&self, other: Money) -> Money {
        Money((self.0 - other.0).max(0))
    }
}

/// `$12.34` / `-$5.50`. Front ends format with their own locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.minor())
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}
