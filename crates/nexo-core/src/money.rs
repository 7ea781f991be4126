//! # Money Module
//!
//! Provides the `Money` type for monetary values in Chilean pesos.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CLP HAS NO MINOR UNIT                                                  │
//! │                                                                         │
//! │  Prices, debts and credit limits are whole pesos:                       │
//! │    Pan Blanco      $1.990                                               │
//! │    Credit limit  $150.000                                               │
//! │                                                                         │
//! │  Storing them as f64 invites 0.1 + 0.2 style drift in totals and makes │
//! │  the 80% credit rule inexact. Every amount is an i64 count of pesos,   │
//! │  and threshold checks are done with integer cross-multiplication.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use nexo_core::money::Money;
//!
//! let price = Money::from_pesos(1990);
//! let line = price * 3;
//! assert_eq!(line.pesos(), 5970);
//! assert_eq!(line.to_string(), "$5.970");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole Chilean pesos.
///
/// ## Where Money is Used
/// ```text
/// Product.unit_price ──► CartLine.line_total ──► Sale.total_amount
///                                                    │
///                               credito ─────────────┴──► Customer.current_debt
///
/// CreditPayment.amount ──► Customer.current_debt (never below zero)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type), sqlx(transparent))]
#[serde(transparent)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole pesos.
    ///
    /// ## Example
    /// ```rust
    /// use nexo_core::money::Money;
    ///
    /// let limit = Money::from_pesos(150_000);
    /// assert_eq!(limit.pesos(), 150_000);
    /// ```
    #[inline]
    pub const fn from_pesos(pesos: i64) -> Self {
        Money(pesos)
    }

    /// Returns the value in pesos.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0
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

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use nexo_core::money::Money;
    ///
    /// let unit_price = Money::from_pesos(890);
    /// assert_eq!(unit_price.multiply_quantity(4).pesos(), 3560);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// `None` when the product does not fit in an `i64`.
    #[inline]
    pub const fn checked_mul_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// `None` when the sum does not fit in an `i64`.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Subtracts `other`, flooring the result at zero.
    ///
    /// Used when a payment larger than the outstanding debt arrives.
    ///
    /// ## Example
    /// ```rust
    /// use nexo_core::money::Money;
    ///
    /// let debt = Money::from_pesos(5_000);
    /// assert_eq!(debt.saturating_sub_to_zero(Money::from_pesos(8_000)), Money::zero());
    /// ```
    #[inline]
    pub fn saturating_sub_to_zero(&self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }

    /// True when `self` is at least `num/den` of `of`.
    ///
    /// Integer cross-multiplication in i128, so no rounding is involved.
    /// `debt.reaches_fraction_of(limit, 4, 5)` is the 80% credit rule.
    pub fn reaches_fraction_of(&self, of: Money, num: i64, den: i64) -> bool {
        (self.0 as i128) * (den as i128) >= (of.0 as i128) * (num as i128)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

// Operators saturate at the i64 bounds. Checkout totals and debts use the
// checked forms and reject overflow instead.

/// Formats as CLP with a dot thousands separator: `$1.234.567`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}", sign, grouped)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
