//! Minor-unit money type.
//!
//! Every monetary value in the engine is an integer number of cents. Payout
//! recalculation must be bit-for-bit reproducible, so no floating point is
//! allowed anywhere in the calculation path; decimal notation exists only in
//! `Display` output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A monetary amount in cents. Signed: chair-rental payouts can go negative
/// (the staff member owes the business) and ledger totals are signed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Applies a whole percentage (0-100), rounding half-up on cents.
    ///
    /// Intermediate math is i128 so large revenues cannot overflow. The
    /// rounding is deterministic, which keeps recalculation idempotent.
    pub fn apply_percent(&self, percent: i64) -> Money {
        let scaled = self.0 as i128 * percent as i128;
        let rounded = if scaled >= 0 {
            (scaled + 50) / 100
        } else {
            (scaled - 50) / 100
        };
        Money(rounded as i64)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::zero(), Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_application_rounds_half_up() {
        // 1000 * 50% = 500 exactly
        assert_eq!(Money::from_cents(1000).apply_percent(50).cents(), 500);
        // 125 * 50% = 62.5 -> 63
        assert_eq!(Money::from_cents(125).apply_percent(50).cents(), 63);
        // 33 * 10% = 3.3 -> 3
        assert_eq!(Money::from_cents(33).apply_percent(10).cents(), 3);
        // 0% and 100% are exact
        assert_eq!(Money::from_cents(999).apply_percent(0).cents(), 0);
        assert_eq!(Money::from_cents(999).apply_percent(100).cents(), 999);
    }

    #[test]
    fn percent_of_negative_amount_rounds_away_from_zero() {
        assert_eq!(Money::from_cents(-125).apply_percent(50).cents(), -63);
    }

    #[test]
    fn percent_scales_linearly() {
        let base = Money::from_cents(100_000).apply_percent(50);
        let doubled = Money::from_cents(200_000).apply_percent(50);
        assert_eq!(doubled.cents(), base.cents() * 2);
    }

    #[test]
    fn display_is_decimal_notation() {
        assert_eq!(Money::from_cents(56000).to_string(), "560.00");
        assert_eq!(Money::from_cents(-2000).to_string(), "-20.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(0).to_string(), "0.00");
    }

    #[test]
    fn arithmetic_and_sum() {
        let total: Money = [100, -30, 50].iter().map(|c| Money::from_cents(*c)).sum();
        assert_eq!(total.cents(), 120);
        assert_eq!((Money::from_cents(250) - Money::from_cents(300)).cents(), -50);
        assert_eq!((-Money::from_cents(40)).cents(), -40);
    }
}
