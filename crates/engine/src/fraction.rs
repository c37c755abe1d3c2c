//! Exact rational amounts.
//!
//! A unit price is a line total divided by a purchased count, which is rarely
//! a whole number of cents (`10.00 / 3`). [`Fraction`] keeps such values
//! exact so nothing is lost before a report rounds them.

use std::cmp::Ordering;

use crate::{EngineError, MoneyCents};

/// An exact rational number of cents, always stored reduced with a positive
/// denominator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fraction {
    numerator: i128,
    denominator: i128,
}

impl Fraction {
    pub const ZERO: Fraction = Fraction {
        numerator: 0,
        denominator: 1,
    };

    /// Builds `numerator / denominator` cents.
    pub fn new(numerator: i128, denominator: i128) -> Result<Self, EngineError> {
        if denominator == 0 {
            return Err(EngineError::validation("denominator cannot be zero"));
        }
        let mut out = Self {
            numerator,
            denominator,
        };
        out.reduce();
        Ok(out)
    }

    #[must_use]
    pub const fn numerator(self) -> i128 {
        self.numerator
    }

    #[must_use]
    pub const fn denominator(self) -> i128 {
        self.denominator
    }

    /// Multiplies by a whole quantity (e.g. an assigned count).
    pub fn checked_mul_int(self, factor: i128) -> Result<Self, EngineError> {
        let numerator = self.numerator.checked_mul(factor).ok_or_else(too_large)?;
        Self::new(numerator, self.denominator)
    }

    /// Adds over the least common denominator, so sums of shares of the
    /// same items keep their denominators small.
    pub fn checked_add(self, rhs: Fraction) -> Result<Self, EngineError> {
        let denominator = lcm(self.denominator, rhs.denominator).ok_or_else(too_large)?;
        let left = self
            .numerator
            .checked_mul(denominator / self.denominator)
            .ok_or_else(too_large)?;
        let right = rhs
            .numerator
            .checked_mul(denominator / rhs.denominator)
            .ok_or_else(too_large)?;
        Self::new(left.checked_add(right).ok_or_else(too_large)?, denominator)
    }

    /// Multiplies two fractions, cancelling common factors crosswise first.
    pub fn checked_mul(self, rhs: Fraction) -> Result<Self, EngineError> {
        let left = gcd(self.numerator.unsigned_abs(), rhs.denominator.unsigned_abs()) as i128;
        let right = gcd(rhs.numerator.unsigned_abs(), self.denominator.unsigned_abs()) as i128;
        let numerator = (self.numerator / left)
            .checked_mul(rhs.numerator / right)
            .ok_or_else(too_large)?;
        let denominator = (self.denominator / right)
            .checked_mul(rhs.denominator / left)
            .ok_or_else(too_large)?;
        Self::new(numerator, denominator)
    }

    /// Rounds to whole cents with banker's rounding (ties to even).
    pub fn round_to_cents(self) -> Result<MoneyCents, EngineError> {
        let rounded = round_half_even(self.numerator, self.denominator);
        i64::try_from(rounded)
            .map(MoneyCents::new)
            .map_err(|_| too_large())
    }

    fn reduce(&mut self) {
        if self.denominator < 0 {
            self.numerator = -self.numerator;
            self.denominator = -self.denominator;
        }
        let gcd = gcd(self.numerator.unsigned_abs(), self.denominator.unsigned_abs());
        if gcd > 1 {
            // gcd divides both operands, so it fits back into i128.
            let gcd = gcd as i128;
            self.numerator /= gcd;
            self.denominator /= gcd;
        }
    }
}

impl Ord for Fraction {
    /// Compares by continued-fraction expansion, so values whose cross
    /// products would not fit in `i128` still order correctly.
    fn cmp(&self, other: &Self) -> Ordering {
        let (mut a, mut b) = (self.numerator, self.denominator);
        let (mut c, mut d) = (other.numerator, other.denominator);
        loop {
            let ordering = a.div_euclid(b).cmp(&c.div_euclid(d));
            if ordering != Ordering::Equal {
                return ordering;
            }
            match (a.rem_euclid(b), c.rem_euclid(d)) {
                (0, 0) => return Ordering::Equal,
                (0, _) => return Ordering::Less,
                (_, 0) => return Ordering::Greater,
                // r1/b < r2/d exactly when d/r2 < b/r1.
                (r1, r2) => (a, b, c, d) = (d, r2, b, r1),
            }
        }
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub(crate) fn too_large() -> EngineError {
    EngineError::validation("amount too large")
}

/// `numerator / denominator` rounded to the nearest integer, ties to even.
/// `denominator` must be positive.
pub(crate) fn round_half_even(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator.div_euclid(denominator);
    let remainder = numerator.rem_euclid(denominator);
    let rest = denominator - remainder;
    if remainder > rest || (remainder == rest && quotient % 2 != 0) {
        quotient + 1
    } else {
        quotient
    }
}

pub(crate) fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}

/// Least common multiple, `None` on overflow.
fn lcm(a: i128, b: i128) -> Option<i128> {
    let gcd = gcd(a.unsigned_abs(), b.unsigned_abs()) as i128;
    (a / gcd).checked_mul(b)
}
