//! Value Objects for the storefront

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn vnd(amount: Decimal) -> Self { Self::new(amount, "VND") }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }

    /// Price after taking `percent` off, rounded to two decimals.
    pub fn discounted(&self, percent: DiscountPercent) -> Money {
        let factor = Decimal::ONE - percent.value() / Decimal::ONE_HUNDRED;
        let amount = (self.amount * factor).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero).normalize();
        Money::new(amount, &self.currency)
    }
}

/// Percentage taken off a price, between 0 and 100 inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct DiscountPercent(Decimal);

impl DiscountPercent {
    pub fn new(value: impl Into<Decimal>) -> Result<Self, PercentError> {
        let value = value.into();
        if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED { return Err(PercentError::OutOfRange(value)); }
        Ok(Self(value))
    }
    pub fn value(&self) -> Decimal { self.0 }
}

impl TryFrom<Decimal> for DiscountPercent {
    type Error = PercentError;
    fn try_from(value: Decimal) -> Result<Self, Self::Error> { Self::new(value) }
}

impl From<DiscountPercent> for Decimal {
    fn from(p: DiscountPercent) -> Self { p.0 }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PercentError {
    #[error("discount percent {0} is outside 0..=100")]
    OutOfRange(Decimal),
}

/// Time left until the next promotion boundary, with days folded away.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Countdown {
    const DAY_MS: i64 = 86_400_000;
    const HOUR_MS: i64 = 3_600_000;
    const MINUTE_MS: i64 = 60_000;
    const SECOND_MS: i64 = 1_000;

    pub const ZERO: Countdown = Countdown { hours: 0, minutes: 0, seconds: 0 };

    /// Splits a distance in milliseconds. Negative distances count as zero.
    pub fn from_millis(distance: i64) -> Self {
        if distance <= 0 { return Self::ZERO; }
        // Each component is bounded by its modulus, so the casts cannot truncate.
        Self {
            hours: ((distance % Self::DAY_MS) / Self::HOUR_MS) as u32,
            minutes: ((distance % Self::HOUR_MS) / Self::MINUTE_MS) as u32,
            seconds: ((distance % Self::MINUTE_MS) / Self::SECOND_MS) as u32,
        }
    }

    pub fn is_zero(&self) -> bool { *self == Self::ZERO }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}
