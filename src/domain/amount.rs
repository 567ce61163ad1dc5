use crate::error::PrintQError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative amount in the major currency unit (e.g. pesos).
///
/// Wraps `rust_decimal::Decimal` so that money never passes through binary
/// floating point before it is converted to the gateway's minor unit.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, PrintQError> {
        if value.is_sign_negative() && !value.is_zero() {
            Err(PrintQError::InvalidRequest(format!(
                "amount must not be negative: {value}"
            )))
        } else {
            Ok(Self(value.normalize()))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Converts to the gateway's integer minor unit, rounding half away from
    /// zero so fractional cents never bill low.
    pub fn to_minor_units(&self) -> Result<i64, PrintQError> {
        self.0
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|cents| cents.to_i64())
            .ok_or_else(|| {
                PrintQError::InvalidRequest(format!("amount out of range: {}", self.0))
            })
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PrintQError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
