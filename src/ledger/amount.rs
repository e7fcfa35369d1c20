// Amount - Money represented as integer minor units (euro cents)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing an amount from a decimal string
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AmountParseError {
    #[error("Empty amount")]
    Empty,

    #[error("Negative amounts are not allowed")]
    Negative,

    #[error("Not a valid decimal amount: {0}")]
    NotNumeric(String),

    #[error("At most two decimal places are allowed: {0}")]
    TooManyDecimals(String),

    #[error("Amount is too large")]
    Overflow,
}

/// A non-negative amount of currency in minor units (cents).
///
/// Arithmetic is always checked; there is no silent wraparound.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Create an amount from minor units (cents)
    pub fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Get the value in minor units (cents)
    pub fn minor(&self) -> u64 {
        self.0
    }

    /// Check if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    /// Parse a decimal string like "50.00", "50.5" or "50"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountParseError::Empty);
        }
        if trimmed.starts_with('-') {
            return Err(AmountParseError::Negative);
        }

        let (whole, frac) = match trimmed.split_once('.') {
            Some((w, f)) => (w, f),
            None => (trimmed, ""),
        };

        if frac.len() > 2 {
            return Err(AmountParseError::TooManyDecimals(trimmed.to_string()));
        }
        if whole.is_empty() && frac.is_empty() {
            return Err(AmountParseError::NotNumeric(trimmed.to_string()));
        }

        let euros: u64 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| AmountParseError::NotNumeric(trimmed.to_string()))?
        };

        // Pad "5" to "50" so tenths parse as tens of cents
        let cents: u64 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<2}", frac);
            padded
                .parse()
                .map_err(|_| AmountParseError::NotNumeric(trimmed.to_string()))?
        };

        euros
            .checked_mul(100)
            .and_then(|e| e.checked_add(cents))
            .map(Amount)
            .ok_or(AmountParseError::Overflow)
    }
}
