//! Token amounts and prices.
//!
//! Amounts are fixed-point with 18 decimals (the ERC-20 convention for OCEAN
//! and ETH), stored as integer base units so comparisons and debits are
//! exact.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AcquireError, Result};

/// Number of decimal places in one whole token.
pub const TOKEN_DECIMALS: u32 = 18;

const UNITS_PER_TOKEN: u128 = 10u128.pow(TOKEN_DECIMALS);

/// A non-negative token quantity in base units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(u128);

impl TokenAmount {
    pub const ZERO: TokenAmount = TokenAmount(0);

    pub fn from_base_units(units: u128) -> Self {
        Self(units)
    }

    pub fn base_units(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_sub(&self, other: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_sub(other.0).map(TokenAmount)
    }
}

impl FromStr for TokenAmount {
    type Err = AcquireError;

    /// Parse a decimal string such as `"10.5"` or `"0.002"`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || AcquireError::InvalidAmount(s.to_string());

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        if frac.len() > TOKEN_DECIMALS as usize {
            return Err(invalid());
        }

        let whole_units: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac_units: u128 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{frac:0<width$}", width = TOKEN_DECIMALS as usize);
            padded.parse().map_err(|_| invalid())?
        };

        whole_units
            .checked_mul(UNITS_PER_TOKEN)
            .and_then(|w| w.checked_add(frac_units))
            .map(TokenAmount)
            .ok_or_else(invalid)
    }
}

impl std::fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let whole = self.0 / UNITS_PER_TOKEN;
        let frac = self.0 % UNITS_PER_TOKEN;
        if frac == 0 {
            return write!(f, "{whole}");
        }
        let digits = format!("{frac:0>width$}", width = TOKEN_DECIMALS as usize);
        write!(f, "{whole}.{}", digits.trim_end_matches('0'))
    }
}

/// An amount together with its currency unit, written as `"0.1 OCEAN"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Price {
    pub amount: TokenAmount,
    pub currency: String,
}

impl Price {
    pub fn new(amount: TokenAmount, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }
}

impl FromStr for Price {
    type Err = AcquireError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let (Some(amount), Some(currency), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(AcquireError::InvalidAmount(format!(
                "expected '<amount> <currency>', got '{s}'"
            )));
        };
        Ok(Self {
            amount: amount.parse()?,
            currency: currency.to_string(),
        })
    }
}

impl TryFrom<String> for Price {
    type Error = AcquireError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Price> for String {
    fn from(price: Price) -> Self {
        price.to_string()
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
