use std::{fmt::Display, str::FromStr};

use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{Deserialize, Serialize};

use crate::{Currency, Error, PRECISION};

/// Number of decimal places encoded by [`PRECISION`].
const DECIMALS: u32 = 18;

/// Raw fixed-point amount that renders as a human readable decimal.
///
/// `Amount(50_000_000_000_000_000)` displays as `0.05`, and `"0.05".parse::<Amount>()`
/// gives back the same raw value.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(pub Currency);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Whole `units` of a token.
    pub const fn units(units: u64) -> Self {
        Self(units as Currency * PRECISION)
    }

    pub const fn raw(self) -> Currency {
        self.0
    }

    /// Convert into a [`Decimal`] expressed in whole tokens.
    pub fn to_decimal(self) -> Result<Decimal, Error> {
        let raw = i128::try_from(self.0).map_err(|_| Error::AmountOutOfRange(self.0.to_string()))?;
        Ok(Decimal::try_from_i128_with_scale(raw, DECIMALS)?.normalize())
    }

    /// Convert a decimal expressed in whole tokens into its raw value.
    ///
    /// Digits beyond the 18th decimal place cannot be represented and are rejected.
    pub fn from_decimal(value: Decimal) -> Result<Self, Error> {
        let out_of_range = || Error::AmountOutOfRange(value.to_string());
        if value.is_sign_negative() || value.scale() > DECIMALS {
            return Err(out_of_range());
        }

        // Split to keep the intermediate values inside the 96 bit mantissa.
        let whole = value.trunc().to_u128().ok_or_else(out_of_range)?;
        let fraction = (value.fract() * Decimal::from(10u64.pow(DECIMALS)))
            .to_u128()
            .ok_or_else(out_of_range)?;

        whole
            .checked_mul(PRECISION)
            .and_then(|whole| whole.checked_add(fraction))
            .map(Self)
            .ok_or_else(out_of_range)
    }
}

impl From<Currency> for Amount {
    fn from(value: Currency) -> Self {
        Self(value)
    }
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal(Decimal::from_str(s.trim())?)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_decimal() {
            Ok(decimal) => write!(f, "{decimal}"),
            // Too large for a Decimal, fall back to the raw value.
            Err(_) => write!(f, "{} raw", self.0),
        }
    }
}
