use crate::core::account::AccountId;
use crate::core::amount::Amount;
use crate::core::currency::Issue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Ledger encoding of the parity rate: rates are stored in billionths.
pub const QUALITY_ONE: u32 = 1_000_000_000;

/// Largest transfer rate an issuer may configure (a 100% fee).
pub const MAX_TRANSFER_RATE: u32 = 2 * QUALITY_ONE;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateError {
    #[error("transfer rate {0} is outside [1, 2]")]
    OutOfRange(Decimal),
}

/// Multiplicative fee an issuer charges when its currency moves between
/// two accounts that are not the issuer.
///
/// A rate of `1.02` means the sender is debited 102 for every 100 the
/// receiver is credited; the difference stays with the issuer.
///
/// # Examples
///
/// ```
/// use offer_crossing::core::rate::TransferRate;
/// use rust_decimal_macros::dec;
///
/// let rate = TransferRate::from_billionths(1_020_000_000).unwrap();
/// assert_eq!(rate.value(), dec!(1.02));
/// assert!(TransferRate::from_billionths(0).unwrap().is_parity());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct TransferRate(Decimal);

impl TransferRate {
    pub const PARITY: TransferRate = TransferRate(Decimal::ONE);

    pub fn new(rate: Decimal) -> Result<Self, RateError> {
        if rate < Decimal::ONE || rate > Decimal::TWO {
            return Err(RateError::OutOfRange(rate));
        }
        Ok(Self(rate))
    }

    /// Decode the ledger's per-issuer setting. Zero means "never set".
    pub fn from_billionths(setting: u32) -> Result<Self, RateError> {
        if setting == 0 {
            return Ok(Self::PARITY);
        }
        Self::new(Decimal::from(setting) / Decimal::from(QUALITY_ONE))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_parity(&self) -> bool {
        self.0 == Decimal::ONE
    }

    /// What the sender must part with so that `amount` arrives.
    pub fn gross(&self, amount: &Amount) -> Amount {
        if self.is_parity() {
            return amount.clone();
        }
        amount.mul_round(self.0, true)
    }

    /// What arrives when the sender parts with `amount`.
    pub fn net(&self, amount: &Amount) -> Amount {
        if self.is_parity() {
            return amount.clone();
        }
        amount.div_round(self.0, false)
    }
}

impl TryFrom<Decimal> for TransferRate {
    type Error = RateError;

    fn try_from(rate: Decimal) -> Result<Self, Self::Error> {
        Self::new(rate)
    }
}

impl Default for TransferRate {
    fn default() -> Self {
        Self::PARITY
    }
}

impl fmt::Display for TransferRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// The rate that applies when `issue` moves from `from` to `to`.
///
/// Issuers never pay fees on their own currency, in either direction, and
/// neither does an account moving funds to itself or the native currency.
pub fn effective_rate(
    rate: TransferRate,
    issue: &Issue,
    from: &AccountId,
    to: &AccountId,
) -> TransferRate {
    if issue.is_native() || from == to || *from == issue.issuer || *to == issue.issuer {
        return TransferRate::PARITY;
    }
    rate
}
