use crate::core::account::AccountId;
use crate::core::amount::{AmountError, Amounts};
use crate::core::quality::Quality;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// A resting order in the book, seen from the taker's side: `amounts.input`
/// is what the taker pays the owner, `amounts.output` what the owner pays
/// the taker.
///
/// The quality is fixed when the offer is placed and is not recomputed as
/// the offer is partially consumed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Offer {
    owner: AccountId,
    sequence: u32,
    amounts: Amounts,
    quality: Quality,
}

impl Offer {
    pub fn new(owner: AccountId, sequence: u32, amounts: Amounts) -> Result<Self, AmountError> {
        amounts.input.check_range()?;
        amounts.output.check_range()?;
        let quality = Quality::from_amounts(&amounts)?;
        Ok(Self {
            owner,
            sequence,
            amounts,
            quality,
        })
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Sequence of the transaction that placed this offer.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn amounts(&self) -> &Amounts {
        &self.amounts
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Take `order` out of the offer. Legs stop at zero.
    pub fn consume(&mut self, order: &Amounts) {
        let input = (self.amounts.input.clone() - order.input.clone()).value();
        let output = (self.amounts.output.clone() - order.output.clone()).value();
        self.amounts.input = self.amounts.input.with_value(input.max(Decimal::ZERO));
        self.amounts.output = self.amounts.output.with_value(output.max(Decimal::ZERO));
    }

    /// Nothing left to cross.
    pub fn is_consumed(&self) -> bool {
        self.amounts.is_empty()
    }
}

impl fmt::Display for Offer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{} [{}] @ {}",
            self.owner, self.sequence, self.amounts, self.quality
        )
    }
}
