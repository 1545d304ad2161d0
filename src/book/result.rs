use crate::book::flow::{CrossType, Flow};
use crate::core::account::AccountId;
use crate::core::amount::{Amount, AmountError, Amounts};
use crate::core::currency::Issue;
use crate::core::ledger::LedgerError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Outcome of a crossing step as the transaction pipeline records it.
///
/// `tes` codes succeed, `tec` codes are expected failures caused by ledger
/// state (the caller moves on to another offer or stops), `tef` codes mean
/// the request or the engine itself is broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResultCode {
    #[serde(rename = "tesSUCCESS")]
    TesSuccess,
    #[serde(rename = "tecUNFUNDED_OFFER")]
    TecUnfundedOffer,
    #[serde(rename = "tecUNFUNDED")]
    TecUnfunded,
    #[serde(rename = "tecINSUFFICIENT_FUNDS")]
    TecInsufficientFunds,
    #[serde(rename = "tecOVERSIZE")]
    TecOversize,
    #[serde(rename = "tecNO_FLOW")]
    TecNoFlow,
    #[serde(rename = "tefBAD_CROSS")]
    TefBadCross,
    #[serde(rename = "tefINTERNAL")]
    TefInternal,
}

impl ResultCode {
    pub fn token(&self) -> &'static str {
        match self {
            ResultCode::TesSuccess => "tesSUCCESS",
            ResultCode::TecUnfundedOffer => "tecUNFUNDED_OFFER",
            ResultCode::TecUnfunded => "tecUNFUNDED",
            ResultCode::TecInsufficientFunds => "tecINSUFFICIENT_FUNDS",
            ResultCode::TecOversize => "tecOVERSIZE",
            ResultCode::TecNoFlow => "tecNO_FLOW",
            ResultCode::TefBadCross => "tefBAD_CROSS",
            ResultCode::TefInternal => "tefINTERNAL",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResultCode::TesSuccess)
    }

    /// Either side of the step could not pay.
    pub fn is_insufficient_funds(&self) -> bool {
        matches!(
            self,
            ResultCode::TecUnfundedOffer
                | ResultCode::TecUnfunded
                | ResultCode::TecInsufficientFunds
        )
    }

    /// The engine or the request is defective; the transaction must not
    /// continue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ResultCode::TefBadCross | ResultCode::TefInternal)
    }

    /// Collapse a crossing outcome into its code.
    pub fn of<T>(outcome: &Result<T, CrossError>) -> ResultCode {
        match outcome {
            Ok(_) => ResultCode::TesSuccess,
            Err(e) => e.code(),
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A taker request that cannot be crossed at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TakerError {
    #[error("native-to-native crossing is not allowed")]
    NativeToNative,
    #[error("cross type {cross_type} does not fit {input} -> {output}")]
    CrossTypeMismatch {
        cross_type: CrossType,
        input: Issue,
        output: Issue,
    },
    #[error("taker amounts must be positive, got {0}")]
    NonPositiveAmounts(Amounts),
    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// Why a crossing step was aborted. Nothing was changed when one of these
/// is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrossError {
    #[error("computed flow fails sanity check: {0}")]
    Sanity(Flow),
    #[error("bridged legs disagree on the native amount: {leg1} out vs {leg2} in")]
    Discontinuous { leg1: Amount, leg2: Amount },
    #[error("offer owned by {owner} is unfunded")]
    UnfundedOffer { owner: AccountId },
    #[error("taker {account} has no funds left")]
    TakerUnfunded { account: AccountId },
    #[error("crossing would move nothing: {0}")]
    NoFlow(Flow),
    #[error("cannot consume a negative order from an offer: {0}")]
    NegativeOrder(Amounts),
    #[error("invalid crossing: {0}")]
    BadCross(String),
    #[error("offer cannot be crossed: {0}")]
    Amount(#[from] AmountError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl CrossError {
    pub fn code(&self) -> ResultCode {
        match self {
            CrossError::Sanity(_)
            | CrossError::Discontinuous { .. }
            | CrossError::NegativeOrder(_) => ResultCode::TefInternal,
            CrossError::UnfundedOffer { .. } => ResultCode::TecUnfundedOffer,
            CrossError::TakerUnfunded { .. } => ResultCode::TecUnfunded,
            CrossError::NoFlow(_) => ResultCode::TecNoFlow,
            CrossError::BadCross(_) | CrossError::Amount(_) => ResultCode::TefBadCross,
            CrossError::Ledger(LedgerError::InsufficientFunds { .. }) => {
                ResultCode::TecInsufficientFunds
            }
            CrossError::Ledger(LedgerError::ExceedsCap { .. } | LedgerError::Overflow { .. }) => {
                ResultCode::TecOversize
            }
            CrossError::Ledger(_) => ResultCode::TefInternal,
        }
    }
}
