use crate::book::result::TakerError;
use crate::core::amount::Amounts;
use crate::core::currency::Issue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which pairing of currencies a crossing involves.
///
/// Native-to-native is not a variant: such a trade is never valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossType {
    NativeToIssued,
    IssuedToNative,
    IssuedToIssued,
}

impl CrossType {
    /// The cross type for a trade paying `input` to receive `output`.
    pub fn for_issues(input: &Issue, output: &Issue) -> Result<Self, TakerError> {
        match (input.is_native(), output.is_native()) {
            (true, true) => Err(TakerError::NativeToNative),
            (true, false) => Ok(CrossType::NativeToIssued),
            (false, true) => Ok(CrossType::IssuedToNative),
            (false, false) => Ok(CrossType::IssuedToIssued),
        }
    }

    /// Whether a taker of this type may trade `input` for `output`.
    pub fn admits(&self, input: &Issue, output: &Issue) -> bool {
        match self {
            CrossType::NativeToIssued => input.is_native() && !output.is_native(),
            CrossType::IssuedToNative => !input.is_native() && output.is_native(),
            CrossType::IssuedToIssued => !input.is_native() && !output.is_native(),
        }
    }
}

impl fmt::Display for CrossType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CrossType::NativeToIssued => "native->issued",
            CrossType::IssuedToNative => "issued->native",
            CrossType::IssuedToIssued => "issued->issued",
        };
        f.write_str(name)
    }
}

/// What one crossing step moves.
///
/// `order` is exchanged between the taker and the offer owner at the offer's
/// quality. `issuers` is what actually leaves the paying accounts once
/// transfer fees are added on issued legs; native legs carry no fee, so on
/// them both sides agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flow {
    pub order: Amounts,
    pub issuers: Amounts,
}

impl Flow {
    /// Every leg non-negative, and never native on both sides.
    pub fn sanity_check(&self) -> bool {
        if self.order.is_native_to_native() {
            return false;
        }
        !self.order.input.is_negative()
            && !self.order.output.is_negative()
            && !self.issuers.input.is_negative()
            && !self.issuers.output.is_negative()
    }

    /// True when the step would move something on both sides.
    pub fn moves_funds(&self) -> bool {
        self.order.input.is_positive() && self.order.output.is_positive()
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "order [{}] issuers [{}]", self.order, self.issuers)
    }
}
