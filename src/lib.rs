//! # offer-crossing
//!
//! Deterministic offer-crossing engine for a ledger-embedded exchange.
//!
//! A trade request (the taker) is crossed against resting offers, either
//! directly or bridged through the native currency, and the resulting
//! transfers are applied to a ledger view. Every node replaying the same
//! crossing gets bit-identical results.
//!
//! ## Architecture
//!
//! - **core** — Accounts, issues, amounts, qualities, transfer rates, ledger view
//! - **book** — Offers, flows, result codes, `BasicTaker` and `Taker`
//! - **scenario** — JSON-described crossings and their reports
//! - **simulation** — Seeded random order books

pub mod book;
pub mod core;
pub mod scenario;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::book::basic_taker::{BasicTaker, TakerFlags};
    pub use crate::book::flow::{CrossType, Flow};
    pub use crate::book::offer::Offer;
    pub use crate::book::result::{CrossError, ResultCode, TakerError};
    pub use crate::book::taker::Taker;
    pub use crate::core::account::AccountId;
    pub use crate::core::amount::{Amount, Amounts};
    pub use crate::core::currency::Issue;
    pub use crate::core::ledger::{InMemoryLedger, LedgerView};
    pub use crate::core::quality::Quality;
    pub use crate::core::rate::TransferRate;
    pub use crate::scenario::{CrossingReport, Scenario};
}
