//! Offer crossing: the pure crossing policy ([`basic_taker`]), the
//! ledger-effecting engine built on it ([`taker`]), and the values they
//! exchange with callers.

pub mod basic_taker;
pub mod flow;
pub mod offer;
pub mod result;
pub mod taker;
