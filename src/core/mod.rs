pub mod account;
pub mod amount;
pub mod currency;
pub mod ledger;
pub mod quality;
pub mod rate;
