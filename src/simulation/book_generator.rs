//! Deterministic random offer books.
//!
//! Books are generated from a seed so a benchmark or a failing property
//! can be replayed exactly.

use crate::book::offer::Offer;
use crate::core::account::AccountId;
use crate::core::amount::{round_to, Amount, Amounts};
use crate::core::currency::Issue;
use crate::core::ledger::InMemoryLedger;
use crate::core::rate::TransferRate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Shape of a generated book.
#[derive(Debug, Clone)]
pub struct BookConfig {
    /// Number of distinct offer owners.
    pub owners: usize,
    /// Number of offers in the book.
    pub offers: usize,
    /// What the offers take in (the taker pays this).
    pub taker_pays: Issue,
    /// What the offers give out (the taker gets this).
    pub taker_gets: Issue,
    /// Smallest offer input.
    pub min_amount: Decimal,
    /// Largest offer input.
    pub max_amount: Decimal,
    /// Output per unit of input at the top of the book.
    pub best_rate: Decimal,
    /// Largest fraction by which one offer is worse than the one before it.
    pub max_step: Decimal,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            owners: 10,
            offers: 50,
            taker_pays: Issue::native(),
            taker_gets: Issue::new("USD", AccountId::new("GATEWAY")),
            min_amount: dec!(10),
            max_amount: dec!(10_000),
            best_rate: dec!(2),
            max_step: dec!(0.01),
        }
    }
}

fn owner_name(index: usize) -> AccountId {
    AccountId::new(format!("MAKER-{:03}", index))
}

fn random_decimal(rng: &mut StdRng, min: Decimal, max: Decimal) -> Decimal {
    if max <= min {
        return min;
    }
    // Fraction of the range in millionths, kept integral so the result is
    // exact and reproducible.
    let fraction = Decimal::new(rng.gen_range(0..=1_000_000), 6);
    min + (max - min) * fraction
}

/// Generate `config.offers` offers in descending quality.
///
/// The same `config` and `seed` always produce the same book.
pub fn generate_book(config: &BookConfig, seed: u64) -> Vec<Offer> {
    let mut rng = StdRng::seed_from_u64(seed);
    let owners = config.owners.max(1);
    let in_scale = config.taker_pays.scale();
    let out_scale = config.taker_gets.scale();
    let mut rate = config.best_rate;
    let mut book = Vec::with_capacity(config.offers);

    for sequence in 0..config.offers {
        let input = round_to(
            random_decimal(&mut rng, config.min_amount, config.max_amount),
            in_scale,
            false,
        );
        let output = round_to(input * rate, out_scale, false);
        let amounts = Amounts::new(
            Amount::new(input, config.taker_pays.clone()),
            Amount::new(output, config.taker_gets.clone()),
        );
        let owner = owner_name(rng.gen_range(0..owners));
        // Amounts too small to carry a quality at this scale are skipped.
        if let Ok(offer) = Offer::new(owner, sequence as u32 + 1, amounts) {
            book.push(offer);
        }

        let step = random_decimal(&mut rng, Decimal::ZERO, config.max_step);
        rate = (rate * (Decimal::ONE - step)).round_dp(12);
    }

    // Rounding the outputs down can tie or invert neighbours that sit
    // within one unit of each other.
    book.sort_by(|a, b| b.quality().cmp(&a.quality()));
    book
}

/// Credit every owner in `book` enough of what they sell to back all of
/// their offers, fees included at `rate`.
pub fn fund_owners(ledger: &mut InMemoryLedger, book: &[Offer], rate: TransferRate) {
    for offer in book {
        let output = &offer.amounts().output;
        if offer.owner() != &output.issue().issuer {
            ledger.credit(offer.owner(), &rate.gross(output));
        }
    }
}
