//! The crossing policy of a taker, free of any ledger access.
//!
//! A [`BasicTaker`] is built once per incoming trade request and is then
//! presented resting offers in descending quality order. For each one it
//! computes the [`Flow`] that crossing would produce, clamped by:
//!
//! 1. what the offer owner can actually deliver,
//! 2. what the taker still wants to receive (buy requests only),
//! 3. what the taker still wants to pay,
//! 4. what the taker can actually pay.
//!
//! Account balances come through the [`FundsSource`] hook, so the same
//! arithmetic runs against the live ledger or against synthetic balances.

use crate::book::flow::{CrossType, Flow};
use crate::book::result::{CrossError, TakerError};
use crate::core::account::AccountId;
use crate::core::amount::{mul_div, round_to, Amount, Amounts};
use crate::core::currency::Issue;
use crate::core::quality::Quality;
use crate::core::rate::{effective_rate, TransferRate};
use log::{debug, trace};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Options of the trade request that shape how it crosses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakerFlags {
    /// Sell the whole input even if that yields more output than asked.
    #[serde(default)]
    pub sell: bool,
    /// Do not cross offers at exactly the taker's own quality.
    #[serde(default)]
    pub passive: bool,
}

impl TakerFlags {
    pub fn sell() -> Self {
        Self {
            sell: true,
            passive: false,
        }
    }

    pub fn passive() -> Self {
        Self {
            sell: false,
            passive: true,
        }
    }
}

/// Balance lookup used to bound a crossing.
pub trait FundsSource {
    /// The lesser of what `account` can spend in `ceiling`'s issue and
    /// `ceiling` itself.
    fn get_funds(&self, account: &AccountId, ceiling: &Amount) -> Amount;
}

/// Fixed balances for exercising the crossing arithmetic without a ledger.
///
/// Issuers have unlimited funds in their own currency; everything not set
/// explicitly is zero.
#[derive(Debug, Clone, Default)]
pub struct SyntheticFunds {
    balances: HashMap<(AccountId, Issue), Decimal>,
}

impl SyntheticFunds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, account: &AccountId, amount: &Amount) {
        self.balances
            .insert((account.clone(), amount.issue().clone()), amount.value());
    }

    pub fn with(mut self, account: &AccountId, amount: &Amount) -> Self {
        self.set(account, amount);
        self
    }
}

impl FundsSource for SyntheticFunds {
    fn get_funds(&self, account: &AccountId, ceiling: &Amount) -> Amount {
        if !ceiling.is_native() && *account == ceiling.issue().issuer {
            return ceiling.clone();
        }
        let held = self
            .balances
            .get(&(account.clone(), ceiling.issue().clone()))
            .copied()
            .unwrap_or(Decimal::ZERO)
            .max(Decimal::ZERO);
        ceiling.with_value(held.min(ceiling.value()))
    }
}

fn log_flow(stage: &str, flow: &Flow) {
    trace!("{}: {}", stage, flow);
}

/// State of the active party of an offer crossing.
#[derive(Debug, Clone)]
pub struct BasicTaker {
    account: AccountId,
    quality: Quality,
    threshold: Quality,
    passive: bool,
    sell: bool,
    original: Amounts,
    remaining: Amounts,
    issue_in: Issue,
    issue_out: Issue,
    rate_in: TransferRate,
    rate_out: TransferRate,
    cross_type: CrossType,
}

impl BasicTaker {
    /// Start crossing `amounts` on behalf of `account`.
    ///
    /// `quality` is the taker's limit; `rate_in` and `rate_out` are the
    /// transfer fees of the input and output issuers.
    pub fn new(
        cross_type: CrossType,
        account: AccountId,
        amounts: Amounts,
        quality: Quality,
        flags: TakerFlags,
        rate_in: TransferRate,
        rate_out: TransferRate,
    ) -> Result<Self, TakerError> {
        if !amounts.input.is_positive() || !amounts.output.is_positive() {
            return Err(TakerError::NonPositiveAmounts(amounts));
        }
        if amounts.is_native_to_native() {
            return Err(TakerError::NativeToNative);
        }
        amounts.input.check_range()?;
        amounts.output.check_range()?;
        let issue_in = amounts.input.issue().clone();
        let issue_out = amounts.output.issue().clone();
        if !cross_type.admits(&issue_in, &issue_out) {
            return Err(TakerError::CrossTypeMismatch {
                cross_type,
                input: issue_in,
                output: issue_out,
            });
        }

        Ok(Self {
            account,
            quality,
            threshold: quality,
            passive: flags.passive,
            sell: flags.sell,
            original: amounts.clone(),
            remaining: amounts,
            issue_in,
            issue_out,
            rate_in,
            rate_out,
            cross_type,
        })
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn cross_type(&self) -> CrossType {
        self.cross_type
    }

    pub fn issue_in(&self) -> &Issue {
        &self.issue_in
    }

    pub fn issue_out(&self) -> &Issue {
        &self.issue_out
    }

    /// The amounts the request was placed with.
    pub fn original_offer(&self) -> &Amounts {
        &self.original
    }

    /// What is still left to take.
    pub fn remaining(&self) -> &Amounts {
        &self.remaining
    }

    /// Returns `true` if an offer of `quality` must not be crossed.
    pub fn reject(&self, quality: Quality) -> bool {
        if self.passive {
            quality <= self.threshold
        } else {
            quality < self.threshold
        }
    }

    /// Returns `true` once the input is spent, or a buy has received all it
    /// asked for.
    pub fn done(&self) -> bool {
        if self.remaining.input.value() <= Decimal::ZERO {
            return true;
        }
        !self.sell && self.remaining.output.value() <= Decimal::ZERO
    }

    /// What should rest on the book once crossing stops, at the taker's own
    /// quality.
    ///
    /// Zero when done, the original request when nothing crossed, otherwise
    /// rescaled from the constrained leg: the input for sells, the output
    /// for buys. The derived leg is rounded up.
    pub fn remaining_offer(&self) -> Amounts {
        if self.done() {
            return self.remaining.zeroed();
        }
        if self.original == self.remaining {
            return self.original.clone();
        }

        let q = self.quality;
        if self.sell {
            let input = self.remaining.input.clone();
            let output = match mul_div(input.value(), q.output(), q.input()) {
                Some(value) => self
                    .original
                    .output
                    .with_value(round_to(value, self.issue_out.scale(), true))
                    .min(self.original.output.clone()),
                None => self.original.output.clone(),
            };
            return Amounts::new(input, output);
        }

        let output = self.remaining.output.clone();
        let input = match mul_div(output.value(), q.input(), q.output()) {
            Some(value) => self
                .original
                .input
                .with_value(round_to(value, self.issue_in.scale(), true))
                .min(self.original.input.clone()),
            None => self.original.input.clone(),
        };
        Amounts::new(input, output)
    }

    /// Fee on the input currency when it moves between the two accounts.
    pub fn in_rate(&self, from: &AccountId, to: &AccountId) -> TransferRate {
        effective_rate(self.rate_in, &self.issue_in, from, to)
    }

    /// Fee on the output currency when it moves between the two accounts.
    pub fn out_rate(&self, from: &AccountId, to: &AccountId) -> TransferRate {
        effective_rate(self.rate_out, &self.issue_out, from, to)
    }

    fn flow_native_to_issued(
        &self,
        offer: &Amounts,
        quality: Quality,
        owner_funds: &Amount,
        taker_funds: &Amount,
        rate_out: TransferRate,
    ) -> Flow {
        let mut order = offer.clone();
        let mut issuers_out = rate_out.gross(&order.output);
        log_flow(
            "flow_native_to_issued",
            &Flow {
                order: order.clone(),
                issuers: Amounts::new(order.input.clone(), issuers_out.clone()),
            },
        );

        // Clamp on owner balance
        if *owner_funds < issuers_out {
            issuers_out = owner_funds.clone();
            order.output = rate_out.net(&issuers_out);
            order.input = quality.input_for(&order.output, &order.input);
            trace!("clamped on owner balance: {}", order);
        }

        // Clamp if the taker wants to limit the output
        if !self.sell && self.remaining.output < order.output {
            order.output = self.remaining.output.clone();
            order.input = quality.input_for(&order.output, &order.input);
            issuers_out = rate_out.gross(&order.output);
            trace!("clamped on taker output: {}", order);
        }

        // Clamp on the taker's funds
        if *taker_funds < order.input {
            order.input = taker_funds.clone();
            order.output = quality.output_for(&order.input, &order.output);
            issuers_out = rate_out.gross(&order.output);
            trace!("clamped on taker funds: {}", order);
        }

        // Clamp on remaining input, unless this is the second leg of a bridge
        if self.cross_type == CrossType::NativeToIssued && self.remaining.input < order.input {
            order.input = self.remaining.input.clone();
            order.output = quality.output_for(&order.input, &order.output);
            issuers_out = rate_out.gross(&order.output);
            trace!("clamped on taker input: {}", order);
        }

        let issuers = Amounts::new(order.input.clone(), issuers_out);
        Flow { order, issuers }
    }

    fn flow_issued_to_native(
        &self,
        offer: &Amounts,
        quality: Quality,
        owner_funds: &Amount,
        taker_funds: &Amount,
        rate_in: TransferRate,
    ) -> Flow {
        let mut order = offer.clone();
        let mut issuers_in = rate_in.gross(&order.input);
        log_flow(
            "flow_issued_to_native",
            &Flow {
                order: order.clone(),
                issuers: Amounts::new(issuers_in.clone(), order.output.clone()),
            },
        );

        // Clamp on owner's funds
        if *owner_funds < order.output {
            order.output = owner_funds.clone();
            order.input = quality.input_for(&order.output, &order.input);
            issuers_in = rate_in.gross(&order.input);
            trace!("clamped on owner funds: {}", order);
        }

        // Clamp on taker output, unless this is the first leg of a bridge
        if !self.sell
            && self.cross_type == CrossType::IssuedToNative
            && self.remaining.output < order.output
        {
            order.output = self.remaining.output.clone();
            order.input = quality.input_for(&order.output, &order.input);
            issuers_in = rate_in.gross(&order.input);
            trace!("clamped on taker output: {}", order);
        }

        // Clamp on the taker's remaining input
        if self.remaining.input < order.input {
            order.input = self.remaining.input.clone();
            issuers_in = rate_in.gross(&order.input);
            order.output = quality.output_for(&order.input, &order.output);
            trace!("clamped on taker input: {}", order);
        }

        // Clamp on the taker's input balance
        if *taker_funds < issuers_in {
            issuers_in = taker_funds.clone();
            order.input = rate_in.net(&issuers_in);
            order.output = quality.output_for(&order.input, &order.output);
            trace!("clamped on taker funds: {}", order);
        }

        let issuers = Amounts::new(issuers_in, order.output.clone());
        Flow { order, issuers }
    }

    fn flow_issued_to_issued(
        &self,
        offer: &Amounts,
        quality: Quality,
        owner_funds: &Amount,
        taker_funds: &Amount,
        rate_in: TransferRate,
        rate_out: TransferRate,
    ) -> Flow {
        let mut order = offer.clone();
        let mut issuers_in = rate_in.gross(&order.input);
        let mut issuers_out = rate_out.gross(&order.output);
        log_flow(
            "flow_issued_to_issued",
            &Flow {
                order: order.clone(),
                issuers: Amounts::new(issuers_in.clone(), issuers_out.clone()),
            },
        );

        // Clamp on owner balance
        if *owner_funds < issuers_out {
            issuers_out = owner_funds.clone();
            order.output = rate_out.net(&issuers_out);
            order.input = quality.input_for(&order.output, &order.input);
            issuers_in = rate_in.gross(&order.input);
            trace!("clamped on owner balance: {}", order);
        }

        // Clamp on the taker's requested output
        if !self.sell && self.remaining.output < order.output {
            order.output = self.remaining.output.clone();
            order.input = quality.input_for(&order.output, &order.input);
            issuers_out = rate_out.gross(&order.output);
            issuers_in = rate_in.gross(&order.input);
            trace!("clamped on taker output: {}", order);
        }

        // Clamp on the taker's remaining input
        if self.remaining.input < order.input {
            order.input = self.remaining.input.clone();
            issuers_in = rate_in.gross(&order.input);
            order.output = quality.output_for(&order.input, &order.output);
            issuers_out = rate_out.gross(&order.output);
            trace!("clamped on taker input: {}", order);
        }

        // Clamp on the taker's input balance
        if *taker_funds < issuers_in {
            issuers_in = taker_funds.clone();
            order.input = rate_in.net(&issuers_in);
            order.output = quality.output_for(&order.input, &order.output);
            issuers_out = rate_out.gross(&order.output);
            trace!("clamped on taker funds: {}", order);
        }

        Flow {
            order,
            issuers: Amounts::new(issuers_in, issuers_out),
        }
    }

    fn check_leg(offer: &Amounts, input: &Issue, output: &Issue) -> Result<(), CrossError> {
        if offer.input.issue() != input || offer.output.issue() != output {
            return Err(CrossError::BadCross(format!(
                "offer [{}] does not trade {} for {}",
                offer, input, output
            )));
        }
        offer.input.check_range()?;
        offer.output.check_range()?;
        Ok(())
    }

    /// Compute the flow of crossing a single offer, without changing the
    /// taker.
    pub fn cross_direct<F: FundsSource + ?Sized>(
        &self,
        funds: &F,
        offer: &Amounts,
        quality: Quality,
        owner: &AccountId,
    ) -> Result<Flow, CrossError> {
        Self::check_leg(offer, &self.issue_in, &self.issue_out)?;

        let rate_in = self.in_rate(&self.account, owner);
        let rate_out = self.out_rate(owner, &self.account);

        let owner_funds = funds.get_funds(owner, &rate_out.gross(&offer.output));
        if !owner_funds.is_positive() {
            return Err(CrossError::UnfundedOffer {
                owner: owner.clone(),
            });
        }
        let taker_funds = funds.get_funds(&self.account, &rate_in.gross(&offer.input));
        if !taker_funds.is_positive() {
            return Err(CrossError::TakerUnfunded {
                account: self.account.clone(),
            });
        }

        let flow = match self.cross_type {
            CrossType::NativeToIssued => {
                self.flow_native_to_issued(offer, quality, &owner_funds, &taker_funds, rate_out)
            }
            CrossType::IssuedToNative => {
                self.flow_issued_to_native(offer, quality, &owner_funds, &taker_funds, rate_in)
            }
            CrossType::IssuedToIssued => self.flow_issued_to_issued(
                offer,
                quality,
                &owner_funds,
                &taker_funds,
                rate_in,
                rate_out,
            ),
        };

        if !flow.sanity_check() {
            return Err(CrossError::Sanity(flow));
        }
        if !flow.moves_funds() {
            return Err(CrossError::NoFlow(flow));
        }
        Ok(flow)
    }

    /// Compute the flows of crossing two offers bridged through the native
    /// currency, without changing the taker.
    ///
    /// `offer1` turns the taker's input into native currency, `offer2` turns
    /// that into the taker's output. The native amount is equalised so that
    /// leg 1 delivers exactly what leg 2 consumes. Either both flows are
    /// returned or neither.
    #[allow(clippy::too_many_arguments)]
    pub fn cross_bridged<F: FundsSource + ?Sized>(
        &self,
        funds: &F,
        offer1: &Amounts,
        quality1: Quality,
        owner1: &AccountId,
        offer2: &Amounts,
        quality2: Quality,
        owner2: &AccountId,
    ) -> Result<(Flow, Flow), CrossError> {
        if self.cross_type != CrossType::IssuedToIssued {
            return Err(CrossError::BadCross(format!(
                "bridging needs an issued->issued taker, not {}",
                self.cross_type
            )));
        }
        let native = Issue::native();
        Self::check_leg(offer1, &self.issue_in, &native)?;
        Self::check_leg(offer2, &native, &self.issue_out)?;

        let leg1_rate = self.in_rate(owner1, &self.account);
        let leg2_rate = self.out_rate(owner2, &self.account);

        // If the taker owns the first leg, its input is bounded by the offer
        // rather than by its balance.
        let mut leg1_in_funds = funds.get_funds(&self.account, &leg1_rate.gross(&offer1.input));
        if self.account == *owner1 {
            trace!("the taker owns the first leg of a bridge");
            leg1_in_funds = leg1_in_funds.max(offer1.input.clone());
        }

        // Likewise for the output when the taker owns the second leg.
        let mut leg2_out_funds = funds.get_funds(owner2, &leg2_rate.gross(&offer2.output));
        if self.account == *owner2 {
            trace!("the taker owns the second leg of a bridge");
            leg2_out_funds = leg2_out_funds.max(offer2.output.clone());
        }

        // Native currency leg 1's owner can feed into leg 2. When one
        // account owns both legs it only moves between its own offers.
        let mut native_funds = funds.get_funds(owner1, &offer1.output);
        if owner1 == owner2 {
            trace!("the bridge endpoints are owned by the same account");
            native_funds = offer1.output.clone().max(offer2.input.clone());
        }

        if !native_funds.is_positive() {
            return Err(CrossError::UnfundedOffer {
                owner: owner1.clone(),
            });
        }
        if !leg2_out_funds.is_positive() {
            return Err(CrossError::UnfundedOffer {
                owner: owner2.clone(),
            });
        }
        if !leg1_in_funds.is_positive() {
            return Err(CrossError::TakerUnfunded {
                account: self.account.clone(),
            });
        }

        // Maximal flow across each leg on its own.
        let mut flow1 =
            self.flow_issued_to_native(offer1, quality1, &native_funds, &leg1_in_funds, leg1_rate);
        if !flow1.sanity_check() {
            return Err(CrossError::Sanity(flow1));
        }

        let mut flow2 =
            self.flow_native_to_issued(offer2, quality2, &leg2_out_funds, &native_funds, leg2_rate);
        if !flow2.sanity_check() {
            return Err(CrossError::Sanity(flow2));
        }

        // Equalise the native amount on the limiting side.
        if flow1.order.output < flow2.order.input {
            flow2.order.input = flow1.order.output.clone();
            flow2.order.output = quality2.output_for(&flow2.order.input, &flow2.order.output);
            flow2.issuers.input = flow2.order.input.clone();
            flow2.issuers.output = leg2_rate.gross(&flow2.order.output);
            log_flow("balancing: adjusted second leg down", &flow2);
        } else if flow1.order.output > flow2.order.input {
            flow1.order.output = flow2.order.input.clone();
            flow1.order.input = quality1.input_for(&flow1.order.output, &flow1.order.input);
            flow1.issuers.input = leg1_rate.gross(&flow1.order.input);
            flow1.issuers.output = flow1.order.output.clone();
            log_flow("balancing: adjusted first leg down", &flow1);
        }

        if flow1.order.output != flow2.order.input || flow1.issuers.output != flow2.issuers.input {
            return Err(CrossError::Discontinuous {
                leg1: flow1.issuers.output,
                leg2: flow2.issuers.input,
            });
        }
        if !flow1.sanity_check() {
            return Err(CrossError::Sanity(flow1));
        }
        if !flow2.sanity_check() {
            return Err(CrossError::Sanity(flow2));
        }
        if !flow1.moves_funds() {
            return Err(CrossError::NoFlow(flow1));
        }
        if !flow2.moves_funds() {
            return Err(CrossError::NoFlow(flow2));
        }
        Ok((flow1, flow2))
    }

    /// Subtract what a crossing consumed from the remaining request.
    ///
    /// Each leg stops at zero: a sell may receive more output than it
    /// asked for, which must not turn the remaining output negative.
    pub fn consume_remaining(&mut self, input: &Amount, output: &Amount) {
        let left_in = (self.remaining.input.clone() - input.clone()).value();
        let left_out = (self.remaining.output.clone() - output.clone()).value();
        debug_assert!(left_in >= Decimal::ZERO, "crossing consumed more than remaining input");
        self.remaining.input = self.remaining.input.with_value(left_in.max(Decimal::ZERO));
        self.remaining.output = self.remaining.output.with_value(left_out.max(Decimal::ZERO));
    }

    /// Cross a single offer and account for it in the remaining request.
    pub fn do_cross<F: FundsSource + ?Sized>(
        &mut self,
        funds: &F,
        offer: &Amounts,
        quality: Quality,
        owner: &AccountId,
    ) -> Result<Flow, CrossError> {
        let flow = self.cross_direct(funds, offer, quality, owner)?;
        self.consume_remaining(&flow.order.input, &flow.order.output);
        debug!("direct cross with {}: {}", owner, flow);
        Ok(flow)
    }

    /// Cross two bridged offers and account for them in the remaining
    /// request.
    #[allow(clippy::too_many_arguments)]
    pub fn do_cross_bridged<F: FundsSource + ?Sized>(
        &mut self,
        funds: &F,
        offer1: &Amounts,
        quality1: Quality,
        owner1: &AccountId,
        offer2: &Amounts,
        quality2: Quality,
        owner2: &AccountId,
    ) -> Result<(Flow, Flow), CrossError> {
        let (flow1, flow2) =
            self.cross_bridged(funds, offer1, quality1, owner1, offer2, quality2, owner2)?;
        self.consume_remaining(&flow1.order.input, &flow2.order.output);
        debug!(
            "bridged cross via {} and {}: {} / {}",
            owner1, owner2, flow1, flow2
        );
        Ok((flow1, flow2))
    }
}
