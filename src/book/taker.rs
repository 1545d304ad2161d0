//! The crossing engine bound to a ledger view.
//!
//! [`Taker`] wraps a [`BasicTaker`], reads balances and issuer fees from the
//! ledger, and turns each computed [`Flow`] into balance transfers. All the
//! transfers of one crossing step are staged in a [`Sandbox`] and committed
//! together, so a step either fully applies or leaves the ledger, the
//! offers and the taker exactly as they were.

use crate::book::basic_taker::{BasicTaker, FundsSource, TakerFlags};
use crate::book::flow::{CrossType, Flow};
use crate::book::offer::Offer;
use crate::book::result::{CrossError, TakerError};
use crate::core::account::AccountId;
use crate::core::amount::{Amount, Amounts};
use crate::core::currency::Issue;
use crate::core::ledger::{LedgerView, Sandbox};
use crate::core::quality::Quality;
use crate::core::rate::TransferRate;
use log::{debug, warn};
use rust_decimal::Decimal;

/// [`FundsSource`] reading spendable balances from a ledger view.
pub struct LedgerFunds<'a, V: LedgerView + ?Sized>(pub &'a V);

impl<V: LedgerView + ?Sized> FundsSource for LedgerFunds<'_, V> {
    fn get_funds(&self, account: &AccountId, ceiling: &Amount) -> Amount {
        self.0.account_funds(account, ceiling)
    }
}

/// Crosses one trade request against offers, moving funds on `view`.
pub struct Taker<'v, V: LedgerView> {
    basic: BasicTaker,
    view: &'v mut V,
    // Native currency that moved between bridge legs
    native_flow: Amount,
    direct_crossings: u32,
    bridge_crossings: u32,
}

impl<'v, V: LedgerView> Taker<'v, V> {
    /// Start crossing `amounts` for `account`. Transfer rates are read from
    /// the view once, here, and used for every offer this taker crosses.
    pub fn new(
        cross_type: CrossType,
        view: &'v mut V,
        account: AccountId,
        amounts: Amounts,
        flags: TakerFlags,
    ) -> Result<Self, TakerError> {
        let quality = Quality::from_amounts(&amounts)?;
        let rate_in = Self::calculate_rate(view, &amounts.input.issue().issuer, &account);
        let rate_out = Self::calculate_rate(view, &amounts.output.issue().issuer, &account);
        let basic =
            BasicTaker::new(cross_type, account, amounts, quality, flags, rate_in, rate_out)?;
        debug!(
            "taker {} crossing {} ({}), rates in {} out {}",
            basic.account(),
            basic.original_offer(),
            cross_type,
            rate_in,
            rate_out
        );

        Ok(Self {
            basic,
            view,
            native_flow: Amount::zero(Issue::native()),
            direct_crossings: 0,
            bridge_crossings: 0,
        })
    }

    /// The fee `issuer` charges, or parity for the native currency and for
    /// the issuer's own account.
    pub fn calculate_rate(view: &V, issuer: &AccountId, account: &AccountId) -> TransferRate {
        if issuer.is_native() || account == issuer {
            return TransferRate::PARITY;
        }
        view.transfer_rate(issuer)
    }

    pub fn basic(&self) -> &BasicTaker {
        &self.basic
    }

    pub fn account(&self) -> &AccountId {
        self.basic.account()
    }

    pub fn original_offer(&self) -> &Amounts {
        self.basic.original_offer()
    }

    pub fn remaining_offer(&self) -> Amounts {
        self.basic.remaining_offer()
    }

    pub fn reject(&self, quality: Quality) -> bool {
        self.basic.reject(quality)
    }

    pub fn done(&self) -> bool {
        self.basic.done()
    }

    /// The taker has nothing left to pay with.
    pub fn unfunded(&self) -> bool {
        match self.view.spendable(self.basic.account(), self.basic.issue_in()) {
            None => false,
            Some(available) => available <= Decimal::ZERO,
        }
    }

    pub fn get_funds(&self, account: &AccountId, ceiling: &Amount) -> Amount {
        LedgerFunds(&*self.view).get_funds(account, ceiling)
    }

    /// Native currency that flowed through bridges so far.
    pub fn native_flow(&self) -> &Amount {
        &self.native_flow
    }

    pub fn direct_crossings(&self) -> u32 {
        self.direct_crossings
    }

    pub fn bridge_crossings(&self) -> u32 {
        self.bridge_crossings
    }

    /// Shrink `offer` by what was taken from it.
    pub fn consume_offer(&self, offer: &mut Offer, order: &Amounts) -> Result<(), CrossError> {
        if order.input.is_negative() || order.output.is_negative() {
            return Err(CrossError::NegativeOrder(order.clone()));
        }
        offer.consume(order);
        Ok(())
    }

    fn transfer_native<L: LedgerView>(
        view: &mut L,
        from: &AccountId,
        to: &AccountId,
        amount: &Amount,
    ) -> Result<(), CrossError> {
        if !amount.is_native() {
            return Err(CrossError::BadCross(format!(
                "native transfer of issued amount {}",
                amount
            )));
        }
        view.transfer_native(from, to, amount)?;
        Ok(())
    }

    fn redeem_iou<L: LedgerView>(
        view: &mut L,
        account: &AccountId,
        amount: &Amount,
        issue: &Issue,
    ) -> Result<(), CrossError> {
        if amount.is_native() {
            return Err(CrossError::BadCross(format!(
                "redeeming native amount {}",
                amount
            )));
        }
        view.redeem_iou(account, amount, issue)?;
        Ok(())
    }

    fn issue_iou<L: LedgerView>(
        view: &mut L,
        account: &AccountId,
        amount: &Amount,
        issue: &Issue,
    ) -> Result<(), CrossError> {
        if amount.is_native() {
            return Err(CrossError::BadCross(format!(
                "issuing native amount {}",
                amount
            )));
        }
        view.issue_iou(account, amount, issue)?;
        Ok(())
    }

    /// Move the funds of a direct crossing with `owner`.
    fn fill(&mut self, flow: &Flow, owner: &AccountId) -> Result<(), CrossError> {
        let account = self.basic.account().clone();
        let cross_type = self.basic.cross_type();
        let mut sandbox = Sandbox::new(&mut *self.view);

        // Taker pays the owner
        if cross_type != CrossType::NativeToIssued {
            let issue = flow.order.input.issue();
            Self::redeem_iou(&mut sandbox, &account, &flow.issuers.input, issue)?;
            Self::issue_iou(&mut sandbox, owner, &flow.order.input, issue)?;
        } else {
            Self::transfer_native(&mut sandbox, &account, owner, &flow.order.input)?;
        }

        // Owner pays the taker
        if cross_type != CrossType::IssuedToNative {
            let issue = flow.order.output.issue();
            Self::redeem_iou(&mut sandbox, owner, &flow.issuers.output, issue)?;
            Self::issue_iou(&mut sandbox, &account, &flow.order.output, issue)?;
        } else {
            Self::transfer_native(&mut sandbox, owner, &account, &flow.order.output)?;
        }

        sandbox.commit();
        Ok(())
    }

    /// Move the funds of a bridged crossing through `owner1` and `owner2`.
    fn fill_bridged(
        &mut self,
        flow1: &Flow,
        owner1: &AccountId,
        flow2: &Flow,
        owner2: &AccountId,
    ) -> Result<(), CrossError> {
        let account = self.basic.account().clone();
        let mut sandbox = Sandbox::new(&mut *self.view);

        // Taker to leg 1: issued
        if *owner1 != account {
            let issue = flow1.order.input.issue();
            Self::redeem_iou(&mut sandbox, &account, &flow1.issuers.input, issue)?;
            Self::issue_iou(&mut sandbox, owner1, &flow1.order.input, issue)?;
        }

        // Leg 1 to leg 2: native
        Self::transfer_native(&mut sandbox, owner1, owner2, &flow1.order.output)?;

        // Leg 2 to taker: issued
        if *owner2 != account {
            let issue = flow2.order.output.issue();
            Self::redeem_iou(&mut sandbox, owner2, &flow2.issuers.output, issue)?;
            Self::issue_iou(&mut sandbox, &account, &flow2.order.output, issue)?;
        }

        sandbox.commit();
        Ok(())
    }

    fn try_cross(&mut self, offer: &mut Offer) -> Result<Flow, CrossError> {
        // In direct crossings, at least one leg must not be native.
        if offer.amounts().is_native_to_native() {
            return Err(CrossError::BadCross(format!(
                "offer {} trades native for native",
                offer
            )));
        }

        let flow = self.basic.cross_direct(
            &LedgerFunds(&*self.view),
            offer.amounts(),
            offer.quality(),
            offer.owner(),
        )?;
        if flow.order.input.is_negative() || flow.order.output.is_negative() {
            return Err(CrossError::NegativeOrder(flow.order));
        }

        self.fill(&flow, offer.owner())?;
        self.consume_offer(offer, &flow.order)?;
        self.basic
            .consume_remaining(&flow.order.input, &flow.order.output);
        Ok(flow)
    }

    fn try_cross_bridged(
        &mut self,
        leg1: &mut Offer,
        leg2: &mut Offer,
    ) -> Result<(Flow, Flow), CrossError> {
        // The bridge currency can be neither the taker's input nor its output.
        if leg1.amounts().input.is_native() || leg2.amounts().output.is_native() {
            return Err(CrossError::BadCross(format!(
                "legs {} and {} do not bridge through the native currency",
                leg1, leg2
            )));
        }

        let (flow1, flow2) = self.basic.cross_bridged(
            &LedgerFunds(&*self.view),
            leg1.amounts(),
            leg1.quality(),
            leg1.owner(),
            leg2.amounts(),
            leg2.quality(),
            leg2.owner(),
        )?;
        for order in [&flow1.order, &flow2.order] {
            if order.input.is_negative() || order.output.is_negative() {
                return Err(CrossError::NegativeOrder(order.clone()));
            }
        }

        self.fill_bridged(&flow1, leg1.owner(), &flow2, leg2.owner())?;
        self.consume_offer(leg1, &flow1.order)?;
        self.consume_offer(leg2, &flow2.order)?;
        self.basic
            .consume_remaining(&flow1.order.input, &flow2.order.output);
        Ok((flow1, flow2))
    }

    /// Cross `offer` directly, transferring funds and shrinking the offer.
    ///
    /// On error nothing changed: not the ledger, not the offer, not the
    /// taker. [`CrossError::code`] gives the result code to record.
    pub fn cross(&mut self, offer: &mut Offer) -> Result<Flow, CrossError> {
        match self.try_cross(offer) {
            Ok(flow) => {
                self.direct_crossings += 1;
                debug!("crossed {}: {}", offer, flow);
                Ok(flow)
            }
            Err(e) => {
                warn!("direct crossing with {} aborted: {} ({})", offer, e, e.code());
                Err(e)
            }
        }
    }

    /// Cross `leg1` (taker's input to native) and `leg2` (native to the
    /// taker's output) as one atomic step.
    pub fn cross_bridged(
        &mut self,
        leg1: &mut Offer,
        leg2: &mut Offer,
    ) -> Result<(Flow, Flow), CrossError> {
        match self.try_cross_bridged(leg1, leg2) {
            Ok((flow1, flow2)) => {
                self.bridge_crossings += 1;
                self.native_flow = self.native_flow.clone() + flow1.order.output.clone();
                debug!("bridged {} and {}: {} / {}", leg1, leg2, flow1, flow2);
                Ok((flow1, flow2))
            }
            Err(e) => {
                warn!(
                    "bridged crossing via {} and {} aborted: {} ({})",
                    leg1,
                    leg2,
                    e,
                    e.code()
                );
                Err(e)
            }
        }
    }
}
