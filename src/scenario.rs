//! Crossing scenarios described in JSON.
//!
//! A [`Scenario`] sets up a ledger, one trade request and a sequence of
//! offers to cross it against, in the order an order book would present
//! them. [`Scenario::run`] plays the crossing and returns a
//! [`CrossingReport`].
//!
//! ```json
//! {
//!   "ledger": {
//!     "balances": [
//!       { "account": "alice", "currency": "SWT", "value": "500" },
//!       { "account": "bob", "currency": "USD", "issuer": "gateway", "value": "300" }
//!     ],
//!     "transfer_rates": [{ "issuer": "gateway", "rate": 1020000000 }]
//!   },
//!   "taker": {
//!     "account": "alice",
//!     "input": { "currency": "SWT", "value": "100" },
//!     "output": { "currency": "USD", "issuer": "gateway", "value": "200" },
//!     "flags": { "sell": true }
//!   },
//!   "steps": [
//!     { "direct": { "owner": "bob", "sequence": 1,
//!                   "input": { "currency": "SWT", "value": "50" },
//!                   "output": { "currency": "USD", "issuer": "gateway", "value": "100" } } }
//!   ]
//! }
//! ```

use crate::book::basic_taker::TakerFlags;
use crate::book::flow::{CrossType, Flow};
use crate::book::offer::Offer;
use crate::book::result::{ResultCode, TakerError};
use crate::book::taker::Taker;
use crate::core::account::AccountId;
use crate::core::amount::{Amount, AmountError, Amounts};
use crate::core::currency::{Issue, NATIVE_CODE};
use crate::core::ledger::InMemoryLedger;
use crate::core::quality::Quality;
use crate::core::rate::{RateError, TransferRate};
use log::{debug, info};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while loading or setting up a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid amount '{value}': {source}")]
    InvalidAmount {
        value: String,
        #[source]
        source: rust_decimal::Error,
    },

    #[error("currency {0} needs an issuer")]
    MissingIssuer(String),

    #[error("native currency {0} cannot have an issuer")]
    NativeWithIssuer(String),

    #[error(transparent)]
    OutOfRange(AmountError),

    #[error(transparent)]
    Rate(#[from] RateError),

    #[error("offer {sequence} is malformed: {source}")]
    Offer {
        sequence: u32,
        #[source]
        source: AmountError,
    },

    #[error(transparent)]
    Taker(#[from] TakerError),
}

/// JSON form of an amount. Values are strings so they stay exact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmountInput {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    pub value: String,
}

fn default_currency() -> String {
    NATIVE_CODE.to_string()
}

impl AmountInput {
    pub fn to_amount(&self) -> Result<Amount, ScenarioError> {
        let value: Decimal = self
            .value
            .parse()
            .map_err(|source| ScenarioError::InvalidAmount {
                value: self.value.clone(),
                source,
            })?;
        let amount = Amount::new(value, self.issue()?);
        amount.check_range().map_err(ScenarioError::OutOfRange)?;
        Ok(amount)
    }

    fn issue(&self) -> Result<Issue, ScenarioError> {
        match (self.currency.as_str(), &self.issuer) {
            (NATIVE_CODE, None) => Ok(Issue::native()),
            (NATIVE_CODE, Some(_)) => {
                Err(ScenarioError::NativeWithIssuer(self.currency.clone()))
            }
            (_, None) => Err(ScenarioError::MissingIssuer(self.currency.clone())),
            (currency, Some(issuer)) => Ok(Issue::new(currency, AccountId::new(issuer))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceInput {
    pub account: String,
    #[serde(flatten)]
    pub amount: AmountInput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReserveInput {
    pub account: String,
    pub value: String,
}

/// Transfer rate of an issuer, in billionths as the ledger stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateInput {
    pub issuer: String,
    pub rate: u32,
}

/// Initial ledger state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerInput {
    #[serde(default)]
    pub base_reserve: Option<String>,
    #[serde(default)]
    pub balances: Vec<BalanceInput>,
    #[serde(default)]
    pub reserves: Vec<ReserveInput>,
    #[serde(default)]
    pub transfer_rates: Vec<RateInput>,
}

fn parse_decimal(value: &str) -> Result<Decimal, ScenarioError> {
    value
        .parse()
        .map_err(|source| ScenarioError::InvalidAmount {
            value: value.to_string(),
            source,
        })
}

impl LedgerInput {
    pub fn build(&self) -> Result<InMemoryLedger, ScenarioError> {
        let mut ledger = match &self.base_reserve {
            Some(reserve) => InMemoryLedger::with_base_reserve(parse_decimal(reserve)?),
            None => InMemoryLedger::new(),
        };
        for balance in &self.balances {
            ledger.credit(&AccountId::new(&balance.account), &balance.amount.to_amount()?);
        }
        for reserve in &self.reserves {
            ledger.set_reserve(&AccountId::new(&reserve.account), parse_decimal(&reserve.value)?);
        }
        for rate in &self.transfer_rates {
            ledger.set_transfer_rate(
                &AccountId::new(&rate.issuer),
                TransferRate::from_billionths(rate.rate)?,
            );
        }
        Ok(ledger)
    }
}

/// The trade request being crossed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TakerInput {
    pub account: String,
    pub input: AmountInput,
    pub output: AmountInput,
    #[serde(default)]
    pub flags: TakerFlags,
}

/// A resting offer. `input` is what the offer takes in, which is what the
/// taker pays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferInput {
    pub owner: String,
    #[serde(default)]
    pub sequence: u32,
    pub input: AmountInput,
    pub output: AmountInput,
}

impl OfferInput {
    pub fn to_offer(&self) -> Result<Offer, ScenarioError> {
        let amounts = Amounts::new(self.input.to_amount()?, self.output.to_amount()?);
        Offer::new(AccountId::new(&self.owner), self.sequence, amounts).map_err(|source| {
            ScenarioError::Offer {
                sequence: self.sequence,
                source,
            }
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepInput {
    Direct(OfferInput),
    Bridged { leg1: OfferInput, leg2: OfferInput },
}

/// One book position, ready to cross.
#[derive(Debug, Clone)]
enum Step {
    Direct(Offer),
    Bridged(Offer, Offer),
}

impl Step {
    fn quality(&self) -> Quality {
        match self {
            Step::Direct(offer) => offer.quality(),
            Step::Bridged(leg1, leg2) => leg1.quality().compose(&leg2.quality()),
        }
    }

    fn kind(&self) -> StepKind {
        match self {
            Step::Direct(_) => StepKind::Direct,
            Step::Bridged(..) => StepKind::Bridged,
        }
    }
}

/// A complete crossing scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub ledger: LedgerInput,
    pub taker: TakerInput,
    #[serde(default)]
    pub steps: Vec<StepInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Direct,
    Bridged,
}

/// What happened at one book position.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub kind: StepKind,
    pub code: ResultCode,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub flows: Vec<Flow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Why the crossing loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The request was fully satisfied.
    Filled,
    /// The next offer was worse than the taker accepts.
    QualityRejected,
    /// The taker ran out of funds.
    TakerUnfunded,
    /// A step failed in a way that aborts the transaction.
    Fatal,
    /// Every step was tried.
    BookExhausted,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceReport {
    pub account: AccountId,
    pub issue: Issue,
    pub value: Decimal,
}

/// Outcome of [`Scenario::run`].
#[derive(Debug, Clone, Serialize)]
pub struct CrossingReport {
    pub account: AccountId,
    pub cross_type: CrossType,
    pub original: Amounts,
    pub remaining: Amounts,
    pub stop: StopReason,
    pub steps: Vec<StepReport>,
    pub direct_crossings: u32,
    pub bridge_crossings: u32,
    pub native_flow: Amount,
    pub balances: Vec<BalanceReport>,
}

impl CrossingReport {
    /// Result code of the transaction: the fatal code if a step aborted,
    /// success otherwise.
    pub fn code(&self) -> ResultCode {
        self.steps
            .iter()
            .map(|s| s.code)
            .find(ResultCode::is_fatal)
            .unwrap_or(ResultCode::TesSuccess)
    }

    pub fn balance(&self, account: &AccountId, issue: &Issue) -> Decimal {
        self.balances
            .iter()
            .find(|b| &b.account == account && &b.issue == issue)
            .map(|b| b.value)
            .unwrap_or(Decimal::ZERO)
    }
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    fn steps(&self) -> Result<Vec<Step>, ScenarioError> {
        self.steps
            .iter()
            .map(|step| match step {
                StepInput::Direct(offer) => Ok(Step::Direct(offer.to_offer()?)),
                StepInput::Bridged { leg1, leg2 } => {
                    Ok(Step::Bridged(leg1.to_offer()?, leg2.to_offer()?))
                }
            })
            .collect()
    }

    /// Cross the taker against each step in order until it is filled,
    /// rejects the next quality, runs out of funds, or hits a fatal error.
    ///
    /// Failed steps with a `tec` code leave everything untouched and the
    /// loop moves on to the next offer.
    pub fn run(&self) -> Result<CrossingReport, ScenarioError> {
        let mut ledger = self.ledger.build()?;
        let mut steps = self.steps()?;
        let account = AccountId::new(&self.taker.account);
        let request = Amounts::new(self.taker.input.to_amount()?, self.taker.output.to_amount()?);
        let cross_type = CrossType::for_issues(request.input.issue(), request.output.issue())?;

        let mut taker = Taker::new(
            cross_type,
            &mut ledger,
            account.clone(),
            request.clone(),
            self.taker.flags,
        )?;

        let mut reports = Vec::with_capacity(steps.len());
        let mut stop = StopReason::BookExhausted;
        for (index, step) in steps.iter_mut().enumerate() {
            if taker.done() {
                stop = StopReason::Filled;
                break;
            }
            if taker.unfunded() {
                stop = StopReason::TakerUnfunded;
                break;
            }
            if taker.reject(step.quality()) {
                debug!("step {} at {} rejected", index, step.quality());
                stop = StopReason::QualityRejected;
                break;
            }

            let kind = step.kind();
            let outcome = match step {
                Step::Direct(offer) => taker.cross(offer).map(|flow| vec![flow]),
                Step::Bridged(leg1, leg2) => taker
                    .cross_bridged(leg1, leg2)
                    .map(|(flow1, flow2)| vec![flow1, flow2]),
            };
            let code = ResultCode::of(&outcome);
            let (flows, error) = match outcome {
                Ok(flows) => (flows, None),
                Err(e) => (Vec::new(), Some(e.to_string())),
            };
            reports.push(StepReport {
                index,
                kind,
                code,
                flows,
                error,
            });
            if code.is_fatal() {
                stop = StopReason::Fatal;
                break;
            }
            if code == ResultCode::TecUnfunded {
                stop = StopReason::TakerUnfunded;
                break;
            }
        }
        if stop == StopReason::BookExhausted && taker.done() {
            stop = StopReason::Filled;
        }

        let remaining = taker.basic().remaining().clone();
        let direct_crossings = taker.direct_crossings();
        let bridge_crossings = taker.bridge_crossings();
        let native_flow = taker.native_flow().clone();
        drop(taker);

        info!(
            "{} crossed {} of {} steps, stopped: {:?}",
            account,
            direct_crossings + bridge_crossings,
            reports.len(),
            stop
        );

        let mut balances: Vec<BalanceReport> = ledger
            .all_balances()
            .iter()
            .map(|((account, issue), &value)| BalanceReport {
                account: account.clone(),
                issue: issue.clone(),
                value,
            })
            .collect();
        balances.sort_by_key(|b| (b.account.to_string(), b.issue.to_string()));

        Ok(CrossingReport {
            account,
            cross_type,
            original: request,
            remaining,
            stop,
            steps: reports,
            direct_crossings,
            bridge_crossings,
            native_flow,
            balances,
        })
    }
}

impl fmt::Display for CrossingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Crossing Report ===")?;
        writeln!(f, "Taker:            {}", self.account)?;
        writeln!(f, "Cross type:       {}", self.cross_type)?;
        writeln!(f, "Requested:        {}", self.original)?;
        writeln!(f, "Remaining:        {}", self.remaining)?;
        writeln!(f, "Stopped:          {:?}", self.stop)?;
        writeln!(f, "Result:           {}", self.code())?;
        writeln!(
            f,
            "Crossings:        {} direct, {} bridged",
            self.direct_crossings, self.bridge_crossings
        )?;
        writeln!(f, "Native bridged:   {}", self.native_flow)?;
        writeln!(f, "\nSteps:")?;
        for step in &self.steps {
            write!(f, "  [{}] {:?} {}", step.index, step.kind, step.code)?;
            for flow in &step.flows {
                write!(f, "  {}", flow)?;
            }
            if let Some(error) = &step.error {
                write!(f, "  ({})", error)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "\nBalances:")?;
        for balance in &self.balances {
            if !balance.value.is_zero() {
                writeln!(
                    f,
                    "  {:<12} {:>20} {}",
                    balance.account, balance.value, balance.issue
                )?;
            }
        }
        Ok(())
    }
}
