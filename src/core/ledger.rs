use crate::core::account::AccountId;
use crate::core::amount::Amount;
use crate::core::currency::Issue;
use crate::core::rate::TransferRate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// No account may hold more than this much of the native currency.
pub const NATIVE_SUPPLY_CAP: Decimal = dec!(100_000_000_000);

/// Errors raised by the ledger's mutation primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("{account} has {available} {issue} available but {required} is required")]
    InsufficientFunds {
        account: AccountId,
        issue: Issue,
        available: Decimal,
        required: Decimal,
    },
    #[error("crediting {amount} to {account} would exceed the native supply cap")]
    ExceedsCap { account: AccountId, amount: Decimal },
    #[error("expected the native currency, got {0}")]
    NotNative(Issue),
    #[error("expected an issued currency, got {0}")]
    NotIssued(Issue),
    #[error("cannot move a negative amount {0}")]
    NegativeAmount(Decimal),
    #[error("{account}'s {issue} balance would overflow")]
    Overflow { account: AccountId, issue: Issue },
}

/// The slice of ledger state the crossing engine reads and mutates.
///
/// Implementors supply raw balance storage, reserves and issuer settings;
/// the solvency-checked mutation primitives are provided on top of them so
/// every view (the live ledger, a staging [`Sandbox`]) enforces the same
/// rules.
///
/// Issued balances are tracked for holders only. An issuer can always
/// create more of its own currency, so it has no balance in it.
pub trait LedgerView {
    /// Raw balance `account` holds of `issue`.
    fn balance(&self, account: &AccountId, issue: &Issue) -> Decimal;

    fn set_balance(&mut self, account: &AccountId, issue: &Issue, value: Decimal);

    /// Native currency `account` must keep and cannot spend.
    fn reserve(&self, account: &AccountId) -> Decimal;

    /// Transfer fee configured by `issuer`.
    fn transfer_rate(&self, issuer: &AccountId) -> TransferRate;

    /// What `account` can spend of `issue`; `None` when unlimited because
    /// the account issues it.
    fn spendable(&self, account: &AccountId, issue: &Issue) -> Option<Decimal> {
        if !issue.is_native() && *account == issue.issuer {
            return None;
        }
        let mut available = self.balance(account, issue);
        if issue.is_native() {
            available -= self.reserve(account);
        }
        Some(available.max(Decimal::ZERO))
    }

    /// The lesser of what `account` can spend in `ceiling`'s issue and
    /// `ceiling` itself.
    fn account_funds(&self, account: &AccountId, ceiling: &Amount) -> Amount {
        match self.spendable(account, ceiling.issue()) {
            None => ceiling.clone(),
            Some(available) => ceiling.with_value(available.min(ceiling.value())),
        }
    }

    /// Move native currency between two accounts.
    fn transfer_native(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: &Amount,
    ) -> Result<(), LedgerError> {
        if !amount.is_native() {
            return Err(LedgerError::NotNative(amount.issue().clone()));
        }
        if amount.is_negative() {
            return Err(LedgerError::NegativeAmount(amount.value()));
        }
        if from == to || amount.is_zero() {
            return Ok(());
        }

        let issue = amount.issue();
        let available = self.spendable(from, issue).unwrap_or(Decimal::ZERO);
        if available < amount.value() {
            return Err(LedgerError::InsufficientFunds {
                account: from.clone(),
                issue: issue.clone(),
                available,
                required: amount.value(),
            });
        }

        let credited = self
            .balance(to, issue)
            .checked_add(amount.value())
            .ok_or_else(|| LedgerError::Overflow {
                account: to.clone(),
                issue: issue.clone(),
            })?;
        if credited > NATIVE_SUPPLY_CAP {
            return Err(LedgerError::ExceedsCap {
                account: to.clone(),
                amount: amount.value(),
            });
        }

        let debited = self.balance(from, issue) - amount.value();
        self.set_balance(from, issue, debited);
        self.set_balance(to, issue, credited);
        Ok(())
    }

    /// `account` hands `amount` of an issued currency back to its issuer.
    fn redeem_iou(
        &mut self,
        account: &AccountId,
        amount: &Amount,
        issue: &Issue,
    ) -> Result<(), LedgerError> {
        if issue.is_native() {
            return Err(LedgerError::NotIssued(issue.clone()));
        }
        if amount.is_negative() {
            return Err(LedgerError::NegativeAmount(amount.value()));
        }
        if *account == issue.issuer || amount.is_zero() {
            return Ok(());
        }

        let held = self.balance(account, issue);
        if held < amount.value() {
            return Err(LedgerError::InsufficientFunds {
                account: account.clone(),
                issue: issue.clone(),
                available: held.max(Decimal::ZERO),
                required: amount.value(),
            });
        }
        self.set_balance(account, issue, held - amount.value());
        Ok(())
    }

    /// The issuer of `issue` hands `amount` to `account`.
    fn issue_iou(
        &mut self,
        account: &AccountId,
        amount: &Amount,
        issue: &Issue,
    ) -> Result<(), LedgerError> {
        if issue.is_native() {
            return Err(LedgerError::NotIssued(issue.clone()));
        }
        if amount.is_negative() {
            return Err(LedgerError::NegativeAmount(amount.value()));
        }
        if *account == issue.issuer || amount.is_zero() {
            return Ok(());
        }

        let held = self
            .balance(account, issue)
            .checked_add(amount.value())
            .ok_or_else(|| LedgerError::Overflow {
                account: account.clone(),
                issue: issue.clone(),
            })?;
        self.set_balance(account, issue, held);
        Ok(())
    }
}

/// A ledger held entirely in memory.
///
/// Balances are keyed by `(account, issue)`. Every account's native reserve
/// defaults to `base_reserve` unless overridden, and issuers without a
/// configured transfer rate charge nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryLedger {
    #[serde(with = "balances_serde")]
    balances: HashMap<(AccountId, Issue), Decimal>,
    #[serde(default)]
    base_reserve: Decimal,
    #[serde(default)]
    reserves: HashMap<AccountId, Decimal>,
    #[serde(default)]
    transfer_rates: HashMap<AccountId, TransferRate>,
}

mod balances_serde {
    use super::*;
    use serde::{Deserializer, Serializer};

    // One entry per balance, so account and currency names are stored as is.
    #[derive(Serialize, Deserialize)]
    struct Entry {
        account: AccountId,
        issue: Issue,
        value: Decimal,
    }

    pub fn serialize<S: Serializer>(
        balances: &HashMap<(AccountId, Issue), Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut entries: Vec<Entry> = balances
            .iter()
            .map(|((account, issue), value)| Entry {
                account: account.clone(),
                issue: issue.clone(),
                value: *value,
            })
            .collect();
        entries.sort_by(|a, b| (&a.account, &a.issue).cmp(&(&b.account, &b.issue)));
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<HashMap<(AccountId, Issue), Decimal>, D::Error> {
        let entries = Vec::<Entry>::deserialize(deserializer)?;
        Ok(entries
            .into_iter()
            .map(|e| ((e.account, e.issue), e.value))
            .collect())
    }
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger where every account keeps `reserve` native currency back.
    pub fn with_base_reserve(reserve: Decimal) -> Self {
        Self {
            base_reserve: reserve,
            ..Self::default()
        }
    }

    /// Add `amount` to `account`'s balance (genesis / test setup).
    pub fn credit(&mut self, account: &AccountId, amount: &Amount) {
        *self
            .balances
            .entry((account.clone(), amount.issue().clone()))
            .or_insert(Decimal::ZERO) += amount.value();
    }

    pub fn set_reserve(&mut self, account: &AccountId, reserve: Decimal) {
        self.reserves.insert(account.clone(), reserve);
    }

    pub fn set_transfer_rate(&mut self, issuer: &AccountId, rate: TransferRate) {
        self.transfer_rates.insert(issuer.clone(), rate);
    }

    pub fn all_balances(&self) -> &HashMap<(AccountId, Issue), Decimal> {
        &self.balances
    }

    /// Sum of every holder's balance of `issue`.
    pub fn total_supply(&self, issue: &Issue) -> Decimal {
        self.balances
            .iter()
            .filter(|((_, i), _)| i == issue)
            .map(|(_, v)| *v)
            .sum()
    }
}

impl LedgerView for InMemoryLedger {
    fn balance(&self, account: &AccountId, issue: &Issue) -> Decimal {
        self.balances
            .get(&(account.clone(), issue.clone()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn set_balance(&mut self, account: &AccountId, issue: &Issue, value: Decimal) {
        self.balances.insert((account.clone(), issue.clone()), value);
    }

    fn reserve(&self, account: &AccountId) -> Decimal {
        self.reserves
            .get(account)
            .copied()
            .unwrap_or(self.base_reserve)
    }

    fn transfer_rate(&self, issuer: &AccountId) -> TransferRate {
        self.transfer_rates
            .get(issuer)
            .copied()
            .unwrap_or(TransferRate::PARITY)
    }
}

/// Staging overlay over another view.
///
/// Reads fall through to the parent until a balance is written; writes land
/// in the overlay only. [`Sandbox::commit`] writes the overlay through to
/// the parent, dropping the sandbox discards it.
pub struct Sandbox<'v, V: LedgerView + ?Sized> {
    parent: &'v mut V,
    staged: BTreeMap<(AccountId, Issue), Decimal>,
}

impl<'v, V: LedgerView + ?Sized> Sandbox<'v, V> {
    pub fn new(parent: &'v mut V) -> Self {
        Self {
            parent,
            staged: BTreeMap::new(),
        }
    }

    pub fn commit(self) {
        for ((account, issue), value) in self.staged {
            self.parent.set_balance(&account, &issue, value);
        }
    }
}

impl<V: LedgerView + ?Sized> LedgerView for Sandbox<'_, V> {
    fn balance(&self, account: &AccountId, issue: &Issue) -> Decimal {
        match self.staged.get(&(account.clone(), issue.clone())) {
            Some(value) => *value,
            None => self.parent.balance(account, issue),
        }
    }

    fn set_balance(&mut self, account: &AccountId, issue: &Issue, value: Decimal) {
        self.staged.insert((account.clone(), issue.clone()), value);
    }

    fn reserve(&self, account: &AccountId) -> Decimal {
        self.parent.reserve(account)
    }

    fn transfer_rate(&self, issuer: &AccountId) -> TransferRate {
        self.parent.transfer_rate(issuer)
    }
}
