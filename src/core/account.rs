use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an account on the ledger.
///
/// Accounts own balances, place offers and issue currencies. The empty
/// identifier is reserved as the issuer of the native currency and never
/// belongs to a real account.
///
/// # Examples
///
/// ```
/// use offer_crossing::core::account::AccountId;
///
/// let alice = AccountId::new("alice");
/// let bob = AccountId::new("bob");
/// assert_ne!(alice, bob);
/// assert!(AccountId::native().is_native());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create a new account identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The sentinel issuer of the native currency.
    pub fn native() -> Self {
        Self(String::new())
    }

    pub fn is_native(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the string representation of this account ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native() {
            write!(f, "<native>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
