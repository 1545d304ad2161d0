use crate::core::account::AccountId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Code of the ledger's native currency.
pub const NATIVE_CODE: &str = "SWT";

/// Decimal places kept for native amounts.
pub const NATIVE_SCALE: u32 = 6;

/// Decimal places kept for issued amounts.
pub const ISSUED_SCALE: u32 = 10;

/// Three-letter style currency code.
///
/// # Examples
///
/// ```
/// use offer_crossing::core::currency::CurrencyCode;
///
/// let usd = CurrencyCode::new("USD");
/// let eur = CurrencyCode::new("EUR");
/// assert_ne!(usd, eur);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn native() -> Self {
        Self(NATIVE_CODE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CurrencyCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A currency together with the account that issues it.
///
/// Two issues with the same currency code but different issuers are
/// different assets: `USD/gateway-a` and `USD/gateway-b` never mix.
/// The native currency has no issuer and is represented with the
/// [`AccountId::native`] sentinel.
///
/// # Examples
///
/// ```
/// use offer_crossing::core::account::AccountId;
/// use offer_crossing::core::currency::Issue;
///
/// let usd = Issue::new("USD", AccountId::new("gateway"));
/// assert!(!usd.is_native());
/// assert!(Issue::native().is_native());
/// assert_eq!(usd.to_string(), "USD/gateway");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Issue {
    pub currency: CurrencyCode,
    pub issuer: AccountId,
}

impl Issue {
    pub fn new(currency: impl Into<CurrencyCode>, issuer: AccountId) -> Self {
        Self {
            currency: currency.into(),
            issuer,
        }
    }

    pub fn native() -> Self {
        Self {
            currency: CurrencyCode::native(),
            issuer: AccountId::native(),
        }
    }

    pub fn is_native(&self) -> bool {
        self.issuer.is_native()
    }

    /// Number of decimal places amounts of this issue are rounded to.
    pub fn scale(&self) -> u32 {
        if self.is_native() {
            NATIVE_SCALE
        } else {
            ISSUED_SCALE
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native() {
            write!(f, "{}", self.currency)
        } else {
            write!(f, "{}/{}", self.currency, self.issuer)
        }
    }
}

impl From<String> for CurrencyCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}
