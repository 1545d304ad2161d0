use crate::core::currency::Issue;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Neg, Sub};
use thiserror::Error;

/// Errors arising from amount arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("cannot combine amounts of different issues: {left} and {right}")]
    IssueMismatch { left: Issue, right: Issue },
    #[error("quality is undefined for {input} -> {output}: both legs must be positive")]
    UndefinedQuality { input: Decimal, output: Decimal },
    #[error("quality {input} -> {output} is outside the range amounts may take")]
    QualityOutOfRange { input: Decimal, output: Decimal },
    #[error("{value} {issue} is outside the range an amount may take")]
    OutOfRange { value: Decimal, issue: Issue },
}

/// Largest magnitude an amount may have. Up to this value an issued amount
/// still carries all of its decimal places exactly.
pub const MAX_VALUE: Decimal = dec!(1_000_000_000_000_000_000);

/// Round `value` to `scale` decimal places, away from zero when `round_up`.
pub(crate) fn round_to(value: Decimal, scale: u32, round_up: bool) -> Decimal {
    let strategy = if round_up {
        RoundingStrategy::AwayFromZero
    } else {
        RoundingStrategy::ToZero
    };
    value.round_dp_with_strategy(scale, strategy)
}

/// Computes `value * num / den`, multiplying first when it fits. `None` if
/// the result itself does not fit in a `Decimal`.
pub(crate) fn mul_div(value: Decimal, num: Decimal, den: Decimal) -> Option<Decimal> {
    match value.checked_mul(num) {
        Some(product) => product.checked_div(den),
        None => num.checked_div(den)?.checked_mul(value),
    }
}

/// A signed quantity of one issue.
///
/// Amounts are immutable values. Arithmetic between amounts of different
/// issues is a programming error: the operators panic and
/// [`Amount::checked_sub`] reports [`AmountError::IssueMismatch`].
///
/// # Examples
///
/// ```
/// use offer_crossing::core::account::AccountId;
/// use offer_crossing::core::amount::Amount;
/// use offer_crossing::core::currency::Issue;
/// use rust_decimal_macros::dec;
///
/// let usd = Issue::new("USD", AccountId::new("gateway"));
/// let a = Amount::new(dec!(100), usd.clone());
/// let b = Amount::new(dec!(40), usd);
/// assert_eq!((a - b).value(), dec!(60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    value: Decimal,
    issue: Issue,
}

impl Amount {
    pub fn new(value: Decimal, issue: Issue) -> Self {
        Self { value, issue }
    }

    /// A quantity of the native currency.
    pub fn native(value: Decimal) -> Self {
        Self::new(value, Issue::native())
    }

    pub fn zero(issue: Issue) -> Self {
        Self::new(Decimal::ZERO, issue)
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn issue(&self) -> &Issue {
        &self.issue
    }

    pub fn is_native(&self) -> bool {
        self.issue.is_native()
    }

    /// Same issue, zero value.
    pub fn zeroed(&self) -> Self {
        Self::zero(self.issue.clone())
    }

    /// Same issue, different value.
    pub fn with_value(&self, value: Decimal) -> Self {
        Self::new(value, self.issue.clone())
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.value > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.value < Decimal::ZERO
    }

    pub fn checked_sub(&self, other: &Amount) -> Result<Amount, AmountError> {
        self.ensure_same_issue(other)?;
        Ok(self.with_value(self.value - other.value))
    }

    /// Zero, or between one unit of the issue's smallest denomination and
    /// [`MAX_VALUE`] in magnitude.
    ///
    /// Crossing only multiplies in-range amounts by transfer rates and
    /// qualities built from in-range amounts, which cannot overflow.
    pub fn check_range(&self) -> Result<(), AmountError> {
        let magnitude = self.value.abs();
        let unit = Decimal::new(1, self.issue.scale());
        if magnitude.is_zero() || (magnitude >= unit && magnitude <= MAX_VALUE) {
            return Ok(());
        }
        Err(AmountError::OutOfRange {
            value: self.value,
            issue: self.issue.clone(),
        })
    }

    /// Multiply by a plain factor, rounding to the issue's scale.
    pub fn mul_round(&self, factor: Decimal, round_up: bool) -> Amount {
        self.with_value(round_to(self.value * factor, self.issue.scale(), round_up))
    }

    /// Divide by a plain divisor, rounding to the issue's scale.
    pub fn div_round(&self, divisor: Decimal, round_up: bool) -> Amount {
        self.with_value(round_to(self.value / divisor, self.issue.scale(), round_up))
    }

    /// The smaller of two amounts of the same issue.
    pub fn min(self, other: Amount) -> Amount {
        self.assert_same_issue(&other);
        if other.value < self.value {
            other
        } else {
            self
        }
    }

    /// The larger of two amounts of the same issue.
    pub fn max(self, other: Amount) -> Amount {
        self.assert_same_issue(&other);
        if other.value > self.value {
            other
        } else {
            self
        }
    }

    fn ensure_same_issue(&self, other: &Amount) -> Result<(), AmountError> {
        if self.issue != other.issue {
            return Err(AmountError::IssueMismatch {
                left: self.issue.clone(),
                right: other.issue.clone(),
            });
        }
        Ok(())
    }

    fn assert_same_issue(&self, other: &Amount) {
        assert!(
            self.issue == other.issue,
            "amount issue mismatch: {} vs {}",
            self.issue,
            other.issue
        );
    }
}

impl PartialOrd for Amount {
    /// Amounts of different issues are unordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.issue != other.issue {
            return None;
        }
        Some(self.value.cmp(&other.value))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        self.assert_same_issue(&rhs);
        Amount::new(self.value + rhs.value, self.issue)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        self.assert_same_issue(&rhs);
        Amount::new(self.value - rhs.value, self.issue)
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount::new(-self.value, self.issue)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value.normalize(), self.issue)
    }
}

/// The two legs of an order: what is paid in and what is taken out.
///
/// Used for a taker's original and remaining request, for resting offers,
/// and for the movements inside a [`Flow`](crate::book::flow::Flow).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amounts {
    pub input: Amount,
    pub output: Amount,
}

impl Amounts {
    pub fn new(input: Amount, output: Amount) -> Self {
        Self { input, output }
    }

    /// Both legs zero, issues preserved.
    pub fn zeroed(&self) -> Self {
        Self::new(self.input.zeroed(), self.output.zeroed())
    }

    /// True when either leg has nothing left.
    pub fn is_empty(&self) -> bool {
        self.input.value() <= Decimal::ZERO || self.output.value() <= Decimal::ZERO
    }

    pub fn is_native_to_native(&self) -> bool {
        self.input.is_native() && self.output.is_native()
    }
}

impl fmt::Display for Amounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.input, self.output)
    }
}
