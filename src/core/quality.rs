use crate::core::amount::{mul_div, round_to, Amount, AmountError, Amounts, MAX_VALUE};
use crate::core::currency::ISSUED_SCALE;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Exchange ratio of an order: output received per unit of input paid.
///
/// Stored as the exact `(output, input)` pair rather than a divided rate,
/// so conversions at a quality multiply before they divide. Two qualities
/// compare by cross-multiplication, which makes `50 -> 100` and
/// `1 -> 2` equal. Higher quality is better for the taker.
///
/// # Examples
///
/// ```
/// use offer_crossing::core::quality::Quality;
/// use rust_decimal_macros::dec;
///
/// let a = Quality::new(dec!(50), dec!(100)).unwrap();
/// let b = Quality::new(dec!(1), dec!(2)).unwrap();
/// let worse = Quality::new(dec!(1), dec!(1.5)).unwrap();
/// assert_eq!(a, b);
/// assert!(worse < a);
/// ```
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Quality {
    input: Decimal,
    output: Decimal,
}

impl Quality {
    /// Quality of paying `input` to receive `output`. Both must be positive
    /// and no larger than [`MAX_VALUE`].
    pub fn new(input: Decimal, output: Decimal) -> Result<Self, AmountError> {
        if input <= Decimal::ZERO || output <= Decimal::ZERO {
            return Err(AmountError::UndefinedQuality { input, output });
        }
        let smallest = Decimal::new(1, ISSUED_SCALE);
        if [input, output].iter().any(|v| *v < smallest || *v > MAX_VALUE) {
            return Err(AmountError::QualityOutOfRange { input, output });
        }
        Ok(Self { input, output })
    }

    pub fn from_amounts(amounts: &Amounts) -> Result<Self, AmountError> {
        Self::new(amounts.input.value(), amounts.output.value())
    }

    /// Input side of the ratio as it was given.
    pub fn input(&self) -> Decimal {
        self.input
    }

    /// Output side of the ratio as it was given.
    pub fn output(&self) -> Decimal {
        self.output
    }

    /// The out/in ratio as a single decimal, saturating at `Decimal::MAX`.
    pub fn rate(&self) -> Decimal {
        self.output.checked_div(self.input).unwrap_or(if self.output > self.input {
            Decimal::MAX
        } else {
            Decimal::ZERO
        })
    }

    /// Output obtained for `input` at this quality, rounded toward zero and
    /// never more than `cap`.
    pub fn output_for(&self, input: &Amount, cap: &Amount) -> Amount {
        match mul_div(input.value(), self.output, self.input) {
            Some(value) => cap
                .with_value(round_to(value, cap.issue().scale(), false))
                .min(cap.clone()),
            None => cap.clone(),
        }
    }

    /// Input required for `output` at this quality, rounded away from zero
    /// and never more than `cap`.
    pub fn input_for(&self, output: &Amount, cap: &Amount) -> Amount {
        match mul_div(output.value(), self.input, self.output) {
            Some(value) => cap
                .with_value(round_to(value, cap.issue().scale(), true))
                .min(cap.clone()),
            None => cap.clone(),
        }
    }

    /// Quality of two legs crossed one after the other.
    ///
    /// When the exact pair does not fit, the product of the two rates is
    /// used instead, saturating at the ends of the `Decimal` range.
    pub fn compose(&self, next: &Quality) -> Quality {
        match (
            self.input.checked_mul(next.input),
            self.output.checked_mul(next.output),
        ) {
            (Some(input), Some(output)) if !input.is_zero() && !output.is_zero() => {
                Quality { input, output }
            }
            _ => {
                let (a, b) = (self.rate(), next.rate());
                let output = match a.checked_mul(b) {
                    Some(rate) if !rate.is_zero() => rate,
                    // Both rates above one overflow, both below one underflow.
                    None if a >= Decimal::ONE => Decimal::MAX,
                    _ => Decimal::new(1, 28),
                };
                Quality {
                    input: Decimal::ONE,
                    output,
                }
            }
        }
    }
}

impl PartialEq for Quality {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Quality {}

impl PartialOrd for Quality {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quality {
    fn cmp(&self, other: &Self) -> Ordering {
        // a.out / a.in  vs  b.out / b.in  ==  a.out * b.in  vs  b.out * a.in
        match (
            self.output.checked_mul(other.input),
            other.output.checked_mul(self.input),
        ) {
            (Some(lhs), Some(rhs)) => lhs.cmp(&rhs),
            _ => self.rate().cmp(&other.rate()),
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rate().normalize())
    }
}
