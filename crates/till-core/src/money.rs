//! # Money Module
//!
//! Provides the `Money` type and currency formatting.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing prices as binary floats drifts:                                │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A day of sales summed in reais can end up a cent off the drawer.       │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every price, cart total, cash total and stock valuation is an i64    │
//! │    count of cents. Sums accumulate in cents and are converted back to   │
//! │    reais only for display.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::money::{CurrencyFormat, Money};
//!
//! let price = Money::from_cents(2500); // R$ 25,00
//! let total: Money = [price, price].iter().sum();
//! assert_eq!(total.cents(), 5000);
//!
//! let typed = Money::parse_major("25,00").unwrap();
//! assert_eq!(typed, price);
//!
//! assert_eq!(CurrencyFormat::brl().format(total), "R$ 50,00");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::error::MoneyParseError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents (the smallest currency unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: subtraction (unit profit) may go negative
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serialized as the raw cent count**: `2500`, never `25.0`
/// - **Saturating operators**: `+`, `-`, `×` and `Sum` clamp at the `i64`
///   bounds instead of panicking or wrapping. Product validation keeps real
///   totals far below them; use the `checked_*` methods where an overflow must
///   be reported
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► CartItem.price (snapshot) ──► SaleRecord.price
///                                                      │
///                         Ledger Σ ◄───────────────────┘
///                            │
///                            ▼
///             PeriodCash.current ──► ClosingReport ──► prior_cash
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // R$ 10,99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts a major-unit amount (reais) to Money, rounding to the
    /// nearest cent.
    ///
    /// Halves round away from zero. NaN and infinities become zero, so
    /// garbage coming from an import never poisons a total.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(25.0).cents(), 2500);
    /// assert_eq!(Money::from_major(0.125).cents(), 13);
    /// assert_eq!(Money::from_major(f64::NAN).cents(), 0);
    /// ```
    pub fn from_major(major: f64) -> Self {
        if !major.is_finite() {
            return Money::zero();
        }
        // `as` saturates at the i64 bounds
        Money((major * 100.0).round() as i64)
    }

    /// Returns the value in reais. Exact for any amount below 2^53 cents.
    #[inline]
    pub fn to_major(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Parses decimal text in reais without going through floating point.
    ///
    /// ## Rules
    /// - Surrounding whitespace is ignored, a leading `-` or `+` is accepted
    /// - Either `.` or `,` is the decimal separator (only one is allowed)
    /// - Digits past the second fraction digit round half-up on the third
    /// - Thousands separators are rejected, not guessed
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// assert_eq!(Money::parse_major("10.99").unwrap().cents(), 1099);
    /// assert_eq!(Money::parse_major("10,5").unwrap().cents(), 1050);
    /// assert_eq!(Money::parse_major("0.125").unwrap().cents(), 13);
    /// assert!(Money::parse_major("1.234,56").is_err());
    /// ```
    pub fn parse_major(text: &str) -> Result<Money, MoneyParseError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(MoneyParseError::Empty);
        }

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };

        let (whole, fraction) = match unsigned.find(|c| c == '.' || c == ',') {
            Some(pos) => (&unsigned[..pos], &unsigned[pos + 1..]),
            None => (unsigned, ""),
        };

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
        {
            return Err(MoneyParseError::InvalidFormat(trimmed.to_string()));
        }

        let overflow = || MoneyParseError::Overflow(trimmed.to_string());

        let mut cents: i64 = 0;
        for digit in whole.bytes().map(|b| i64::from(b - b'0')) {
            cents = cents
                .checked_mul(10)
                .and_then(|c| c.checked_add(digit))
                .ok_or_else(overflow)?;
        }
        cents = cents.checked_mul(100).ok_or_else(overflow)?;

        let mut fraction_digits = fraction.bytes().map(|b| i64::from(b - b'0'));
        let tenths = fraction_digits.next().unwrap_or(0);
        let hundredths = fraction_digits.next().unwrap_or(0);
        let round_up = fraction_digits.next().is_some_and(|d| d >= 5);

        cents = cents
            .checked_add(tenths * 10 + hundredths + i64::from(round_up))
            .ok_or_else(overflow)?;

        Ok(Money(if negative { -cents } else { cents }))
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a stock quantity.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(2500);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 7500);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }

    /// `self × qty`, or `None` if the result does not fit.
    #[inline]
    pub const fn checked_mul_quantity(&self, qty: u32) -> Option<Self> {
        match self.0.checked_mul(qty as i64) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// `self + other`, or `None` if the result does not fit.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sums in cents, `None` as soon as the running total leaves `i64`.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let max = Money::from_cents(i64::MAX);
    /// assert!(Money::checked_sum([max, Money::from_cents(1)]).is_none());
    /// assert_eq!(Money::checked_sum([Money::from_cents(2)]).unwrap().cents(), 2);
    /// ```
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |total, amount| total.checked_add(amount))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display uses the default (pt-BR) currency format.
///
/// ## Note
/// Configurable symbols and separators go through [`CurrencyFormat`].
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&CurrencyFormat::default().format(*self))
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

/// Summing collections accumulates in cents, never in rounded reais.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |total, amount| total + amount)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Currency Format
// =============================================================================

/// Locale settings for displaying money.
///
/// ```text
/// symbol  thousands  decimal
///   │         │         │
///   ▼         ▼         ▼
///   R$   1   .   234    ,   56
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFormat {
    /// Currency symbol printed before the amount.
    pub symbol: String,

    /// Separator between reais and centavos.
    pub decimal_separator: char,

    /// Separator between groups of three digits.
    pub thousands_separator: char,
}

impl CurrencyFormat {
    /// Brazilian real, pt-BR conventions: `R$ 1.234,56`.
    pub fn brl() -> Self {
        CurrencyFormat {
            symbol: "R$".to_string(),
            decimal_separator: ',',
            thousands_separator: '.',
        }
    }

    /// Formats an amount, e.g. `R$ 1.234,56` or `-R$ 5,50`.
    pub fn format(&self, amount: Money) -> String {
        let sign = if amount.is_negative() { "-" } else { "" };
        let abs = amount.cents().unsigned_abs();
        format!(
            "{sign}{} {}{}{:02}",
            self.symbol,
            group_thousands(abs / 100, self.thousands_separator),
            self.decimal_separator,
            abs % 100
        )
    }

    /// Formats raw text typed by an operator. Never fails: anything that is
    /// not a number formats as zero.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::CurrencyFormat;
    ///
    /// let brl = CurrencyFormat::brl();
    /// assert_eq!(brl.format_lenient("12.5"), "R$ 12,50");
    /// assert_eq!(brl.format_lenient("abc"), "R$ 0,00");
    /// ```
    pub fn format_lenient(&self, input: &str) -> String {
        self.format(Money::parse_major(input).unwrap_or_default())
    }
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat::brl()
    }
}

fn group_thousands(value: u64, separator: char) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major_rounds_to_nearest_cent() {
        assert_eq!(Money::from_major(10.99).cents(), 1099);
        assert_eq!(Money::from_major(0.1 + 0.2).cents(), 30);
        assert_eq!(Money::from_major(-5.5).cents(), -550);
        assert_eq!(Money::from_major(f64::INFINITY).cents(), 0);
    }

    #[test]
    fn test_to_major() {
        assert_eq!(Money::from_cents(1099).to_major(), 10.99);
        assert_eq!(Money::from_cents(-550).to_major(), -5.5);
    }

    #[test]
    fn test_parse_major() {
        assert_eq!(Money::parse_major("25").unwrap().cents(), 2500);
        assert_eq!(Money::parse_major(" 25.00 ").unwrap().cents(), 2500);
        assert_eq!(Money::parse_major("25,5").unwrap().cents(), 2550);
        assert_eq!(Money::parse_major(",99").unwrap().cents(), 99);
        assert_eq!(Money::parse_major("7.").unwrap().cents(), 700);
        assert_eq!(Money::parse_major("-3.10").unwrap().cents(), -310);
        assert_eq!(Money::parse_major("1.994").unwrap().cents(), 199);
        assert_eq!(Money::parse_major("1.995").unwrap().cents(), 200);
    }

    #[test]
    fn test_parse_major_rejects_garbage() {
        assert!(matches!(Money::parse_major(""), Err(MoneyParseError::Empty)));
        assert!(matches!(
            Money::parse_major("abc"),
            Err(MoneyParseError::InvalidFormat(_))
        ));
        assert!(Money::parse_major(".").is_err());
        assert!(Money::parse_major("1.2.3").is_err());
        assert!(Money::parse_major("1 000").is_err());
        assert!(matches!(
            Money::parse_major("99999999999999999999"),
            Err(MoneyParseError::Overflow(_))
        ));
    }

    #[test]
    fn test_sum_accumulates_in_cents() {
        // Ten sales of R$ 0,10 must be exactly R$ 1,00
        let prices = vec![Money::from_major(0.1); 10];
        let total: Money = prices.iter().sum();
        assert_eq!(total.cents(), 100);
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((b - a).cents(), -500);
        assert_eq!((a * 3).cents(), 3000);

        let mut c = a;
        c += b;
        c -= Money::from_cents(1);
        assert_eq!(c.cents(), 1499);
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_panicking() {
        let huge = Money::from_cents(5_000_000_000_000_000_000);
        assert_eq!(huge.multiply_quantity(2).cents(), i64::MAX);
        assert_eq!((huge + huge + huge).cents(), i64::MAX);
        assert_eq!([huge, huge].iter().sum::<Money>().cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MIN) - huge).cents(), i64::MIN);
    }

    #[test]
    fn test_checked_arithmetic() {
        let huge = Money::from_cents(5_000_000_000_000_000_000);
        assert!(huge.checked_mul_quantity(2).is_none());
        assert!(huge.checked_add(huge).is_none());
        assert!(Money::checked_sum([huge, huge]).is_none());

        let price = Money::from_cents(2500);
        assert_eq!(price.checked_mul_quantity(3), Some(Money::from_cents(7500)));
        assert_eq!(price.checked_add(price), Some(Money::from_cents(5000)));
        assert_eq!(Money::checked_sum(Vec::new()), Some(Money::zero()));
    }

    #[test]
    fn test_format_brl() {
        let brl = CurrencyFormat::brl();
        assert_eq!(brl.format(Money::from_cents(0)), "R$ 0,00");
        assert_eq!(brl.format(Money::from_cents(5)), "R$ 0,05");
        assert_eq!(brl.format(Money::from_cents(123456)), "R$ 1.234,56");
        assert_eq!(brl.format(Money::from_cents(123456789)), "R$ 1.234.567,89");
        assert_eq!(brl.format(Money::from_cents(-550)), "-R$ 5,50");
        assert_eq!(Money::from_cents(2500).to_string(), "R$ 25,00");
    }

    #[test]
    fn test_format_custom_locale() {
        let usd = CurrencyFormat {
            symbol: "$".to_string(),
            decimal_separator: '.',
            thousands_separator: ',',
        };
        assert_eq!(usd.format(Money::from_cents(100000)), "$ 1,000.00");
    }

    #[test]
    fn test_format_lenient_treats_garbage_as_zero() {
        let brl = CurrencyFormat::brl();
        assert_eq!(brl.format_lenient(""), "R$ 0,00");
        assert_eq!(brl.format_lenient("NaN"), "R$ 0,00");
        assert_eq!(brl.format_lenient("3,5"), "R$ 3,50");
    }

    #[test]
    fn test_serializes_as_cents() {
        let json = serde_json::to_string(&Money::from_cents(2500)).unwrap();
        assert_eq!(json, "2500");
        let back: Money = serde_json::from_str("2500").unwrap();
        assert_eq!(back, Money::from_cents(2500));
    }
}
