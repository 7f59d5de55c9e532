//! # Period Cash Register
//!
//! Running cash for the current period, plus the baselines carried over from
//! the last closing.
//!
//! ```text
//!            finalize_sale                     close
//!   current ─────────────► current + total ──────────► 0
//!                                   │
//!                                   └──────────────► prior_cash
//!   stock valuation at closing ───────────────────► prior_stock_valuation
//! ```
//!
//! The prior values are display and report data only: nothing is ever
//! computed from them.

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Cash state for one register.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodCash {
    current: Money,
    prior_cash: Money,
    prior_stock_valuation: Money,
}

impl PeriodCash {
    pub fn new() -> Self {
        PeriodCash::default()
    }

    pub(crate) fn restore(current: Money, prior_cash: Money, prior_stock_valuation: Money) -> Self {
        PeriodCash {
            current,
            prior_cash,
            prior_stock_valuation,
        }
    }

    pub(crate) fn record_sale(&mut self, total: Money) {
        self.current += total;
    }

    /// Moves the period total into the baselines and starts a new period.
    /// Returns the cash that was closed.
    pub(crate) fn roll_forward(&mut self, stock_valuation: Money) -> Money {
        let closed = self.current;
        self.prior_cash = closed;
        self.prior_stock_valuation = stock_valuation;
        self.current = Money::zero();
        closed
    }

    /// Cash taken since the last closing.
    #[inline]
    pub fn current(&self) -> Money {
        self.current
    }

    /// Cash of the previous period.
    #[inline]
    pub fn prior_cash(&self) -> Money {
        self.prior_cash
    }

    /// Stock valuation at the previous closing.
    #[inline]
    pub fn prior_stock_valuation(&self) -> Money {
        self.prior_stock_valuation
    }
}

/// Read-only view of the money figures the operator screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashSnapshot {
    /// Cash taken since the last closing.
    pub current_cash: Money,
    /// Cash of the previous period.
    pub prior_cash: Money,
    /// Stock valuation at the previous closing.
    pub prior_stock_valuation: Money,
    /// Live stock valuation, `Σ price × quantity`.
    pub stock_valuation: Money,
    /// Value of what is currently staged.
    pub cart_total: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_forward() {
        let mut cash = PeriodCash::new();
        cash.record_sale(Money::from_cents(2500));
        cash.record_sale(Money::from_cents(2500));
        assert_eq!(cash.current().cents(), 5000);

        let closed = cash.roll_forward(Money::from_cents(12000));
        assert_eq!(closed.cents(), 5000);
        assert!(cash.current().is_zero());
        assert_eq!(cash.prior_cash().cents(), 5000);
        assert_eq!(cash.prior_stock_valuation().cents(), 12000);
    }
}
