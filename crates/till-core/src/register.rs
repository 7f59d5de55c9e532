//! # Register
//!
//! The single owned aggregate for one till: catalog, cart, ledger and cash.
//! Every operation the operator can perform goes through here.
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Register                                       │
//! │                                                                         │
//! │  add_product ──► Catalog                                                │
//! │                    │                                                    │
//! │  stage_for_sale ───┼──► quantity - 1 ──► Cart (name/price snapshot)     │
//! │  unstage ◄─────────┘                      │                             │
//! │                                           ▼                             │
//! │  finalize_sale ── confirm ──► SalesLedger (shared timestamp)           │
//! │                                PeriodCash += cart total                 │
//! │                                Cart cleared (no restock)                │
//! │                                           │                             │
//! │  close ── confirm ──► ClosingReport ──► baselines rolled forward        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomicity
//! Each method either applies all of its changes or none. Confirmation is
//! asked before the first mutation, so a declined prompt leaves the register
//! untouched.
//!
//! ## Example
//! ```rust
//! use till_core::{Money, ProductInput, Prompt, Register};
//!
//! let mut register = Register::new();
//! let id = register
//!     .add_product(&ProductInput {
//!         name: "Camisa".to_string(),
//!         quantity: 2,
//!         cost: Money::from_cents(1000),
//!         price: Money::from_cents(2500),
//!     })
//!     .unwrap()
//!     .id()
//!     .clone();
//!
//! register.stage_for_sale(&id).unwrap();
//! let receipt = register.finalize_sale(&mut |_: &Prompt| true).unwrap().unwrap();
//! assert_eq!(receipt.total, Money::from_cents(2500));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cart::Cart;
use crate::cash::{CashSnapshot, PeriodCash};
use crate::catalog::Catalog;
use crate::closing::{tally_by_name, ClosingOutcome, ClosingReport, ReportGenerator};
use crate::confirm::{Confirm, Prompt};
use crate::error::{CoreError, CoreResult, SnapshotError};
use crate::ledger::SalesLedger;
use crate::money::Money;
use crate::snapshot::StateSnapshot;
use crate::types::{CartItem, Product, ProductId, ProductInput, SaleRecord};

/// What a committed sale produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleReceipt {
    /// Ledger lines appended by this sale, in cart order.
    pub items: Vec<SaleRecord>,
    pub total: Money,
    pub sold_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Register {
    catalog: Catalog,
    cart: Cart,
    ledger: SalesLedger,
    cash: PeriodCash,
}

impl Register {
    /// An empty register, as on first run.
    pub fn new() -> Self {
        Register::default()
    }

    /// Rebuilds a register from persisted state, rejecting malformed records.
    pub fn from_snapshot(snapshot: StateSnapshot) -> Result<Self, SnapshotError> {
        let parts = snapshot.into_parts()?;
        debug!(
            products = parts.catalog.len(),
            staged = parts.cart.len(),
            ledger = parts.ledger.len(),
            current_cash = parts.cash.current().cents(),
            "Register restored"
        );
        Ok(Register {
            catalog: parts.catalog,
            cart: parts.cart,
            ledger: parts.ledger,
            cash: parts.cash,
        })
    }

    /// Full state for the persistence gateway.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            catalog: self.catalog_snapshot(),
            cart: self.cart_snapshot(),
            current_cash: self.cash.current(),
            ledger: self.ledger.records().to_vec(),
            prior_cash: self.cash.prior_cash(),
            prior_stock_valuation: self.cash.prior_stock_valuation(),
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    pub fn add_product(&mut self, input: &ProductInput) -> CoreResult<&Product> {
        self.catalog.add(input)
    }

    /// Overwrites a product. Items already in the cart keep the name and
    /// price they were staged with.
    pub fn edit_product(&mut self, id: &ProductId, input: &ProductInput) -> CoreResult<&Product> {
        self.catalog.edit(id, input)
    }

    /// Removes a product even when staged items still point at it. Those items
    /// stay in the cart, sell at their snapshot price, and unstage without
    /// restocking.
    pub fn delete_product(&mut self, id: &ProductId) -> CoreResult<Product> {
        let removed = self.catalog.delete(id)?;
        let orphaned = self.cart.reserved_units(id);
        if orphaned > 0 {
            warn!(
                product_id = %id,
                name = removed.name(),
                orphaned,
                "Deleted product is still referenced by staged items"
            );
        }
        Ok(removed)
    }

    pub fn search_products<'a>(
        &'a self,
        term: &'a str,
    ) -> impl Iterator<Item = &'a Product> + Clone + 'a {
        self.catalog.search(term)
    }

    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.catalog.get(id)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    pub fn stage_for_sale(&mut self, id: &ProductId) -> CoreResult<&CartItem> {
        self.cart.stage(&mut self.catalog, id)
    }

    pub fn unstage(&mut self, index: usize) -> CoreResult<CartItem> {
        self.cart.unstage(&mut self.catalog, index)
    }

    // =========================================================================
    // Sale & Closing
    // =========================================================================

    /// Commits the cart to the ledger and the period cash.
    ///
    /// ## Errors
    /// `EmptyCart` when nothing is staged.
    ///
    /// Returns `Ok(None)` when the operator declines; nothing changes then.
    pub fn finalize_sale<C>(&mut self, confirm: &mut C) -> CoreResult<Option<SaleReceipt>>
    where
        C: Confirm + ?Sized,
    {
        if self.cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let total = self.cart.total();
        if !confirm.confirm(&Prompt::FinalizeSale { total }) {
            debug!(total = total.cents(), "Sale declined");
            return Ok(None);
        }

        let sold_at = Utc::now();
        let items = self.cart.clear();
        let appended = self.ledger.append_batch(items, sold_at).to_vec();
        self.cash.record_sale(total);

        info!(
            lines = appended.len(),
            total = total.cents(),
            current_cash = self.cash.current().cents(),
            "Sale finalized"
        );

        Ok(Some(SaleReceipt {
            items: appended,
            total,
            sold_at,
        }))
    }

    /// Closes the period and returns its report.
    ///
    /// The report carries the baselines as they were *before* this closing.
    /// Afterwards the period cash becomes the prior cash, the live stock
    /// valuation becomes the prior stock valuation, and cash and ledger reset.
    ///
    /// ## Errors
    /// `NothingToClose` when there is no cash and no sale line.
    pub fn close<C>(&mut self, confirm: &mut C) -> CoreResult<Option<ClosingReport>>
    where
        C: Confirm + ?Sized,
    {
        if self.cash.current().is_zero() && self.ledger.is_empty() {
            return Err(CoreError::NothingToClose);
        }

        if !confirm.confirm(&Prompt::Close) {
            debug!("Closing declined");
            return Ok(None);
        }

        let stock_valuation = self.catalog.total_valuation();
        let report = ClosingReport {
            closed_at: Utc::now(),
            prior_cash: self.cash.prior_cash(),
            prior_stock_valuation: self.cash.prior_stock_valuation(),
            current_cash: self.cash.current(),
            stock_valuation,
            line_count: self.ledger.len(),
            sales_by_name: tally_by_name(self.ledger.records()),
        };

        let closed = self.cash.roll_forward(stock_valuation);
        self.ledger.clear();

        info!(
            closed_cash = closed.cents(),
            stock_valuation = stock_valuation.cents(),
            names = report.sales_by_name.len(),
            "Period closed"
        );

        Ok(Some(report))
    }

    /// Closes the period, then renders the report.
    ///
    /// A render failure is reported in the outcome; the period stays closed.
    pub fn close_and_render<C, G>(
        &mut self,
        confirm: &mut C,
        generator: &mut G,
    ) -> CoreResult<Option<ClosingOutcome<G::Error>>>
    where
        C: Confirm + ?Sized,
        G: ReportGenerator + ?Sized,
    {
        let Some(report) = self.close(confirm)? else {
            return Ok(None);
        };

        let rendered = generator.render(&report);
        if let Err(e) = &rendered {
            warn!(error = %e, "Closing report could not be rendered, period stays closed");
        }

        Ok(Some(ClosingOutcome { report, rendered }))
    }

    // =========================================================================
    // Read-only views
    // =========================================================================

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn ledger(&self) -> &SalesLedger {
        &self.ledger
    }

    pub fn catalog_snapshot(&self) -> Vec<Product> {
        self.catalog.products().to_vec()
    }

    pub fn cart_snapshot(&self) -> Vec<CartItem> {
        self.cart.items().to_vec()
    }

    pub fn cash_snapshot(&self) -> CashSnapshot {
        CashSnapshot {
            current_cash: self.cash.current(),
            prior_cash: self.cash.prior_cash(),
            prior_stock_valuation: self.cash.prior_stock_valuation(),
            stock_valuation: self.stock_valuation(),
            cart_total: self.cart.total(),
        }
    }

    /// Live `Σ price × quantity` over the catalog.
    pub fn stock_valuation(&self) -> Money {
        self.catalog.total_valuation()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use std::fmt;

    fn yes(_: &Prompt) -> bool {
        true
    }

    fn no(_: &Prompt) -> bool {
        false
    }

    fn camisa() -> ProductInput {
        ProductInput {
            name: "Camisa".to_string(),
            quantity: 2,
            cost: Money::from_cents(1000),
            price: Money::from_cents(2500),
        }
    }

    fn register_with_camisa() -> (Register, ProductId) {
        let mut register = Register::new();
        let id = register.add_product(&camisa()).unwrap().id().clone();
        (register, id)
    }

    #[test]
    fn test_add_then_lookup_derives_active() {
        let mut register = Register::new();
        for quantity in [0, 1, 7] {
            let input = ProductInput {
                quantity,
                ..camisa()
            };
            let id = register.add_product(&input).unwrap().id().clone();
            let product = register.product(&id).unwrap();
            assert_eq!(product.is_active(), quantity > 0);
            assert_eq!(i64::from(product.quantity()), quantity);
        }
    }

    #[test]
    fn test_camisa_day() {
        let (mut register, id) = register_with_camisa();

        register.stage_for_sale(&id).unwrap();
        register.stage_for_sale(&id).unwrap();
        let product = register.product(&id).unwrap();
        assert_eq!(product.quantity(), 0);
        assert!(!product.is_active());
        assert_eq!(register.cart().len(), 2);

        let receipt = register.finalize_sale(&mut yes).unwrap().unwrap();
        assert_eq!(receipt.items.len(), 2);
        assert_eq!(receipt.total.cents(), 5000);
        assert!(receipt.items.iter().all(|r| r.sold_at() == receipt.sold_at));
        assert_eq!(register.ledger().len(), 2);
        assert!(register
            .ledger()
            .records()
            .iter()
            .all(|r| r.price().cents() == 2500));
        assert_eq!(register.cash_snapshot().current_cash.cents(), 5000);
        assert!(register.cart().is_empty());

        let report = register.close(&mut yes).unwrap().unwrap();
        let camisa = report.sales_by_name["Camisa"];
        assert_eq!(camisa.count, 2);
        assert_eq!(camisa.total.cents(), 5000);
        assert_eq!(report.current_cash.cents(), 5000);
        assert!(report.prior_cash.is_zero());

        let cash = register.cash_snapshot();
        assert!(cash.current_cash.is_zero());
        assert_eq!(cash.prior_cash.cents(), 5000);
        assert!(cash.prior_stock_valuation.is_zero());
        assert!(register.ledger().is_empty());
    }

    #[test]
    fn test_stage_unstage_round_trip() {
        let (mut register, id) = register_with_camisa();

        register.stage_for_sale(&id).unwrap();
        register.unstage(0).unwrap();

        let product = register.product(&id).unwrap();
        assert_eq!(product.quantity(), 2);
        assert!(product.is_active());
        assert!(register.cart().is_empty());
    }

    #[test]
    fn test_stage_unstage_many_times_restores_state() {
        let (mut register, id) = register_with_camisa();
        let before = register.clone();

        register.stage_for_sale(&id).unwrap();
        register.stage_for_sale(&id).unwrap();
        register.unstage(1).unwrap();
        register.unstage(0).unwrap();

        assert_eq!(register, before);
    }

    #[test]
    fn test_staged_price_is_frozen() {
        let (mut register, id) = register_with_camisa();
        register.stage_for_sale(&id).unwrap();

        let repriced = ProductInput {
            name: "Camisa Azul".to_string(),
            quantity: 1,
            price: Money::from_cents(3900),
            ..camisa()
        };
        register.edit_product(&id, &repriced).unwrap();

        let receipt = register.finalize_sale(&mut yes).unwrap().unwrap();
        assert_eq!(receipt.items[0].price().cents(), 2500);
        assert_eq!(receipt.items[0].name(), "Camisa");
        assert_eq!(register.product(&id).unwrap().price().cents(), 3900);
    }

    #[test]
    fn test_declined_finalize_changes_nothing() {
        let (mut register, id) = register_with_camisa();
        register.stage_for_sale(&id).unwrap();
        let before = register.clone();

        assert!(register.finalize_sale(&mut no).unwrap().is_none());
        assert_eq!(register, before);
    }

    #[test]
    fn test_finalize_empty_cart() {
        let mut register = Register::new();
        let mut asked = false;
        let result = register.finalize_sale(&mut |_: &Prompt| {
            asked = true;
            true
        });
        assert!(matches!(result, Err(CoreError::EmptyCart)));
        assert!(!asked);
    }

    #[test]
    fn test_finalize_asks_with_cart_total() {
        let (mut register, id) = register_with_camisa();
        register.stage_for_sale(&id).unwrap();
        register.stage_for_sale(&id).unwrap();

        let mut seen = None;
        register
            .finalize_sale(&mut |p: &Prompt| {
                seen = Some(p.clone());
                true
            })
            .unwrap();
        assert_eq!(
            seen,
            Some(Prompt::FinalizeSale {
                total: Money::from_cents(5000)
            })
        );
    }

    #[test]
    fn test_stage_out_of_stock() {
        let mut register = Register::new();
        let id = register
            .add_product(&ProductInput {
                quantity: 0,
                ..camisa()
            })
            .unwrap()
            .id()
            .clone();
        let before = register.clone();

        assert!(matches!(
            register.stage_for_sale(&id),
            Err(CoreError::OutOfStock(_))
        ));
        assert_eq!(register, before);
    }

    #[test]
    fn test_close_twice() {
        let (mut register, id) = register_with_camisa();
        register.stage_for_sale(&id).unwrap();
        register.finalize_sale(&mut yes).unwrap();

        register.close(&mut yes).unwrap().unwrap();
        assert!(matches!(
            register.close(&mut yes),
            Err(CoreError::NothingToClose)
        ));
    }

    #[test]
    fn test_declined_close_changes_nothing() {
        let (mut register, id) = register_with_camisa();
        register.stage_for_sale(&id).unwrap();
        register.finalize_sale(&mut yes).unwrap();
        let before = register.clone();

        assert!(register.close(&mut no).unwrap().is_none());
        assert_eq!(register, before);
    }

    #[test]
    fn test_close_rolls_live_stock_valuation() {
        let (mut register, id) = register_with_camisa();
        register.stage_for_sale(&id).unwrap();
        register.finalize_sale(&mut yes).unwrap();

        // One Camisa left at 25,00
        let first = register.close(&mut yes).unwrap().unwrap();
        assert_eq!(first.stock_valuation.cents(), 2500);
        assert_eq!(register.cash_snapshot().prior_stock_valuation.cents(), 2500);

        register.stage_for_sale(&id).unwrap();
        register.finalize_sale(&mut yes).unwrap();
        let second = register.close(&mut yes).unwrap().unwrap();
        assert_eq!(second.prior_cash.cents(), 2500);
        assert_eq!(second.prior_stock_valuation.cents(), 2500);
        assert!(second.stock_valuation.is_zero());
    }

    #[test]
    fn test_delete_with_staged_item() {
        let (mut register, id) = register_with_camisa();
        register.stage_for_sale(&id).unwrap();

        let removed = register.delete_product(&id).unwrap();
        assert_eq!(removed.name(), "Camisa");
        assert_eq!(register.cart().len(), 1);

        // Unstaging the orphan removes it without error
        register.unstage(0).unwrap();
        assert!(register.cart().is_empty());
        assert!(register.product(&id).is_none());
    }

    #[test]
    fn test_orphan_still_sells_at_snapshot_price() {
        let (mut register, id) = register_with_camisa();
        register.stage_for_sale(&id).unwrap();
        register.delete_product(&id).unwrap();

        let receipt = register.finalize_sale(&mut yes).unwrap().unwrap();
        assert_eq!(receipt.total.cents(), 2500);
    }

    #[test]
    fn test_cash_snapshot() {
        let (mut register, id) = register_with_camisa();
        register.stage_for_sale(&id).unwrap();

        let cash = register.cash_snapshot();
        assert_eq!(cash.cart_total.cents(), 2500);
        assert_eq!(cash.stock_valuation.cents(), 2500);
        assert!(cash.current_cash.is_zero());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let (mut register, id) = register_with_camisa();
        register.stage_for_sale(&id).unwrap();
        register.finalize_sale(&mut yes).unwrap();
        register.stage_for_sale(&id).unwrap();

        let restored = Register::from_snapshot(register.snapshot()).unwrap();
        assert_eq!(restored, register);
    }

    #[test]
    fn test_out_of_range_price_never_reaches_totals() {
        let mut register = Register::new();
        let huge = ProductInput {
            name: "Relógio".to_string(),
            quantity: 2,
            cost: Money::zero(),
            price: Money::parse_major("50000000000000000").unwrap(),
        };

        assert!(matches!(
            register.add_product(&huge),
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(register.stock_valuation().is_zero());

        // The largest accepted product still sells with exact totals
        let id = register
            .add_product(&ProductInput {
                quantity: crate::MAX_PRODUCT_QUANTITY,
                price: Money::from_cents(crate::MAX_PRICE_CENTS),
                ..huge
            })
            .unwrap()
            .id()
            .clone();
        assert_eq!(register.stock_valuation().cents(), 100_000_000_000_000);

        register.stage_for_sale(&id).unwrap();
        register.stage_for_sale(&id).unwrap();
        let receipt = register.finalize_sale(&mut yes).unwrap().unwrap();
        assert_eq!(receipt.total.cents(), 2 * crate::MAX_PRICE_CENTS);

        let report = register.close(&mut yes).unwrap().unwrap();
        assert_eq!(report.sales_by_name["Relógio"].total.cents(), 2 * crate::MAX_PRICE_CENTS);
        assert!(Register::from_snapshot(register.snapshot()).is_ok());
    }

    #[test]
    fn test_edit_beyond_bounds_keeps_product() {
        let (mut register, id) = register_with_camisa();
        let before = register.clone();

        let result = register.edit_product(
            &id,
            &ProductInput {
                quantity: crate::MAX_PRODUCT_QUANTITY + 1,
                ..camisa()
            },
        );
        assert!(matches!(
            result,
            Err(CoreError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert_eq!(register, before);
    }

    #[test]
    fn test_search_through_register() {
        let mut register = Register::new();
        register.add_product(&camisa()).unwrap();
        register
            .add_product(&ProductInput {
                name: "Calça Jeans".to_string(),
                ..camisa()
            })
            .unwrap();

        let names: Vec<&str> = register.search_products("CAL").map(Product::name).collect();
        assert_eq!(names, ["Calça Jeans"]);
        assert_eq!(register.search_products("").count(), 2);
    }

    #[derive(Debug)]
    struct PrinterOffline;

    impl fmt::Display for PrinterOffline {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("printer offline")
        }
    }

    impl std::error::Error for PrinterOffline {}

    struct FailingPrinter {
        calls: usize,
    }

    impl ReportGenerator for FailingPrinter {
        type Error = PrinterOffline;

        fn render(&mut self, _report: &ClosingReport) -> Result<(), PrinterOffline> {
            self.calls += 1;
            Err(PrinterOffline)
        }
    }

    #[test]
    fn test_render_failure_keeps_period_closed() {
        let (mut register, id) = register_with_camisa();
        register.stage_for_sale(&id).unwrap();
        register.finalize_sale(&mut yes).unwrap();

        let mut printer = FailingPrinter { calls: 0 };
        let outcome = register
            .close_and_render(&mut yes, &mut printer)
            .unwrap()
            .unwrap();

        assert_eq!(printer.calls, 1);
        assert!(outcome.rendered.is_err());
        assert_eq!(outcome.report.current_cash.cents(), 2500);
        assert!(register.cash_snapshot().current_cash.is_zero());
        assert!(register.ledger().is_empty());
    }

    #[test]
    fn test_declined_close_does_not_render() {
        let (mut register, id) = register_with_camisa();
        register.stage_for_sale(&id).unwrap();
        register.finalize_sale(&mut yes).unwrap();

        let mut printer = FailingPrinter { calls: 0 };
        assert!(register
            .close_and_render(&mut no, &mut printer)
            .unwrap()
            .is_none());
        assert_eq!(printer.calls, 0);
    }
}
