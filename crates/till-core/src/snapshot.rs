//! # State Snapshot
//!
//! The full register state as handed to and from the persistence layer.
//!
//! ## Persisted Layout (logical)
//! ```text
//! ┌───────────────────────┬──────────────────────────────────────────────┐
//! │ catalog               │ ordered Product records                      │
//! │ cart                  │ ordered CartItem records                     │
//! │ current_cash          │ cents                                        │
//! │ ledger                │ ordered SaleRecord records                   │
//! │ prior_cash            │ cents                                        │
//! │ prior_stock_valuation │ cents                                        │
//! └───────────────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! A snapshot coming back from storage is checked as a whole before it
//! becomes a register: bad records are rejected, never patched up.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::cart::Cart;
use crate::cash::PeriodCash;
use crate::catalog::Catalog;
use crate::error::SnapshotError;
use crate::ledger::SalesLedger;
use crate::money::Money;
use crate::types::{CartItem, Product, SaleRecord};
use crate::MAX_PRICE_CENTS;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub catalog: Vec<Product>,
    pub cart: Vec<CartItem>,
    pub current_cash: Money,
    pub ledger: Vec<SaleRecord>,
    pub prior_cash: Money,
    pub prior_stock_valuation: Money,
}

/// Register parts rebuilt from a snapshot that passed every check.
pub(crate) struct RestoredParts {
    pub catalog: Catalog,
    pub cart: Cart,
    pub ledger: SalesLedger,
    pub cash: PeriodCash,
}

impl StateSnapshot {
    /// Checks every record and rebuilds the register parts.
    ///
    /// ## Rules
    /// - products pass the catalog-add rules and have unique ids
    /// - cart and ledger lines have a non-blank name and a positive price
    /// - cash scalars are not negative
    /// - `current_cash` equals the ledger total
    ///
    /// Cart lines whose product no longer exists are accepted: they unstage
    /// without restocking.
    pub(crate) fn into_parts(self) -> Result<RestoredParts, SnapshotError> {
        let mut seen = HashSet::with_capacity(self.catalog.len());
        let mut products = Vec::with_capacity(self.catalog.len());
        for (index, product) in self.catalog.into_iter().enumerate() {
            if !seen.insert(product.id().clone()) {
                return Err(SnapshotError::DuplicateProductId(product.id().clone()));
            }
            let restored = Product::restore(product.id().clone(), &product.to_input())
                .map_err(|source| SnapshotError::InvalidProduct { index, source })?;
            products.push(restored);
        }

        for (index, item) in self.cart.iter().enumerate() {
            check_line("cart", index, item.name(), item.price())?;
        }
        for (index, record) in self.ledger.iter().enumerate() {
            check_line("ledger", index, record.name(), record.price())?;
        }

        check_cash("current_cash", self.current_cash)?;
        check_cash("prior_cash", self.prior_cash)?;
        check_cash("prior_stock_valuation", self.prior_stock_valuation)?;

        let catalog = Catalog::from_products(products);
        if catalog.checked_valuation().is_none() {
            return Err(SnapshotError::OutOfRange {
                field: "catalog stock valuation",
            });
        }

        let ledger_total = Money::checked_sum(self.ledger.iter().map(SaleRecord::price))
            .ok_or(SnapshotError::OutOfRange {
                field: "ledger total",
            })?;
        if ledger_total != self.current_cash {
            return Err(SnapshotError::CashMismatch {
                cash_cents: self.current_cash.cents(),
                ledger_cents: ledger_total.cents(),
            });
        }

        Ok(RestoredParts {
            catalog,
            cart: Cart::from_items(self.cart),
            ledger: SalesLedger::from_records(self.ledger),
            cash: PeriodCash::restore(
                self.current_cash,
                self.prior_cash,
                self.prior_stock_valuation,
            ),
        })
    }
}

fn check_line(
    slot: &'static str,
    index: usize,
    name: &str,
    price: Money,
) -> Result<(), SnapshotError> {
    if name.trim().is_empty() {
        return Err(SnapshotError::InvalidLine {
            slot,
            index,
            reason: "name is blank".to_string(),
        });
    }
    if !price.is_positive() {
        return Err(SnapshotError::InvalidLine {
            slot,
            index,
            reason: format!("price must be positive, got {} cents", price.cents()),
        });
    }
    if price.cents() > MAX_PRICE_CENTS {
        return Err(SnapshotError::InvalidLine {
            slot,
            index,
            reason: format!(
                "price {} cents exceeds the maximum of {MAX_PRICE_CENTS}",
                price.cents()
            ),
        });
    }
    Ok(())
}

fn check_cash(field: &'static str, amount: Money) -> Result<(), SnapshotError> {
    if amount.is_negative() {
        return Err(SnapshotError::NegativeCash {
            field,
            cents: amount.cents(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProductId, ProductInput};
    use chrono::Utc;

    fn product(id: &str, name: &str) -> Product {
        Product::restore(
            ProductId::from(id),
            &ProductInput {
                name: name.to_string(),
                quantity: 1,
                cost: Money::zero(),
                price: Money::from_cents(2500),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_valid_snapshot() {
        let snapshot = StateSnapshot {
            catalog: vec![product("a", "Camisa")],
            cart: vec![CartItem::restore(
                ProductId::from("gone"),
                "Boné",
                Money::from_cents(1500),
            )],
            current_cash: Money::from_cents(2500),
            ledger: vec![SaleRecord::restore(
                ProductId::from("a"),
                "Camisa",
                Money::from_cents(2500),
                Utc::now(),
            )],
            prior_cash: Money::zero(),
            prior_stock_valuation: Money::zero(),
        };

        let parts = snapshot.into_parts().unwrap();
        assert_eq!(parts.catalog.len(), 1);
        assert_eq!(parts.cart.len(), 1);
        assert_eq!(parts.cash.current().cents(), 2500);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let snapshot = StateSnapshot {
            catalog: vec![product("a", "Camisa"), product("a", "Calça")],
            ..StateSnapshot::default()
        };
        assert!(matches!(
            snapshot.into_parts(),
            Err(SnapshotError::DuplicateProductId(_))
        ));
    }

    #[test]
    fn test_cash_must_match_ledger() {
        let snapshot = StateSnapshot {
            current_cash: Money::from_cents(100),
            ..StateSnapshot::default()
        };
        assert!(matches!(
            snapshot.into_parts(),
            Err(SnapshotError::CashMismatch {
                cash_cents: 100,
                ledger_cents: 0
            })
        ));
    }

    #[test]
    fn test_bad_lines_rejected() {
        let snapshot = StateSnapshot {
            cart: vec![CartItem::restore(ProductId::from("a"), " ", Money::from_cents(1))],
            ..StateSnapshot::default()
        };
        assert!(matches!(
            snapshot.into_parts(),
            Err(SnapshotError::InvalidLine { slot: "cart", .. })
        ));

        let snapshot = StateSnapshot {
            prior_cash: Money::from_cents(-1),
            ..StateSnapshot::default()
        };
        assert!(matches!(
            snapshot.into_parts(),
            Err(SnapshotError::NegativeCash { .. })
        ));
    }

    #[test]
    fn test_overflowing_records_rejected_without_panicking() {
        // Deserialized directly, so the catalog-add bounds never ran
        let json = r#"{"id":"x","name":"Relógio","quantity":2,"cost":0,"price":5000000000000000000}"#;
        let huge: Product = serde_json::from_str(json).unwrap();
        let snapshot = StateSnapshot {
            catalog: vec![huge],
            ..StateSnapshot::default()
        };
        assert!(matches!(
            snapshot.into_parts(),
            Err(SnapshotError::InvalidProduct { index: 0, .. })
        ));

        let line = |price: i64| {
            SaleRecord::restore(
                ProductId::from("x"),
                "Relógio",
                Money::from_cents(price),
                Utc::now(),
            )
        };
        let snapshot = StateSnapshot {
            ledger: vec![line(5_000_000_000_000_000_000), line(5_000_000_000_000_000_000)],
            current_cash: Money::from_cents(i64::MAX),
            ..StateSnapshot::default()
        };
        assert!(matches!(
            snapshot.into_parts(),
            Err(SnapshotError::InvalidLine { slot: "ledger", index: 0, .. })
        ));
    }

    #[test]
    fn test_invalid_product_rejected_with_index() {
        let json = r#"{"id":"x","name":"","quantity":1,"cost":0,"price":100}"#;
        let bad: Product = serde_json::from_str(json).unwrap();
        let snapshot = StateSnapshot {
            catalog: vec![product("a", "Camisa"), bad],
            ..StateSnapshot::default()
        };
        assert!(matches!(
            snapshot.into_parts(),
            Err(SnapshotError::InvalidProduct { index: 1, .. })
        ));
    }
}
