//! # Domain Types
//!
//! Entities owned by the register.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartItem     │   │   SaleRecord    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  product_id     │──►│  product_id     │       │
//! │  │  name           │   │  name (frozen)  │   │  name (frozen)  │       │
//! │  │  quantity       │   │  price (frozen) │   │  price (frozen) │       │
//! │  │  cost, price    │   └─────────────────┘   │  sold_at        │       │
//! │  │  active()  ◄── derived: quantity > 0      └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Cart items and sale records copy the product's name and price at staging
//! time. Editing the product afterwards never changes an already staged or
//! already sold line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::money::Money;
use crate::validation::{validate_product, ValidProduct, ValidationResult};

// =============================================================================
// Product Id
// =============================================================================

/// Opaque product identifier, stable for the product's lifetime.
///
/// New products get a UUID v4. Ids restored from older data may have any
/// other shape, so the id is kept as text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Generates a fresh, globally unique id.
    pub fn generate() -> Self {
        ProductId(Uuid::new_v4().to_string())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        ProductId(id.to_string())
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        ProductId(id)
    }
}

// =============================================================================
// Product Input
// =============================================================================

/// Unvalidated product fields, as typed by an operator.
///
/// Quantity is signed so that a negative entry can be rejected with a
/// proper validation error instead of failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub quantity: i64,
    pub cost: Money,
    pub price: Money,
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
///
/// ## Invariants
/// - `name` is non-blank, `cost >= 0`, `price > 0`
/// - `quantity` can never go below zero (unsigned counter)
/// - `is_active()` is computed from `quantity`; there is no way to set it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    quantity: u32,
    cost: Money,
    price: Money,
}

impl Product {
    pub(crate) fn from_valid(id: ProductId, valid: ValidProduct) -> Self {
        Product {
            id,
            name: valid.name,
            quantity: valid.quantity,
            cost: valid.cost,
            price: valid.price,
        }
    }

    /// Rebuilds a product with a known id, applying the same rules as
    /// catalog-add. Used by persistence adapters and importers.
    pub fn restore(id: ProductId, input: &ProductInput) -> ValidationResult<Self> {
        Ok(Product::from_valid(id, validate_product(input)?))
    }

    #[inline]
    pub fn id(&self) -> &ProductId {
        &self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Purchase cost per unit.
    #[inline]
    pub fn cost(&self) -> Money {
        self.cost
    }

    /// Sale price per unit.
    #[inline]
    pub fn price(&self) -> Money {
        self.price
    }

    /// Whether the product has sellable stock.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.quantity > 0
    }

    /// Profit per unit sold (`price - cost`).
    pub fn unit_profit(&self) -> Money {
        self.price - self.cost
    }

    /// Value of the units on hand at sale price (`price × quantity`).
    pub fn stock_value(&self) -> Money {
        self.price.multiply_quantity(self.quantity)
    }

    /// Back to an editable form, e.g. to prefill an edit.
    pub fn to_input(&self) -> ProductInput {
        ProductInput {
            name: self.name.clone(),
            quantity: i64::from(self.quantity),
            cost: self.cost,
            price: self.price,
        }
    }

    /// Takes one unit off the shelf. Returns false (and changes nothing)
    /// when there is nothing left.
    pub(crate) fn take_one(&mut self) -> bool {
        match self.quantity.checked_sub(1) {
            Some(left) => {
                self.quantity = left;
                true
            }
            None => false,
        }
    }

    pub(crate) fn put_back_one(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// A staged unit: one reserved unit of the source product, with its name
/// and price frozen at staging time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    product_id: ProductId,
    name: String,
    price: Money,
}

impl CartItem {
    pub(crate) fn snapshot_of(product: &Product) -> Self {
        CartItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
        }
    }

    /// Rebuilds a staged line from persisted data.
    pub fn restore(product_id: ProductId, name: impl Into<String>, price: Money) -> Self {
        CartItem {
            product_id,
            name: name.into(),
            price,
        }
    }

    #[inline]
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn price(&self) -> Money {
        self.price
    }
}

// =============================================================================
// Sale Record
// =============================================================================

/// A committed sale line. Immutable once written to the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecord {
    product_id: ProductId,
    name: String,
    price: Money,
    sold_at: DateTime<Utc>,
}

impl SaleRecord {
    pub(crate) fn from_cart_item(item: CartItem, sold_at: DateTime<Utc>) -> Self {
        SaleRecord {
            product_id: item.product_id,
            name: item.name,
            price: item.price,
            sold_at,
        }
    }

    /// Rebuilds a sale line from persisted data.
    pub fn restore(
        product_id: ProductId,
        name: impl Into<String>,
        price: Money,
        sold_at: DateTime<Utc>,
    ) -> Self {
        SaleRecord {
            product_id,
            name: name.into(),
            price,
            sold_at,
        }
    }

    #[inline]
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn price(&self) -> Money {
        self.price
    }

    /// Commit time, shared by every line of the same sale.
    #[inline]
    pub fn sold_at(&self) -> DateTime<Utc> {
        self.sold_at
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn camisa(quantity: i64) -> Product {
        Product::restore(
            ProductId::from("p-1"),
            &ProductInput {
                name: "Camisa".to_string(),
                quantity,
                cost: Money::from_cents(1000),
                price: Money::from_cents(2500),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(ProductId::generate(), ProductId::generate());
    }

    #[test]
    fn test_active_follows_quantity() {
        let mut product = camisa(1);
        assert!(product.is_active());

        assert!(product.take_one());
        assert_eq!(product.quantity(), 0);
        assert!(!product.is_active());

        // Nothing left: no change
        assert!(!product.take_one());
        assert_eq!(product.quantity(), 0);

        product.put_back_one();
        assert!(product.is_active());
    }

    #[test]
    fn test_derived_figures() {
        let product = camisa(3);
        assert_eq!(product.unit_profit().cents(), 1500);
        assert_eq!(product.stock_value().cents(), 7500);
    }

    #[test]
    fn test_restore_rejects_invalid_fields() {
        let bad = ProductInput {
            name: "Camisa".to_string(),
            quantity: 1,
            cost: Money::zero(),
            price: Money::zero(),
        };
        assert!(Product::restore(ProductId::generate(), &bad).is_err());
    }

    #[test]
    fn test_cart_item_freezes_name_and_price() {
        let product = camisa(2);
        let item = CartItem::snapshot_of(&product);
        assert_eq!(item.product_id(), product.id());
        assert_eq!(item.name(), "Camisa");
        assert_eq!(item.price().cents(), 2500);
    }

    #[test]
    fn test_product_json_has_no_active_field() {
        let json = serde_json::to_value(camisa(2)).unwrap();
        assert_eq!(json["quantity"], 2);
        assert_eq!(json["price"], 2500);
        assert!(json.get("active").is_none());
    }
}
