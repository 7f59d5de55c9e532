//! # Reservation Buffer (Cart)
//!
//! Items staged for the next sale. Staging already takes the unit off the
//! shelf, so the cart and the catalog move together.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart / Catalog Coupling                              │
//! │                                                                         │
//! │  Operator Action        Cart                 Catalog                    │
//! │  ───────────────        ────                 ───────                    │
//! │                                                                         │
//! │  Click "Vender" ──────► stage(id) ─────────► quantity - 1               │
//! │                         items.push(snapshot)                            │
//! │                                                                         │
//! │  Click "✖" ───────────► unstage(index) ────► quantity + 1               │
//! │                         items.remove(index)  (skipped if deleted)       │
//! │                                                                         │
//! │  Finalize ────────────► clear() ───────────► (untouched: units were     │
//! │                                               taken at stage time)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - Every item corresponds to exactly one unit removed from its product
//! - Items are positional: one entry per staged unit, removal shifts the rest

use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CartItem, ProductId};

/// The pending sale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    pub(crate) fn from_items(items: Vec<CartItem>) -> Self {
        Cart { items }
    }

    /// Reserves one unit of a product and appends its snapshot.
    ///
    /// ## Errors
    /// `OutOfStock` if the product does not exist or has no units left.
    /// Nothing changes on error.
    pub fn stage(&mut self, catalog: &mut Catalog, id: &ProductId) -> CoreResult<&CartItem> {
        let product = catalog.decrement_for_sale(id)?;
        let item = CartItem::snapshot_of(product);

        debug!(
            product_id = %id,
            remaining = product.quantity(),
            price = item.price().cents(),
            "Item staged"
        );

        self.items.push(item);
        let index = self.items.len() - 1;
        Ok(&self.items[index])
    }

    /// Removes the item at `index` and gives its unit back to the product.
    ///
    /// If the product was deleted after staging, the item is still removed
    /// and the missing product is skipped.
    ///
    /// ## Errors
    /// `IndexOutOfRange` if there is no item at `index`.
    pub fn unstage(&mut self, catalog: &mut Catalog, index: usize) -> CoreResult<CartItem> {
        if index >= self.items.len() {
            return Err(CoreError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }

        let item = self.items.remove(index);
        if catalog.increment_for_return(item.product_id()) {
            debug!(product_id = %item.product_id(), index, "Item unstaged");
        } else {
            warn!(
                product_id = %item.product_id(),
                name = item.name(),
                "Unstaged item refers to a deleted product, stock not restored"
            );
        }

        Ok(item)
    }

    /// Sum of staged prices.
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::price).sum()
    }

    /// Empties the cart and hands the items over. Stock is not touched:
    /// the units already left the shelf when they were staged.
    pub(crate) fn clear(&mut self) -> Vec<CartItem> {
        std::mem::take(&mut self.items)
    }

    /// Number of staged units that reference `id`.
    pub fn reserved_units(&self, id: &ProductId) -> usize {
        self.items.iter().filter(|i| i.product_id() == id).count()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
