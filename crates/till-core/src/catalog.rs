//! # Catalog Store
//!
//! Owns every product and the rules that keep stock consistent.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operation               Effect on product                              │
//! │  ─────────               ─────────────────                              │
//! │  add(input)              new product, fresh id                          │
//! │  edit(id, input)         all four fields overwritten at once            │
//! │  delete(id)              removed outright                               │
//! │  decrement_for_sale(id)  quantity - 1   (stage)                         │
//! │  increment_for_return(id) quantity + 1  (unstage)                       │
//! │                                                                         │
//! │  active is never stored: it is read from quantity on every access      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Products keep insertion order. Searches list active products first and
//! otherwise preserve that order.

use tracing::debug;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Product, ProductId, ProductInput};
use crate::validation::validate_product;

/// The set of tracked products.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// Products must already be validated and have unique ids.
    pub(crate) fn from_products(products: Vec<Product>) -> Self {
        Catalog { products }
    }

    /// Adds a product with a freshly generated id.
    ///
    /// ## Errors
    /// `Validation` when the name is blank, quantity or cost is negative, the
    /// price is not positive, or a bound (`MAX_PRODUCT_QUANTITY`,
    /// `MAX_PRICE_CENTS`, total stock valuation) is exceeded.
    pub fn add(&mut self, input: &ProductInput) -> CoreResult<&Product> {
        let valid = validate_product(input)?;
        let product = Product::from_valid(ProductId::generate(), valid);
        self.ensure_valuation_fits(None, &product)?;

        debug!(
            id = %product.id(),
            name = product.name(),
            quantity = product.quantity(),
            price = product.price().cents(),
            "Product added"
        );

        self.products.push(product);
        let index = self.products.len() - 1;
        Ok(&self.products[index])
    }

    /// Overwrites name, quantity, cost and price of an existing product.
    ///
    /// Staged cart items keep the name and price they were staged with.
    ///
    /// ## Errors
    /// - `ProductNotFound` for an unknown id
    /// - `Validation` with the same rules as [`Catalog::add`]
    pub fn edit(&mut self, id: &ProductId, input: &ProductInput) -> CoreResult<&Product> {
        let index = self
            .position(id)
            .ok_or_else(|| CoreError::ProductNotFound(id.clone()))?;
        let valid = validate_product(input)?;
        let edited = Product::from_valid(id.clone(), valid);
        self.ensure_valuation_fits(Some(index), &edited)?;

        self.products[index] = edited;
        let product = &self.products[index];

        debug!(
            id = %product.id(),
            name = product.name(),
            quantity = product.quantity(),
            price = product.price().cents(),
            "Product edited"
        );

        Ok(product)
    }

    /// Removes a product and returns it.
    pub fn delete(&mut self, id: &ProductId) -> CoreResult<Product> {
        let index = self
            .position(id)
            .ok_or_else(|| CoreError::ProductNotFound(id.clone()))?;
        let product = self.products.remove(index);

        debug!(id = %product.id(), name = product.name(), "Product deleted");
        Ok(product)
    }

    /// Looks a product up by id.
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id() == id)
    }

    /// Reserves one unit for a sale.
    ///
    /// ## Errors
    /// `OutOfStock` when the product is missing or has no units left.
    pub(crate) fn decrement_for_sale(&mut self, id: &ProductId) -> CoreResult<&Product> {
        let product = self
            .products
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or_else(|| CoreError::OutOfStock(id.clone()))?;

        if !product.take_one() {
            return Err(CoreError::OutOfStock(id.clone()));
        }

        Ok(&*product)
    }

    /// Returns one reserved unit to the shelf.
    ///
    /// A product deleted in the meantime is tolerated: nothing happens and
    /// `false` is returned.
    pub(crate) fn increment_for_return(&mut self, id: &ProductId) -> bool {
        match self.products.iter_mut().find(|p| p.id() == id) {
            Some(product) => {
                product.put_back_one();
                true
            }
            None => false,
        }
    }

    /// Value of all stock on hand at sale price, `Σ price × quantity`.
    pub fn total_valuation(&self) -> Money {
        self.products.iter().map(Product::stock_value).sum()
    }

    /// Same as [`Catalog::total_valuation`], `None` if it does not fit.
    pub fn checked_valuation(&self) -> Option<Money> {
        Money::checked_sum(self.products.iter().map(Product::stock_value))
    }

    /// Rejects a product (new, or replacing the one at `replacing`) that
    /// would push the catalog valuation out of range.
    fn ensure_valuation_fits(
        &self,
        replacing: Option<usize>,
        product: &Product,
    ) -> CoreResult<()> {
        let others = self
            .products
            .iter()
            .enumerate()
            .filter(|(index, _)| Some(*index) != replacing)
            .map(|(_, p)| p.stock_value());

        match Money::checked_sum(others.chain(std::iter::once(product.stock_value()))) {
            Some(_) => Ok(()),
            None => Err(ValidationError::OutOfRange {
                field: "stock valuation".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into()),
        }
    }

    /// Products whose name contains `term`, ignoring case.
    ///
    /// A blank term matches everything. Active products come first; within
    /// each group products keep insertion order. The returned iterator is
    /// lazy and can be cloned to walk the results again.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::catalog::Catalog;
    /// use till_core::money::Money;
    /// use till_core::types::ProductInput;
    ///
    /// let mut catalog = Catalog::new();
    /// catalog.add(&ProductInput {
    ///     name: "Camisa Polo".to_string(),
    ///     quantity: 1,
    ///     cost: Money::from_cents(1000),
    ///     price: Money::from_cents(2500),
    /// }).unwrap();
    ///
    /// assert_eq!(catalog.search("polo").count(), 1);
    /// assert_eq!(catalog.search("calça").count(), 0);
    /// ```
    pub fn search(&self, term: &str) -> impl Iterator<Item = &Product> + Clone + '_ {
        let needle = term.trim().to_lowercase();
        let active = self.products.iter().filter(|p| p.is_active());
        let inactive = self.products.iter().filter(|p| !p.is_active());

        active
            .chain(inactive)
            .filter(move |p| needle.is_empty() || p.name().to_lowercase().contains(&needle))
    }

    /// All products in insertion order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.products.iter().position(|p| p.id() == id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
