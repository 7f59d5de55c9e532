//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                          │
//! │  ├── CoreError        - Rejected register operations                   │
//! │  ├── ValidationError  - Bad product input                              │
//! │  ├── SnapshotError    - Malformed persisted state                      │
//! │  └── MoneyParseError  - Unparseable money text                         │
//! │                                                                         │
//! │  till-db errors (separate crate)                                       │
//! │  └── DbError          - Persistence failures (non-fatal)               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → CliError → operator               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (id, index, field)
//! 3. Every `CoreError` is recoverable: the register is left exactly as it
//!    was before the rejected call
//! 4. A declined confirmation is not an error (operations return `Ok(None)`)

use thiserror::Error;

use crate::types::ProductId;

// =============================================================================
// Core Error
// =============================================================================

/// A rejected register operation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product input failed validation (add / edit).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No product with this id exists in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// The product is missing or has no units left to stage.
    ///
    /// ## User Workflow
    /// ```text
    /// Click "Vender" on a product with quantity 0
    ///      │
    ///      ▼
    /// stage_for_sale(id) → OutOfStock(id)
    ///      │
    ///      ▼
    /// UI shows: "Sem estoque!"
    /// ```
    #[error("Out of stock: {0}")]
    OutOfStock(ProductId),

    /// Unstage was given a position that is not in the cart.
    #[error("Cart index {index} out of range (cart has {len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Finalize was called with nothing staged.
    #[error("Cart is empty")]
    EmptyCart,

    /// Close was called with no cash and no sales in the period.
    #[error("Nothing to close: no sales in the current period")]
    NothingToClose,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be zero or greater.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Value must be strictly greater than zero.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of the representable range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

// =============================================================================
// Snapshot Error
// =============================================================================

/// A persisted snapshot that cannot be turned back into a register.
///
/// Loading rejects bad state explicitly instead of coercing it deep inside
/// the business logic.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// A catalog record breaks a product rule.
    #[error("Catalog record {index} is invalid: {source}")]
    InvalidProduct {
        index: usize,
        #[source]
        source: ValidationError,
    },

    /// Two catalog records share an id.
    #[error("Duplicate product id in catalog: {0}")]
    DuplicateProductId(ProductId),

    /// A staged or sold line has a blank name or non-positive price.
    #[error("{slot} record {index} is invalid: {reason}")]
    InvalidLine {
        slot: &'static str,
        index: usize,
        reason: String,
    },

    /// A cash scalar is negative.
    #[error("{field} cannot be negative (got {cents} cents)")]
    NegativeCash { field: &'static str, cents: i64 },

    /// A total over the stored records does not fit in a money value.
    #[error("{field} is out of range")]
    OutOfRange { field: &'static str },

    /// The period cash does not match what the ledger says was sold.
    #[error("Current cash {cash_cents} does not match ledger total {ledger_cents}")]
    CashMismatch { cash_cents: i64, ledger_cents: i64 },
}

// =============================================================================
// Money Parse Error
// =============================================================================

/// Money text that cannot be read as reais.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyParseError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a valid amount")]
    InvalidFormat(String),

    #[error("'{0}' is too large")]
    Overflow(String),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
