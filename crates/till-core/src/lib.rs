//! # till-core: Register Logic for a Single Till
//!
//! Stock, staged sales, committed sales and period cash for one shop
//! terminal, with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Till Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    till (operator CLI)                          │   │
//! │  │   add / list / stage / finalize / close / cash                 │   │
//! │  │   terminal confirm ─┐            text report generator ─┐      │   │
//! │  └─────────────────────┼───────────────────────────────────┼──────┘   │
//! │                        │ Confirm                           │ Report   │
//! │  ┌─────────────────────▼───────────────────────────────────▼──────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌─────────┐          │   │
//! │  │   │ catalog │  │  cart   │  │ ledger  │  │  cash   │          │   │
//! │  │   └────┬────┘  └────┬────┘  └────┬────┘  └────┬────┘          │   │
//! │  │        └────────────┴─── Register ┴────────────┘               │   │
//! │  │                            │                                    │   │
//! │  │                   closing ─┘  snapshot ⇅                       │   │
//! │  └────────────────────────────────┬────────────────────────────────┘   │
//! │                                   │ StateSnapshot                      │
//! │  ┌────────────────────────────────▼────────────────────────────────┐   │
//! │  │                    till-db (Persistence Gateway)                │   │
//! │  │            SQLite slots, migrations, legacy import              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Integer-cents money and currency formatting
//! - [`types`] - Product, CartItem and SaleRecord
//! - [`validation`] - Product input rules
//! - [`catalog`] - Catalog Store
//! - [`cart`] - Reservation Buffer
//! - [`ledger`] - Sales Ledger
//! - [`cash`] - Period Cash Register
//! - [`closing`] - Closing Aggregator and the report generator seam
//! - [`confirm`] - Operator confirmation seam
//! - [`snapshot`] - Persisted state and its load-time checks
//! - [`register`] - The aggregate tying it all together
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **No I/O**: confirmation, rendering and storage are injected
//! 2. **Integer Money**: every sum accumulates in cents
//! 3. **No partial mutation**: a rejected call leaves the register as it was
//! 4. **Derived, not stored**: a product is active because it has stock

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod cash;
pub mod catalog;
pub mod closing;
pub mod confirm;
pub mod error;
pub mod ledger;
pub mod money;
pub mod register;
pub mod snapshot;
pub mod types;
pub mod validation;

// =============================================================================
// Business Constants
// =============================================================================

/// Maximum units of one product on hand.
///
/// ## Business Reason
/// A shop shelf never holds a million pieces of one model; anything above is
/// a typo. Together with [`MAX_PRICE_CENTS`] it caps a product's stock value
/// at 10^14 cents, so catalog valuations and period totals stay far inside
/// `i64`.
pub const MAX_PRODUCT_QUANTITY: i64 = 1_000_000;

/// Maximum unit price or cost, in cents (R$ 1.000.000,00).
pub const MAX_PRICE_CENTS: i64 = 100_000_000;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cash::CashSnapshot;
pub use closing::{ClosingOutcome, ClosingReport, ReportGenerator, SalesTally};
pub use confirm::{Confirm, Prompt};
pub use error::{CoreError, CoreResult, MoneyParseError, SnapshotError, ValidationError};
pub use money::{CurrencyFormat, Money};
pub use register::{Register, SaleReceipt};
pub use snapshot::StateSnapshot;
pub use types::*;
