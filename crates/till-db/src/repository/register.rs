//! # Register State Repository
//!
//! Whole-state load and save of the register, one row per slot.
//!
//! ## Save Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   save(&StateSnapshot)                                  │
//! │                                                                         │
//! │  encode every slot to JSON first (nothing written if one fails)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │  UPSERT catalog, cart, cash, ledger, prior_cash, prior_stock   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← all six slots change together or not at all                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Load Outcomes
//! - no slot rows → `None` (fresh install)
//! - all six slots → `Some(snapshot)`
//! - anything in between → `DbError::MissingSlot`

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use till_core::{Register, StateSnapshot};

/// A logical slot of the register state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Catalog,
    Cart,
    Cash,
    Ledger,
    PriorCash,
    PriorStock,
}

impl Slot {
    pub const ALL: [Slot; 6] = [
        Slot::Catalog,
        Slot::Cart,
        Slot::Cash,
        Slot::Ledger,
        Slot::PriorCash,
        Slot::PriorStock,
    ];

    /// Value of the `slot` column.
    pub fn key(self) -> &'static str {
        match self {
            Slot::Catalog => "catalog",
            Slot::Cart => "cart",
            Slot::Cash => "cash",
            Slot::Ledger => "ledger",
            Slot::PriorCash => "prior_cash",
            Slot::PriorStock => "prior_stock",
        }
    }
}

/// Repository for the persisted register state.
#[derive(Debug, Clone)]
pub struct RegisterStateRepository {
    pool: SqlitePool,
}

impl RegisterStateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        RegisterStateRepository { pool }
    }

    /// Reads every slot. `None` means nothing was ever saved.
    pub async fn load(&self) -> DbResult<Option<StateSnapshot>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT slot, payload FROM register_slots")
                .fetch_all(&self.pool)
                .await?;

        if rows.is_empty() {
            debug!("No saved register state");
            return Ok(None);
        }

        let mut payloads: HashMap<String, String> = rows.into_iter().collect();
        let snapshot = StateSnapshot {
            catalog: take(&mut payloads, Slot::Catalog)?,
            cart: take(&mut payloads, Slot::Cart)?,
            current_cash: take(&mut payloads, Slot::Cash)?,
            ledger: take(&mut payloads, Slot::Ledger)?,
            prior_cash: take(&mut payloads, Slot::PriorCash)?,
            prior_stock_valuation: take(&mut payloads, Slot::PriorStock)?,
        };

        debug!(
            products = snapshot.catalog.len(),
            staged = snapshot.cart.len(),
            ledger = snapshot.ledger.len(),
            "Register state loaded"
        );
        Ok(Some(snapshot))
    }

    /// Loads and validates the register; a fresh install yields an empty one.
    pub async fn load_register(&self) -> DbResult<Register> {
        match self.load().await? {
            Some(snapshot) => Ok(Register::from_snapshot(snapshot)?),
            None => {
                info!("Starting with an empty register");
                Ok(Register::new())
            }
        }
    }

    /// Writes all six slots in one transaction.
    pub async fn save(&self, snapshot: &StateSnapshot) -> DbResult<()> {
        let payloads = [
            (Slot::Catalog, encode(Slot::Catalog, &snapshot.catalog)?),
            (Slot::Cart, encode(Slot::Cart, &snapshot.cart)?),
            (Slot::Cash, encode(Slot::Cash, &snapshot.current_cash)?),
            (Slot::Ledger, encode(Slot::Ledger, &snapshot.ledger)?),
            (Slot::PriorCash, encode(Slot::PriorCash, &snapshot.prior_cash)?),
            (
                Slot::PriorStock,
                encode(Slot::PriorStock, &snapshot.prior_stock_valuation)?,
            ),
        ];
        let now = Utc::now().to_rfc3339();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for (slot, payload) in &payloads {
            sqlx::query(
                r#"
                INSERT INTO register_slots (slot, payload, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(slot) DO UPDATE SET
                    payload = excluded.payload,
                    updated_at = excluded.updated_at
                "#,
            )
            .bind(slot.key())
            .bind(payload)
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(
            products = snapshot.catalog.len(),
            staged = snapshot.cart.len(),
            ledger = snapshot.ledger.len(),
            current_cash = snapshot.current_cash.cents(),
            "Register state saved"
        );
        Ok(())
    }
}

fn encode<T: Serialize + ?Sized>(slot: Slot, value: &T) -> DbResult<String> {
    serde_json::to_string(value).map_err(|source| DbError::Serialization {
        slot: slot.key(),
        source,
    })
}

fn take<T: DeserializeOwned>(payloads: &mut HashMap<String, String>, slot: Slot) -> DbResult<T> {
    let raw = payloads
        .remove(slot.key())
        .ok_or(DbError::MissingSlot(slot.key()))?;
    serde_json::from_str(&raw).map_err(|source| DbError::Serialization {
        slot: slot.key(),
        source,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
