//! # Register Session
//!
//! Holds the loaded register and the database, and saves after every
//! successful operation.
//!
//! ## Mutate → Save
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  session.apply(|register| register.stage_for_sale(&id))                │
//! │       │                                                                 │
//! │       ├── Err(CoreError) ──► returned, register unchanged, no save     │
//! │       │                                                                 │
//! │       ▼ Ok(value)                                                       │
//! │  db.register_state().save(&register.snapshot())                        │
//! │       │                                                                 │
//! │       ├── Ok   ──► Applied { value, save_warning: None }               │
//! │       └── Err  ──► Applied { value, save_warning: Some(err) }          │
//! │                    (in-memory state stays authoritative)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, warn};

use crate::error::CliResult;
use till_core::{CoreResult, Register};
use till_db::{Database, DbError, DbResult};

/// Result of an applied operation plus the outcome of saving it.
#[derive(Debug)]
pub struct Applied<T> {
    pub value: T,
    pub save_warning: Option<DbError>,
}

pub struct Session {
    db: Database,
    register: Register,
}

impl Session {
    /// Loads the saved register (or an empty one on first run).
    pub async fn open(db: Database) -> CliResult<Self> {
        let register = db.register_state().load_register().await?;
        Ok(Session { db, register })
    }

    pub fn register(&self) -> &Register {
        &self.register
    }

    /// Whether anything was ever recorded in this register.
    pub fn is_blank(&self) -> bool {
        self.register == Register::new()
    }

    /// Runs one register operation and saves on success.
    pub async fn apply<T, F>(&mut self, op: F) -> CliResult<Applied<T>>
    where
        F: FnOnce(&mut Register) -> CoreResult<T>,
    {
        let value = op(&mut self.register)?;
        let save_warning = self.save().await.err();
        Ok(Applied {
            value,
            save_warning,
        })
    }

    /// Swaps in a whole register (legacy import) and saves it.
    pub async fn replace(&mut self, register: Register) -> Option<DbError> {
        self.register = register;
        self.save().await.err()
    }

    async fn save(&self) -> DbResult<()> {
        match self.db.register_state().save(&self.register.snapshot()).await {
            Ok(()) => {
                debug!("Register saved");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Saving the register failed, keeping in-memory state");
                Err(e)
            }
        }
    }

    pub async fn close(self) {
        self.db.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use till_core::{CoreError, Money, ProductInput};
    use till_db::DbConfig;

    fn camisa() -> ProductInput {
        ProductInput {
            name: "Camisa".to_string(),
            quantity: 2,
            cost: Money::from_cents(1000),
            price: Money::from_cents(2500),
        }
    }

    #[tokio::test]
    async fn test_apply_saves() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut session = Session::open(db.clone()).await.unwrap();
        assert!(session.is_blank());

        let applied = session
            .apply(|r| r.add_product(&camisa()).map(|p| p.id().clone()))
            .await
            .unwrap();
        assert!(applied.save_warning.is_none());

        let reloaded = Session::open(db).await.unwrap();
        assert!(reloaded.register().product(&applied.value).is_some());
    }

    #[tokio::test]
    async fn test_rejected_operation_is_not_saved() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut session = Session::open(db.clone()).await.unwrap();

        let result = session.apply(|r| r.unstage(0)).await;
        assert!(matches!(
            result,
            Err(crate::error::CliError::Core(CoreError::IndexOutOfRange { .. }))
        ));
        assert!(db.register_state().load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_failure_is_a_warning() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut session = Session::open(db.clone()).await.unwrap();
        db.close().await;

        let applied = session
            .apply(|r| r.add_product(&camisa()).map(|p| p.id().clone()))
            .await
            .unwrap();

        assert!(applied.save_warning.is_some());
        assert!(session.register().product(&applied.value).is_some());
    }
}
