//! # Sales Ledger
//!
//! Append-only list of committed sale lines for the current period. It only
//! ever shrinks when the period is closed.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::money::Money;
use crate::types::{CartItem, SaleRecord};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalesLedger {
    records: Vec<SaleRecord>,
}

impl SalesLedger {
    pub fn new() -> Self {
        SalesLedger::default()
    }

    pub(crate) fn from_records(records: Vec<SaleRecord>) -> Self {
        SalesLedger { records }
    }

    /// Appends one record per item, all stamped with the same commit time.
    /// Returns the newly appended records.
    pub(crate) fn append_batch(
        &mut self,
        items: Vec<CartItem>,
        sold_at: DateTime<Utc>,
    ) -> &[SaleRecord] {
        let start = self.records.len();
        self.records.extend(
            items
                .into_iter()
                .map(|item| SaleRecord::from_cart_item(item, sold_at)),
        );

        debug!(
            lines = self.records.len() - start,
            ledger_len = self.records.len(),
            %sold_at,
            "Sale lines appended"
        );
        &self.records[start..]
    }

    /// Period reset. Only closing calls this.
    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }

    /// Sum of every recorded price.
    pub fn total(&self) -> Money {
        self.records.iter().map(SaleRecord::price).sum()
    }

    pub fn records(&self) -> &[SaleRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductId;

    fn item(name: &str, price: i64) -> CartItem {
        CartItem::restore(ProductId::generate(), name, Money::from_cents(price))
    }

    #[test]
    fn test_append_batch_shares_timestamp() {
        let mut ledger = SalesLedger::new();
        let at = Utc::now();

        let appended = ledger.append_batch(vec![item("Camisa", 2500), item("Calça", 8990)], at);
        assert_eq!(appended.len(), 2);
        assert!(appended.iter().all(|r| r.sold_at() == at));

        ledger.append_batch(vec![item("Boné", 1500)], Utc::now());
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.total().cents(), 2500 + 8990 + 1500);
    }

    #[test]
    fn test_clear() {
        let mut ledger = SalesLedger::new();
        ledger.append_batch(vec![item("Camisa", 2500)], Utc::now());
        ledger.clear();
        assert!(ledger.is_empty());
        assert!(ledger.total().is_zero());
    }
}
