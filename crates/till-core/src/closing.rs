//! # Closing Aggregator
//!
//! End-of-period snapshot of the register.
//!
//! ## Closing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         close()                                         │
//! │                                                                         │
//! │  cash == 0 and ledger empty? ──► NothingToClose                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  confirm(Prompt::Close)? ──no──► Ok(None), nothing changed             │
//! │       │ yes                                                             │
//! │       ▼                                                                 │
//! │  ClosingReport {                                                       │
//! │    prior_cash, prior_stock_valuation   (baselines BEFORE the reset)    │
//! │    current_cash                                                        │
//! │    sales_by_name: "Camisa" → { count: 2, total: R$ 50,00 }             │
//! │  }                                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  prior_cash ← current_cash                                             │
//! │  prior_stock_valuation ← live stock valuation                          │
//! │  current_cash ← 0, ledger cleared                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ReportGenerator::render(&report)  (failure does NOT undo the reset)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::SaleRecord;

/// Units sold and money taken for one product name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesTally {
    pub count: u32,
    pub total: Money,
}

/// Snapshot of a closed period, handed to the report generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingReport {
    /// When the period was closed.
    pub closed_at: DateTime<Utc>,
    /// Cash of the period before this one.
    pub prior_cash: Money,
    /// Stock valuation at the previous closing.
    pub prior_stock_valuation: Money,
    /// Cash taken in the period being closed.
    pub current_cash: Money,
    /// Live stock valuation at the moment of closing.
    pub stock_valuation: Money,
    /// Sale lines in the period.
    pub line_count: usize,
    /// Sales grouped by the name each line was sold under, in order of first
    /// sale.
    pub sales_by_name: IndexMap<String, SalesTally>,
}

/// Groups sale lines by exact name (not by product id), summing in cents.
///
/// A product renamed mid-period shows up under both names: each line counts
/// under the name it was sold with.
pub fn tally_by_name<'a, I>(records: I) -> IndexMap<String, SalesTally>
where
    I: IntoIterator<Item = &'a SaleRecord>,
{
    let mut tallies: IndexMap<String, SalesTally> = IndexMap::new();
    for record in records {
        let tally = tallies.entry(record.name().to_string()).or_default();
        tally.count += 1;
        tally.total += record.price();
    }
    tallies
}

/// Turns a closing report into a document (file, printout, ...).
pub trait ReportGenerator {
    type Error: std::error::Error;

    fn render(&mut self, report: &ClosingReport) -> Result<(), Self::Error>;
}

/// Result of closing and rendering.
///
/// The period is closed whenever this value exists; `rendered` only says
/// whether the document could be produced.
#[derive(Debug)]
pub struct ClosingOutcome<E> {
    pub report: ClosingReport,
    pub rendered: Result<(), E>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductId;

    fn sale(id: &ProductId, name: &str, price: i64) -> SaleRecord {
        SaleRecord::restore(id.clone(), name, Money::from_cents(price), Utc::now())
    }

    #[test]
    fn test_tally_groups_by_sale_time_name() {
        let camisa = ProductId::generate();
        let calca = ProductId::generate();
        let records = vec![
            sale(&camisa, "Camisa", 2500),
            sale(&calca, "Calça", 8990),
            sale(&camisa, "Camisa", 2500),
            // Same product, renamed before this sale
            sale(&camisa, "Camisa Azul", 2700),
        ];

        let tallies = tally_by_name(&records);

        let names: Vec<&str> = tallies.keys().map(String::as_str).collect();
        assert_eq!(names, ["Camisa", "Calça", "Camisa Azul"]);
        assert_eq!(
            tallies["Camisa"],
            SalesTally {
                count: 2,
                total: Money::from_cents(5000)
            }
        );
        assert_eq!(tallies["Camisa Azul"].count, 1);
    }

    #[test]
    fn test_tally_empty() {
        assert!(tally_by_name(&Vec::<SaleRecord>::new()).is_empty());
    }
}
