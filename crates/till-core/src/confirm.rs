//! # Operator Confirmation
//!
//! Finalizing a sale and closing the period both stop for a yes/no from the
//! operator before anything changes. The core does not know whether the
//! answer comes from a dialog, a terminal or a test: it only asks.
//!
//! ```rust
//! use till_core::confirm::{Confirm, Prompt};
//!
//! // Any closure works as a confirmer
//! let mut always = |_: &Prompt| true;
//! assert!(always.confirm(&Prompt::Close));
//! ```

use std::fmt;

use crate::money::Money;

/// What the operator is asked to approve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Commit the cart for this total.
    FinalizeSale { total: Money },
    /// Close the period and reset cash and sales.
    Close,
    /// Remove a product permanently.
    DeleteProduct { name: String },
}

impl Prompt {
    /// Stable key, e.g. for looking up translated prompt text.
    pub fn key(&self) -> &'static str {
        match self {
            Prompt::FinalizeSale { .. } => "finalize_sale",
            Prompt::Close => "close",
            Prompt::DeleteProduct { .. } => "delete_product",
        }
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prompt::FinalizeSale { total } => write!(f, "Confirmar venda de {total}?"),
            Prompt::Close => f.write_str("Fechar caixa e gerar relatório?"),
            Prompt::DeleteProduct { name } => {
                write!(f, "Excluir produto \"{name}\" permanentemente?")
            }
        }
    }
}

/// A yes/no gate checked before any mutation.
pub trait Confirm {
    fn confirm(&mut self, prompt: &Prompt) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&Prompt) -> bool,
{
    fn confirm(&mut self, prompt: &Prompt) -> bool {
        self(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_text() {
        let prompt = Prompt::FinalizeSale {
            total: Money::from_cents(5000),
        };
        assert_eq!(prompt.to_string(), "Confirmar venda de R$ 50,00?");
        assert_eq!(prompt.key(), "finalize_sale");
    }

    #[test]
    fn test_closure_confirmer_sees_prompt() {
        let mut seen = Vec::new();
        let mut confirmer = |p: &Prompt| {
            seen.push(p.key());
            false
        };
        assert!(!confirmer.confirm(&Prompt::Close));
        assert_eq!(seen, ["close"]);
    }
}
