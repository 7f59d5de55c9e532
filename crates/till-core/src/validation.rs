//! # Validation Module
//!
//! Input validation for catalog records.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI argument parsing (clap)                                  │
//! │  ├── Types: integers, money text                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── add / edit: name, quantity, cost, price rules                     │
//! │  └── snapshot load: every persisted product goes through the same      │
//! │      rules, so bad data is rejected at the boundary                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::money::Money;
//! use till_core::validation::{validate_price, validate_quantity};
//!
//! assert_eq!(validate_quantity(2).unwrap(), 2);
//! assert!(validate_price(Money::zero()).is_err());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::ProductInput;
use crate::{MAX_PRICE_CENTS, MAX_PRODUCT_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Product fields that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ValidProduct {
    pub name: String,
    pub quantity: u32,
    pub cost: Money,
    pub price: Money,
}

/// Validates a product name and returns it trimmed.
///
/// ## Example
/// ```rust
/// use till_core::validation::validate_product_name;
///
/// assert_eq!(validate_product_name("  Camisa ").unwrap(), "Camisa");
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    Ok(name.to_string())
}

/// Validates a stock quantity.
///
/// ## Rules
/// - Must be zero or greater (zero means "registered but not sellable")
/// - Must not exceed MAX_PRODUCT_QUANTITY
pub fn validate_quantity(qty: i64) -> ValidationResult<u32> {
    if qty < 0 {
        return Err(ValidationError::Negative {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_PRODUCT_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: MAX_PRODUCT_QUANTITY,
        });
    }

    u32::try_from(qty).map_err(|_| ValidationError::OutOfRange {
        field: "quantity".to_string(),
        min: 0,
        max: MAX_PRODUCT_QUANTITY,
    })
}

/// Validates a purchase cost. Zero is allowed (gifts, samples).
pub fn validate_cost(cost: Money) -> ValidationResult<()> {
    if cost.is_negative() {
        return Err(ValidationError::Negative {
            field: "cost".to_string(),
        });
    }

    if cost.cents() > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "cost".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a sale price.
///
/// ## Rules
/// - Must be strictly positive: nothing is sold for free
/// - Must not exceed MAX_PRICE_CENTS
///
/// ## Example
/// ```rust
/// use till_core::money::Money;
/// use till_core::validation::validate_price;
///
/// assert!(validate_price(Money::from_cents(2500)).is_ok());
/// assert!(validate_price(Money::zero()).is_err());
/// assert!(validate_price(Money::from_cents(-100)).is_err());
/// assert!(validate_price(Money::from_cents(i64::MAX)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }

    if price.cents() > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 1,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Runs every product rule, in field order.
pub(crate) fn validate_product(input: &ProductInput) -> ValidationResult<ValidProduct> {
    let name = validate_product_name(&input.name)?;
    let quantity = validate_quantity(input.quantity)?;
    validate_cost(input.cost)?;
    validate_price(input.price)?;

    Ok(ValidProduct {
        name,
        quantity,
        cost: input.cost,
        price: input.price,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
