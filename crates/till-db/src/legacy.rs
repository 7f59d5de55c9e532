//! # Legacy Import
//!
//! Converts an export of the browser-storage register into a [`StateSnapshot`].
//!
//! ## Export Shape
//! ```text
//! {
//!   "ousadia_produtos_v1":        [{ "id", "nome", "quantidade", "compra", "venda", "ativo" }],
//!   "ousadia_carrinho_v1":        [{ "idOriginal", "nome", "valor" }],
//!   "ousadia_caixaDia_v1":        "50",
//!   "ousadia_vendasDoDia_v1":     [{ "idOriginal", "nome", "valor", "vendidoEm" }],
//!   "ousadia_caixaAnterior_v1":   "0",
//!   "ousadia_estoqueAnterior_v1": "0"
//! }
//! ```
//!
//! Each value is either the raw storage text (JSON encoded as a string) or
//! the decoded JSON itself. Money is in major units (reais) as floats and is
//! rounded to cents on the way in.
//!
//! ## Conversion Rules
//! - a missing key (or empty text) means empty list / zero, like a first run
//! - a product without `id` gets a fresh one
//! - `ativo` is ignored; the active flag follows the quantity
//! - any record that breaks a register rule fails the import with its index
//! - the period cash is re-derived from the sale lines when they disagree

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use till_core::{CartItem, Money, Product, ProductId, ProductInput, Register, SaleRecord, StateSnapshot};

pub const PRODUCTS_KEY: &str = "ousadia_produtos_v1";
pub const CART_KEY: &str = "ousadia_carrinho_v1";
pub const CASH_KEY: &str = "ousadia_caixaDia_v1";
pub const SALES_KEY: &str = "ousadia_vendasDoDia_v1";
pub const PRIOR_CASH_KEY: &str = "ousadia_caixaAnterior_v1";
pub const PRIOR_STOCK_KEY: &str = "ousadia_estoqueAnterior_v1";

// =============================================================================
// Legacy Records
// =============================================================================

#[derive(Debug, Deserialize)]
struct LegacyProduct {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    nome: String,
    #[serde(default)]
    quantidade: Value,
    #[serde(default)]
    compra: Value,
    #[serde(default)]
    venda: Value,
}

#[derive(Debug, Deserialize)]
struct LegacyCartItem {
    #[serde(rename = "idOriginal", default)]
    id_original: Value,
    #[serde(default)]
    nome: String,
    #[serde(default)]
    valor: Value,
}

#[derive(Debug, Deserialize)]
struct LegacySale {
    #[serde(rename = "idOriginal", default)]
    id_original: Value,
    #[serde(default)]
    nome: String,
    #[serde(default)]
    valor: Value,
    #[serde(rename = "vendidoEm", default)]
    vendido_em: Option<String>,
}

// =============================================================================
// Import
// =============================================================================

/// Parses an export file's text into a snapshot.
pub fn parse_export(text: &str) -> DbResult<StateSnapshot> {
    let export: Value = serde_json::from_str(text)
        .map_err(|e| DbError::legacy(format!("export is not valid JSON: {e}")))?;
    convert_export(&export)
}

/// Parses an export and checks it the same way stored state is checked.
pub fn import_register(text: &str) -> DbResult<Register> {
    let snapshot = parse_export(text)?;
    Ok(Register::from_snapshot(snapshot)?)
}

/// Converts an already decoded export object.
pub fn convert_export(export: &Value) -> DbResult<StateSnapshot> {
    let Value::Object(entries) = export else {
        return Err(DbError::legacy("export must be a JSON object of storage keys"));
    };

    let products: Vec<LegacyProduct> = list(entries.get(PRODUCTS_KEY), PRODUCTS_KEY)?;
    let cart: Vec<LegacyCartItem> = list(entries.get(CART_KEY), CART_KEY)?;
    let sales: Vec<LegacySale> = list(entries.get(SALES_KEY), SALES_KEY)?;

    let catalog = products
        .into_iter()
        .enumerate()
        .map(|(index, p)| convert_product(index, p))
        .collect::<DbResult<Vec<_>>>()?;

    let cart = cart
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let id = id_text(&item.id_original)
                .ok_or_else(|| DbError::legacy(format!("{CART_KEY}[{index}]: missing idOriginal")))?;
            let price = money(&item.valor, CART_KEY, index, "valor")?;
            Ok(CartItem::restore(id, item.nome, price))
        })
        .collect::<DbResult<Vec<_>>>()?;

    let ledger = sales
        .into_iter()
        .enumerate()
        .map(|(index, sale)| convert_sale(index, sale))
        .collect::<DbResult<Vec<_>>>()?;

    let ledger_total: Money = ledger.iter().map(SaleRecord::price).sum();
    let stored_cash = scalar(entries.get(CASH_KEY), CASH_KEY)?;
    let current_cash = if stored_cash == ledger_total {
        stored_cash
    } else {
        warn!(
            stored = stored_cash.cents(),
            ledger = ledger_total.cents(),
            "Legacy cash disagrees with its sale lines, using the sale lines"
        );
        ledger_total
    };

    let snapshot = StateSnapshot {
        catalog,
        cart,
        current_cash,
        ledger,
        prior_cash: scalar(entries.get(PRIOR_CASH_KEY), PRIOR_CASH_KEY)?,
        prior_stock_valuation: scalar(entries.get(PRIOR_STOCK_KEY), PRIOR_STOCK_KEY)?,
    };

    info!(
        products = snapshot.catalog.len(),
        staged = snapshot.cart.len(),
        ledger = snapshot.ledger.len(),
        current_cash = snapshot.current_cash.cents(),
        "Legacy export converted"
    );
    Ok(snapshot)
}

fn convert_product(index: usize, p: LegacyProduct) -> DbResult<Product> {
    let id = id_text(&p.id).unwrap_or_else(|| {
        let id = ProductId::generate();
        debug!(index, product_id = %id, "Legacy product without id, generated one");
        id
    });

    let quantity = number(&p.quantidade, PRODUCTS_KEY, index, "quantidade")?;
    if quantity.fract() != 0.0 {
        return Err(DbError::legacy(format!(
            "{PRODUCTS_KEY}[{index}]: quantidade {quantity} is not a whole number"
        )));
    }

    let input = ProductInput {
        name: p.nome,
        // Saturating cast; out-of-range values fail validation below
        quantity: quantity as i64,
        cost: money(&p.compra, PRODUCTS_KEY, index, "compra")?,
        price: money(&p.venda, PRODUCTS_KEY, index, "venda")?,
    };

    Product::restore(id, &input)
        .map_err(|e| DbError::legacy(format!("{PRODUCTS_KEY}[{index}]: {e}")))
}

fn convert_sale(index: usize, sale: LegacySale) -> DbResult<SaleRecord> {
    let id = id_text(&sale.id_original)
        .ok_or_else(|| DbError::legacy(format!("{SALES_KEY}[{index}]: missing idOriginal")))?;
    let price = money(&sale.valor, SALES_KEY, index, "valor")?;
    let stamp = sale
        .vendido_em
        .ok_or_else(|| DbError::legacy(format!("{SALES_KEY}[{index}]: missing vendidoEm")))?;
    let sold_at = DateTime::parse_from_rfc3339(&stamp)
        .map_err(|e| DbError::legacy(format!("{SALES_KEY}[{index}]: vendidoEm '{stamp}': {e}")))?
        .with_timezone(&Utc);

    Ok(SaleRecord::restore(id, sale.nome, price, sold_at))
}

// =============================================================================
// Value helpers
// =============================================================================

/// Unwraps a storage value that may still be JSON text.
fn decode(value: Option<&Value>, key: &str) -> DbResult<Option<Value>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
        Some(Value::String(text)) => serde_json::from_str(text)
            .map(Some)
            .map_err(|e| DbError::legacy(format!("{key}: stored text is not JSON: {e}"))),
        Some(other) => Ok(Some(other.clone())),
    }
}

fn list<T: for<'de> Deserialize<'de>>(value: Option<&Value>, key: &str) -> DbResult<Vec<T>> {
    match decode(value, key)? {
        None => Ok(Vec::new()),
        Some(decoded) => serde_json::from_value(decoded)
            .map_err(|e| DbError::legacy(format!("{key}: {e}"))),
    }
}

fn scalar(value: Option<&Value>, key: &str) -> DbResult<Money> {
    match decode(value, key)? {
        None => Ok(Money::zero()),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Money::from_major)
            .ok_or_else(|| DbError::legacy(format!("{key}: {n} is out of range"))),
        Some(other) => Err(DbError::legacy(format!("{key}: expected a number, got {other}"))),
    }
}

fn number(value: &Value, key: &str, index: usize, field: &str) -> DbResult<f64> {
    let parsed = match value {
        Value::Null => Some(0.0),
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).ok_or_else(|| {
        DbError::legacy(format!("{key}[{index}]: {field} is not a number: {value}"))
    })
}

fn money(value: &Value, key: &str, index: usize, field: &str) -> DbResult<Money> {
    number(value, key, index, field).map(Money::from_major)
}

fn id_text(value: &Value) -> Option<ProductId> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(ProductId::from(s.as_str())),
        Value::Number(n) => Some(ProductId::from(n.to_string())),
        _ => None,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored(value: Value) -> Value {
        Value::String(value.to_string())
    }

    #[test]
    fn test_browser_storage_export() {
        let export = json!({
            PRODUCTS_KEY: stored(json!([
                { "id": "p1", "nome": "Camisa", "quantidade": 0, "compra": 10, "venda": 25, "ativo": true },
                { "nome": "Calça", "quantidade": "3", "compra": 40.5, "venda": 89.9, "ativo": true }
            ])),
            CART_KEY: stored(json!([{ "idOriginal": "p1", "nome": "Camisa", "valor": 25 }])),
            CASH_KEY: "25",
            SALES_KEY: stored(json!([
                { "idOriginal": "p1", "nome": "Camisa", "valor": 25, "vendidoEm": "2024-03-01T14:05:00.000Z" }
            ])),
            PRIOR_CASH_KEY: "120.1",
            PRIOR_STOCK_KEY: "0"
        });

        let snapshot = convert_export(&export).unwrap();

        assert_eq!(snapshot.catalog.len(), 2);
        let camisa = &snapshot.catalog[0];
        assert_eq!(camisa.id().as_str(), "p1");
        assert!(!camisa.is_active());
        let calca = &snapshot.catalog[1];
        assert!(!calca.id().as_str().is_empty());
        assert_eq!(calca.quantity(), 3);
        assert_eq!(calca.cost().cents(), 4050);
        assert_eq!(calca.price().cents(), 8990);

        assert_eq!(snapshot.cart[0].price().cents(), 2500);
        assert_eq!(snapshot.ledger[0].sold_at().to_rfc3339(), "2024-03-01T14:05:00+00:00");
        assert_eq!(snapshot.current_cash.cents(), 2500);
        assert_eq!(snapshot.prior_cash.cents(), 12010);

        assert!(Register::from_snapshot(snapshot).is_ok());
    }

    #[test]
    fn test_raw_json_values() {
        let export = json!({
            PRODUCTS_KEY: [{ "id": 17, "nome": "Boné", "quantidade": 2, "compra": 5, "venda": 15 }],
            CASH_KEY: 0
        });

        let snapshot = convert_export(&export).unwrap();
        assert_eq!(snapshot.catalog[0].id().as_str(), "17");
        assert!(snapshot.cart.is_empty());
    }

    #[test]
    fn test_empty_export_is_first_run() {
        let snapshot = parse_export("{}").unwrap();
        assert_eq!(snapshot, StateSnapshot::default());
    }

    #[test]
    fn test_invalid_product_names_index() {
        let export = json!({
            PRODUCTS_KEY: [
                { "id": "a", "nome": "Camisa", "quantidade": 1, "compra": 1, "venda": 2 },
                { "id": "b", "nome": "Brinde", "quantidade": 1, "compra": 0, "venda": 0 }
            ]
        });

        let err = convert_export(&export).unwrap_err();
        assert!(err.to_string().contains("ousadia_produtos_v1[1]"));
    }

    #[test]
    fn test_fractional_quantity_rejected() {
        let export = json!({
            PRODUCTS_KEY: [{ "id": "a", "nome": "Camisa", "quantidade": 1.5, "venda": 2 }]
        });
        assert!(matches!(
            convert_export(&export),
            Err(DbError::LegacyImport(_))
        ));
    }

    #[test]
    fn test_cash_rederived_from_sales() {
        let export = json!({
            CASH_KEY: "50.000000001",
            SALES_KEY: [
                { "idOriginal": "a", "nome": "Camisa", "valor": 25, "vendidoEm": "2024-03-01T14:05:00Z" },
                { "idOriginal": "a", "nome": "Camisa", "valor": 25.1, "vendidoEm": "2024-03-01T14:05:00Z" }
            ]
        });

        let snapshot = convert_export(&export).unwrap();
        assert_eq!(snapshot.current_cash.cents(), 5010);
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let export = json!({
            SALES_KEY: [{ "idOriginal": "a", "nome": "Camisa", "valor": 25, "vendidoEm": "ontem" }]
        });
        let err = convert_export(&export).unwrap_err();
        assert!(err.to_string().contains("vendidoEm 'ontem'"));
    }

    #[test]
    fn test_not_an_object() {
        assert!(parse_export("[]").is_err());
        assert!(parse_export("not json").is_err());
    }
}
