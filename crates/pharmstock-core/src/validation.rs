//! # Validation Module
//!
//! Input validation for inventory payloads.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP adapter (axum)                                          │
//! │  └── Type validation (JSON / path / query deserialization)             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Service façade                                               │
//! │  └── THIS MODULE: length, presence, non-negativity                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Record store                                                 │
//! │  ├── UNIQUE barcode                                                    │
//! │  └── CHECK (price >= 0, stock_quantity >= 0)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Checks are fail-fast in field declaration order: barcode, drug_name,
//! manufacturer, units, price, stock_quantity. Lengths count characters, not
//! bytes. Values are not trimmed and no barcode format is imposed.
//!
//! ## Usage
//! ```rust
//! use pharmstock_core::validation::{validate_barcode, validate_price};
//!
//! validate_barcode("8901234567890").unwrap();
//! assert!(validate_price(-1.0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{InventoryPatch, NewInventory};
use crate::{MAX_BARCODE_LEN, MAX_DRUG_NAME_LEN, MAX_MANUFACTURER_LEN, MAX_UNITS_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Checks that `value` holds between 1 and `max` characters.
fn validate_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product barcode.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
/// - Any characters are accepted
///
/// ## Example
/// ```rust
/// use pharmstock_core::validation::validate_barcode;
///
/// assert!(validate_barcode("ABC123").is_ok());
/// assert!(validate_barcode("").is_err());
/// assert!(validate_barcode(&"9".repeat(65)).is_err());
/// ```
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    validate_text("barcode", barcode, MAX_BARCODE_LEN)
}

/// Validates a drug name (1 to 255 characters).
pub fn validate_drug_name(name: &str) -> ValidationResult<()> {
    validate_text("drug_name", name, MAX_DRUG_NAME_LEN)
}

/// Validates a manufacturer name (1 to 255 characters).
pub fn validate_manufacturer(manufacturer: &str) -> ValidationResult<()> {
    validate_text("manufacturer", manufacturer, MAX_MANUFACTURER_LEN)
}

/// Validates a unit-of-measure label such as `tablets` (1 to 50 characters).
pub fn validate_units(units: &str) -> ValidationResult<()> {
    validate_text("units", units, MAX_UNITS_LEN)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit price.
///
/// ## Rules
/// - Must be >= 0
/// - Zero is allowed (free samples)
/// - NaN is rejected
///
/// ## Example
/// ```rust
/// use pharmstock_core::validation::validate_price;
///
/// assert!(validate_price(12.5).is_ok());
/// assert!(validate_price(0.0).is_ok());
/// assert!(validate_price(-0.01).is_err());
/// ```
pub fn validate_price(price: f64) -> ValidationResult<()> {
    // `!(x >= 0)` also catches NaN
    if !(price >= 0.0) {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock quantity (must be >= 0).
pub fn validate_stock_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::Negative {
            field: "stock_quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Payload Validators
// =============================================================================

/// Validates a full create/update payload.
///
/// ## Flow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  POST /api/inventory  or  PUT /api/inventory/{id}                      │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_new_inventory(&input) ← THIS FUNCTION                        │
/// │       │                                                                 │
/// │       ├── first violated field? → Err(ValidationError), store untouched │
/// │       │                                                                 │
/// │       └── OK → store.create / store.update                              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// Dates are not checked against each other; an expiry date before the
/// stocked date is accepted.
pub fn validate_new_inventory(input: &NewInventory) -> ValidationResult<()> {
    validate_barcode(&input.barcode)?;
    validate_drug_name(&input.drug_name)?;
    validate_manufacturer(&input.manufacturer)?;
    validate_units(&input.units)?;
    validate_price(input.price)?;
    validate_stock_quantity(input.stock_quantity)?;
    Ok(())
}

/// Validates only the fields present in a patch.
pub fn validate_patch(patch: &InventoryPatch) -> ValidationResult<()> {
    if let Some(barcode) = &patch.barcode {
        validate_barcode(barcode)?;
    }
    if let Some(name) = &patch.drug_name {
        validate_drug_name(name)?;
    }
    if let Some(manufacturer) = &patch.manufacturer {
        validate_manufacturer(manufacturer)?;
    }
    if let Some(units) = &patch.units {
        validate_units(units)?;
    }
    if let Some(price) = patch.price {
        validate_price(price)?;
    }
    if let Some(quantity) = patch.stock_quantity {
        validate_stock_quantity(quantity)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_input() -> NewInventory {
        NewInventory {
            barcode: "ABC123".to_string(),
            drug_name: "Paracetamol 500mg".to_string(),
            manufacturer: "GSK".to_string(),
            units: "tablets".to_string(),
            price: 2.5,
            stock_quantity: 100,
            stocked_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            expiry_date: NaiveDate::from_ymd_opt(2027, 3, 1).unwrap(),
        }
    }

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("ABC123").is_ok());
        assert!(validate_barcode("has space").is_ok());
        assert!(validate_barcode(&"9".repeat(64)).is_ok());

        assert!(validate_barcode("").is_err());
        assert!(validate_barcode(&"9".repeat(65)).is_err());
    }

    #[test]
    fn test_lengths_count_characters() {
        // 64 two-byte characters are 128 bytes but still within the limit
        let barcode = "é".repeat(64);
        assert!(validate_barcode(&barcode).is_ok());
        assert!(validate_units(&"µ".repeat(50)).is_ok());
        assert!(validate_units(&"µ".repeat(51)).is_err());
    }

    #[test]
    fn test_whitespace_is_not_trimmed() {
        assert!(validate_drug_name("   ").is_ok());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(9.99).is_ok());
        assert!(validate_price(-1.0).is_err());
        assert!(validate_price(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_stock_quantity() {
        assert!(validate_stock_quantity(0).is_ok());
        assert!(validate_stock_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_new_inventory_reports_first_field() {
        let mut input = sample_input();
        input.units = String::new();
        input.price = -1.0;

        let err = validate_new_inventory(&input).unwrap_err();
        assert_eq!(err.field(), "units");
    }

    #[test]
    fn test_negative_price_names_price() {
        let mut input = sample_input();
        input.price = -1.0;

        let err = validate_new_inventory(&input).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Negative {
                field: "price".to_string()
            }
        );
    }

    #[test]
    fn test_expiry_before_stocked_is_accepted() {
        let mut input = sample_input();
        input.expiry_date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert!(validate_new_inventory(&input).is_ok());
    }

    #[test]
    fn test_validate_patch_only_checks_present_fields() {
        assert!(validate_patch(&InventoryPatch::default()).is_ok());

        let patch = InventoryPatch {
            price: Some(9.99),
            ..Default::default()
        };
        assert!(validate_patch(&patch).is_ok());

        let patch = InventoryPatch {
            stock_quantity: Some(-5),
            ..Default::default()
        };
        assert_eq!(validate_patch(&patch).unwrap_err().field(), "stock_quantity");

        let patch = InventoryPatch {
            barcode: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(validate_patch(&patch).unwrap_err().field(), "barcode");
    }
}
