//! # pharmstock-core: Pure Domain Logic for PharmStock
//!
//! This crate holds the inventory data model and every rule that can be
//! checked without touching a database, a socket or a scanner.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        PharmStock Architecture                          │
//! │                                                                         │
//! │  HTTP (axum) ──► Service Façade ──► Validation ──► Record Store        │
//! │                                        ▲               ▲                │
//! │                                        │               │                │
//! │  ┌─────────────────────────────────────┴───────────────┼────────────┐   │
//! │  │               ★ pharmstock-core (THIS CRATE) ★      │            │   │
//! │  │                                                     │            │   │
//! │  │   ┌─────────────┐  ┌──────────────┐  ┌────────────┐ │            │   │
//! │  │   │    types    │  │  validation  │  │   error    │ │            │   │
//! │  │   │ Inventory-  │  │ length/range │  │ Validation │ │            │   │
//! │  │   │ Record,Scan │  │    checks    │  │  CoreError │ │            │   │
//! │  │   └─────────────┘  └──────────────┘  └────────────┘ │            │   │
//! │  └─────────────────────────────────────────────────────┼────────────┘   │
//! │                                                        │                │
//! │  Scanner ──► Scan Correlator ──── lookup by barcode ───┘                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Inventory record, create/patch payloads, scan events, pagination
//! - [`validation`] - Field constraint checks run before any store call
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use pharmstock_core::validation::validate_new_inventory;
//! use pharmstock_core::NewInventory;
//!
//! let input = NewInventory {
//!     barcode: "8901234567890".to_string(),
//!     drug_name: "Amoxicillin 500mg".to_string(),
//!     manufacturer: "Cipla".to_string(),
//!     units: "capsules".to_string(),
//!     price: 4.75,
//!     stock_quantity: 120,
//!     stocked_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
//!     expiry_date: NaiveDate::from_ymd_opt(2027, 1, 10).unwrap(),
//! };
//!
//! assert!(validate_new_inventory(&input).is_ok());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Field Limits
// =============================================================================

/// Maximum barcode length in characters.
pub const MAX_BARCODE_LEN: usize = 64;

/// Maximum drug name length in characters.
pub const MAX_DRUG_NAME_LEN: usize = 255;

/// Maximum manufacturer length in characters.
pub const MAX_MANUFACTURER_LEN: usize = 255;

/// Maximum unit-of-measure label length in characters.
pub const MAX_UNITS_LEN: usize = 50;

// =============================================================================
// Pagination Defaults
// =============================================================================

/// Page size used when a list request does not name one.
pub const DEFAULT_PAGE_LIMIT: u64 = 50;

/// Offset used when a list request does not name one.
pub const DEFAULT_PAGE_OFFSET: u64 = 0;
