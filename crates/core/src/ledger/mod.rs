//! Tenant-scoped financial ledger.
//!
//! This module implements the invoice/payment engine:
//! - Invoice status machine with derived balance and status
//! - The payment-application algorithm
//! - Financial summary aggregation
//! - Error types for ledger operations

pub mod error;
pub mod service;
pub mod summary;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::LedgerError;
pub use service::LedgerService;
pub use summary::FinancialSummary;
pub use types::{InvoiceState, InvoiceStatus, PaymentApplication, PaymentMethod};
