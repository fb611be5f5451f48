//! Ledger error types for validation and state errors.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use scolara_shared::AppError;

use super::types::InvoiceStatus;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Amount must be strictly positive.
    #[error("Amount must be positive")]
    NonPositiveAmount,

    /// Payment would overshoot the outstanding balance.
    #[error("Payment of {amount} exceeds balance of {balance}")]
    ExceedsBalance {
        /// The attempted payment amount.
        amount: Decimal,
        /// The outstanding balance at call time.
        balance: Decimal,
    },

    /// Payments cannot be applied to a cancelled invoice.
    #[error("Invoice is cancelled")]
    InvoiceCancelled,

    /// Administrative override contradicts the stored balance.
    #[error("Status {status} contradicts the invoice balance")]
    StatusContradictsBalance {
        /// The requested status.
        status: InvoiceStatus,
    },

    // ========== Not-Found Errors ==========
    /// Invoice absent or not tenant-visible.
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Uuid),

    /// Period absent or not tenant-visible.
    #[error("Period not found: {0}")]
    PeriodNotFound(Uuid),

    /// Enrollment absent or not tenant-visible.
    #[error("Enrollment not found: {0}")]
    EnrollmentNotFound(Uuid),

    // ========== Conflict Errors ==========
    /// The enrollment is not active and cannot be invoiced.
    #[error("Enrollment {0} is not active")]
    EnrollmentNotActive(Uuid),

    /// One invoice exists per (enrollment, period) pair.
    #[error("Invoice already exists for enrollment {enrollment_id} in this period")]
    DuplicateInvoice {
        /// The enrollment already carrying an invoice.
        enrollment_id: Uuid,
    },

    /// Invoices with payments are never deleted.
    #[error("Invoice {0} has payments and cannot be deleted")]
    InvoiceHasPayments(Uuid),

    // ========== Infrastructure Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the stable error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::ExceedsBalance { .. } => "EXCEEDS_BALANCE",
            Self::InvoiceCancelled => "INVOICE_CANCELLED",
            Self::StatusContradictsBalance { .. } => "STATUS_CONTRADICTS_BALANCE",
            Self::InvoiceNotFound(_) => "INVOICE_NOT_FOUND",
            Self::PeriodNotFound(_) => "PERIOD_NOT_FOUND",
            Self::EnrollmentNotFound(_) => "ENROLLMENT_NOT_FOUND",
            Self::EnrollmentNotActive(_) => "ENROLLMENT_NOT_ACTIVE",
            Self::DuplicateInvoice { .. } => "DUPLICATE_INVOICE",
            Self::InvoiceHasPayments(_) => "INVOICE_HAS_PAYMENTS",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        let msg = err.to_string();
        match err {
            LedgerError::NonPositiveAmount
            | LedgerError::ExceedsBalance { .. }
            | LedgerError::InvoiceCancelled
            | LedgerError::StatusContradictsBalance { .. } => Self::Validation(msg),
            LedgerError::InvoiceNotFound(_)
            | LedgerError::PeriodNotFound(_)
            | LedgerError::EnrollmentNotFound(_) => Self::NotFound(msg),
            LedgerError::EnrollmentNotActive(_)
            | LedgerError::DuplicateInvoice { .. }
            | LedgerError::InvoiceHasPayments(_) => Self::Conflict(msg),
            LedgerError::Database(_) => Self::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::NonPositiveAmount.error_code(),
            "NON_POSITIVE_AMOUNT"
        );
        assert_eq!(
            LedgerError::ExceedsBalance {
                amount: dec!(100),
                balance: dec!(50),
            }
            .error_code(),
            "EXCEEDS_BALANCE"
        );
        assert_eq!(
            LedgerError::InvoiceHasPayments(Uuid::nil()).error_code(),
            "INVOICE_HAS_PAYMENTS"
        );
    }

    #[test]
    fn test_error_kind_mapping() {
        let err: AppError = LedgerError::NonPositiveAmount.into();
        assert_eq!(err.status_code(), 400);

        let err: AppError = LedgerError::InvoiceNotFound(Uuid::nil()).into();
        assert_eq!(err.status_code(), 404);

        let err: AppError = LedgerError::DuplicateInvoice {
            enrollment_id: Uuid::nil(),
        }
        .into();
        assert_eq!(err.status_code(), 409);

        let err: AppError = LedgerError::Database("down".into()).into();
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_exceeds_balance_display() {
        let err = LedgerError::ExceedsBalance {
            amount: dec!(300.50),
            balance: dec!(200),
        };
        assert_eq!(err.to_string(), "Payment of 300.50 exceeds balance of 200");
    }
}
