//! Ledger domain types for invoices and payments.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Invoice status.
///
/// The status is always derivable from `(balance, due_date, now)` and is
/// stored redundantly with the balance as a deliberate denormalization for
/// query performance. Every mutation site recomputes and persists it.
/// `Cancelled` is only reachable via explicit administrative override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// No payment applied yet.
    Pending,
    /// Partially paid, balance outstanding.
    Partial,
    /// Fully paid. Terminal for the payment algorithm.
    Paid,
    /// Unpaid or partially paid past the due date.
    Overdue,
    /// Administratively cancelled.
    Cancelled,
}

impl InvoiceStatus {
    /// Returns true if the payment algorithm will never move this status again.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        matches!(self, Self::Paid)
    }

    /// Returns true if payments may be applied in this status.
    #[must_use]
    pub const fn accepts_payments(&self) -> bool {
        !matches!(self, Self::Paid | Self::Cancelled)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Partial => write!(f, "partial"),
            Self::Paid => write!(f, "paid"),
            Self::Overdue => write!(f, "overdue"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash payment.
    Cash,
    /// Bank transfer.
    BankTransfer,
    /// Card payment.
    Card,
    /// Mobile money.
    MobileMoney,
    /// Cheque.
    Cheque,
}

/// Snapshot of an invoice's financial state.
///
/// This is the input format for the pure payment-application algorithm;
/// the repository layer loads it from the locked invoice row.
#[derive(Debug, Clone)]
pub struct InvoiceState {
    /// Total billed amount.
    pub amount: Decimal,
    /// Amount paid so far. Monotonically non-decreasing.
    pub paid_amount: Decimal,
    /// Outstanding balance. Invariant: `balance == amount - paid_amount`.
    pub balance: Decimal,
    /// Current (stored) status.
    pub status: InvoiceStatus,
    /// Optional due date.
    pub due_date: Option<NaiveDate>,
}

impl InvoiceState {
    /// Creates the state of a freshly generated invoice.
    #[must_use]
    pub const fn new(amount: Decimal, due_date: Option<NaiveDate>) -> Self {
        Self {
            amount,
            paid_amount: Decimal::ZERO,
            balance: amount,
            status: InvoiceStatus::Pending,
            due_date,
        }
    }
}

/// Result of applying a payment to an invoice.
///
/// The repository persists the payment row and these derived fields in the
/// same transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentApplication {
    /// The amount applied.
    pub payment_amount: Decimal,
    /// New cumulative paid amount.
    pub new_paid_amount: Decimal,
    /// New outstanding balance.
    pub new_balance: Decimal,
    /// Recomputed status.
    pub new_status: InvoiceStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_accepts_payments() {
        assert!(InvoiceStatus::Pending.accepts_payments());
        assert!(InvoiceStatus::Partial.accepts_payments());
        assert!(InvoiceStatus::Overdue.accepts_payments());
        assert!(!InvoiceStatus::Paid.accepts_payments());
        assert!(!InvoiceStatus::Cancelled.accepts_payments());
    }

    #[test]
    fn test_status_settled() {
        assert!(InvoiceStatus::Paid.is_settled());
        assert!(!InvoiceStatus::Overdue.is_settled());
    }

    #[test]
    fn test_new_invoice_state() {
        let state = InvoiceState::new(dec!(500), None);
        assert_eq!(state.paid_amount, Decimal::ZERO);
        assert_eq!(state.balance, dec!(500));
        assert_eq!(state.status, InvoiceStatus::Pending);
    }
}
