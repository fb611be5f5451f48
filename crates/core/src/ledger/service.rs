//! Ledger service: payment application and status derivation.
//!
//! This module provides the core business logic for settling invoices.
//! It contains pure functions with no database dependencies; the repository
//! layer loads a locked invoice snapshot, calls into here, and persists the
//! result atomically.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{InvoiceState, InvoiceStatus, PaymentApplication};

/// Ledger service for invoice settlement logic.
pub struct LedgerService;

impl LedgerService {
    /// Validates an invoice amount at generation time.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NonPositiveAmount` for zero or negative amounts.
    pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount);
        }
        Ok(())
    }

    /// Derives the invoice status from its financial state.
    ///
    /// Rules, in order:
    /// 1. `balance <= 0` → `Paid`
    /// 2. past due date → `Overdue`
    /// 3. `paid_amount > 0` → `Partial`
    /// 4. otherwise → `Pending`
    ///
    /// `Cancelled` is never derived; it is an administrative override only.
    #[must_use]
    pub fn derive_status(
        balance: Decimal,
        paid_amount: Decimal,
        due_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> InvoiceStatus {
        if balance <= Decimal::ZERO {
            return InvoiceStatus::Paid;
        }
        if due_date.is_some_and(|due| today > due) {
            return InvoiceStatus::Overdue;
        }
        if paid_amount > Decimal::ZERO {
            return InvoiceStatus::Partial;
        }
        InvoiceStatus::Pending
    }

    /// Applies a payment to an invoice snapshot.
    ///
    /// Preconditions: `amount > 0`, the invoice accepts payments, and the
    /// payment never overshoots the balance (there is no credit or refund
    /// concept). On success the returned application satisfies
    /// `new_balance == invoice.amount - new_paid_amount` and
    /// `new_balance >= 0`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NonPositiveAmount`, `LedgerError::InvoiceCancelled`,
    /// or `LedgerError::ExceedsBalance` when a precondition fails. No state is
    /// mutated on error.
    pub fn apply_payment(
        invoice: &InvoiceState,
        amount: Decimal,
        today: NaiveDate,
    ) -> Result<PaymentApplication, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount);
        }
        if invoice.status == InvoiceStatus::Cancelled {
            return Err(LedgerError::InvoiceCancelled);
        }
        if amount > invoice.balance {
            return Err(LedgerError::ExceedsBalance {
                amount,
                balance: invoice.balance,
            });
        }

        let new_paid_amount = invoice.paid_amount + amount;
        let new_balance = invoice.amount - new_paid_amount;
        let new_status =
            Self::derive_status(new_balance, new_paid_amount, invoice.due_date, today);

        Ok(PaymentApplication {
            payment_amount: amount,
            new_paid_amount,
            new_balance,
            new_status,
        })
    }

    /// Validates an administrative status override against the stored balance.
    ///
    /// The override exists for `Cancelled` and for correcting `Overdue`
    /// bookkeeping; balance-derived states stay owned by the payment
    /// algorithm, so an override may never contradict the balance:
    /// - `Paid` requires a zero balance
    /// - `Partial` requires `paid_amount > 0` and a positive balance
    /// - `Pending` requires no payments applied
    /// - `Overdue` requires a positive balance
    /// - `Cancelled` is always accepted
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::StatusContradictsBalance` otherwise.
    pub fn validate_status_override(
        invoice: &InvoiceState,
        new_status: InvoiceStatus,
    ) -> Result<(), LedgerError> {
        let ok = match new_status {
            InvoiceStatus::Paid => invoice.balance <= Decimal::ZERO,
            InvoiceStatus::Partial => {
                invoice.paid_amount > Decimal::ZERO && invoice.balance > Decimal::ZERO
            }
            InvoiceStatus::Pending => invoice.paid_amount == Decimal::ZERO,
            InvoiceStatus::Overdue => invoice.balance > Decimal::ZERO,
            InvoiceStatus::Cancelled => true,
        };

        if ok {
            Ok(())
        } else {
            Err(LedgerError::StatusContradictsBalance { status: new_status })
        }
    }
}
