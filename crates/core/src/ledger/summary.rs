//! Financial summary aggregation over tenant-scoped invoices.

use rust_decimal::Decimal;
use serde::Serialize;

use super::types::InvoiceStatus;

/// Aggregated financial position of a tenant, optionally scoped to a period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FinancialSummary {
    /// Sum of invoice amounts.
    pub total_amount: Decimal,
    /// Sum of paid amounts.
    pub total_paid: Decimal,
    /// Sum of outstanding balances.
    pub total_balance: Decimal,
    /// Number of invoices counted.
    pub invoice_count: u64,
    /// Pending invoices.
    pub pending_count: u64,
    /// Partially paid invoices.
    pub partial_count: u64,
    /// Fully paid invoices.
    pub paid_count: u64,
    /// Overdue invoices.
    pub overdue_count: u64,
    /// Cancelled invoices.
    pub cancelled_count: u64,
}

impl FinancialSummary {
    /// Folds one invoice row into the summary.
    pub fn accumulate(
        &mut self,
        amount: Decimal,
        paid_amount: Decimal,
        balance: Decimal,
        status: InvoiceStatus,
    ) {
        self.total_amount += amount;
        self.total_paid += paid_amount;
        self.total_balance += balance;
        self.invoice_count += 1;
        match status {
            InvoiceStatus::Pending => self.pending_count += 1,
            InvoiceStatus::Partial => self.partial_count += 1,
            InvoiceStatus::Paid => self.paid_count += 1,
            InvoiceStatus::Overdue => self.overdue_count += 1,
            InvoiceStatus::Cancelled => self.cancelled_count += 1,
        }
    }

    /// Builds a summary from an iterator of invoice rows.
    #[must_use]
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (Decimal, Decimal, Decimal, InvoiceStatus)>,
    {
        let mut summary = Self::default();
        for (amount, paid, balance, status) in rows {
            summary.accumulate(amount, paid, balance, status);
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_summary_fold() {
        let summary = FinancialSummary::from_rows([
            (dec!(1000), dec!(1000), dec!(0), InvoiceStatus::Paid),
            (dec!(500), dec!(200), dec!(300), InvoiceStatus::Partial),
            (dec!(750), dec!(0), dec!(750), InvoiceStatus::Overdue),
            (dec!(250), dec!(0), dec!(250), InvoiceStatus::Pending),
        ]);

        assert_eq!(summary.total_amount, dec!(2500));
        assert_eq!(summary.total_paid, dec!(1200));
        assert_eq!(summary.total_balance, dec!(1300));
        assert_eq!(summary.invoice_count, 4);
        assert_eq!(summary.paid_count, 1);
        assert_eq!(summary.partial_count, 1);
        assert_eq!(summary.overdue_count, 1);
        assert_eq!(summary.pending_count, 1);
        assert_eq!(summary.cancelled_count, 0);
    }

    #[test]
    fn test_empty_summary() {
        let summary = FinancialSummary::from_rows([]);
        assert_eq!(summary, FinancialSummary::default());
    }

    #[test]
    fn test_totals_are_consistent_with_balance_invariant() {
        // For rows satisfying balance == amount - paid, the totals do too.
        let rows = [
            (dec!(100), dec!(40), dec!(60), InvoiceStatus::Partial),
            (dec!(300), dec!(300), dec!(0), InvoiceStatus::Paid),
        ];
        let summary = FinancialSummary::from_rows(rows);
        assert_eq!(
            summary.total_balance,
            summary.total_amount - summary.total_paid
        );
    }
}
