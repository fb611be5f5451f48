//! Property-based tests for the payment-application algorithm.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::service::LedgerService;
use super::types::{InvoiceState, InvoiceStatus};

/// Strategy for generating positive decimal amounts (two decimal places).
fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for generating dates within a few years of each other.
fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (2024i32..2028, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// Builds a consistent invoice snapshot from an amount and a paid fraction.
fn invoice_from(amount: Decimal, paid: Decimal, due: Option<NaiveDate>) -> InvoiceState {
    let balance = amount - paid;
    let status = LedgerService::derive_status(
        balance,
        paid,
        due,
        NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
    );
    InvoiceState {
        amount,
        paid_amount: paid,
        balance,
        status,
        due_date: due,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// After any accepted payment, `new_balance == amount - new_paid_amount`.
    #[test]
    fn prop_balance_identity_holds(
        amount in amount_strategy(),
        payment in amount_strategy(),
        today in date_strategy(),
    ) {
        let inv = invoice_from(amount, Decimal::ZERO, None);
        if let Ok(app) = LedgerService::apply_payment(&inv, payment, today) {
            prop_assert_eq!(app.new_balance, inv.amount - app.new_paid_amount);
        }
    }

    /// An accepted payment never drives the balance negative.
    #[test]
    fn prop_balance_never_negative(
        amount in amount_strategy(),
        paid_fraction in 0u8..=100,
        payment in amount_strategy(),
        today in date_strategy(),
    ) {
        let paid = amount * Decimal::from(paid_fraction) / Decimal::from(100u8);
        let inv = invoice_from(amount, paid, None);
        if let Ok(app) = LedgerService::apply_payment(&inv, payment, today) {
            prop_assert!(app.new_balance >= Decimal::ZERO);
        }
    }

    /// Paid amount is monotonically non-decreasing across accepted payments.
    #[test]
    fn prop_paid_amount_monotonic(
        amount in amount_strategy(),
        payment in amount_strategy(),
        today in date_strategy(),
    ) {
        let inv = invoice_from(amount, Decimal::ZERO, None);
        if let Ok(app) = LedgerService::apply_payment(&inv, payment, today) {
            prop_assert!(app.new_paid_amount > inv.paid_amount);
        }
    }

    /// A payment exceeding the balance is always rejected, state unchanged.
    #[test]
    fn prop_overshoot_always_rejected(
        amount in amount_strategy(),
        excess in amount_strategy(),
        today in date_strategy(),
    ) {
        let inv = invoice_from(amount, Decimal::ZERO, None);
        let result = LedgerService::apply_payment(&inv, amount + excess, today);
        prop_assert!(result.is_err());
    }

    /// A sequence of payments summing exactly to the amount ends `Paid`
    /// with zero balance.
    #[test]
    fn prop_exact_settlement_ends_paid(
        amount in amount_strategy(),
        splits in prop::collection::vec(1u32..100, 1..8),
        today in date_strategy(),
    ) {
        let total_weight: u64 = splits.iter().map(|w| u64::from(*w)).sum();
        let mut inv = invoice_from(amount, Decimal::ZERO, None);

        // Pay weighted slices; the final slice settles the remainder exactly.
        for (i, weight) in splits.iter().enumerate() {
            let payment = if i == splits.len() - 1 {
                inv.balance
            } else {
                (amount * Decimal::from(*weight) / Decimal::from(total_weight))
                    .min(inv.balance)
            };
            if payment <= Decimal::ZERO {
                continue;
            }
            let app = LedgerService::apply_payment(&inv, payment, today).unwrap();
            inv.paid_amount = app.new_paid_amount;
            inv.balance = app.new_balance;
            inv.status = app.new_status;
        }

        prop_assert_eq!(inv.balance, Decimal::ZERO);
        prop_assert_eq!(inv.status, InvoiceStatus::Paid);
    }

    /// Status derivation is consistent: `Paid` iff balance is zero; `Overdue`
    /// only past due; `Partial` only with payments applied.
    #[test]
    fn prop_derived_status_consistent(
        amount in amount_strategy(),
        paid_fraction in 0u8..=100,
        due in prop::option::of(date_strategy()),
        today in date_strategy(),
    ) {
        let paid = amount * Decimal::from(paid_fraction) / Decimal::from(100u8);
        let balance = amount - paid;
        let status = LedgerService::derive_status(balance, paid, due, today);

        match status {
            InvoiceStatus::Paid => prop_assert!(balance <= Decimal::ZERO),
            InvoiceStatus::Overdue => {
                prop_assert!(balance > Decimal::ZERO);
                prop_assert!(due.is_some_and(|d| today > d));
            }
            InvoiceStatus::Partial => {
                prop_assert!(paid > Decimal::ZERO);
                prop_assert!(balance > Decimal::ZERO);
            }
            InvoiceStatus::Pending => {
                prop_assert_eq!(paid, Decimal::ZERO);
                prop_assert!(balance > Decimal::ZERO);
            }
            InvoiceStatus::Cancelled => prop_assert!(false, "derive never yields Cancelled"),
        }
    }

    /// Once settled, no further payment is ever accepted.
    #[test]
    fn prop_paid_is_terminal(
        amount in amount_strategy(),
        payment in amount_strategy(),
        today in date_strategy(),
    ) {
        let inv = invoice_from(amount, amount, None);
        prop_assert!(LedgerService::apply_payment(&inv, payment, today).is_err());
    }
}
