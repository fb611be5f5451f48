//! Database enum mappings.
//!
//! Each enum mirrors a Postgres enum type created by the initial migration,
//! with conversions to and from the domain-layer equivalents.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use scolara_core::enrollment::{AttendanceStatus as DomainAttendance, EnrollmentStatus as DomainEnrollment};
use scolara_core::ledger::{InvoiceStatus as DomainInvoice, PaymentMethod as DomainPayment};

/// Invoice lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "partial")]
    Partial,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "overdue")]
    Overdue,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// Payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    #[sea_orm(string_value = "card")]
    Card,
    #[sea_orm(string_value = "mobile_money")]
    MobileMoney,
    #[sea_orm(string_value = "cheque")]
    Cheque,
}

/// Enrollment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "enrollment_status")]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "dropped")]
    Dropped,
}

/// Attendance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_status")]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "present")]
    Present,
    #[sea_orm(string_value = "absent")]
    Absent,
    #[sea_orm(string_value = "late")]
    Late,
    #[sea_orm(string_value = "excused")]
    Excused,
}

impl From<InvoiceStatus> for DomainInvoice {
    fn from(s: InvoiceStatus) -> Self {
        match s {
            InvoiceStatus::Pending => Self::Pending,
            InvoiceStatus::Partial => Self::Partial,
            InvoiceStatus::Paid => Self::Paid,
            InvoiceStatus::Overdue => Self::Overdue,
            InvoiceStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<DomainInvoice> for InvoiceStatus {
    fn from(s: DomainInvoice) -> Self {
        match s {
            DomainInvoice::Pending => Self::Pending,
            DomainInvoice::Partial => Self::Partial,
            DomainInvoice::Paid => Self::Paid,
            DomainInvoice::Overdue => Self::Overdue,
            DomainInvoice::Cancelled => Self::Cancelled,
        }
    }
}

impl From<PaymentMethod> for DomainPayment {
    fn from(m: PaymentMethod) -> Self {
        match m {
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::BankTransfer => Self::BankTransfer,
            PaymentMethod::Card => Self::Card,
            PaymentMethod::MobileMoney => Self::MobileMoney,
            PaymentMethod::Cheque => Self::Cheque,
        }
    }
}

impl From<DomainPayment> for PaymentMethod {
    fn from(m: DomainPayment) -> Self {
        match m {
            DomainPayment::Cash => Self::Cash,
            DomainPayment::BankTransfer => Self::BankTransfer,
            DomainPayment::Card => Self::Card,
            DomainPayment::MobileMoney => Self::MobileMoney,
            DomainPayment::Cheque => Self::Cheque,
        }
    }
}

impl From<EnrollmentStatus> for DomainEnrollment {
    fn from(s: EnrollmentStatus) -> Self {
        match s {
            EnrollmentStatus::Active => Self::Active,
            EnrollmentStatus::Completed => Self::Completed,
            EnrollmentStatus::Dropped => Self::Dropped,
        }
    }
}

impl From<DomainEnrollment> for EnrollmentStatus {
    fn from(s: DomainEnrollment) -> Self {
        match s {
            DomainEnrollment::Active => Self::Active,
            DomainEnrollment::Completed => Self::Completed,
            DomainEnrollment::Dropped => Self::Dropped,
        }
    }
}

impl From<AttendanceStatus> for DomainAttendance {
    fn from(s: AttendanceStatus) -> Self {
        match s {
            AttendanceStatus::Present => Self::Present,
            AttendanceStatus::Absent => Self::Absent,
            AttendanceStatus::Late => Self::Late,
            AttendanceStatus::Excused => Self::Excused,
        }
    }
}

impl From<DomainAttendance> for AttendanceStatus {
    fn from(s: DomainAttendance) -> Self {
        match s {
            DomainAttendance::Present => Self::Present,
            DomainAttendance::Absent => Self::Absent,
            DomainAttendance::Late => Self::Late,
            DomainAttendance::Excused => Self::Excused,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_invoice_status_round_trip() {
        for status in InvoiceStatus::iter() {
            let domain: DomainInvoice = status.into();
            assert_eq!(InvoiceStatus::from(domain), status);
        }
    }

    #[test]
    fn test_enrollment_status_round_trip() {
        for status in EnrollmentStatus::iter() {
            let domain: DomainEnrollment = status.into();
            assert_eq!(EnrollmentStatus::from(domain), status);
        }
    }

    #[test]
    fn test_payment_method_round_trip() {
        for method in PaymentMethod::iter() {
            let domain: DomainPayment = method.into();
            assert_eq!(PaymentMethod::from(domain), method);
        }
    }

    #[test]
    fn test_attendance_status_round_trip() {
        for status in AttendanceStatus::iter() {
            let domain: DomainAttendance = status.into();
            assert_eq!(AttendanceStatus::from(domain), status);
        }
    }
}
