//! `SeaORM` entity definitions.

pub mod academic_periods;
pub mod attendance_records;
pub mod audit_logs;
pub mod classes;
pub mod enrollments;
pub mod invoices;
pub mod payments;
pub mod results;
pub mod sea_orm_active_enums;
pub mod students;
pub mod tenants;
