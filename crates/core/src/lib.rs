//! Core business logic for Scolara.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `authz` - Role and tenant-ownership checks (the authorization gate)
//! - `ledger` - Invoice/payment engine with derived balance and status
//! - `enrollment` - Enrollment state machine and transition rules
//! - `batch` - Partial-failure-tolerant bulk-operation model
//! - `audit` - Best-effort audit event types

pub mod audit;
pub mod authz;
pub mod batch;
pub mod enrollment;
pub mod ledger;
