//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Every query is tenant-filtered; rows belonging to other
//! tenants behave as if they do not exist.

pub mod audit;
pub mod enrollment;
pub mod invoice;
pub mod records;
pub mod tenant;

pub use audit::AuditRepository;
pub use enrollment::{
    CreateEnrollmentInput, EnrollmentRepoError, EnrollmentRepository, PromoteInput,
    PromotionReport, TransferInput,
};
pub use invoice::{
    GenerateInvoicesInput, InvoiceFilter, InvoiceRepoError, InvoiceRepository, PaymentReceipt,
    RecordPaymentInput,
};
pub use records::{
    AttendanceInput, RecordsError, RecordsRepository, ResultInput,
};
pub use tenant::{TenantError, TenantRepository};
