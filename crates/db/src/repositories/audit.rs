//! Best-effort audit trail persistence.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

use scolara_core::audit::AuditEvent;

use crate::entities::audit_logs;

/// Audit repository.
///
/// Writes are best-effort: a failed audit insert is logged and swallowed so
/// it never fails the operation that produced the event.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    db: Arc<DatabaseConnection>,
}

impl AuditRepository {
    /// Creates a new audit repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Persists an audit event. Never fails the caller.
    pub async fn record(&self, event: AuditEvent) {
        let model = audit_logs::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(event.tenant_id),
            actor_id: Set(event.actor_id),
            action: Set(event.action.to_string()),
            entity_kind: Set(event.entity_kind.to_owned()),
            entity_id: Set(event.entity_id),
            before: Set(event.before),
            after: Set(event.after),
            metadata: Set(event.metadata),
            created_at: Set(Utc::now().into()),
        };

        if let Err(err) = model.insert(self.db.as_ref()).await {
            tracing::warn!(
                error = %err,
                entity_kind = event.entity_kind,
                entity_id = %event.entity_id,
                "failed to write audit log entry"
            );
        }
    }
}
