//! Audit trail event model.
//!
//! Mutating operations emit an [`AuditEvent`] describing who did what to
//! which entity. Persistence is best-effort: a failed audit write must never
//! fail the operation that produced it.

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Entity created.
    Create,
    /// Entity updated in place.
    Update,
    /// Entity deleted.
    Delete,
    /// Payment applied to an invoice.
    Payment,
    /// Enrollment moved to another class.
    Transfer,
    /// Enrollments promoted to a new period.
    Promote,
    /// Enrollment dropped.
    Drop,
    /// Terminal enrollment reactivated.
    Reactivate,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Payment => "payment",
            Self::Transfer => "transfer",
            Self::Promote => "promote",
            Self::Drop => "drop",
            Self::Reactivate => "reactivate",
        };
        write!(f, "{s}")
    }
}

/// One audit trail entry, ready for persistence.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    /// Tenant the mutation occurred in. `None` for platform-level actions.
    pub tenant_id: Option<Uuid>,
    /// The authenticated caller.
    pub actor_id: Uuid,
    /// What happened.
    pub action: AuditAction,
    /// Entity kind, e.g. `"invoice"` or `"enrollment"`.
    pub entity_kind: &'static str,
    /// Primary key of the affected entity.
    pub entity_id: Uuid,
    /// Snapshot before the mutation, where applicable.
    pub before: Option<Value>,
    /// Snapshot after the mutation, where applicable.
    pub after: Option<Value>,
    /// Free-form context, e.g. batch counts or a target period.
    pub metadata: Option<Value>,
}

impl AuditEvent {
    /// Builds an event with no state snapshots.
    #[must_use]
    pub const fn new(
        tenant_id: Option<Uuid>,
        actor_id: Uuid,
        action: AuditAction,
        entity_kind: &'static str,
        entity_id: Uuid,
    ) -> Self {
        Self {
            tenant_id,
            actor_id,
            action,
            entity_kind,
            entity_id,
            before: None,
            after: None,
            metadata: None,
        }
    }

    /// Attaches the pre-mutation snapshot.
    #[must_use]
    pub fn with_before(mut self, before: Value) -> Self {
        self.before = Some(before);
        self
    }

    /// Attaches the post-mutation snapshot.
    #[must_use]
    pub fn with_after(mut self, after: Value) -> Self {
        self.after = Some(after);
        self
    }

    /// Attaches free-form context.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_builder() {
        let actor = Uuid::new_v4();
        let entity = Uuid::new_v4();
        let event = AuditEvent::new(None, actor, AuditAction::Payment, "invoice", entity)
            .with_before(json!({"balance": "700"}))
            .with_after(json!({"balance": "400"}))
            .with_metadata(json!({"method": "cash"}));

        assert_eq!(event.actor_id, actor);
        assert_eq!(event.entity_id, entity);
        assert_eq!(event.entity_kind, "invoice");
        assert_eq!(event.before, Some(json!({"balance": "700"})));
        assert_eq!(event.after, Some(json!({"balance": "400"})));
        assert_eq!(event.metadata, Some(json!({"method": "cash"})));
    }

    #[test]
    fn test_action_display() {
        assert_eq!(AuditAction::Promote.to_string(), "promote");
        assert_eq!(AuditAction::Reactivate.to_string(), "reactivate");
    }
}
