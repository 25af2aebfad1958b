use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::diff::AuditDiff;
use crate::enums::{AuditAction, EntityKind};

/// An append-only audit log entry recording one mutation.
///
/// `resource_name` is the display name of the mutated entity at the time of
/// the mutation; `parent_resource_name` names its owner where one exists
/// (the weapon of a weapon mode). `diff` is only present for updates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditRecord {
    pub id: String,
    pub acting_user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub action: AuditAction,
    pub entity_kind: EntityKind,
    pub entity_id: String,
    pub resource_name: String,
    pub parent_resource_name: Option<String>,
    pub message: Option<String>,
    pub diff: Option<AuditDiff>,
}
