//! Audit log repository.
//!
//! Append-only records of every catalogue mutation. Writes that accompany a
//! mutation are best-effort: a failed audit write is logged and the mutation
//! result is still returned. Custom records are written on request and do
//! report failures.

use armory_core::diff::{AuditDiff, diff};
use armory_core::entities::AuditRecord;
use armory_core::enums::{AuditAction, EntityKind};
use armory_core::errors::CoreError;
use armory_core::ids::PREFIX_AUDIT;
use armory_core::pagination::{PageRequest, Paginated};
use armory_core::snapshot::Snapshot;
use chrono::Utc;
use tracing::{debug, error, warn};

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum};
use crate::repos::ListQuery;
use crate::service::ArmoryService;

const AUDIT_COLUMNS: &str = "id, acting_user_id, action, entity_kind, entity_id, resource_name, \
                             parent_resource_name, message, diff, created_at";

/// Filter criteria for audit queries.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub entity_kind: Option<EntityKind>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    pub acting_user_id: Option<String>,
}

/// A free-form audit entry not tied to a catalogue mutation.
#[derive(Debug, Clone)]
pub struct CustomAudit {
    pub entity_kind: EntityKind,
    pub entity_id: String,
    pub resource_name: String,
    pub parent_resource_name: Option<String>,
    pub message: String,
}

fn row_to_audit(row: &libsql::Row) -> Result<AuditRecord, DatabaseError> {
    let diff = get_opt_string(row, 8)?
        .map(|raw| {
            serde_json::from_str::<AuditDiff>(&raw)
                .map_err(|e| DatabaseError::Query(format!("Invalid audit diff: {e}")))
        })
        .transpose()?;
    Ok(AuditRecord {
        id: row.get::<String>(0)?,
        acting_user_id: get_opt_string(row, 1)?,
        action: parse_enum(&row.get::<String>(2)?)?,
        entity_kind: parse_enum(&row.get::<String>(3)?)?,
        entity_id: row.get::<String>(4)?,
        resource_name: row.get::<String>(5)?,
        parent_resource_name: get_opt_string(row, 6)?,
        message: get_opt_string(row, 7)?,
        diff,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

impl ArmoryService {
    /// Append an audit record.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_audit(&self, record: &AuditRecord) -> Result<(), DatabaseError> {
        let diff = record
            .diff
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| DatabaseError::Other(e.into()))?;
        self.db()
            .execute(
                "INSERT INTO audit_records (id, acting_user_id, action, entity_kind, entity_id,
                     resource_name, parent_resource_name, message, diff, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                libsql::params![
                    record.id.as_str(),
                    record.acting_user_id.as_deref(),
                    record.action.as_str(),
                    record.entity_kind.as_str(),
                    record.entity_id.as_str(),
                    record.resource_name.as_str(),
                    record.parent_resource_name.as_deref(),
                    record.message.as_deref(),
                    diff.as_deref(),
                    record.created_at.to_rfc3339()
                ],
            )
            .await?;
        Ok(())
    }

    /// Record a mutation of the entity captured by `snapshot`.
    ///
    /// Never fails: an audit write error is logged and `None` returned, so
    /// the caller still reports the mutation as successful.
    pub(crate) async fn record_audit(
        &self,
        acting_user_id: Option<&str>,
        action: AuditAction,
        snapshot: &Snapshot,
        diff: Option<AuditDiff>,
    ) -> Option<AuditRecord> {
        match self
            .try_record_audit(acting_user_id, action, snapshot, diff)
            .await
        {
            Ok(record) => {
                debug!(
                    audit_id = %record.id,
                    action = %action,
                    entity_kind = %record.entity_kind,
                    entity_id = %record.entity_id,
                    "Recorded audit"
                );
                Some(record)
            }
            Err(err) => {
                error!(
                    error = %err,
                    action = %action,
                    entity_kind = %snapshot.kind(),
                    entity_id = snapshot.entity_id(),
                    "Audit write failed; mutation kept"
                );
                None
            }
        }
    }

    /// Diff two snapshots of one entity and record an UPDATE if anything changed.
    ///
    /// Returns the record written, or `None` for a no-op update or a failed
    /// audit write.
    pub(crate) async fn record_update(
        &self,
        acting_user_id: Option<&str>,
        before: &Snapshot,
        after: &Snapshot,
    ) -> Result<Option<AuditRecord>, DatabaseError> {
        let changes = diff(before, after)?;
        if changes.is_empty() {
            debug!(
                entity_kind = %after.kind(),
                entity_id = after.entity_id(),
                "No changes; skipping audit"
            );
            return Ok(None);
        }
        Ok(self
            .record_audit(acting_user_id, AuditAction::Update, after, Some(changes))
            .await)
    }

    async fn try_record_audit(
        &self,
        acting_user_id: Option<&str>,
        action: AuditAction,
        snapshot: &Snapshot,
        diff: Option<AuditDiff>,
    ) -> Result<AuditRecord, DatabaseError> {
        let record = AuditRecord {
            id: self.db().generate_id(PREFIX_AUDIT).await?,
            acting_user_id: acting_user_id.map(String::from),
            created_at: Utc::now(),
            action,
            entity_kind: snapshot.kind(),
            entity_id: snapshot.entity_id().to_string(),
            resource_name: snapshot.resource_name().to_string(),
            parent_resource_name: self.parent_resource_name(snapshot).await,
            message: None,
            diff,
        };
        self.append_audit(&record).await?;
        Ok(record)
    }

    /// Name of the owning resource, for kinds that have one.
    async fn parent_resource_name(&self, snapshot: &Snapshot) -> Option<String> {
        let Snapshot::WeaponMode(mode) = snapshot else {
            return None;
        };
        match self.get_weapon(&mode.weapon_id).await {
            Ok(weapon) => Some(weapon.name),
            Err(err) => {
                warn!(weapon_id = %mode.weapon_id, error = %err, "Parent weapon lookup failed");
                None
            }
        }
    }

    /// Write a free-form audit record with a message.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a blank message or resource
    /// name, or `DatabaseError` if the INSERT fails.
    pub async fn record_custom_audit(
        &self,
        acting_user_id: Option<&str>,
        custom: CustomAudit,
    ) -> Result<AuditRecord, DatabaseError> {
        CoreError::require_name("resource_name", &custom.resource_name)?;
        if custom.message.trim().is_empty() {
            return Err(DatabaseError::Validation("message must not be blank".into()));
        }

        let record = AuditRecord {
            id: self.db().generate_id(PREFIX_AUDIT).await?,
            acting_user_id: acting_user_id.map(String::from),
            created_at: Utc::now(),
            action: AuditAction::Custom,
            entity_kind: custom.entity_kind,
            entity_id: custom.entity_id,
            resource_name: custom.resource_name,
            parent_resource_name: custom.parent_resource_name,
            message: Some(custom.message),
            diff: None,
        };
        self.append_audit(&record).await?;
        Ok(record)
    }

    /// Fetch one audit record by id.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no record has that id.
    pub async fn get_audit_record(&self, id: &str) -> Result<AuditRecord, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                &format!("SELECT {AUDIT_COLUMNS} FROM audit_records WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_audit(&row)
    }

    /// Query audit records with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(
        &self,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> Result<Paginated<AuditRecord>, DatabaseError> {
        let query = ListQuery::new("audit_records", AUDIT_COLUMNS, "created_at DESC, rowid DESC")
            .eq("entity_kind", filter.entity_kind.map(EntityKind::as_str))
            .eq("entity_id", filter.entity_id.as_deref())
            .eq("action", filter.action.map(AuditAction::as_str))
            .eq("acting_user_id", filter.acting_user_id.as_deref());
        self.find_and_count(query, page, row_to_audit).await
    }
}
