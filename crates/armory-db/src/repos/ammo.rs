//! Ammo repository, including the directed combined-ammo relation.

use armory_core::entities::{Ammo, AmmoGraph};
use armory_core::enums::AuditAction;
use armory_core::errors::CoreError;
use armory_core::ids::PREFIX_AMMO;
use armory_core::pagination::{PageRequest, Paginated};
use armory_core::snapshot::Snapshottable;
use chrono::Utc;
use libsql::Value;

use crate::error::DatabaseError;
use crate::helpers::{SetClauses, parse_datetime};
use crate::repos::{Junction, ListQuery};
use crate::service::ArmoryService;
use crate::updates::ammo::AmmoUpdate;

pub(crate) const AMMO_COLUMNS: &str = "a.id, a.name, a.created_at, a.updated_at";
pub(crate) const AMMO_COLUMN_COUNT: i32 = 4;

/// Owned direction only; the mirror is never written.
const COMBINED_AMMO: Junction = Junction {
    table: "ammo_combined",
    owner_column: "ammo_id",
    member_column: "combined_ammo_id",
    owner_table: "ammo",
    member_table: "ammo",
    member_alias: "a",
    member_columns: AMMO_COLUMNS,
    member_label: "ammo",
};

pub(crate) fn row_to_ammo(row: &libsql::Row) -> Result<Ammo, DatabaseError> {
    Ok(Ammo {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        created_at: parse_datetime(&row.get::<String>(2)?)?,
        updated_at: parse_datetime(&row.get::<String>(3)?)?,
    })
}

impl ArmoryService {
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a blank name, or
    /// `DatabaseError` if the INSERT fails.
    pub async fn create_ammo(
        &self,
        acting_user_id: Option<&str>,
        name: &str,
    ) -> Result<Ammo, DatabaseError> {
        CoreError::require_name("name", name)?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_AMMO).await?;

        self.db()
            .execute(
                "INSERT INTO ammo (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
                libsql::params![id.as_str(), name, now.to_rfc3339(), now.to_rfc3339()],
            )
            .await?;

        let graph = AmmoGraph {
            ammo: Ammo {
                id,
                name: name.to_string(),
                created_at: now,
                updated_at: now,
            },
            combined: Vec::new(),
        };
        self.record_audit(acting_user_id, AuditAction::Create, &graph.snapshot(), None)
            .await;
        Ok(graph.ammo)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no ammo has that id.
    pub async fn get_ammo(&self, id: &str) -> Result<Ammo, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                &format!("SELECT {AMMO_COLUMNS} FROM ammo a WHERE a.id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_ammo(&row)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the ammo does not exist,
    /// `DatabaseError::Validation` for a blank name, or `DatabaseError` if
    /// the UPDATE fails.
    pub async fn update_ammo(
        &self,
        acting_user_id: Option<&str>,
        id: &str,
        update: AmmoUpdate,
    ) -> Result<Ammo, DatabaseError> {
        let before = self.load_ammo_graph(id).await?;

        let mut after = before.clone();
        let mut sets = SetClauses::new();
        if let Some(name) = update.name {
            CoreError::require_name("name", &name)?;
            sets.push("name", Value::Text(name.clone()));
            after.ammo.name = name;
        }
        if sets.is_empty() {
            return Ok(before.ammo);
        }

        after.ammo.updated_at = Utc::now();
        let (sql, params) = sets.into_update("ammo", id, after.ammo.updated_at);
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.record_update(acting_user_id, &before.snapshot(), &after.snapshot())
            .await?;
        Ok(after.ammo)
    }

    /// Replace the ammo that `ammo_id` combines.
    ///
    /// Only the owned direction is written; composites that reference
    /// `ammo_id` are unaffected.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` if the ammo would combine itself
    /// or an id is unknown, `DatabaseError::NoResult` if `ammo_id` does not
    /// exist, or `DatabaseError` if the write fails.
    pub async fn set_combined_ammo(
        &self,
        acting_user_id: Option<&str>,
        ammo_id: &str,
        combined_ids: &[String],
    ) -> Result<AmmoGraph, DatabaseError> {
        if combined_ids.iter().any(|id| id == ammo_id) {
            return Err(DatabaseError::Validation(format!(
                "ammo {ammo_id} cannot combine itself"
            )));
        }
        let before = self.load_ammo_graph(ammo_id).await?;
        let replaced = self
            .replace_relation(&COMBINED_AMMO, ammo_id, combined_ids, row_to_ammo)
            .await?;
        let mut after = before.clone();
        after.ammo.updated_at = replaced.updated_at;
        after.combined = replaced.members;
        self.record_update(acting_user_id, &before.snapshot(), &after.snapshot())
            .await?;
        Ok(after)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the ammo does not exist.
    pub async fn delete_ammo(
        &self,
        acting_user_id: Option<&str>,
        id: &str,
    ) -> Result<(), DatabaseError> {
        let before = self.load_ammo_graph(id).await?;
        self.db()
            .execute("DELETE FROM ammo WHERE id = ?1", [id])
            .await?;
        self.record_audit(acting_user_id, AuditAction::Delete, &before.snapshot(), None)
            .await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_and_count_ammo(
        &self,
        name_contains: Option<&str>,
        page: PageRequest,
    ) -> Result<Paginated<Ammo>, DatabaseError> {
        let query = ListQuery::new("ammo a", AMMO_COLUMNS, "a.name, a.id")
            .name_contains("a.name", name_contains);
        self.find_and_count(query, page, row_to_ammo).await
    }
}
