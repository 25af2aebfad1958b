//! Weapon repository.

use armory_core::entities::{Weapon, WeaponGraph};
use armory_core::enums::{AuditAction, WeaponType};
use armory_core::errors::CoreError;
use armory_core::ids::PREFIX_WEAPON;
use armory_core::pagination::{PageRequest, Paginated};
use armory_core::snapshot::Snapshottable;
use chrono::Utc;
use libsql::Value;

use crate::error::DatabaseError;
use crate::helpers::{SetClauses, parse_datetime, parse_enum};
use crate::repos::ListQuery;
use crate::service::ArmoryService;
use crate::updates::weapon::WeaponUpdate;

pub(crate) const WEAPON_COLUMNS: &str = "w.id, w.name, w.weapon_type, w.created_at, w.updated_at";

pub(crate) fn row_to_weapon(row: &libsql::Row) -> Result<Weapon, DatabaseError> {
    Ok(Weapon {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        weapon_type: parse_enum(&row.get::<String>(2)?)?,
        created_at: parse_datetime(&row.get::<String>(3)?)?,
        updated_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

impl ArmoryService {
    /// Create a weapon with no modes.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a blank name, or
    /// `DatabaseError` if the INSERT fails.
    pub async fn create_weapon(
        &self,
        acting_user_id: Option<&str>,
        name: &str,
        weapon_type: WeaponType,
    ) -> Result<Weapon, DatabaseError> {
        CoreError::require_name("name", name)?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_WEAPON).await?;

        self.db()
            .execute(
                "INSERT INTO weapons (id, name, weapon_type, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                libsql::params![
                    id.as_str(),
                    name,
                    weapon_type.as_str(),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        let weapon = Weapon {
            id,
            name: name.to_string(),
            weapon_type,
            created_at: now,
            updated_at: now,
        };
        let graph = WeaponGraph {
            weapon,
            modes: Vec::new(),
        };
        self.record_audit(acting_user_id, AuditAction::Create, &graph.snapshot(), None)
            .await;
        Ok(graph.weapon)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no weapon has that id.
    pub async fn get_weapon(&self, id: &str) -> Result<Weapon, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                &format!("SELECT {WEAPON_COLUMNS} FROM weapons w WHERE w.id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_weapon(&row)
    }

    /// Apply `update` and record the diff.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the weapon does not exist,
    /// `DatabaseError::Validation` for a blank name, or `DatabaseError` if
    /// the UPDATE fails.
    pub async fn update_weapon(
        &self,
        acting_user_id: Option<&str>,
        id: &str,
        update: WeaponUpdate,
    ) -> Result<Weapon, DatabaseError> {
        if let Some(name) = &update.name {
            CoreError::require_name("name", name)?;
        }
        let before = self.load_weapon_graph(id).await?;

        let mut after = before.clone();
        let mut sets = SetClauses::new();
        if let Some(name) = update.name {
            sets.push("name", Value::Text(name.clone()));
            after.weapon.name = name;
        }
        if let Some(weapon_type) = update.weapon_type {
            sets.push("weapon_type", Value::Text(weapon_type.as_str().into()));
            after.weapon.weapon_type = weapon_type;
        }
        if sets.is_empty() {
            return Ok(before.weapon);
        }

        after.weapon.updated_at = Utc::now();
        let (sql, params) = sets.into_update("weapons", id, after.weapon.updated_at);
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.record_update(acting_user_id, &before.snapshot(), &after.snapshot())
            .await?;
        Ok(after.weapon)
    }

    /// Delete a weapon together with its modes.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the weapon does not exist.
    pub async fn delete_weapon(
        &self,
        acting_user_id: Option<&str>,
        id: &str,
    ) -> Result<(), DatabaseError> {
        let before = self.load_weapon_graph(id).await?;
        self.db()
            .execute("DELETE FROM weapons WHERE id = ?1", [id])
            .await?;
        self.record_audit(acting_user_id, AuditAction::Delete, &before.snapshot(), None)
            .await;
        Ok(())
    }

    /// List weapons by name, optionally filtered by a name substring.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_and_count_weapons(
        &self,
        name_contains: Option<&str>,
        page: PageRequest,
    ) -> Result<Paginated<Weapon>, DatabaseError> {
        let query = ListQuery::new("weapons w", WEAPON_COLUMNS, "w.name, w.id")
            .name_contains("w.name", name_contains);
        self.find_and_count(query, page, row_to_weapon).await
    }
}
