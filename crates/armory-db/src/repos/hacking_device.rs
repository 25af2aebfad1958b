//! Hacking device repository, including the program set.

use armory_core::entities::{HackingDevice, HackingDeviceGraph};
use armory_core::enums::AuditAction;
use armory_core::errors::CoreError;
use armory_core::ids::PREFIX_HACKING_DEVICE;
use armory_core::pagination::{PageRequest, Paginated};
use armory_core::snapshot::Snapshottable;
use chrono::Utc;
use libsql::Value;

use crate::error::DatabaseError;
use crate::helpers::{SetClauses, parse_datetime};
use crate::repos::hacking_program::{PROGRAM_COLUMNS, row_to_program};
use crate::repos::{Junction, ListQuery};
use crate::service::ArmoryService;
use crate::updates::hacking_device::HackingDeviceUpdate;

pub(crate) const DEVICE_COLUMNS: &str = "d.id, d.name, d.created_at, d.updated_at";

const DEVICE_PROGRAMS: Junction = Junction {
    table: "hacking_device_programs",
    owner_column: "hacking_device_id",
    member_column: "hacking_program_id",
    owner_table: "hacking_devices",
    member_table: "hacking_programs",
    member_alias: "p",
    member_columns: PROGRAM_COLUMNS,
    member_label: "hacking program",
};

pub(crate) fn row_to_device(row: &libsql::Row) -> Result<HackingDevice, DatabaseError> {
    Ok(HackingDevice {
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
    pub async fn create_hacking_device(
        &self,
        acting_user_id: Option<&str>,
        name: &str,
    ) -> Result<HackingDevice, DatabaseError> {
        CoreError::require_name("name", name)?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_HACKING_DEVICE).await?;

        self.db()
            .execute(
                "INSERT INTO hacking_devices (id, name, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                libsql::params![id.as_str(), name, now.to_rfc3339(), now.to_rfc3339()],
            )
            .await?;

        let graph = HackingDeviceGraph {
            device: HackingDevice {
                id,
                name: name.to_string(),
                created_at: now,
                updated_at: now,
            },
            programs: Vec::new(),
        };
        self.record_audit(acting_user_id, AuditAction::Create, &graph.snapshot(), None)
            .await;
        Ok(graph.device)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no device has that id.
    pub async fn get_hacking_device(&self, id: &str) -> Result<HackingDevice, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                &format!("SELECT {DEVICE_COLUMNS} FROM hacking_devices d WHERE d.id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_device(&row)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the device does not exist,
    /// `DatabaseError::Validation` for a blank name, or `DatabaseError` if
    /// the UPDATE fails.
    pub async fn update_hacking_device(
        &self,
        acting_user_id: Option<&str>,
        id: &str,
        update: HackingDeviceUpdate,
    ) -> Result<HackingDevice, DatabaseError> {
        let before = self.load_hacking_device_graph(id).await?;

        let mut after = before.clone();
        let mut sets = SetClauses::new();
        if let Some(name) = update.name {
            CoreError::require_name("name", &name)?;
            sets.push("name", Value::Text(name.clone()));
            after.device.name = name;
        }
        if sets.is_empty() {
            return Ok(before.device);
        }

        after.device.updated_at = Utc::now();
        let (sql, params) = sets.into_update("hacking_devices", id, after.device.updated_at);
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.record_update(acting_user_id, &before.snapshot(), &after.snapshot())
            .await?;
        Ok(after.device)
    }

    /// Replace the program set of a hacking device.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the device does not exist,
    /// `DatabaseError::Validation` if a program id is unknown, or
    /// `DatabaseError` if the write fails.
    pub async fn set_device_programs(
        &self,
        acting_user_id: Option<&str>,
        device_id: &str,
        program_ids: &[String],
    ) -> Result<HackingDeviceGraph, DatabaseError> {
        let before = self.load_hacking_device_graph(device_id).await?;
        let replaced = self
            .replace_relation(&DEVICE_PROGRAMS, device_id, program_ids, row_to_program)
            .await?;
        let mut after = before.clone();
        after.device.updated_at = replaced.updated_at;
        after.programs = replaced.members;
        self.record_update(acting_user_id, &before.snapshot(), &after.snapshot())
            .await?;
        Ok(after)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the device does not exist.
    pub async fn delete_hacking_device(
        &self,
        acting_user_id: Option<&str>,
        id: &str,
    ) -> Result<(), DatabaseError> {
        let before = self.load_hacking_device_graph(id).await?;
        self.db()
            .execute("DELETE FROM hacking_devices WHERE id = ?1", [id])
            .await?;
        self.record_audit(acting_user_id, AuditAction::Delete, &before.snapshot(), None)
            .await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_and_count_hacking_devices(
        &self,
        name_contains: Option<&str>,
        page: PageRequest,
    ) -> Result<Paginated<HackingDevice>, DatabaseError> {
        let query = ListQuery::new("hacking_devices d", DEVICE_COLUMNS, "d.name, d.id")
            .name_contains("d.name", name_contains);
        self.find_and_count(query, page, row_to_device).await
    }
}
