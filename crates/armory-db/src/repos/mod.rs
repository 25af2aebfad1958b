//! Repository modules implementing CRUD operations for all Armory entities.
//!
//! Each module adds methods to `ArmoryService` via `impl ArmoryService` blocks.
//! This module holds the pieces they share: paginated listing and relation
//! replacement.

pub mod ammo;
pub mod audit;
pub mod graph;
pub mod hacking_device;
pub mod hacking_program;
pub mod rule;
pub mod user;
pub mod weapon;
pub mod weapon_mode;

use std::collections::HashSet;

use armory_core::pagination::{PageRequest, Paginated};
use chrono::{DateTime, Utc};
use libsql::Value;

use crate::error::DatabaseError;
use crate::helpers::{contains_pattern, placeholders};
use crate::service::ArmoryService;

/// A listing over one table (or join) with optional conditions.
pub(crate) struct ListQuery<'a> {
    from: &'a str,
    columns: &'a str,
    order_by: &'a str,
    conditions: Vec<String>,
    params: Vec<Value>,
}

impl<'a> ListQuery<'a> {
    pub(crate) const fn new(from: &'a str, columns: &'a str, order_by: &'a str) -> Self {
        Self {
            from,
            columns,
            order_by,
            conditions: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Add `column = ?` when `value` is present.
    pub(crate) fn eq(mut self, column: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.params.push(Value::Text(value.to_string()));
            self.conditions
                .push(format!("{column} = ?{}", self.params.len()));
        }
        self
    }

    /// Add a case-insensitive substring match on `column` when `needle` is present.
    pub(crate) fn name_contains(mut self, column: &str, needle: Option<&str>) -> Self {
        if let Some(needle) = needle.filter(|n| !n.trim().is_empty()) {
            self.params.push(Value::Text(contains_pattern(needle.trim())));
            self.conditions.push(format!(
                "{column} LIKE ?{} ESCAPE '\\'",
                self.params.len()
            ));
        }
        self
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }
}

/// A many-to-many junction table and the tables on either side of it.
///
/// `member_columns` must select from `member_table` aliased as
/// `member_alias` and start with the id column.
pub(crate) struct Junction {
    pub table: &'static str,
    pub owner_column: &'static str,
    pub member_column: &'static str,
    pub owner_table: &'static str,
    pub member_table: &'static str,
    pub member_alias: &'static str,
    pub member_columns: &'static str,
    pub member_label: &'static str,
}

/// The committed result of a relation replacement.
pub(crate) struct ReplacedRelation<T> {
    /// The new member set, ordered by name then id.
    pub members: Vec<T>,
    /// The `updated_at` written to the owner row.
    pub updated_at: DateTime<Utc>,
}

impl ArmoryService {
    /// Count the matching rows and fetch one page of them.
    pub(crate) async fn find_and_count<T>(
        &self,
        query: ListQuery<'_>,
        page: PageRequest,
        decode: fn(&libsql::Row) -> Result<T, DatabaseError>,
    ) -> Result<Paginated<T>, DatabaseError> {
        let page = self.clamp_page(page);
        let where_clause = query.where_clause();

        let mut rows = self
            .db()
            .query(
                &format!("SELECT COUNT(*) FROM {} {where_clause}", query.from),
                libsql::params_from_iter(query.params.clone()),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let total = u64::try_from(row.get::<i64>(0)?)
            .map_err(|e| DatabaseError::InvalidState(format!("negative row count: {e}")))?;

        let offset = i64::try_from(page.offset())
            .map_err(|e| DatabaseError::Validation(format!("page offset out of range: {e}")))?;
        let mut params = query.params;
        params.push(Value::Integer(i64::from(page.limit)));
        params.push(Value::Integer(offset));
        let sql = format!(
            "SELECT {} FROM {} {where_clause} ORDER BY {} LIMIT ?{} OFFSET ?{}",
            query.columns,
            query.from,
            query.order_by,
            params.len() - 1,
            params.len()
        );

        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut items = Vec::new();
        while let Some(row) = rows.next().await? {
            items.push(decode(&row)?);
        }
        Ok(Paginated::new(items, total, page))
    }

    /// Replace the member set of `owner_id` in `junction` atomically.
    ///
    /// Duplicate member ids are ignored. Unknown member ids are rejected
    /// before anything is written. The members are read before the write,
    /// so nothing has to be re-read once the transaction commits.
    pub(crate) async fn replace_relation<T>(
        &self,
        junction: &Junction,
        owner_id: &str,
        member_ids: &[String],
        decode: fn(&libsql::Row) -> Result<T, DatabaseError>,
    ) -> Result<ReplacedRelation<T>, DatabaseError> {
        let mut seen = HashSet::new();
        let ids: Vec<&str> = member_ids
            .iter()
            .map(String::as_str)
            .filter(|id| seen.insert(*id))
            .collect();
        let members = self.fetch_members(junction, &ids, decode).await?;

        let updated_at = Utc::now();
        let tx = self.db().conn().transaction().await?;
        tx.execute(
            &format!("DELETE FROM {} WHERE {} = ?1", junction.table, junction.owner_column),
            [owner_id],
        )
        .await?;
        let insert = format!(
            "INSERT INTO {} ({}, {}) VALUES (?1, ?2)",
            junction.table, junction.owner_column, junction.member_column
        );
        for member_id in &ids {
            tx.execute(&insert, [owner_id, *member_id]).await?;
        }
        tx.execute(
            &format!("UPDATE {} SET updated_at = ?1 WHERE id = ?2", junction.owner_table),
            libsql::params![updated_at.to_rfc3339(), owner_id],
        )
        .await?;
        tx.commit().await?;
        Ok(ReplacedRelation {
            members,
            updated_at,
        })
    }

    /// Load the rows for `member_ids`, ordered by name then id.
    async fn fetch_members<T>(
        &self,
        junction: &Junction,
        member_ids: &[&str],
        decode: fn(&libsql::Row) -> Result<T, DatabaseError>,
    ) -> Result<Vec<T>, DatabaseError> {
        if member_ids.is_empty() {
            return Ok(Vec::new());
        }
        let alias = junction.member_alias;
        let sql = format!(
            "SELECT {} FROM {} {alias} WHERE {alias}.id IN ({}) ORDER BY {alias}.name, {alias}.id",
            junction.member_columns,
            junction.member_table,
            placeholders(1, member_ids.len())
        );
        let params: Vec<Value> = member_ids
            .iter()
            .map(|id| Value::Text((*id).to_string()))
            .collect();
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut found = HashSet::new();
        let mut members = Vec::with_capacity(member_ids.len());
        while let Some(row) = rows.next().await? {
            found.insert(row.get::<String>(0)?);
            members.push(decode(&row)?);
        }

        let missing: Vec<&str> = member_ids
            .iter()
            .copied()
            .filter(|id| !found.contains(*id))
            .collect();
        if missing.is_empty() {
            Ok(members)
        } else {
            Err(DatabaseError::Validation(format!(
                "unknown {} ids: {}",
                junction.member_label,
                missing.join(", ")
            )))
        }
    }
}
