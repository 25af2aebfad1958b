//! Hacking program repository.

use armory_core::entities::HackingProgram;
use armory_core::enums::AuditAction;
use armory_core::errors::CoreError;
use armory_core::ids::PREFIX_HACKING_PROGRAM;
use armory_core::pagination::{PageRequest, Paginated};
use armory_core::snapshot::Snapshottable;
use chrono::Utc;
use libsql::Value;

use crate::error::DatabaseError;
use crate::helpers::{
    SetClauses, get_opt_i64, get_opt_string, opt_integer, opt_text, parse_datetime,
    parse_optional_enum,
};
use crate::repos::ListQuery;
use crate::service::ArmoryService;
use crate::updates::hacking_program::{HackingProgramUpdate, NewHackingProgram};

pub(crate) const PROGRAM_COLUMNS: &str = "p.id, p.name, p.attack_modifier, p.opponent_modifier, \
                                          p.damage, p.burst, p.target, p.skill_type, p.special, \
                                          p.created_at, p.updated_at";
pub(crate) const PROGRAM_COLUMN_COUNT: i32 = 11;

pub(crate) fn row_to_program(row: &libsql::Row) -> Result<HackingProgram, DatabaseError> {
    Ok(HackingProgram {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        attack_modifier: get_opt_i64(row, 2)?,
        opponent_modifier: get_opt_i64(row, 3)?,
        damage: get_opt_string(row, 4)?,
        burst: get_opt_string(row, 5)?,
        target: get_opt_string(row, 6)?,
        skill_type: parse_optional_enum(get_opt_string(row, 7)?.as_deref())?,
        special: get_opt_string(row, 8)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

impl ArmoryService {
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a blank name, or
    /// `DatabaseError` if the INSERT fails.
    pub async fn create_hacking_program(
        &self,
        acting_user_id: Option<&str>,
        new: NewHackingProgram,
    ) -> Result<HackingProgram, DatabaseError> {
        CoreError::require_name("name", &new.name)?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_HACKING_PROGRAM).await?;

        let params = vec![
            Value::Text(id.clone()),
            Value::Text(new.name.clone()),
            opt_integer(new.attack_modifier),
            opt_integer(new.opponent_modifier),
            opt_text(new.damage.as_deref()),
            opt_text(new.burst.as_deref()),
            opt_text(new.target.as_deref()),
            opt_text(new.skill_type.map(|s| s.as_str())),
            opt_text(new.special.as_deref()),
            Value::Text(now.to_rfc3339()),
            Value::Text(now.to_rfc3339()),
        ];
        self.db()
            .execute(
                "INSERT INTO hacking_programs (id, name, attack_modifier, opponent_modifier,
                     damage, burst, target, skill_type, special, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                libsql::params_from_iter(params),
            )
            .await?;

        let program = HackingProgram {
            id,
            name: new.name,
            attack_modifier: new.attack_modifier,
            opponent_modifier: new.opponent_modifier,
            damage: new.damage,
            burst: new.burst,
            target: new.target,
            skill_type: new.skill_type,
            special: new.special,
            created_at: now,
            updated_at: now,
        };
        self.record_audit(acting_user_id, AuditAction::Create, &program.snapshot(), None)
            .await;
        Ok(program)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no program has that id.
    pub async fn get_hacking_program(&self, id: &str) -> Result<HackingProgram, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                &format!("SELECT {PROGRAM_COLUMNS} FROM hacking_programs p WHERE p.id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_program(&row)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the program does not exist,
    /// `DatabaseError::Validation` for a blank name, or `DatabaseError` if
    /// the UPDATE fails.
    pub async fn update_hacking_program(
        &self,
        acting_user_id: Option<&str>,
        id: &str,
        update: HackingProgramUpdate,
    ) -> Result<HackingProgram, DatabaseError> {
        let before = self.get_hacking_program(id).await?;

        let mut after = before.clone();
        let mut sets = SetClauses::new();
        if let Some(name) = update.name {
            CoreError::require_name("name", &name)?;
            sets.push("name", Value::Text(name.clone()));
            after.name = name;
        }
        if let Some(value) = update.attack_modifier {
            sets.push("attack_modifier", opt_integer(value));
            after.attack_modifier = value;
        }
        if let Some(value) = update.opponent_modifier {
            sets.push("opponent_modifier", opt_integer(value));
            after.opponent_modifier = value;
        }
        if let Some(value) = update.damage {
            sets.push("damage", opt_text(value.as_deref()));
            after.damage = value;
        }
        if let Some(value) = update.burst {
            sets.push("burst", opt_text(value.as_deref()));
            after.burst = value;
        }
        if let Some(value) = update.target {
            sets.push("target", opt_text(value.as_deref()));
            after.target = value;
        }
        if let Some(value) = update.skill_type {
            sets.push("skill_type", opt_text(value.map(|s| s.as_str())));
            after.skill_type = value;
        }
        if let Some(value) = update.special {
            sets.push("special", opt_text(value.as_deref()));
            after.special = value;
        }
        if sets.is_empty() {
            return Ok(before);
        }

        after.updated_at = Utc::now();
        let (sql, params) = sets.into_update("hacking_programs", id, after.updated_at);
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.record_update(acting_user_id, &before.snapshot(), &after.snapshot())
            .await?;
        Ok(after)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the program does not exist.
    pub async fn delete_hacking_program(
        &self,
        acting_user_id: Option<&str>,
        id: &str,
    ) -> Result<(), DatabaseError> {
        let before = self.get_hacking_program(id).await?;
        self.db()
            .execute("DELETE FROM hacking_programs WHERE id = ?1", [id])
            .await?;
        self.record_audit(acting_user_id, AuditAction::Delete, &before.snapshot(), None)
            .await;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_and_count_hacking_programs(
        &self,
        name_contains: Option<&str>,
        page: PageRequest,
    ) -> Result<Paginated<HackingProgram>, DatabaseError> {
        let query = ListQuery::new("hacking_programs p", PROGRAM_COLUMNS, "p.name, p.id")
            .name_contains("p.name", name_contains);
        self.find_and_count(query, page, row_to_program).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::test_service;
    use crate::updates::hacking_program::HackingProgramUpdateBuilder;
    use armory_core::enums::SkillType;
    use armory_core::render::render_record;
    use pretty_assertions::assert_eq;

    fn carbonite() -> NewHackingProgram {
        NewHackingProgram {
            name: "Carbonite".into(),
            attack_modifier: Some(0),
            opponent_modifier: Some(-3),
            burst: Some("2".into()),
            target: Some("TAG, HI, REM, HD".into()),
            skill_type: Some(SkillType::ShortSkill),
            ..NewHackingProgram::default()
        }
    }

    #[tokio::test]
    async fn create_roundtrips_every_column() {
        let svc = test_service().await;
        let program = svc.create_hacking_program(None, carbonite()).await.unwrap();

        let fetched = svc.get_hacking_program(&program.id).await.unwrap();
        assert_eq!(fetched, program);
        assert_eq!(fetched.opponent_modifier, Some(-3));
        assert_eq!(fetched.damage, None);
    }

    #[tokio::test]
    async fn skill_type_change_renders_as_words() {
        let svc = test_service().await;
        let program = svc.create_hacking_program(None, carbonite()).await.unwrap();

        svc.update_hacking_program(
            None,
            &program.id,
            HackingProgramUpdateBuilder::new()
                .skill_type(Some(SkillType::EntireOrder))
                .opponent_modifier(Some(-6))
                .build(),
        )
        .await
        .unwrap();

        let records = svc
            .query_audit(
                &AuditFilter {
                    entity_id: Some(program.id.clone()),
                    action: Some(AuditAction::Update),
                    ..AuditFilter::default()
                },
                PageRequest::first(10),
            )
            .await
            .unwrap();
        let view = render_record(&records.items[0]);
        let rows: Vec<(&str, &str, &str)> = view
            .rows
            .iter()
            .map(|r| (r.field, r.old_value.as_str(), r.new_value.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("opponent_modifier", "-3", "-6"),
                ("skill_type", "Short Skill", "Entire Order"),
            ]
        );
    }
}
