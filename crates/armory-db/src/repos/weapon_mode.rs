//! Weapon mode repository, including the ammo and trait sets.

use armory_core::entities::{WeaponMode, WeaponModeGraph};
use armory_core::enums::AuditAction;
use armory_core::errors::CoreError;
use armory_core::ids::PREFIX_WEAPON_MODE;
use armory_core::pagination::{PageRequest, Paginated};
use armory_core::snapshot::Snapshottable;
use chrono::Utc;
use libsql::Value;

use crate::error::DatabaseError;
use crate::helpers::{
    SetClauses, get_opt_string, opt_text, parse_datetime, parse_optional_enum,
};
use crate::repos::ammo::{AMMO_COLUMNS, row_to_ammo};
use crate::repos::rule::{RULE_COLUMNS, row_to_rule};
use crate::repos::{Junction, ListQuery};
use crate::service::ArmoryService;
use crate::updates::weapon_mode::{NewWeaponMode, WeaponModeUpdate};

pub(crate) const MODE_COLUMNS: &str =
    "m.id, m.weapon_id, m.name, m.damage, m.burst, m.saving_attribute, m.created_at, m.updated_at";
pub(crate) const MODE_COLUMN_COUNT: i32 = 8;

const MODE_AMMO: Junction = Junction {
    table: "weapon_mode_ammo",
    owner_column: "weapon_mode_id",
    member_column: "ammo_id",
    owner_table: "weapon_modes",
    member_table: "ammo",
    member_alias: "a",
    member_columns: AMMO_COLUMNS,
    member_label: "ammo",
};

const MODE_TRAITS: Junction = Junction {
    table: "weapon_mode_traits",
    owner_column: "weapon_mode_id",
    member_column: "rule_id",
    owner_table: "weapon_modes",
    member_table: "rules",
    member_alias: "r",
    member_columns: RULE_COLUMNS,
    member_label: "rule",
};

pub(crate) fn row_to_weapon_mode(row: &libsql::Row) -> Result<WeaponMode, DatabaseError> {
    Ok(WeaponMode {
        id: row.get::<String>(0)?,
        weapon_id: row.get::<String>(1)?,
        name: row.get::<String>(2)?,
        damage: get_opt_string(row, 3)?,
        burst: get_opt_string(row, 4)?,
        saving_attribute: parse_optional_enum(get_opt_string(row, 5)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

impl ArmoryService {
    /// Create a weapon mode under an existing weapon.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the weapon does not exist,
    /// `DatabaseError::Validation` for a blank name, or `DatabaseError` if
    /// the INSERT fails.
    pub async fn create_weapon_mode(
        &self,
        acting_user_id: Option<&str>,
        new: NewWeaponMode,
    ) -> Result<WeaponMode, DatabaseError> {
        CoreError::require_name("name", &new.name)?;
        self.get_weapon(&new.weapon_id).await?;
        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_WEAPON_MODE).await?;

        self.db()
            .execute(
                "INSERT INTO weapon_modes (id, weapon_id, name, damage, burst, saving_attribute, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                libsql::params![
                    id.as_str(),
                    new.weapon_id.as_str(),
                    new.name.as_str(),
                    new.damage.as_deref(),
                    new.burst.as_deref(),
                    new.saving_attribute.map(|s| s.as_str()),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        let graph = WeaponModeGraph {
            mode: WeaponMode {
                id,
                weapon_id: new.weapon_id,
                name: new.name,
                damage: new.damage,
                burst: new.burst,
                saving_attribute: new.saving_attribute,
                created_at: now,
                updated_at: now,
            },
            ammo: Vec::new(),
            traits: Vec::new(),
        };
        self.record_audit(acting_user_id, AuditAction::Create, &graph.snapshot(), None)
            .await;
        Ok(graph.mode)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if no weapon mode has that id.
    pub async fn get_weapon_mode(&self, id: &str) -> Result<WeaponMode, DatabaseError> {
        let mut rows = self
            .db()
            .query(
                &format!("SELECT {MODE_COLUMNS} FROM weapon_modes m WHERE m.id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_weapon_mode(&row)
    }

    /// Apply `update` and record the diff, if any.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the mode does not exist,
    /// `DatabaseError::Validation` for a blank name, or `DatabaseError` if
    /// the UPDATE fails.
    pub async fn update_weapon_mode(
        &self,
        acting_user_id: Option<&str>,
        id: &str,
        update: WeaponModeUpdate,
    ) -> Result<WeaponMode, DatabaseError> {
        if let Some(name) = &update.name {
            CoreError::require_name("name", name)?;
        }
        let before = self.load_weapon_mode_graph(id).await?;

        let mut after = before.clone();
        let mut sets = SetClauses::new();
        if let Some(name) = update.name {
            sets.push("name", Value::Text(name.clone()));
            after.mode.name = name;
        }
        if let Some(damage) = update.damage {
            sets.push("damage", opt_text(damage.as_deref()));
            after.mode.damage = damage;
        }
        if let Some(burst) = update.burst {
            sets.push("burst", opt_text(burst.as_deref()));
            after.mode.burst = burst;
        }
        if let Some(saving_attribute) = update.saving_attribute {
            sets.push(
                "saving_attribute",
                opt_text(saving_attribute.map(|s| s.as_str())),
            );
            after.mode.saving_attribute = saving_attribute;
        }
        if sets.is_empty() {
            return Ok(before.mode);
        }

        after.mode.updated_at = Utc::now();
        let (sql, params) = sets.into_update("weapon_modes", id, after.mode.updated_at);
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.record_update(acting_user_id, &before.snapshot(), &after.snapshot())
            .await?;
        Ok(after.mode)
    }

    /// Replace the ammo set of a weapon mode.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the mode does not exist,
    /// `DatabaseError::Validation` if an ammo id is unknown, or
    /// `DatabaseError` if the write fails.
    pub async fn set_mode_ammo(
        &self,
        acting_user_id: Option<&str>,
        mode_id: &str,
        ammo_ids: &[String],
    ) -> Result<WeaponModeGraph, DatabaseError> {
        let before = self.load_weapon_mode_graph(mode_id).await?;
        let replaced = self
            .replace_relation(&MODE_AMMO, mode_id, ammo_ids, row_to_ammo)
            .await?;
        let mut after = before.clone();
        after.mode.updated_at = replaced.updated_at;
        after.ammo = replaced.members;
        self.record_update(acting_user_id, &before.snapshot(), &after.snapshot())
            .await?;
        Ok(after)
    }

    /// Replace the trait set of a weapon mode.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the mode does not exist,
    /// `DatabaseError::Validation` if a rule id is unknown, or
    /// `DatabaseError` if the write fails.
    pub async fn set_mode_traits(
        &self,
        acting_user_id: Option<&str>,
        mode_id: &str,
        rule_ids: &[String],
    ) -> Result<WeaponModeGraph, DatabaseError> {
        let before = self.load_weapon_mode_graph(mode_id).await?;
        let replaced = self
            .replace_relation(&MODE_TRAITS, mode_id, rule_ids, row_to_rule)
            .await?;
        let mut after = before.clone();
        after.mode.updated_at = replaced.updated_at;
        after.traits = replaced.members;
        self.record_update(acting_user_id, &before.snapshot(), &after.snapshot())
            .await?;
        Ok(after)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the mode does not exist.
    pub async fn delete_weapon_mode(
        &self,
        acting_user_id: Option<&str>,
        id: &str,
    ) -> Result<(), DatabaseError> {
        let before = self.load_weapon_mode_graph(id).await?;
        self.db()
            .execute("DELETE FROM weapon_modes WHERE id = ?1", [id])
            .await?;
        self.record_audit(acting_user_id, AuditAction::Delete, &before.snapshot(), None)
            .await;
        Ok(())
    }

    /// List weapon modes, optionally of one weapon and filtered by name.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_and_count_weapon_modes(
        &self,
        weapon_id: Option<&str>,
        name_contains: Option<&str>,
        page: PageRequest,
    ) -> Result<Paginated<WeaponMode>, DatabaseError> {
        let query = ListQuery::new("weapon_modes m", MODE_COLUMNS, "m.name, m.id")
            .eq("m.weapon_id", weapon_id)
            .name_contains("m.name", name_contains);
        self.find_and_count(query, page, row_to_weapon_mode).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::{seed_combi_rifle, test_service, test_user};
    use crate::updates::weapon_mode::WeaponModeUpdateBuilder;
    use armory_core::diff::{AuditDiff, DiffValue};
    use armory_core::enums::SavingAttribute;
    use armory_core::fields::WeaponModeField;
    use armory_core::render::render_record;
    use pretty_assertions::assert_eq;

    async fn updates_of(svc: &ArmoryService, mode_id: &str) -> Paginated<armory_core::entities::AuditRecord> {
        svc.query_audit(
            &AuditFilter {
                entity_id: Some(mode_id.to_string()),
                action: Some(AuditAction::Update),
                ..AuditFilter::default()
            },
            PageRequest::first(10),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn create_requires_existing_weapon() {
        let svc = test_service().await;
        let err = svc
            .create_weapon_mode(
                None,
                NewWeaponMode {
                    weapon_id: "wpn-missing".into(),
                    name: "Burst".into(),
                    ..NewWeaponMode::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NoResult));
    }

    #[tokio::test]
    async fn create_audit_names_parent_weapon() {
        let svc = test_service().await;
        let seed = seed_combi_rifle(&svc).await;

        let records = svc
            .query_audit(
                &AuditFilter {
                    entity_id: Some(seed.mode.id.clone()),
                    ..AuditFilter::default()
                },
                PageRequest::first(10),
            )
            .await
            .unwrap();

        let create = records
            .items
            .iter()
            .find(|r| r.action == AuditAction::Create)
            .unwrap();
        assert_eq!(create.parent_resource_name.as_deref(), Some("Combi Rifle"));
        assert_eq!(
            render_record(create).summary,
            "Created weapon mode 'Combi Rifle' of 'Combi Rifle'"
        );
    }

    #[tokio::test]
    async fn rename_diff_has_only_name() {
        let svc = test_service().await;
        let user = test_user(&svc).await;
        let seed = seed_combi_rifle(&svc).await;

        svc.update_weapon_mode(
            Some(&user.id),
            &seed.mode.id,
            WeaponModeUpdateBuilder::new().name("Breaker Rifle").build(),
        )
        .await
        .unwrap();

        let records = updates_of(&svc, &seed.mode.id).await;
        assert_eq!(records.total, 1);
        let record = &records.items[0];
        assert_eq!(record.acting_user_id.as_deref(), Some(user.id.as_str()));
        let Some(AuditDiff::WeaponMode(diff)) = &record.diff else {
            panic!("expected a weapon mode diff, got {:?}", record.diff);
        };
        assert_eq!(diff.len(), 1);
        assert_eq!(
            diff.old_fields.get(&WeaponModeField::Name),
            Some(&DiffValue::Text("Combi Rifle".into()))
        );
        assert_eq!(
            diff.new_fields.get(&WeaponModeField::Name),
            Some(&DiffValue::Text("Breaker Rifle".into()))
        );
        assert!(!diff.old_fields.contains_key(&WeaponModeField::Ammo));
        assert!(!diff.old_fields.contains_key(&WeaponModeField::Traits));
    }

    #[tokio::test]
    async fn ammo_swap_diff_renders_old_and_new() {
        let svc = test_service().await;
        let seed = seed_combi_rifle(&svc).await;

        let graph = svc
            .set_mode_ammo(None, &seed.mode.id, &[seed.ap.id.clone()])
            .await
            .unwrap();
        assert_eq!(graph.ammo, vec![seed.ap.clone()]);

        let records = updates_of(&svc, &seed.mode.id).await;
        assert_eq!(records.total, 1);
        let view = render_record(&records.items[0]);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].field, "ammo");
        assert_eq!(view.rows[0].label, "Ammo");
        assert_eq!(view.rows[0].old_value, "N");
        assert_eq!(view.rows[0].new_value, "AP");
    }

    #[tokio::test]
    async fn identical_resubmission_writes_no_audit() {
        let svc = test_service().await;
        let seed = seed_combi_rifle(&svc).await;

        svc.update_weapon_mode(
            None,
            &seed.mode.id,
            WeaponModeUpdateBuilder::new()
                .name("Combi Rifle")
                .damage(Some("13".into()))
                .burst(Some("3".into()))
                .saving_attribute(Some(SavingAttribute::Arm))
                .build(),
        )
        .await
        .unwrap();
        svc.set_mode_ammo(None, &seed.mode.id, &[seed.n.id.clone()])
            .await
            .unwrap();

        assert_eq!(updates_of(&svc, &seed.mode.id).await.total, 0);
    }

    /// Make every later UPDATE leave the mode row undecodable.
    async fn garble_mode_rows_on_update(svc: &ArmoryService) {
        svc.db()
            .execute(
                "CREATE TRIGGER garble_mode AFTER UPDATE ON weapon_modes
                 BEGIN
                     UPDATE weapon_modes SET created_at = 'garbage' WHERE id = NEW.id;
                 END",
                (),
            )
            .await
            .unwrap();
    }

    async fn stored_mode_name(svc: &ArmoryService, mode_id: &str) -> String {
        let mut rows = svc
            .db()
            .query("SELECT name FROM weapon_modes WHERE id = ?1", [mode_id])
            .await
            .unwrap();
        rows.next().await.unwrap().unwrap().get::<String>(0).unwrap()
    }

    #[tokio::test]
    async fn update_succeeds_when_row_is_unreadable_afterwards() {
        let svc = test_service().await;
        let seed = seed_combi_rifle(&svc).await;
        garble_mode_rows_on_update(&svc).await;

        let mode = svc
            .update_weapon_mode(
                None,
                &seed.mode.id,
                WeaponModeUpdateBuilder::new().name("Breaker Rifle").build(),
            )
            .await
            .unwrap();

        assert_eq!(mode.name, "Breaker Rifle");
        assert!(svc.get_weapon_mode(&seed.mode.id).await.is_err());
        assert_eq!(stored_mode_name(&svc, &seed.mode.id).await, "Breaker Rifle");
        assert_eq!(updates_of(&svc, &seed.mode.id).await.total, 1);
    }

    #[tokio::test]
    async fn set_succeeds_when_row_is_unreadable_afterwards() {
        let svc = test_service().await;
        let seed = seed_combi_rifle(&svc).await;
        garble_mode_rows_on_update(&svc).await;

        let graph = svc
            .set_mode_ammo(None, &seed.mode.id, &[seed.ap.id.clone(), seed.n.id.clone()])
            .await
            .unwrap();

        assert_eq!(graph.ammo, vec![seed.ap.clone(), seed.n.clone()]);
        assert!(svc.load_weapon_mode_graph(&seed.mode.id).await.is_err());
        assert_eq!(updates_of(&svc, &seed.mode.id).await.total, 1);
    }

    #[tokio::test]
    async fn set_returns_members_in_name_order_without_duplicates() {
        let svc = test_service().await;
        let seed = seed_combi_rifle(&svc).await;

        let graph = svc
            .set_mode_ammo(
                None,
                &seed.mode.id,
                &[seed.n.id.clone(), seed.ap.id.clone(), seed.n.id.clone()],
            )
            .await
            .unwrap();

        assert_eq!(graph.ammo, vec![seed.ap.clone(), seed.n.clone()]);
        assert!(graph.mode.updated_at >= seed.mode.updated_at);
        assert_eq!(graph, svc.load_weapon_mode_graph(&seed.mode.id).await.unwrap());
    }

    #[tokio::test]
    async fn clearing_a_field_is_recorded() {
        let svc = test_service().await;
        let seed = seed_combi_rifle(&svc).await;

        let mode = svc
            .update_weapon_mode(
                None,
                &seed.mode.id,
                WeaponModeUpdateBuilder::new().burst(None).build(),
            )
            .await
            .unwrap();
        assert_eq!(mode.burst, None);

        let records = updates_of(&svc, &seed.mode.id).await;
        let Some(AuditDiff::WeaponMode(diff)) = &records.items[0].diff else {
            panic!("expected a weapon mode diff");
        };
        assert_eq!(
            diff.new_fields.get(&WeaponModeField::Burst),
            Some(&DiffValue::Null)
        );
    }

    #[tokio::test]
    async fn unknown_ammo_is_rejected_without_changes() {
        let svc = test_service().await;
        let seed = seed_combi_rifle(&svc).await;

        let err = svc
            .set_mode_ammo(
                None,
                &seed.mode.id,
                &[seed.ap.id.clone(), "amm-missing".to_string()],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(ref m) if m.contains("amm-missing")));

        let graph = svc.load_weapon_mode_graph(&seed.mode.id).await.unwrap();
        assert_eq!(graph.ammo, vec![seed.n.clone()]);
    }

    #[tokio::test]
    async fn traits_are_replaced_and_audited() {
        let svc = test_service().await;
        let seed = seed_combi_rifle(&svc).await;
        let suppressive = svc
            .create_rule(None, "Suppressive Fire", None)
            .await
            .unwrap();

        let graph = svc
            .set_mode_traits(None, &seed.mode.id, &[suppressive.id.clone()])
            .await
            .unwrap();

        assert_eq!(graph.traits, vec![suppressive]);
        let records = updates_of(&svc, &seed.mode.id).await;
        assert_eq!(
            records.items[0].diff.as_ref().unwrap().changed_fields(),
            vec!["traits"]
        );
    }

    #[tokio::test]
    async fn find_and_count_scopes_to_weapon() {
        let svc = test_service().await;
        let seed = seed_combi_rifle(&svc).await;
        let other = svc
            .create_weapon(None, "Pistol", armory_core::enums::WeaponType::Ballistic)
            .await
            .unwrap();
        svc.create_weapon_mode(
            None,
            NewWeaponMode {
                weapon_id: other.id.clone(),
                name: "Single".into(),
                ..NewWeaponMode::default()
            },
        )
        .await
        .unwrap();

        let all = svc
            .find_and_count_weapon_modes(None, None, PageRequest::first(10))
            .await
            .unwrap();
        assert_eq!(all.total, 2);

        let of_rifle = svc
            .find_and_count_weapon_modes(Some(&seed.weapon.id), None, PageRequest::first(10))
            .await
            .unwrap();
        assert_eq!(of_rifle.total, 1);
        assert_eq!(of_rifle.items[0].id, seed.mode.id);
    }
}
