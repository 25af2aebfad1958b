//! Bulk association queries backing the batch resolver.
//!
//! Each query returns the child columns followed by the owner id, so one
//! decoder per child type serves every association of that type.

use std::future::Future;

use armory_batch::{Association, AssociationKind, AssociationSource, OwnedChild};
use armory_core::entities::{Ammo, HackingProgram, Rule, WeaponMode};
use libsql::Value;
use tracing::debug;

use crate::ArmoryDb;
use crate::error::DatabaseError;
use crate::helpers::placeholders;
use crate::repos::ammo::{AMMO_COLUMN_COUNT, AMMO_COLUMNS, row_to_ammo};
use crate::repos::hacking_program::{PROGRAM_COLUMN_COUNT, PROGRAM_COLUMNS, row_to_program};
use crate::repos::rule::{RULE_COLUMN_COUNT, RULE_COLUMNS, row_to_rule};
use crate::repos::weapon_mode::{MODE_COLUMN_COUNT, MODE_COLUMNS, row_to_weapon_mode};

type Decode<C> = fn(&libsql::Row) -> Result<C, DatabaseError>;

fn unsupported(kind: AssociationKind, child: &str) -> DatabaseError {
    DatabaseError::InvalidState(format!("association {kind} does not yield {child} rows"))
}

impl ArmoryDb {
    /// Run `sql` with `owner_ids` bound as `?1..?n` and decode `(child, owner)` rows.
    async fn fetch_owned<C>(
        &self,
        sql: &str,
        owner_ids: &[String],
        owner_column: i32,
        decode: Decode<C>,
    ) -> Result<Vec<OwnedChild<C>>, DatabaseError> {
        let params: Vec<Value> = owner_ids.iter().cloned().map(Value::Text).collect();
        let mut rows = self
            .query(sql, libsql::params_from_iter(params))
            .await?;

        let mut owned = Vec::new();
        while let Some(row) = rows.next().await? {
            owned.push(OwnedChild {
                owner_id: row.get::<String>(owner_column)?,
                child: decode(&row)?,
            });
        }
        debug!(owners = owner_ids.len(), rows = owned.len(), "Fetched owned rows");
        Ok(owned)
    }
}

impl AssociationSource<WeaponMode> for ArmoryDb {
    type Error = DatabaseError;

    fn find_by_owner_ids(
        &self,
        association: Association<WeaponMode>,
        owner_ids: &[String],
    ) -> impl Future<Output = Result<Vec<OwnedChild<WeaponMode>>, Self::Error>> + Send {
        async move {
            let ids = placeholders(1, owner_ids.len());
            let sql = match association.kind() {
                AssociationKind::WeaponModes => format!(
                    "SELECT {MODE_COLUMNS}, m.weapon_id FROM weapon_modes m
                     WHERE m.weapon_id IN ({ids}) ORDER BY m.name, m.id"
                ),
                other => return Err(unsupported(other, "weapon mode")),
            };
            self.fetch_owned(&sql, owner_ids, MODE_COLUMN_COUNT, row_to_weapon_mode)
                .await
        }
    }
}

impl AssociationSource<Ammo> for ArmoryDb {
    type Error = DatabaseError;

    fn find_by_owner_ids(
        &self,
        association: Association<Ammo>,
        owner_ids: &[String],
    ) -> impl Future<Output = Result<Vec<OwnedChild<Ammo>>, Self::Error>> + Send {
        async move {
            let ids = placeholders(1, owner_ids.len());
            let (junction, child_column, owner_column) = match association.kind() {
                AssociationKind::WeaponModeAmmo => {
                    ("weapon_mode_ammo", "j.ammo_id", "j.weapon_mode_id")
                }
                AssociationKind::CombinedAmmo => ("ammo_combined", "j.combined_ammo_id", "j.ammo_id"),
                AssociationKind::CombinedInto => ("ammo_combined", "j.ammo_id", "j.combined_ammo_id"),
                other => return Err(unsupported(other, "ammo")),
            };
            let sql = format!(
                "SELECT {AMMO_COLUMNS}, {owner_column} FROM {junction} j
                 JOIN ammo a ON a.id = {child_column}
                 WHERE {owner_column} IN ({ids}) ORDER BY a.name, a.id"
            );
            self.fetch_owned(&sql, owner_ids, AMMO_COLUMN_COUNT, row_to_ammo)
                .await
        }
    }
}

impl AssociationSource<Rule> for ArmoryDb {
    type Error = DatabaseError;

    fn find_by_owner_ids(
        &self,
        association: Association<Rule>,
        owner_ids: &[String],
    ) -> impl Future<Output = Result<Vec<OwnedChild<Rule>>, Self::Error>> + Send {
        async move {
            let ids = placeholders(1, owner_ids.len());
            let sql = match association.kind() {
                AssociationKind::WeaponModeTraits => format!(
                    "SELECT {RULE_COLUMNS}, j.weapon_mode_id FROM weapon_mode_traits j
                     JOIN rules r ON r.id = j.rule_id
                     WHERE j.weapon_mode_id IN ({ids}) ORDER BY r.name, r.id"
                ),
                other => return Err(unsupported(other, "rule")),
            };
            self.fetch_owned(&sql, owner_ids, RULE_COLUMN_COUNT, row_to_rule)
                .await
        }
    }
}

impl AssociationSource<HackingProgram> for ArmoryDb {
    type Error = DatabaseError;

    fn find_by_owner_ids(
        &self,
        association: Association<HackingProgram>,
        owner_ids: &[String],
    ) -> impl Future<Output = Result<Vec<OwnedChild<HackingProgram>>, Self::Error>> + Send {
        async move {
            let ids = placeholders(1, owner_ids.len());
            let sql = match association.kind() {
                AssociationKind::DevicePrograms => format!(
                    "SELECT {PROGRAM_COLUMNS}, j.hacking_device_id FROM hacking_device_programs j
                     JOIN hacking_programs p ON p.id = j.hacking_program_id
                     WHERE j.hacking_device_id IN ({ids}) ORDER BY p.name, p.id"
                ),
                other => return Err(unsupported(other, "hacking program")),
            };
            self.fetch_owned(&sql, owner_ids, PROGRAM_COLUMN_COUNT, row_to_program)
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;
    use armory_batch::{BatchAssociationResolver, ChildOrder};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn combined_ammo_follows_owned_direction() {
        let svc = test_service().await;
        let da = svc.create_ammo(None, "DA").await.unwrap();
        let shock = svc.create_ammo(None, "Shock").await.unwrap();
        let composite = svc.create_ammo(None, "DA + Shock").await.unwrap();
        svc.set_combined_ammo(None, &composite.id, &[da.id.clone(), shock.id.clone()])
            .await
            .unwrap();

        let owned = svc
            .db()
            .find_by_owner_ids(Association::COMBINED_AMMO, &[da.id.clone()])
            .await
            .unwrap();
        assert!(owned.is_empty(), "DA combines nothing");

        let mirror = svc
            .db()
            .find_by_owner_ids(Association::COMBINED_INTO, &[da.id.clone()])
            .await
            .unwrap();
        assert_eq!(mirror.len(), 1);
        assert_eq!(mirror[0].owner_id, da.id);
        assert_eq!(mirror[0].child.name, "DA + Shock");
    }

    #[tokio::test]
    async fn mismatched_association_is_rejected() {
        let svc = test_service().await;
        let bogus = Association::<Ammo>::new(AssociationKind::WeaponModes, ChildOrder::NameAsc);

        let err = svc
            .db()
            .find_by_owner_ids(bogus, &["wpn-1".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, DatabaseError::InvalidState(_)));
    }

    #[tokio::test]
    async fn resolver_over_database_keeps_request_shape() {
        let svc = test_service().await;
        let weapon = svc
            .create_weapon(None, "Combi Rifle", armory_core::enums::WeaponType::Ballistic)
            .await
            .unwrap();
        let resolver = BatchAssociationResolver::new(svc.db());
        let ids = vec![weapon.id.clone(), "wpn-missing".to_string(), weapon.id.clone()];

        let lists = resolver.resolve(Association::WEAPON_MODES, &ids).await.unwrap();

        assert_eq!(lists.len(), 3);
        assert!(lists.iter().all(Vec::is_empty));
    }
}
