//! Shared test utilities for armory-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use armory_config::GeneralConfig;
    use armory_core::entities::{Ammo, User, Weapon, WeaponMode};
    use armory_core::enums::{SavingAttribute, UserRole, WeaponType};

    use crate::ArmoryDb;
    use crate::service::ArmoryService;
    use crate::updates::weapon_mode::NewWeaponMode;

    /// Create an in-memory ArmoryService with default listing limits.
    pub async fn test_service() -> ArmoryService {
        let db = ArmoryDb::open_local(":memory:").await.unwrap();
        ArmoryService::from_db(db, GeneralConfig::default())
    }

    /// Create an editor account to act as.
    pub async fn test_user(svc: &ArmoryService) -> User {
        svc.create_user("Test Editor", "editor@example.com", UserRole::Editor)
            .await
            .unwrap()
    }

    pub struct SeededRifle {
        pub weapon: Weapon,
        pub mode: WeaponMode,
        pub n: Ammo,
        pub ap: Ammo,
    }

    /// Combi Rifle with one mode carrying N ammo, plus an unused AP ammo.
    ///
    /// The mode's ammo row is inserted directly so the only audit records
    /// are the three creates.
    pub async fn seed_combi_rifle(svc: &ArmoryService) -> SeededRifle {
        let weapon = svc
            .create_weapon(None, "Combi Rifle", WeaponType::Ballistic)
            .await
            .unwrap();
        let mode = svc
            .create_weapon_mode(
                None,
                NewWeaponMode {
                    weapon_id: weapon.id.clone(),
                    name: "Combi Rifle".into(),
                    damage: Some("13".into()),
                    burst: Some("3".into()),
                    saving_attribute: Some(SavingAttribute::Arm),
                },
            )
            .await
            .unwrap();
        let n = svc.create_ammo(None, "N").await.unwrap();
        let ap = svc.create_ammo(None, "AP").await.unwrap();
        svc.db()
            .execute(
                "INSERT INTO weapon_mode_ammo (weapon_mode_id, ammo_id) VALUES (?1, ?2)",
                libsql::params![mode.id.as_str(), n.id.as_str()],
            )
            .await
            .unwrap();
        SeededRifle {
            weapon,
            mode,
            n,
            ap,
        }
    }
}
