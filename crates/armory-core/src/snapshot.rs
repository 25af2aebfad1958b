//! Structural snapshots of auditable entities.
//!
//! A snapshot is an owned, plain-data copy of an entity's audited scalar
//! fields plus `{id, name}` projections of its loaded relations. Snapshots
//! never borrow from the entity they were taken from, so mutating the entity
//! afterwards cannot change them.
//!
//! Relations must already be loaded on the graph being snapshotted; nothing
//! here performs I/O.

use serde::{Deserialize, Serialize};

use crate::entities::{
    AmmoGraph, HackingDeviceGraph, HackingProgram, Named, Rule, WeaponGraph, WeaponModeGraph,
};
use crate::enums::{EntityKind, SavingAttribute, SkillType, WeaponType};

/// Minimal projection of a related entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberRef {
    pub id: String,
    pub name: String,
}

impl MemberRef {
    #[must_use]
    pub fn of(entity: &impl Named) -> Self {
        Self {
            id: entity.id().to_string(),
            name: entity.name().to_string(),
        }
    }
}

fn members<T: Named>(related: &[T]) -> Vec<MemberRef> {
    related.iter().map(MemberRef::of).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponSnapshot {
    pub id: String,
    pub name: String,
    pub weapon_type: WeaponType,
    pub modes: Vec<MemberRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponModeSnapshot {
    pub id: String,
    pub weapon_id: String,
    pub name: String,
    pub damage: Option<String>,
    pub burst: Option<String>,
    pub saving_attribute: Option<SavingAttribute>,
    pub ammo: Vec<MemberRef>,
    pub traits: Vec<MemberRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoSnapshot {
    pub id: String,
    pub name: String,
    pub combined_ammo: Vec<MemberRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSnapshot {
    pub id: String,
    pub name: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HackingDeviceSnapshot {
    pub id: String,
    pub name: String,
    pub programs: Vec<MemberRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HackingProgramSnapshot {
    pub id: String,
    pub name: String,
    pub attack_modifier: Option<i64>,
    pub opponent_modifier: Option<i64>,
    pub damage: Option<String>,
    pub burst: Option<String>,
    pub target: Option<String>,
    pub skill_type: Option<SkillType>,
    pub special: Option<String>,
}

/// Snapshot of any auditable entity, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Snapshot {
    Weapon(WeaponSnapshot),
    WeaponMode(WeaponModeSnapshot),
    Ammo(AmmoSnapshot),
    Rule(RuleSnapshot),
    HackingDevice(HackingDeviceSnapshot),
    HackingProgram(HackingProgramSnapshot),
}

impl Snapshot {
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Weapon(_) => EntityKind::Weapon,
            Self::WeaponMode(_) => EntityKind::WeaponMode,
            Self::Ammo(_) => EntityKind::Ammo,
            Self::Rule(_) => EntityKind::Rule,
            Self::HackingDevice(_) => EntityKind::HackingDevice,
            Self::HackingProgram(_) => EntityKind::HackingProgram,
        }
    }

    #[must_use]
    pub fn entity_id(&self) -> &str {
        match self {
            Self::Weapon(s) => &s.id,
            Self::WeaponMode(s) => &s.id,
            Self::Ammo(s) => &s.id,
            Self::Rule(s) => &s.id,
            Self::HackingDevice(s) => &s.id,
            Self::HackingProgram(s) => &s.id,
        }
    }

    /// Display name recorded as the audit record's resource name.
    #[must_use]
    pub fn resource_name(&self) -> &str {
        match self {
            Self::Weapon(s) => &s.name,
            Self::WeaponMode(s) => &s.name,
            Self::Ammo(s) => &s.name,
            Self::Rule(s) => &s.name,
            Self::HackingDevice(s) => &s.name,
            Self::HackingProgram(s) => &s.name,
        }
    }
}

/// Entities (or entity graphs) that can be snapshotted for auditing.
pub trait Snapshottable {
    fn snapshot(&self) -> Snapshot;
}

impl Snapshottable for WeaponGraph {
    fn snapshot(&self) -> Snapshot {
        Snapshot::Weapon(WeaponSnapshot {
            id: self.weapon.id.clone(),
            name: self.weapon.name.clone(),
            weapon_type: self.weapon.weapon_type,
            modes: members(&self.modes),
        })
    }
}

impl Snapshottable for WeaponModeGraph {
    fn snapshot(&self) -> Snapshot {
        Snapshot::WeaponMode(WeaponModeSnapshot {
            id: self.mode.id.clone(),
            weapon_id: self.mode.weapon_id.clone(),
            name: self.mode.name.clone(),
            damage: self.mode.damage.clone(),
            burst: self.mode.burst.clone(),
            saving_attribute: self.mode.saving_attribute,
            ammo: members(&self.ammo),
            traits: members(&self.traits),
        })
    }
}

impl Snapshottable for AmmoGraph {
    fn snapshot(&self) -> Snapshot {
        Snapshot::Ammo(AmmoSnapshot {
            id: self.ammo.id.clone(),
            name: self.ammo.name.clone(),
            combined_ammo: members(&self.combined),
        })
    }
}

impl Snapshottable for Rule {
    fn snapshot(&self) -> Snapshot {
        Snapshot::Rule(RuleSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            link: self.link.clone(),
        })
    }
}

impl Snapshottable for HackingDeviceGraph {
    fn snapshot(&self) -> Snapshot {
        Snapshot::HackingDevice(HackingDeviceSnapshot {
            id: self.device.id.clone(),
            name: self.device.name.clone(),
            programs: members(&self.programs),
        })
    }
}

impl Snapshottable for HackingProgram {
    fn snapshot(&self) -> Snapshot {
        Snapshot::HackingProgram(HackingProgramSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            attack_modifier: self.attack_modifier,
            opponent_modifier: self.opponent_modifier,
            damage: self.damage.clone(),
            burst: self.burst.clone(),
            target: self.target.clone(),
            skill_type: self.skill_type,
            special: self.special.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Ammo, WeaponMode};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn ammo(id: &str, name: &str) -> Ammo {
        let now = Utc::now();
        Ammo {
            id: id.into(),
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }

    fn mode_graph() -> WeaponModeGraph {
        let now = Utc::now();
        WeaponModeGraph {
            mode: WeaponMode {
                id: "wmd-00000001".into(),
                weapon_id: "wpn-00000001".into(),
                name: "Combi Rifle".into(),
                damage: Some("13".into()),
                burst: Some("3".into()),
                saving_attribute: Some(SavingAttribute::Arm),
                created_at: now,
                updated_at: now,
            },
            ammo: vec![ammo("amm-00000001", "N")],
            traits: vec![],
        }
    }

    #[test]
    fn snapshot_projects_relations_to_member_refs() {
        let snapshot = mode_graph().snapshot();
        let Snapshot::WeaponMode(mode) = &snapshot else {
            panic!("expected weapon mode snapshot, got {snapshot:?}");
        };
        assert_eq!(
            mode.ammo,
            vec![MemberRef {
                id: "amm-00000001".into(),
                name: "N".into()
            }]
        );
        assert!(mode.traits.is_empty());
        assert_eq!(snapshot.kind(), EntityKind::WeaponMode);
        assert_eq!(snapshot.resource_name(), "Combi Rifle");
        assert_eq!(snapshot.entity_id(), "wmd-00000001");
    }

    #[test]
    fn snapshot_is_detached_from_entity() {
        let mut graph = mode_graph();
        let before = graph.snapshot();

        graph.mode.name = "Breaker Rifle".into();
        graph.ammo.push(ammo("amm-00000002", "AP"));

        let Snapshot::WeaponMode(mode) = &before else {
            panic!("expected weapon mode snapshot");
        };
        assert_eq!(mode.name, "Combi Rifle");
        assert_eq!(mode.ammo.len(), 1);
    }

    #[test]
    fn repeated_snapshots_are_equal() {
        let graph = mode_graph();
        assert_eq!(graph.snapshot(), graph.snapshot());
    }

    #[test]
    fn snapshot_serializes_with_kind_tag() {
        let json = serde_json::to_value(mode_graph().snapshot()).unwrap();
        assert_eq!(json["kind"], "weapon_mode");
        assert_eq!(json["ammo"][0]["name"], "N");
    }
}
