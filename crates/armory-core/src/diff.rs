//! Field-level audit diffing between two snapshots of one entity.
//!
//! Scalars are compared by value. Relation fields are compared by their
//! rendered membership: the member names, sorted. Reordering a relation set
//! never produces a change; adding, removing, or renaming a member does.
//!
//! Both sides of a [`FieldDiff`] always carry the same key set, and diffing a
//! snapshot against itself yields two empty maps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::EntityKind;
use crate::fields::{
    AmmoField, AuditField, HackingDeviceField, HackingProgramField, RuleField, WeaponField,
    WeaponModeField,
};
use crate::snapshot::{
    AmmoSnapshot, HackingDeviceSnapshot, HackingProgramSnapshot, MemberRef, RuleSnapshot,
    Snapshot, WeaponModeSnapshot, WeaponSnapshot,
};

/// Errors raised when two snapshots cannot be compared.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    /// The snapshots describe different entity kinds.
    #[error("Cannot diff a {old} snapshot against a {new} snapshot")]
    ShapeMismatch { old: EntityKind, new: EntityKind },

    /// The snapshots describe different entities of the same kind.
    #[error("Cannot diff {kind} {old_id} against {new_id}")]
    EntityMismatch {
        kind: EntityKind,
        old_id: String,
        new_id: String,
    },
}

/// A single audited value, stored in persisted diffs.
///
/// Every variant renders to a scalar display string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DiffValue {
    Null,
    Text(String),
    Integer(i64),
    /// An enum-like token such as `short_skill`.
    Token(String),
    /// Sorted member names of a relation.
    List(Vec<String>),
}

impl DiffValue {
    fn text(value: &str) -> Self {
        Self::Text(value.to_string())
    }

    fn optional_text(value: Option<&str>) -> Self {
        value.map_or(Self::Null, Self::text)
    }

    fn optional_integer(value: Option<i64>) -> Self {
        value.map_or(Self::Null, Self::Integer)
    }

    fn optional_token(value: Option<&'static str>) -> Self {
        value.map_or(Self::Null, |token| Self::Token(token.to_string()))
    }

    /// Rendered membership of a relation: member names, sorted.
    #[must_use]
    pub fn membership(members: &[MemberRef]) -> Self {
        let mut names: Vec<String> = members.iter().map(|m| m.name.clone()).collect();
        names.sort();
        Self::List(names)
    }
}

/// Changed fields of one entity: old values and new values over one key set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDiff<F: Ord> {
    pub old_fields: BTreeMap<F, DiffValue>,
    pub new_fields: BTreeMap<F, DiffValue>,
}

impl<F: Ord> Default for FieldDiff<F> {
    fn default() -> Self {
        Self {
            old_fields: BTreeMap::new(),
            new_fields: BTreeMap::new(),
        }
    }
}

impl<F: AuditField> FieldDiff<F> {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.old_fields.is_empty()
    }

    /// Number of changed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.old_fields.len()
    }

    /// Iterate `(field, old, new)` in field declaration order.
    pub fn changes(&self) -> impl Iterator<Item = (F, &DiffValue, &DiffValue)> {
        self.old_fields.iter().filter_map(|(field, old)| {
            self.new_fields.get(field).map(|new| (*field, old, new))
        })
    }

    fn record(&mut self, field: F, old: DiffValue, new: DiffValue) {
        self.old_fields.insert(field, old);
        self.new_fields.insert(field, new);
    }
}

/// Snapshot types that expose their audited values field by field.
pub trait AuditFields {
    type Field: AuditField;

    /// Every audited field with its comparable value, in declaration order.
    fn audit_values(&self) -> Vec<(Self::Field, DiffValue)>;
}

/// Compare two snapshots of one kind field by field.
pub fn diff_fields<S: AuditFields>(old: &S, new: &S) -> FieldDiff<S::Field> {
    let mut diff = FieldDiff::default();
    for ((field, old_value), (_, new_value)) in
        old.audit_values().into_iter().zip(new.audit_values())
    {
        if old_value != new_value {
            diff.record(field, old_value, new_value);
        }
    }
    diff
}

/// A diff tagged by the kind of entity it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "changes", rename_all = "snake_case")]
pub enum AuditDiff {
    Weapon(FieldDiff<WeaponField>),
    WeaponMode(FieldDiff<WeaponModeField>),
    Ammo(FieldDiff<AmmoField>),
    Rule(FieldDiff<RuleField>),
    HackingDevice(FieldDiff<HackingDeviceField>),
    HackingProgram(FieldDiff<HackingProgramField>),
}

impl AuditDiff {
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
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Weapon(d) => d.is_empty(),
            Self::WeaponMode(d) => d.is_empty(),
            Self::Ammo(d) => d.is_empty(),
            Self::Rule(d) => d.is_empty(),
            Self::HackingDevice(d) => d.is_empty(),
            Self::HackingProgram(d) => d.is_empty(),
        }
    }

    /// Changed field tokens, in declaration order.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<&'static str> {
        fn tokens<F: AuditField>(diff: &FieldDiff<F>) -> Vec<&'static str> {
            diff.old_fields.keys().map(|f| f.as_str()).collect()
        }
        match self {
            Self::Weapon(d) => tokens(d),
            Self::WeaponMode(d) => tokens(d),
            Self::Ammo(d) => tokens(d),
            Self::Rule(d) => tokens(d),
            Self::HackingDevice(d) => tokens(d),
            Self::HackingProgram(d) => tokens(d),
        }
    }
}

/// Compute the minimal diff between two snapshots of the same entity.
///
/// # Errors
///
/// Returns `DiffError::ShapeMismatch` if the snapshots are of different kinds
/// and `DiffError::EntityMismatch` if they describe different entities.
pub fn diff(old: &Snapshot, new: &Snapshot) -> Result<AuditDiff, DiffError> {
    if old.kind() == new.kind() && old.entity_id() != new.entity_id() {
        return Err(DiffError::EntityMismatch {
            kind: old.kind(),
            old_id: old.entity_id().to_string(),
            new_id: new.entity_id().to_string(),
        });
    }
    match (old, new) {
        (Snapshot::Weapon(a), Snapshot::Weapon(b)) => Ok(AuditDiff::Weapon(diff_fields(a, b))),
        (Snapshot::WeaponMode(a), Snapshot::WeaponMode(b)) => {
            Ok(AuditDiff::WeaponMode(diff_fields(a, b)))
        }
        (Snapshot::Ammo(a), Snapshot::Ammo(b)) => Ok(AuditDiff::Ammo(diff_fields(a, b))),
        (Snapshot::Rule(a), Snapshot::Rule(b)) => Ok(AuditDiff::Rule(diff_fields(a, b))),
        (Snapshot::HackingDevice(a), Snapshot::HackingDevice(b)) => {
            Ok(AuditDiff::HackingDevice(diff_fields(a, b)))
        }
        (Snapshot::HackingProgram(a), Snapshot::HackingProgram(b)) => {
            Ok(AuditDiff::HackingProgram(diff_fields(a, b)))
        }
        _ => Err(DiffError::ShapeMismatch {
            old: old.kind(),
            new: new.kind(),
        }),
    }
}

impl AuditFields for WeaponSnapshot {
    type Field = WeaponField;

    fn audit_values(&self) -> Vec<(WeaponField, DiffValue)> {
        vec![
            (WeaponField::Name, DiffValue::text(&self.name)),
            (
                WeaponField::WeaponType,
                DiffValue::Token(self.weapon_type.as_str().to_string()),
            ),
            (WeaponField::Modes, DiffValue::membership(&self.modes)),
        ]
    }
}

impl AuditFields for WeaponModeSnapshot {
    type Field = WeaponModeField;

    fn audit_values(&self) -> Vec<(WeaponModeField, DiffValue)> {
        vec![
            (WeaponModeField::Name, DiffValue::text(&self.name)),
            (
                WeaponModeField::Damage,
                DiffValue::optional_text(self.damage.as_deref()),
            ),
            (
                WeaponModeField::Burst,
                DiffValue::optional_text(self.burst.as_deref()),
            ),
            (
                WeaponModeField::SavingAttribute,
                DiffValue::optional_token(self.saving_attribute.map(|s| s.as_str())),
            ),
            (WeaponModeField::Ammo, DiffValue::membership(&self.ammo)),
            (WeaponModeField::Traits, DiffValue::membership(&self.traits)),
        ]
    }
}

impl AuditFields for AmmoSnapshot {
    type Field = AmmoField;

    fn audit_values(&self) -> Vec<(AmmoField, DiffValue)> {
        vec![
            (AmmoField::Name, DiffValue::text(&self.name)),
            (
                AmmoField::CombinedAmmo,
                DiffValue::membership(&self.combined_ammo),
            ),
        ]
    }
}

impl AuditFields for RuleSnapshot {
    type Field = RuleField;

    fn audit_values(&self) -> Vec<(RuleField, DiffValue)> {
        vec![
            (RuleField::Name, DiffValue::text(&self.name)),
            (RuleField::Link, DiffValue::optional_text(self.link.as_deref())),
        ]
    }
}

impl AuditFields for HackingDeviceSnapshot {
    type Field = HackingDeviceField;

    fn audit_values(&self) -> Vec<(HackingDeviceField, DiffValue)> {
        vec![
            (HackingDeviceField::Name, DiffValue::text(&self.name)),
            (
                HackingDeviceField::Programs,
                DiffValue::membership(&self.programs),
            ),
        ]
    }
}

impl AuditFields for HackingProgramSnapshot {
    type Field = HackingProgramField;

    fn audit_values(&self) -> Vec<(HackingProgramField, DiffValue)> {
        vec![
            (HackingProgramField::Name, DiffValue::text(&self.name)),
            (
                HackingProgramField::AttackModifier,
                DiffValue::optional_integer(self.attack_modifier),
            ),
            (
                HackingProgramField::OpponentModifier,
                DiffValue::optional_integer(self.opponent_modifier),
            ),
            (
                HackingProgramField::Damage,
                DiffValue::optional_text(self.damage.as_deref()),
            ),
            (
                HackingProgramField::Burst,
                DiffValue::optional_text(self.burst.as_deref()),
            ),
            (
                HackingProgramField::Target,
                DiffValue::optional_text(self.target.as_deref()),
            ),
            (
                HackingProgramField::SkillType,
                DiffValue::optional_token(self.skill_type.map(|s| s.as_str())),
            ),
            (
                HackingProgramField::Special,
                DiffValue::optional_text(self.special.as_deref()),
            ),
        ]
    }
}
