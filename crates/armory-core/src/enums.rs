//! Enumerations for game data, entity kinds, and audit actions.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and expose `as_str()` returning the exact token stored in SQL.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// WeaponType
// ---------------------------------------------------------------------------

/// Broad category of a weapon profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    Ballistic,
    CloseCombat,
    Deployable,
    Equipment,
}

impl WeaponType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ballistic => "ballistic",
            Self::CloseCombat => "close_combat",
            Self::Deployable => "deployable",
            Self::Equipment => "equipment",
        }
    }
}

impl fmt::Display for WeaponType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SavingAttribute
// ---------------------------------------------------------------------------

/// Attribute a target rolls against when hit by a weapon mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SavingAttribute {
    Arm,
    Bts,
    Ph,
    Wip,
}

impl SavingAttribute {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Arm => "arm",
            Self::Bts => "bts",
            Self::Ph => "ph",
            Self::Wip => "wip",
        }
    }
}

impl fmt::Display for SavingAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SkillType
// ---------------------------------------------------------------------------

/// Order expenditure a hacking program requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SkillType {
    ShortSkill,
    EntireOrder,
    Aro,
}

impl SkillType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShortSkill => "short_skill",
            Self::EntireOrder => "entire_order",
            Self::Aro => "aro",
        }
    }
}

impl fmt::Display for SkillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// UserRole
// ---------------------------------------------------------------------------

/// Access level of an editor account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Editor,
    Admin,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Editor => "editor",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Type of action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Custom,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Custom => "custom",
        }
    }

    /// Past-tense verb used in rendered audit summaries.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Create => "Created",
            Self::Update => "Updated",
            Self::Delete => "Deleted",
            Self::Custom => "Recorded",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// Kind of persisted entity, used in audit records and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Weapon,
    WeaponMode,
    Ammo,
    Rule,
    HackingDevice,
    HackingProgram,
    User,
}

impl EntityKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::WeaponMode => "weapon_mode",
            Self::Ammo => "ammo",
            Self::Rule => "rule",
            Self::HackingDevice => "hacking_device",
            Self::HackingProgram => "hacking_program",
            Self::User => "user",
        }
    }

    /// Human-readable name, e.g. `"weapon mode"`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Weapon => "weapon",
            Self::WeaponMode => "weapon mode",
            Self::Ammo => "ammo",
            Self::Rule => "rule",
            Self::HackingDevice => "hacking device",
            Self::HackingProgram => "hacking program",
            Self::User => "user",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
