use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{Ammo, Rule};
use crate::enums::SavingAttribute;

/// One firing profile of a weapon. Belongs to exactly one weapon.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct WeaponMode {
    pub id: String,
    pub weapon_id: String,
    pub name: String,
    pub damage: Option<String>,
    pub burst: Option<String>,
    pub saving_attribute: Option<SavingAttribute>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A weapon mode with its ammo and trait sets loaded.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct WeaponModeGraph {
    pub mode: WeaponMode,
    pub ammo: Vec<Ammo>,
    pub traits: Vec<Rule>,
}
