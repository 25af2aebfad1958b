use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::WeaponMode;
use crate::enums::WeaponType;

/// A weapon profile. Owns its weapon modes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Weapon {
    pub id: String,
    pub name: String,
    pub weapon_type: WeaponType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A weapon together with its loaded modes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct WeaponGraph {
    pub weapon: Weapon,
    pub modes: Vec<WeaponMode>,
}
