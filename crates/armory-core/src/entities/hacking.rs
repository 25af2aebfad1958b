use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::SkillType;

/// A hacking device. Carries a set of hacking programs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HackingDevice {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A hacking program available to one or more devices.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HackingProgram {
    pub id: String,
    pub name: String,
    pub attack_modifier: Option<i64>,
    pub opponent_modifier: Option<i64>,
    pub damage: Option<String>,
    pub burst: Option<String>,
    pub target: Option<String>,
    pub skill_type: Option<SkillType>,
    pub special: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A hacking device with its loaded programs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HackingDeviceGraph {
    pub device: HackingDevice,
    pub programs: Vec<HackingProgram>,
}
