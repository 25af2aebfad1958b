//! Hacking program creation input and update builder.

use armory_core::enums::SkillType;
use serde::Serialize;

/// Fields for a new hacking program.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewHackingProgram {
    pub name: String,
    pub attack_modifier: Option<i64>,
    pub opponent_modifier: Option<i64>,
    pub damage: Option<String>,
    pub burst: Option<String>,
    pub target: Option<String>,
    pub skill_type: Option<SkillType>,
    pub special: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HackingProgramUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack_modifier: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opponent_modifier: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burst: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_type: Option<Option<SkillType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special: Option<Option<String>>,
}

#[derive(Debug, Default)]
pub struct HackingProgramUpdateBuilder(HackingProgramUpdate);

impl HackingProgramUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(mut self, val: impl Into<String>) -> Self {
        self.0.name = Some(val.into());
        self
    }

    #[must_use]
    pub const fn attack_modifier(mut self, val: Option<i64>) -> Self {
        self.0.attack_modifier = Some(val);
        self
    }

    #[must_use]
    pub const fn opponent_modifier(mut self, val: Option<i64>) -> Self {
        self.0.opponent_modifier = Some(val);
        self
    }

    #[must_use]
    pub fn damage(mut self, val: Option<String>) -> Self {
        self.0.damage = Some(val);
        self
    }

    #[must_use]
    pub fn burst(mut self, val: Option<String>) -> Self {
        self.0.burst = Some(val);
        self
    }

    #[must_use]
    pub fn target(mut self, val: Option<String>) -> Self {
        self.0.target = Some(val);
        self
    }

    #[must_use]
    pub const fn skill_type(mut self, val: Option<SkillType>) -> Self {
        self.0.skill_type = Some(val);
        self
    }

    #[must_use]
    pub fn special(mut self, val: Option<String>) -> Self {
        self.0.special = Some(val);
        self
    }

    #[must_use]
    pub fn build(self) -> HackingProgramUpdate {
        self.0
    }
}
