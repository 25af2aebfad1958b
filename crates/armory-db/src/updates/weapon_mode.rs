//! Weapon mode creation input and update builder.

use armory_core::enums::SavingAttribute;
use serde::Serialize;

/// Fields for a new weapon mode. Ammo and traits are attached afterwards.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewWeaponMode {
    pub weapon_id: String,
    pub name: String,
    pub damage: Option<String>,
    pub burst: Option<String>,
    pub saving_attribute: Option<SavingAttribute>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WeaponModeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub burst: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saving_attribute: Option<Option<SavingAttribute>>,
}

#[derive(Debug, Default)]
pub struct WeaponModeUpdateBuilder(WeaponModeUpdate);

impl WeaponModeUpdateBuilder {
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
    pub const fn saving_attribute(mut self, val: Option<SavingAttribute>) -> Self {
        self.0.saving_attribute = Some(val);
        self
    }

    #[must_use]
    pub fn build(self) -> WeaponModeUpdate {
        self.0
    }
}
