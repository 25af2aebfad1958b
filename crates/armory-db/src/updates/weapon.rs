//! Weapon update builder.

use armory_core::enums::WeaponType;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct WeaponUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weapon_type: Option<WeaponType>,
}

#[derive(Debug, Default)]
pub struct WeaponUpdateBuilder(WeaponUpdate);

impl WeaponUpdateBuilder {
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
    pub const fn weapon_type(mut self, val: WeaponType) -> Self {
        self.0.weapon_type = Some(val);
        self
    }

    #[must_use]
    pub fn build(self) -> WeaponUpdate {
        self.0
    }
}
