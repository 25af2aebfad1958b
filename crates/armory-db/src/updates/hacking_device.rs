//! Hacking device update builder.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct HackingDeviceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Default)]
pub struct HackingDeviceUpdateBuilder(HackingDeviceUpdate);

impl HackingDeviceUpdateBuilder {
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
    pub fn build(self) -> HackingDeviceUpdate {
        self.0
    }
}
