//! Rule update builder.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct RuleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Option<String>>,
}

#[derive(Debug, Default)]
pub struct RuleUpdateBuilder(RuleUpdate);

impl RuleUpdateBuilder {
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
    pub fn link(mut self, val: Option<String>) -> Self {
        self.0.link = Some(val);
        self
    }

    #[must_use]
    pub fn build(self) -> RuleUpdate {
        self.0
    }
}
