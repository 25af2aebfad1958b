//! General application configuration.

use armory_core::pagination::PageRequest;
use serde::{Deserialize, Serialize};

/// Default page size for listings.
const fn default_page_size() -> u32 {
    20
}

/// Largest page size a caller may request.
const fn default_max_page_size() -> u32 {
    100
}

fn default_log_level() -> String {
    "warn".into()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Page size used when a caller does not specify one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Upper bound applied to every requested page size.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Tracing filter used when `ARMORY_LOG` is unset (e.g. "info", "armory_db=debug").
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            log_level: default_log_level(),
        }
    }
}

impl GeneralConfig {
    /// Build a page request, falling back to the default size and capping at the maximum.
    #[must_use]
    pub fn page(&self, page: u32, limit: Option<u32>) -> PageRequest {
        PageRequest::new(page, limit.unwrap_or(self.default_page_size)).clamped(self.max_page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 100);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn page_uses_default_and_caps() {
        let config = GeneralConfig::default();
        assert_eq!(config.page(2, None), PageRequest::new(2, 20));
        assert_eq!(config.page(0, Some(1000)), PageRequest::new(0, 100));
    }
}
