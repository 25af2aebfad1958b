//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::{ConfigError, GeneralConfig};

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV_VAR: &str = "ARMORY_LOG";

/// Install the global `fmt` subscriber.
///
/// `ARMORY_LOG` wins when set and parseable; otherwise `general.log_level`
/// is used.
///
/// # Errors
///
/// Returns `ConfigError::Tracing` if a global subscriber is already set.
pub fn init_tracing(general: &GeneralConfig) -> Result<(), ConfigError> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(general))
        .try_init()
        .map_err(|error| ConfigError::Tracing(error.to_string()))
}

fn env_filter(general: &GeneralConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(&general.log_level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_reports_error() {
        let general = GeneralConfig::default();
        // Another test may have installed a subscriber first, so only the
        // second call is guaranteed to fail.
        let _ = init_tracing(&general);
        assert!(matches!(
            init_tracing(&general),
            Err(ConfigError::Tracing(_))
        ));
    }
}
