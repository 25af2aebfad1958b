//! Integration tests for layered configuration loading.
//!
//! Uses figment::Jail for sandboxed working directories and env vars.

use armory_config::{ArmoryConfig, ConfigError};
use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;

#[test]
fn loads_sections_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[database]
path = "/var/lib/armory/catalogue.db"

[general]
default_page_size = 10
max_page_size = 50
log_level = "armory_db=debug"
"#,
        )?;

        let config: ArmoryConfig = Figment::from(Serialized::defaults(ArmoryConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.database.path, "/var/lib/armory/catalogue.db");
        assert_eq!(config.general.default_page_size, 10);
        assert_eq!(config.general.max_page_size, 50);
        assert_eq!(config.general.log_level, "armory_db=debug");
        Ok(())
    });
}

#[test]
fn project_file_is_picked_up_by_load() {
    Jail::expect_with(|jail| {
        jail.create_dir(".armory")?;
        jail.create_file(
            ".armory/config.toml",
            r#"
[database]
path = ":memory:"
"#,
        )?;

        let config = ArmoryConfig::load().expect("config loads");
        assert!(config.database.is_in_memory());
        assert_eq!(config.general.max_page_size, 100);
        Ok(())
    });
}

#[test]
fn env_overrides_project_file() {
    Jail::expect_with(|jail| {
        jail.create_dir(".armory")?;
        jail.create_file(
            ".armory/config.toml",
            r#"
[general]
max_page_size = 40
"#,
        )?;
        jail.set_env("ARMORY_GENERAL__MAX_PAGE_SIZE", "25");
        jail.set_env("ARMORY_DATABASE__PATH", "env.db");

        let config = ArmoryConfig::load().expect("config loads");
        assert_eq!(config.general.max_page_size, 25);
        assert_eq!(config.database.path, "env.db");
        Ok(())
    });
}

#[test]
fn inconsistent_values_fail_validation() {
    Jail::expect_with(|jail| {
        jail.set_env("ARMORY_GENERAL__DEFAULT_PAGE_SIZE", "30");
        jail.set_env("ARMORY_GENERAL__MAX_PAGE_SIZE", "10");

        let err = ArmoryConfig::load().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        Ok(())
    });
}

#[test]
fn malformed_toml_is_a_figment_error() {
    Jail::expect_with(|jail| {
        jail.create_dir(".armory")?;
        jail.create_file(".armory/config.toml", "[general\nmax_page_size = ")?;

        let err = ArmoryConfig::load().unwrap_err();
        assert!(matches!(err, ConfigError::Figment(_)));
        Ok(())
    });
}
