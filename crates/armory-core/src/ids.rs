//! ID prefix constants.
//!
//! Every entity ID has the shape `<prefix>-<8 hex chars>`, e.g. `wmd-a3f8b2c1`.
//! The random part is generated by the database layer.

pub const PREFIX_WEAPON: &str = "wpn";
pub const PREFIX_WEAPON_MODE: &str = "wmd";
pub const PREFIX_AMMO: &str = "amm";
pub const PREFIX_RULE: &str = "rul";
pub const PREFIX_HACKING_DEVICE: &str = "hdv";
pub const PREFIX_HACKING_PROGRAM: &str = "hpg";
pub const PREFIX_USER: &str = "usr";
pub const PREFIX_AUDIT: &str = "aud";

/// All prefixes, for exhaustive tests.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_WEAPON,
    PREFIX_WEAPON_MODE,
    PREFIX_AMMO,
    PREFIX_RULE,
    PREFIX_HACKING_DEVICE,
    PREFIX_HACKING_PROGRAM,
    PREFIX_USER,
    PREFIX_AUDIT,
];

/// Check that `id` carries `prefix` followed by a dash and a non-empty suffix.
#[must_use]
pub fn has_prefix(id: &str, prefix: &str) -> bool {
    id.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .is_some_and(|suffix| !suffix.is_empty())
}
