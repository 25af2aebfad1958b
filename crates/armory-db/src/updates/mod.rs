//! Update builder types for entity mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some` fields
//! generate SET clauses in the dynamic UPDATE SQL. `Option<Option<T>>` fields
//! distinguish "leave unchanged" (`None`) from "clear" (`Some(None)`).
//! Relation sets are replaced through dedicated setters, not builders.

pub mod ammo;
pub mod hacking_device;
pub mod hacking_program;
pub mod rule;
pub mod weapon;
pub mod weapon_mode;
