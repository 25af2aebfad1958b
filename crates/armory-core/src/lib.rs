//! # armory-core
//!
//! Core types shared across all Armory crates.
//!
//! This crate provides the foundational pieces every other crate builds on:
//! - Entity structs for the game data (weapons, modes, ammo, rules, hacking)
//! - Entity graphs carrying already-loaded relations
//! - Kind/action enums and ID prefix constants
//! - Structural snapshots of auditable entities
//! - The field-level audit diff and its display renderer
//! - Page requests shared by every paginated listing
//! - Cross-cutting error types

pub mod diff;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod fields;
pub mod ids;
pub mod pagination;
pub mod render;
pub mod snapshot;
