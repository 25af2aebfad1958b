//! Entity structs for all Armory domain objects.
//!
//! Each flat entity maps to one table in the libSQL database. The `*Graph`
//! types bundle an entity with relation collections the caller has already
//! loaded; they are what the snapshotter consumes.

mod ammo;
mod audit;
mod hacking;
mod rule;
mod user;
mod weapon;
mod weapon_mode;

pub use ammo::{Ammo, AmmoGraph};
pub use audit::AuditRecord;
pub use hacking::{HackingDevice, HackingDeviceGraph, HackingProgram};
pub use rule::Rule;
pub use user::User;
pub use weapon::{Weapon, WeaponGraph};
pub use weapon_mode::{WeaponMode, WeaponModeGraph};

/// Entities that expose a stable id and a display name.
///
/// Relation members are projected through this trait into snapshots, and the
/// batch resolver orders children by it.
pub trait Named {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
}

macro_rules! impl_named {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Named for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn name(&self) -> &str {
                    &self.name
                }
            }
        )*
    };
}

impl_named!(Weapon, WeaponMode, Ammo, Rule, HackingDevice, HackingProgram, User);
