//! The loader set for one inbound request.
//!
//! Construct a [`RequestLoaders`] when a request arrives, pass it to every
//! resolver that needs related entities, and drop it when the response is
//! sent. The borrow of the source ties each loader set to the scope that
//! created it.

use armory_core::entities::{Ammo, HackingProgram, Rule, WeaponMode};

use crate::association::{Association, AssociationSource};
use crate::loader::KeyedBatchLoader;

/// A source able to serve every association the catalogue exposes.
pub trait CatalogSource:
    AssociationSource<WeaponMode>
    + AssociationSource<Ammo>
    + AssociationSource<Rule>
    + AssociationSource<HackingProgram>
{
}

impl<T> CatalogSource for T where
    T: AssociationSource<WeaponMode>
        + AssociationSource<Ammo>
        + AssociationSource<Rule>
        + AssociationSource<HackingProgram>
{
}

/// One loader per association, scoped to a single request.
pub struct RequestLoaders<'a, S: CatalogSource> {
    pub weapon_modes: KeyedBatchLoader<'a, S, WeaponMode>,
    pub weapon_mode_ammo: KeyedBatchLoader<'a, S, Ammo>,
    pub weapon_mode_traits: KeyedBatchLoader<'a, S, Rule>,
    pub device_programs: KeyedBatchLoader<'a, S, HackingProgram>,
    pub combined_ammo: KeyedBatchLoader<'a, S, Ammo>,
    pub combined_into: KeyedBatchLoader<'a, S, Ammo>,
}

impl<'a, S: CatalogSource> RequestLoaders<'a, S> {
    #[must_use]
    pub fn new(source: &'a S) -> Self {
        Self {
            weapon_modes: KeyedBatchLoader::new(source, Association::WEAPON_MODES),
            weapon_mode_ammo: KeyedBatchLoader::new(source, Association::WEAPON_MODE_AMMO),
            weapon_mode_traits: KeyedBatchLoader::new(source, Association::WEAPON_MODE_TRAITS),
            device_programs: KeyedBatchLoader::new(source, Association::DEVICE_PROGRAMS),
            combined_ammo: KeyedBatchLoader::new(source, Association::COMBINED_AMMO),
            combined_into: KeyedBatchLoader::new(source, Association::COMBINED_INTO),
        }
    }
}
