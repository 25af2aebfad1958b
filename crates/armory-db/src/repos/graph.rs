//! Entity graph loading.
//!
//! Single-entity loaders go through [`BatchAssociationResolver`] with one
//! key, so snapshots taken around a mutation read relations the same way
//! list resolution does. The `resolve_*` functions attach relations to many
//! parents through a per-request [`RequestLoaders`] set: every key is queued
//! before the first await, so each association costs one query however many
//! parents there are.

use std::slice;

use armory_batch::{Association, BatchAssociationResolver, RequestLoaders};
use armory_core::entities::{
    Ammo, AmmoGraph, HackingDevice, HackingDeviceGraph, Weapon, WeaponGraph, WeaponMode,
    WeaponModeGraph,
};

use crate::ArmoryDb;
use crate::error::DatabaseError;
use crate::service::ArmoryService;

type Loaders<'a> = RequestLoaders<'a, ArmoryDb>;

impl ArmoryService {
    fn resolver(&self) -> BatchAssociationResolver<'_, ArmoryDb> {
        BatchAssociationResolver::new(self.db())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the weapon does not exist.
    pub async fn load_weapon_graph(&self, id: &str) -> Result<WeaponGraph, DatabaseError> {
        let weapon = self.get_weapon(id).await?;
        let modes = self
            .resolver()
            .resolve(Association::WEAPON_MODES, slice::from_ref(&weapon.id))
            .await?;
        Ok(WeaponGraph {
            weapon,
            modes: modes.into_iter().next().unwrap_or_default(),
        })
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the weapon mode does not exist.
    pub async fn load_weapon_mode_graph(&self, id: &str) -> Result<WeaponModeGraph, DatabaseError> {
        let mode = self.get_weapon_mode(id).await?;
        let keys = slice::from_ref(&mode.id);
        let resolver = self.resolver();
        let (ammo, traits) = tokio::try_join!(
            resolver.resolve(Association::WEAPON_MODE_AMMO, keys),
            resolver.resolve(Association::WEAPON_MODE_TRAITS, keys),
        )?;
        Ok(WeaponModeGraph {
            ammo: ammo.into_iter().next().unwrap_or_default(),
            traits: traits.into_iter().next().unwrap_or_default(),
            mode,
        })
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the ammo does not exist.
    pub async fn load_ammo_graph(&self, id: &str) -> Result<AmmoGraph, DatabaseError> {
        let ammo = self.get_ammo(id).await?;
        let combined = self
            .resolver()
            .resolve(Association::COMBINED_AMMO, slice::from_ref(&ammo.id))
            .await?;
        Ok(AmmoGraph {
            ammo,
            combined: combined.into_iter().next().unwrap_or_default(),
        })
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` if the device does not exist.
    pub async fn load_hacking_device_graph(
        &self,
        id: &str,
    ) -> Result<HackingDeviceGraph, DatabaseError> {
        let device = self.get_hacking_device(id).await?;
        let programs = self
            .resolver()
            .resolve(Association::DEVICE_PROGRAMS, slice::from_ref(&device.id))
            .await?;
        Ok(HackingDeviceGraph {
            device,
            programs: programs.into_iter().next().unwrap_or_default(),
        })
    }

    /// Composite ammo that combine `id` (the mirror direction).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_composites_of(&self, id: &str) -> Result<Vec<Ammo>, DatabaseError> {
        let composites = self
            .resolver()
            .resolve(Association::COMBINED_INTO, &[id.to_string()])
            .await?;
        Ok(composites.into_iter().next().unwrap_or_default())
    }
}

/// Attach modes to every weapon.
///
/// # Errors
///
/// Returns `DatabaseError::Load` if the batch fails.
pub async fn resolve_weapon_graphs(
    loaders: &Loaders<'_>,
    weapons: Vec<Weapon>,
) -> Result<Vec<WeaponGraph>, DatabaseError> {
    let pending: Vec<_> = weapons
        .iter()
        .map(|w| loaders.weapon_modes.load(&w.id))
        .collect();
    let mut graphs = Vec::with_capacity(weapons.len());
    for (weapon, modes) in weapons.into_iter().zip(pending) {
        graphs.push(WeaponGraph {
            weapon,
            modes: modes.await?,
        });
    }
    Ok(graphs)
}

/// Attach ammo and traits to every weapon mode.
///
/// # Errors
///
/// Returns `DatabaseError::Load` if either batch fails.
pub async fn resolve_weapon_mode_graphs(
    loaders: &Loaders<'_>,
    modes: Vec<WeaponMode>,
) -> Result<Vec<WeaponModeGraph>, DatabaseError> {
    let pending: Vec<_> = modes
        .iter()
        .map(|m| {
            (
                loaders.weapon_mode_ammo.load(&m.id),
                loaders.weapon_mode_traits.load(&m.id),
            )
        })
        .collect();
    let mut graphs = Vec::with_capacity(modes.len());
    for (mode, (ammo, traits)) in modes.into_iter().zip(pending) {
        graphs.push(WeaponModeGraph {
            mode,
            ammo: ammo.await?,
            traits: traits.await?,
        });
    }
    Ok(graphs)
}

/// Attach owned combined ammo to every ammo.
///
/// # Errors
///
/// Returns `DatabaseError::Load` if the batch fails.
pub async fn resolve_ammo_graphs(
    loaders: &Loaders<'_>,
    ammo: Vec<Ammo>,
) -> Result<Vec<AmmoGraph>, DatabaseError> {
    let pending: Vec<_> = ammo
        .iter()
        .map(|a| loaders.combined_ammo.load(&a.id))
        .collect();
    let mut graphs = Vec::with_capacity(ammo.len());
    for (ammo, combined) in ammo.into_iter().zip(pending) {
        graphs.push(AmmoGraph {
            ammo,
            combined: combined.await?,
        });
    }
    Ok(graphs)
}

/// Attach programs to every hacking device.
///
/// # Errors
///
/// Returns `DatabaseError::Load` if the batch fails.
pub async fn resolve_hacking_device_graphs(
    loaders: &Loaders<'_>,
    devices: Vec<HackingDevice>,
) -> Result<Vec<HackingDeviceGraph>, DatabaseError> {
    let pending: Vec<_> = devices
        .iter()
        .map(|d| loaders.device_programs.load(&d.id))
        .collect();
    let mut graphs = Vec::with_capacity(devices.len());
    for (device, programs) in devices.into_iter().zip(pending) {
        graphs.push(HackingDeviceGraph {
            device,
            programs: programs.await?,
        });
    }
    Ok(graphs)
}
