//! Association descriptors and the storage port they are resolved against.
//!
//! The combined-ammo relation is self-referential and directed. It is
//! described twice: [`Association::COMBINED_AMMO`] follows the owned side
//! (the ammo a composite references) and [`Association::COMBINED_INTO`] the
//! mirror side (the composites that reference an ammo). Only the owned side
//! is authoritative.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;

use armory_core::entities::{Ammo, HackingProgram, Rule, WeaponMode};

/// Which relation to traverse, and in which direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationKind {
    /// Weapon → its modes (one-to-many).
    WeaponModes,
    /// Weapon mode → ammo.
    WeaponModeAmmo,
    /// Weapon mode → trait rules.
    WeaponModeTraits,
    /// Hacking device → programs.
    DevicePrograms,
    /// Composite ammo → the ammo it combines (owned direction).
    CombinedAmmo,
    /// Ammo → the composites that combine it (mirror direction).
    CombinedInto,
}

impl AssociationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WeaponModes => "weapon_modes",
            Self::WeaponModeAmmo => "weapon_mode_ammo",
            Self::WeaponModeTraits => "weapon_mode_traits",
            Self::DevicePrograms => "device_programs",
            Self::CombinedAmmo => "combined_ammo",
            Self::CombinedInto => "combined_into",
        }
    }
}

impl fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordering applied to each parent's child list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildOrder {
    /// Name ascending, id ascending on ties.
    NameAsc,
    /// Keep the order the source returned.
    AsFetched,
}

/// Typed descriptor of an association whose children are `C`.
pub struct Association<C> {
    kind: AssociationKind,
    order: ChildOrder,
    child: PhantomData<fn() -> C>,
}

impl<C> Association<C> {
    #[must_use]
    pub const fn new(kind: AssociationKind, order: ChildOrder) -> Self {
        Self {
            kind,
            order,
            child: PhantomData,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> AssociationKind {
        self.kind
    }

    #[must_use]
    pub const fn order(&self) -> ChildOrder {
        self.order
    }
}

impl Association<WeaponMode> {
    pub const WEAPON_MODES: Self = Self::new(AssociationKind::WeaponModes, ChildOrder::NameAsc);
}

impl Association<Ammo> {
    pub const WEAPON_MODE_AMMO: Self =
        Self::new(AssociationKind::WeaponModeAmmo, ChildOrder::NameAsc);
    pub const COMBINED_AMMO: Self = Self::new(AssociationKind::CombinedAmmo, ChildOrder::NameAsc);
    pub const COMBINED_INTO: Self = Self::new(AssociationKind::CombinedInto, ChildOrder::NameAsc);
}

impl Association<Rule> {
    pub const WEAPON_MODE_TRAITS: Self =
        Self::new(AssociationKind::WeaponModeTraits, ChildOrder::NameAsc);
}

impl Association<HackingProgram> {
    pub const DEVICE_PROGRAMS: Self =
        Self::new(AssociationKind::DevicePrograms, ChildOrder::NameAsc);
}

impl<C> Clone for Association<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Association<C> {}

impl<C> fmt::Debug for Association<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Association")
            .field("kind", &self.kind)
            .field("order", &self.order)
            .finish()
    }
}

/// A child row tagged with the parent id it was fetched for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedChild<C> {
    pub owner_id: String,
    pub child: C,
}

/// Storage port answering "all children whose owner key is in this set".
///
/// Implementations return every matching `(owner, child)` pair in a single
/// round-trip. Unknown owner ids simply match nothing.
pub trait AssociationSource<C>: Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn find_by_owner_ids(
        &self,
        association: Association<C>,
        owner_ids: &[String],
    ) -> impl Future<Output = Result<Vec<OwnedChild<C>>, Self::Error>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(AssociationKind::WeaponModes, "weapon_modes")]
    #[case(AssociationKind::WeaponModeAmmo, "weapon_mode_ammo")]
    #[case(AssociationKind::WeaponModeTraits, "weapon_mode_traits")]
    #[case(AssociationKind::DevicePrograms, "device_programs")]
    #[case(AssociationKind::CombinedAmmo, "combined_ammo")]
    #[case(AssociationKind::CombinedInto, "combined_into")]
    fn kind_names(#[case] kind: AssociationKind, #[case] expected: &str) {
        assert_eq!(kind.to_string(), expected);
    }

    #[test]
    fn combined_ammo_has_two_directions() {
        assert_eq!(
            Association::COMBINED_AMMO.kind(),
            AssociationKind::CombinedAmmo
        );
        assert_eq!(
            Association::COMBINED_INTO.kind(),
            AssociationKind::CombinedInto
        );
        assert_eq!(Association::COMBINED_INTO.order(), ChildOrder::NameAsc);
    }
}
