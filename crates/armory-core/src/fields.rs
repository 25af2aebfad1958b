//! Audited field tables, one enum per auditable entity kind.
//!
//! Each enum lists exactly the fields the diff engine compares for that kind,
//! in display order. The stored token is the `snake_case` serde name; the
//! label is what the audit view shows.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A field of an auditable entity.
pub trait AuditField: Copy + Ord + fmt::Debug + Serialize + DeserializeOwned + 'static {
    /// Token used as the key in persisted diffs.
    fn as_str(self) -> &'static str;

    /// Human-readable column label.
    fn label(self) -> &'static str;
}

macro_rules! audit_fields {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $variant:ident => $token:literal, $label:literal; )*
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $variant, )*
        }

        impl $name {
            /// Every field, in display order.
            pub const ALL: &'static [Self] = &[$( Self::$variant, )*];
        }

        impl AuditField for $name {
            fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $token, )*
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

audit_fields! {
    /// Audited fields of a weapon.
    pub enum WeaponField {
        Name => "name", "Name";
        WeaponType => "weapon_type", "Type";
        Modes => "modes", "Modes";
    }
}

audit_fields! {
    /// Audited fields of a weapon mode.
    pub enum WeaponModeField {
        Name => "name", "Name";
        Damage => "damage", "Damage";
        Burst => "burst", "Burst";
        SavingAttribute => "saving_attribute", "Saving Attribute";
        Ammo => "ammo", "Ammo";
        Traits => "traits", "Traits";
    }
}

audit_fields! {
    /// Audited fields of an ammo.
    pub enum AmmoField {
        Name => "name", "Name";
        CombinedAmmo => "combined_ammo", "Combined Ammo";
    }
}

audit_fields! {
    /// Audited fields of a rule.
    pub enum RuleField {
        Name => "name", "Name";
        Link => "link", "Link";
    }
}

audit_fields! {
    /// Audited fields of a hacking device.
    pub enum HackingDeviceField {
        Name => "name", "Name";
        Programs => "programs", "Programs";
    }
}

audit_fields! {
    /// Audited fields of a hacking program.
    pub enum HackingProgramField {
        Name => "name", "Name";
        AttackModifier => "attack_modifier", "Attack Modifier";
        OpponentModifier => "opponent_modifier", "Opponent Modifier";
        Damage => "damage", "Damage";
        Burst => "burst", "Burst";
        Target => "target", "Target";
        SkillType => "skill_type", "Skill Type";
        Special => "special", "Special";
    }
}
