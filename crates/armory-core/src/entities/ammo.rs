use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An ammunition type.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Ammo {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An ammo with the constituent ammo it combines.
///
/// `combined` is the owned direction of the self-referential relation: the
/// ammo this one references, not the ammo that reference it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AmmoGraph {
    pub ammo: Ammo,
    pub combined: Vec<Ammo>,
}
