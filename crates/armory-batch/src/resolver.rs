//! Bulk resolution of parent ids into per-parent child lists.

use std::collections::{HashMap, HashSet};

use armory_core::entities::Named;
use tracing::debug;

use crate::association::{Association, AssociationSource, ChildOrder};

/// Resolves child lists for many parents with one storage round-trip.
///
/// The output always has one list per requested id, in request order.
/// Duplicate ids each get their own copy of the same list, and ids without
/// children (including ids that do not exist) get an empty list.
pub struct BatchAssociationResolver<'a, S> {
    source: &'a S,
}

impl<S> Clone for BatchAssociationResolver<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for BatchAssociationResolver<'_, S> {}

impl<'a, S> BatchAssociationResolver<'a, S> {
    #[must_use]
    pub const fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Resolve `association` for every id in `parent_ids`.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the bulk fetch fails.
    pub async fn resolve<C>(
        &self,
        association: Association<C>,
        parent_ids: &[String],
    ) -> Result<Vec<Vec<C>>, S::Error>
    where
        S: AssociationSource<C>,
        C: Named + Clone,
    {
        let distinct = distinct_ids(parent_ids);
        if distinct.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self
            .source
            .find_by_owner_ids(association, &distinct)
            .await?;
        debug!(
            association = %association.kind(),
            keys = parent_ids.len(),
            distinct = distinct.len(),
            rows = rows.len(),
            "Resolved association batch"
        );

        let mut groups: HashMap<String, Vec<C>> = HashMap::with_capacity(distinct.len());
        for row in rows {
            groups.entry(row.owner_id).or_default().push(row.child);
        }
        if association.order() == ChildOrder::NameAsc {
            for children in groups.values_mut() {
                children.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(b.id())));
            }
        }

        Ok(parent_ids
            .iter()
            .map(|id| groups.get(id).cloned().unwrap_or_default())
            .collect())
    }
}

/// De-duplicate ids, keeping first-occurrence order.
fn distinct_ids(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}
