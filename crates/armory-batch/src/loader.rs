//! Per-request coalescing loader over one association.
//!
//! `load` queues its key synchronously and returns a future. The first of
//! those futures to be awaited dispatches every queued key in one resolver
//! call, so keys requested while building a response tree are fetched
//! together. Each distinct key is fetched at most once per loader; later
//! loads of the same key are served from the loader's cache, and loads that
//! arrive while the key's batch is still being fetched wait for that batch.
//!
//! A loader must not outlive the request it was created for, otherwise its
//! cache would serve stale child lists to unrelated requests.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use armory_core::entities::Named;
use thiserror::Error;
use tracing::{debug, warn};

use crate::association::{Association, AssociationKind, AssociationSource};
use crate::resolver::BatchAssociationResolver;

/// A load failed because the batch it was part of failed.
///
/// Every load coalesced into a failed batch receives the same shared error.
#[derive(Debug, Error)]
pub enum LoadError<E: std::error::Error + 'static> {
    #[error("Batch load of {association} failed: {source}")]
    Batch {
        association: AssociationKind,
        #[source]
        source: Arc<E>,
    },
}

impl<E: std::error::Error + 'static> Clone for LoadError<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Batch {
                association,
                source,
            } => Self::Batch {
                association: *association,
                source: Arc::clone(source),
            },
        }
    }
}

enum Slot<C, E> {
    Queued,
    InFlight,
    Ready(Vec<C>),
    Failed(Arc<E>),
}

struct LoaderState<C, E> {
    queued: Vec<String>,
    slots: HashMap<String, Slot<C, E>>,
}

type SourceError<S, C> = <S as AssociationSource<C>>::Error;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Keys handed to a running fetch.
///
/// If the fetch is dropped before it settles, its keys are released so the
/// next load dispatches them again.
struct InFlightBatch<'s, C, E> {
    state: &'s Mutex<LoaderState<C, E>>,
    keys: Vec<String>,
}

impl<C, E> InFlightBatch<'_, C, E> {
    fn settle(&mut self) -> Vec<String> {
        std::mem::take(&mut self.keys)
    }
}

impl<C, E> Drop for InFlightBatch<'_, C, E> {
    fn drop(&mut self) {
        if self.keys.is_empty() {
            return;
        }
        let mut state = lock(self.state);
        for key in &self.keys {
            if matches!(state.slots.get(key), Some(Slot::InFlight)) {
                state.slots.remove(key);
            }
        }
    }
}

/// Coalescing, caching loader for one association within one request.
pub struct KeyedBatchLoader<'a, S, C>
where
    S: AssociationSource<C>,
{
    resolver: BatchAssociationResolver<'a, S>,
    association: Association<C>,
    state: Mutex<LoaderState<C, SourceError<S, C>>>,
    dispatch: tokio::sync::Mutex<()>,
    batches: AtomicUsize,
}

impl<'a, S, C> KeyedBatchLoader<'a, S, C>
where
    S: AssociationSource<C>,
    C: Named + Clone,
{
    #[must_use]
    pub fn new(source: &'a S, association: Association<C>) -> Self {
        Self {
            resolver: BatchAssociationResolver::new(source),
            association,
            state: Mutex::new(LoaderState {
                queued: Vec::new(),
                slots: HashMap::new(),
            }),
            dispatch: tokio::sync::Mutex::new(()),
            batches: AtomicUsize::new(0),
        }
    }

    /// Load the child list of `key`.
    ///
    /// The key is queued immediately; the returned future resolves once the
    /// batch carrying it has been fetched. The future borrows the loader but
    /// not `key`.
    pub fn load<'s>(
        &'s self,
        key: &str,
    ) -> impl Future<Output = Result<Vec<C>, LoadError<SourceError<S, C>>>> + use<'s, 'a, S, C>
    {
        let key = key.to_string();
        self.enqueue(&key);
        async move {
            loop {
                self.dispatch_queued().await;
                if let Some(result) = self.cached(&key) {
                    return result;
                }
                // The batch that drained this key was dropped mid-flight.
                self.enqueue(&key);
            }
        }
    }

    /// Load several keys as one batch; results follow `keys` order.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Batch` if the batch fetch fails.
    pub async fn load_many(
        &self,
        keys: &[String],
    ) -> Result<Vec<Vec<C>>, LoadError<SourceError<S, C>>> {
        let pending: Vec<_> = keys.iter().map(|key| self.load(key)).collect();
        let mut lists = Vec::with_capacity(pending.len());
        for load in pending {
            lists.push(load.await?);
        }
        Ok(lists)
    }

    /// Number of bulk fetches this loader has issued.
    #[must_use]
    pub fn batches_dispatched(&self) -> usize {
        self.batches.load(Ordering::Relaxed)
    }

    fn lock_state(&self) -> MutexGuard<'_, LoaderState<C, SourceError<S, C>>> {
        lock(&self.state)
    }

    fn enqueue(&self, key: &str) {
        let mut state = self.lock_state();
        if !state.slots.contains_key(key) {
            state.slots.insert(key.to_string(), Slot::Queued);
            state.queued.push(key.to_string());
        }
    }

    fn cached(&self, key: &str) -> Option<Result<Vec<C>, LoadError<SourceError<S, C>>>> {
        match self.lock_state().slots.get(key)? {
            Slot::Queued | Slot::InFlight => None,
            Slot::Ready(children) => Some(Ok(children.clone())),
            Slot::Failed(source) => Some(Err(LoadError::Batch {
                association: self.association.kind(),
                source: Arc::clone(source),
            })),
        }
    }

    async fn dispatch_queued(&self) {
        let _dispatching = self.dispatch.lock().await;

        let keys = {
            let mut state = self.lock_state();
            let keys = std::mem::take(&mut state.queued);
            for key in &keys {
                state.slots.insert(key.clone(), Slot::InFlight);
            }
            keys
        };
        if keys.is_empty() {
            return;
        }
        let mut batch = InFlightBatch {
            state: &self.state,
            keys,
        };

        self.batches.fetch_add(1, Ordering::Relaxed);
        debug!(
            association = %self.association.kind(),
            keys = batch.keys.len(),
            "Dispatching batch load"
        );
        let outcome = self.resolver.resolve(self.association, &batch.keys).await;

        let keys = batch.settle();
        let mut state = self.lock_state();
        match outcome {
            Ok(lists) => {
                for (key, children) in keys.into_iter().zip(lists) {
                    state.slots.insert(key, Slot::Ready(children));
                }
            }
            Err(error) => {
                warn!(
                    association = %self.association.kind(),
                    keys = keys.len(),
                    error = %error,
                    "Batch load failed"
                );
                let shared = Arc::new(error);
                for key in keys {
                    state.slots.insert(key, Slot::Failed(Arc::clone(&shared)));
                }
            }
        }
    }
}

impl<S, C> fmt::Debug for KeyedBatchLoader<'_, S, C>
where
    S: AssociationSource<C>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedBatchLoader")
            .field("association", &self.association)
            .field("batches", &self.batches.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::test_support::{MemorySource, ammo, mode};
    use armory_core::entities::{Ammo, WeaponMode};
    use pretty_assertions::assert_eq;

    fn ammo_source() -> MemorySource<Ammo> {
        MemorySource::new()
            .with_row("wmd-1", ammo("amm-2", "N"))
            .with_row("wmd-1", ammo("amm-1", "AP"))
            .with_row("wmd-2", ammo("amm-3", "DA"))
    }

    fn names(list: &[Ammo]) -> Vec<&str> {
        list.iter().map(|a| a.name.as_str()).collect()
    }

    #[tokio::test]
    async fn same_key_loads_share_one_fetch() {
        let source = ammo_source();
        let loader = KeyedBatchLoader::new(&source, Association::WEAPON_MODE_AMMO);

        let (a, b, c) = tokio::join!(
            loader.load("wmd-1"),
            loader.load("wmd-1"),
            loader.load("wmd-1")
        );

        assert_eq!(names(&a.unwrap()), vec!["AP", "N"]);
        assert_eq!(b.unwrap(), c.unwrap());
        assert_eq!(source.fetches(), 1);
        assert_eq!(source.last_owner_ids(), vec!["wmd-1".to_string()]);
    }

    #[tokio::test]
    async fn load_arriving_mid_fetch_joins_running_batch() {
        let source = ammo_source().with_delay(Duration::from_millis(50));
        let loader = KeyedBatchLoader::new(&source, Association::WEAPON_MODE_AMMO);

        let (first, second) = tokio::join!(loader.load("wmd-1"), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            loader.load("wmd-1").await
        });

        assert_eq!(names(&first.unwrap()), vec!["AP", "N"]);
        assert_eq!(names(&second.unwrap()), vec!["AP", "N"]);
        assert_eq!(source.fetches(), 1);
        assert_eq!(loader.batches_dispatched(), 1);
    }

    #[tokio::test]
    async fn dropped_fetch_is_dispatched_again() {
        let source = ammo_source().with_delay(Duration::from_millis(50));
        let loader = KeyedBatchLoader::new(&source, Association::WEAPON_MODE_AMMO);

        let abandoned =
            tokio::time::timeout(Duration::from_millis(5), loader.load("wmd-1")).await;
        assert!(abandoned.is_err());

        let list = loader.load("wmd-1").await.unwrap();
        assert_eq!(names(&list), vec!["AP", "N"]);
        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test]
    async fn pending_load_does_not_borrow_key() {
        let source = ammo_source();
        let loader = KeyedBatchLoader::new(&source, Association::WEAPON_MODE_AMMO);

        let pending = {
            let key = String::from("wmd-2");
            loader.load(&key)
        };

        assert_eq!(names(&pending.await.unwrap()), vec!["DA"]);
    }

    #[tokio::test]
    async fn distinct_keys_queued_together_are_one_batch() {
        let source = ammo_source();
        let loader = KeyedBatchLoader::new(&source, Association::WEAPON_MODE_AMMO);

        let first = loader.load("wmd-1");
        let second = loader.load("wmd-2");
        let third = loader.load("wmd-9");

        assert_eq!(names(&third.await.unwrap()), Vec::<&str>::new());
        assert_eq!(names(&first.await.unwrap()), vec!["AP", "N"]);
        assert_eq!(names(&second.await.unwrap()), vec!["DA"]);
        assert_eq!(source.fetches(), 1);
        assert_eq!(loader.batches_dispatched(), 1);
    }

    #[tokio::test]
    async fn cached_keys_are_not_refetched() {
        let source = ammo_source();
        let loader = KeyedBatchLoader::new(&source, Association::WEAPON_MODE_AMMO);

        loader.load("wmd-1").await.unwrap();
        loader.load("wmd-1").await.unwrap();
        assert_eq!(source.fetches(), 1);

        loader.load("wmd-2").await.unwrap();
        assert_eq!(source.fetches(), 2);
        assert_eq!(source.last_owner_ids(), vec!["wmd-2".to_string()]);
    }

    #[tokio::test]
    async fn load_many_preserves_key_order() {
        let source = MemorySource::<WeaponMode>::new()
            .with_row("wpn-1", mode("wmd-2", "wpn-1", "Single"))
            .with_row("wpn-1", mode("wmd-1", "wpn-1", "Burst"))
            .with_row("wpn-2", mode("wmd-3", "wpn-2", "CCW"));
        let loader = KeyedBatchLoader::new(&source, Association::WEAPON_MODES);
        let keys: Vec<String> = ["wpn-2", "wpn-1", "wpn-2"]
            .iter()
            .map(ToString::to_string)
            .collect();

        let lists = loader.load_many(&keys).await.unwrap();

        let mode_names: Vec<Vec<&str>> = lists
            .iter()
            .map(|list| list.iter().map(|m| m.name.as_str()).collect())
            .collect();
        assert_eq!(
            mode_names,
            vec![vec!["CCW"], vec!["Burst", "Single"], vec!["CCW"]]
        );
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test]
    async fn failed_batch_fails_every_load() {
        let source = MemorySource::<Ammo>::new().failing();
        let loader = KeyedBatchLoader::new(&source, Association::COMBINED_AMMO);

        let (a, b) = tokio::join!(loader.load("amm-1"), loader.load("amm-2"));

        for result in [a, b] {
            let err = result.unwrap_err();
            assert!(matches!(
                err,
                LoadError::Batch {
                    association: AssociationKind::CombinedAmmo,
                    ..
                }
            ));
        }
        assert_eq!(source.fetches(), 1);

        // A failed key stays failed for the rest of the request.
        assert!(loader.load("amm-1").await.is_err());
        assert_eq!(source.fetches(), 1);
    }
}
