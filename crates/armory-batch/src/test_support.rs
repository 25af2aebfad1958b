//! In-memory association source for resolver and loader tests.

use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use armory_core::entities::{Ammo, WeaponMode};
use chrono::Utc;
use thiserror::Error;

use crate::association::{Association, AssociationSource, OwnedChild};

#[derive(Debug, Error)]
#[error("memory source unavailable")]
pub struct MemorySourceError;

/// Serves fixed `(owner, child)` rows and counts bulk fetches.
pub struct MemorySource<C> {
    rows: Vec<(String, C)>,
    fail: bool,
    delay: Option<Duration>,
    fetches: AtomicUsize,
    last_owner_ids: Mutex<Vec<String>>,
}

impl<C> MemorySource<C> {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            fail: false,
            delay: None,
            fetches: AtomicUsize::new(0),
            last_owner_ids: Mutex::new(Vec::new()),
        }
    }

    pub fn with_row(mut self, owner_id: &str, child: C) -> Self {
        self.rows.push((owner_id.to_string(), child));
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Make every fetch take `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn last_owner_ids(&self) -> Vec<String> {
        self.last_owner_ids.lock().unwrap().clone()
    }
}

impl<C> AssociationSource<C> for MemorySource<C>
where
    C: Clone + Send + Sync,
{
    type Error = MemorySourceError;

    fn find_by_owner_ids(
        &self,
        _association: Association<C>,
        owner_ids: &[String],
    ) -> impl Future<Output = Result<Vec<OwnedChild<C>>, Self::Error>> + Send {
        async move {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            *self.last_owner_ids.lock().unwrap() = owner_ids.to_vec();
            match self.delay {
                Some(delay) => tokio::time::sleep(delay).await,
                None => tokio::task::yield_now().await,
            }
            if self.fail {
                return Err(MemorySourceError);
            }
            Ok(self
                .rows
                .iter()
                .filter(|(owner, _)| owner_ids.contains(owner))
                .map(|(owner, child)| OwnedChild {
                    owner_id: owner.clone(),
                    child: child.clone(),
                })
                .collect())
        }
    }
}

pub fn ammo(id: &str, name: &str) -> Ammo {
    let now = Utc::now();
    Ammo {
        id: id.into(),
        name: name.into(),
        created_at: now,
        updated_at: now,
    }
}

pub fn mode(id: &str, weapon_id: &str, name: &str) -> WeaponMode {
    let now = Utc::now();
    WeaponMode {
        id: id.into(),
        weapon_id: weapon_id.into(),
        name: name.into(),
        damage: None,
        burst: None,
        saving_attribute: None,
        created_at: now,
        updated_at: now,
    }
}
