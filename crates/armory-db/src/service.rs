//! Service layer orchestrating catalogue mutations with auditing.
//!
//! `ArmoryService` wraps `ArmoryDb` and the listing limits from
//! `GeneralConfig`. All repo methods are implemented as `impl ArmoryService`
//! blocks under [`crate::repos`].

use armory_batch::RequestLoaders;
use armory_config::{ArmoryConfig, GeneralConfig};
use armory_core::pagination::PageRequest;

use crate::ArmoryDb;
use crate::error::DatabaseError;

/// Orchestrates database mutations with the audit log.
///
/// Every mutation method follows this protocol:
/// 1. Snapshot the entity graph (updates and deletes)
/// 2. Execute SQL
/// 3. Snapshot again and diff (updates)
/// 4. Append the audit record; a failure here is logged, not returned
pub struct ArmoryService {
    db: ArmoryDb,
    general: GeneralConfig,
}

impl ArmoryService {
    /// Open the database named by `config.database.path`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn from_config(config: &ArmoryConfig) -> Result<Self, DatabaseError> {
        let db = ArmoryDb::open_local(&config.database.path).await?;
        Ok(Self::from_db(db, config.general.clone()))
    }

    /// Create from an existing `ArmoryDb`.
    #[must_use]
    pub const fn from_db(db: ArmoryDb, general: GeneralConfig) -> Self {
        Self { db, general }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &ArmoryDb {
        &self.db
    }

    /// Listing limits in effect.
    #[must_use]
    pub const fn general(&self) -> &GeneralConfig {
        &self.general
    }

    /// Build a page request with the configured default and maximum size.
    #[must_use]
    pub fn page(&self, page: u32, limit: Option<u32>) -> PageRequest {
        self.general.page(page, limit)
    }

    /// Cap a caller-supplied page request at the configured maximum.
    #[must_use]
    pub fn clamp_page(&self, page: PageRequest) -> PageRequest {
        page.clamped(self.general.max_page_size)
    }

    /// A fresh loader set for one inbound request.
    ///
    /// Drop it when the request completes; its cache is not invalidated by
    /// later mutations.
    #[must_use]
    pub fn request_loaders(&self) -> RequestLoaders<'_, ArmoryDb> {
        RequestLoaders::new(&self.db)
    }
}
