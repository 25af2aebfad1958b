//! # armory-batch
//!
//! Batched relation resolution for Armory.
//!
//! Resolving a list field (a weapon's modes, a mode's ammo) once per parent
//! would issue one query per parent. This crate collapses those into one bulk
//! fetch per association:
//! - [`association`] describes which relation to traverse and how children
//!   are ordered, and defines the [`AssociationSource`] storage port
//! - [`resolver`] turns parent ids into per-parent child lists with one fetch
//! - [`loader`] coalesces single-key loads issued within one request and
//!   caches them for the rest of that request
//! - [`request`] bundles one loader per association for a single request

pub mod association;
pub mod loader;
pub mod request;
pub mod resolver;

#[cfg(test)]
mod test_support;

pub use association::{Association, AssociationKind, AssociationSource, ChildOrder, OwnedChild};
pub use loader::{KeyedBatchLoader, LoadError};
pub use request::{CatalogSource, RequestLoaders};
pub use resolver::BatchAssociationResolver;
