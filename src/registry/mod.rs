//! Registry layer - manager contracts and polymorphic reconstruction.
//!
//! This module provides:
//! - [`MetadataManager`] - the store/retrieve adapter contract
//! - [`ManagerCollection`] - ordered aggregation of keyed managers
//! - [`StorableAsMetadata`] / [`InstanceGetter`] - discriminator-keyed
//!   factories for rebuilding concrete types from proxied metadata

mod instances;
mod manager;

pub use instances::{InstanceGetter, StorableAsMetadata};
pub use manager::{shared, ManagerCollection, MetadataManager, SharedManager};
