//! Backpack/inventory collaborator seam.
//!
//! The authoritative item store is an external service reached over
//! asynchronous calls that may fail. Every engine continuation that
//! awaits one of these calls catches the failure, reports it, and forces
//! the in-flight transfer record into cleanup so nothing stays stuck.

use anyhow::Result;
use async_trait::async_trait;

use crate::core::item::ItemProperties;

/// Asynchronous access to the local user's item store.
#[async_trait]
pub trait Inventory: Send + Sync {
    /// Whether the identified item currently lives in the local backpack.
    async fn contains(&self, id: &str) -> Result<bool>;

    /// Latest authoritative property snapshot for a local item.
    async fn properties(&self, id: &str) -> Result<ItemProperties>;

    /// Store a new item under the given identifier.
    async fn add(&self, id: &str, properties: ItemProperties) -> Result<()>;

    /// Remove an item from the local backpack.
    async fn delete(&self, id: &str) -> Result<()>;
}
