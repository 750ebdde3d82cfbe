//! Posting settings storage.
//!
//! There is exactly one active settings record. Reading it when none exists
//! creates it with defaults, so callers always get a value.

use std::sync::Arc;

use async_trait::async_trait;

use retailpos_accounting::PostingSettings;

use crate::error::StoreError;

mod in_memory;
mod postgres;

pub use in_memory::InMemorySettingsStore;
pub use postgres::PostgresSettingsStore;

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Active settings, created with defaults on first access.
    async fn load(&self) -> Result<PostingSettings, StoreError>;

    /// Replace the active settings.
    async fn save(&self, settings: PostingSettings) -> Result<PostingSettings, StoreError>;
}

#[async_trait]
impl<S> SettingsStore for Arc<S>
where
    S: SettingsStore + ?Sized,
{
    async fn load(&self) -> Result<PostingSettings, StoreError> {
        (**self).load().await
    }

    async fn save(&self, settings: PostingSettings) -> Result<PostingSettings, StoreError> {
        (**self).save(settings).await
    }
}
