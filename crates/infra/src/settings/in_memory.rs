use std::sync::RwLock;

use async_trait::async_trait;

use retailpos_accounting::PostingSettings;

use super::SettingsStore;
use crate::error::StoreError;

/// In-memory settings record for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    inner: RwLock<Option<PostingSettings>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: PostingSettings) -> Self {
        Self {
            inner: RwLock::new(Some(settings)),
        }
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn load(&self) -> Result<PostingSettings, StoreError> {
        let mut slot = self.inner.write().map_err(|_| StoreError::poisoned())?;
        Ok(slot.get_or_insert_with(PostingSettings::default).clone())
    }

    async fn save(&self, settings: PostingSettings) -> Result<PostingSettings, StoreError> {
        let mut slot = self.inner.write().map_err(|_| StoreError::poisoned())?;
        *slot = Some(settings.clone());
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_load_creates_defaults() {
        let store = InMemorySettingsStore::new();
        assert_eq!(store.load().await.unwrap(), PostingSettings::default());
    }

    #[tokio::test]
    async fn saved_settings_are_returned_by_load() {
        let store = InMemorySettingsStore::new();
        let mut s = PostingSettings::default();
        s.enabled = true;
        s.company_name = "Corner Shop".to_string();
        store.save(s.clone()).await.unwrap();
        assert_eq!(store.load().await.unwrap(), s);
    }
}
