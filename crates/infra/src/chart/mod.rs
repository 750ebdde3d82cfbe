//! Read-only access to the local chart of accounts.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use retailpos_accounting::{AccountGroup, LedgerAccount};
use retailpos_core::{AccountGroupId, LedgerAccountId};

use crate::error::StoreError;

mod postgres;

pub use postgres::PostgresChartDirectory;

#[async_trait]
pub trait ChartDirectory: Send + Sync {
    async fn ledger(&self, id: LedgerAccountId) -> Result<Option<LedgerAccount>, StoreError>;

    async fn group(&self, id: AccountGroupId) -> Result<Option<AccountGroup>, StoreError>;
}

#[async_trait]
impl<C> ChartDirectory for Arc<C>
where
    C: ChartDirectory + ?Sized,
{
    async fn ledger(&self, id: LedgerAccountId) -> Result<Option<LedgerAccount>, StoreError> {
        (**self).ledger(id).await
    }

    async fn group(&self, id: AccountGroupId) -> Result<Option<AccountGroup>, StoreError> {
        (**self).group(id).await
    }
}

/// In-memory chart for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryChartDirectory {
    ledgers: RwLock<HashMap<LedgerAccountId, LedgerAccount>>,
    groups: RwLock<HashMap<AccountGroupId, AccountGroup>>,
}

impl InMemoryChartDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_ledger(&self, ledger: LedgerAccount) {
        if let Ok(mut map) = self.ledgers.write() {
            map.insert(ledger.id, ledger);
        }
    }

    pub fn insert_group(&self, group: AccountGroup) {
        if let Ok(mut map) = self.groups.write() {
            map.insert(group.id, group);
        }
    }
}

#[async_trait]
impl ChartDirectory for InMemoryChartDirectory {
    async fn ledger(&self, id: LedgerAccountId) -> Result<Option<LedgerAccount>, StoreError> {
        let map = self.ledgers.read().map_err(|_| StoreError::poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn group(&self, id: AccountGroupId) -> Result<Option<AccountGroup>, StoreError> {
        let map = self.groups.read().map_err(|_| StoreError::poisoned())?;
        Ok(map.get(&id).cloned())
    }
}
