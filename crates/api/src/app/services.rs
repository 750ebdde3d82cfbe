use std::sync::Arc;

use anyhow::Context;

use retailpos_accounting::PostingSettings;
use retailpos_core::{LedgerAccountId, SyncLogId};
use retailpos_infra::chart::{InMemoryChartDirectory, PostgresChartDirectory};
use retailpos_infra::config::BridgeConfig;
use retailpos_infra::db;
use retailpos_infra::settings::{InMemorySettingsStore, PostgresSettingsStore};
use retailpos_infra::sync_log::{
    InMemorySyncLogStore, PostgresSyncLogStore, SyncLogEntry, SyncStatus,
};
use retailpos_infra::tally::TallyClient;
use retailpos_infra::{PostingError, PostingService};

pub type InMemoryPosting = PostingService<
    Arc<InMemorySettingsStore>,
    Arc<InMemorySyncLogStore>,
    Arc<InMemoryChartDirectory>,
>;

pub type PersistentPosting =
    PostingService<PostgresSettingsStore, PostgresSyncLogStore, PostgresChartDirectory>;

pub enum AppServices {
    InMemory {
        posting: InMemoryPosting,
        chart: Arc<InMemoryChartDirectory>,
    },
    Persistent {
        posting: PersistentPosting,
    },
}

macro_rules! with_posting {
    ($services:expr, $posting:ident => $call:expr) => {
        match $services {
            AppServices::InMemory { posting: $posting, .. } => $call,
            AppServices::Persistent { posting: $posting } => $call,
        }
    };
}

impl AppServices {
    /// Postgres-backed when `DATABASE_URL` is set, in-memory otherwise.
    pub async fn from_config(config: &BridgeConfig) -> anyhow::Result<Self> {
        let client = TallyClient::new(config.connect_timeout, config.read_timeout)
            .context("failed to build accounting client")?;

        let Some(url) = config.database_url.as_deref() else {
            return Ok(Self::in_memory(client));
        };

        let pool = db::connect(url).await.context("failed to open database")?;
        tracing::info!("using postgres stores");
        Ok(Self::Persistent {
            posting: PostingService::new(
                PostgresSettingsStore::new(pool.clone()),
                PostgresSyncLogStore::new(pool.clone()),
                PostgresChartDirectory::new(pool),
                client,
            ),
        })
    }

    pub fn in_memory(client: TallyClient) -> Self {
        let chart = Arc::new(InMemoryChartDirectory::new());
        Self::InMemory {
            posting: PostingService::new(
                Arc::new(InMemorySettingsStore::new()),
                Arc::new(InMemorySyncLogStore::new()),
                chart.clone(),
                client,
            ),
            chart,
        }
    }

    /// Chart directory handle for seeding ledgers; only the in-memory wiring has one.
    pub fn in_memory_chart(&self) -> Option<&Arc<InMemoryChartDirectory>> {
        match self {
            Self::InMemory { chart, .. } => Some(chart),
            Self::Persistent { .. } => None,
        }
    }

    pub async fn settings(&self) -> Result<PostingSettings, PostingError> {
        with_posting!(self, p => p.settings().await)
    }

    pub async fn save_settings(
        &self,
        settings: PostingSettings,
    ) -> Result<PostingSettings, PostingError> {
        with_posting!(self, p => p.save_settings(settings).await)
    }

    pub async fn list_companies(&self) -> Result<Vec<String>, PostingError> {
        with_posting!(self, p => p.list_companies().await)
    }

    pub async fn push_ledger(&self, id: LedgerAccountId) -> Result<String, PostingError> {
        with_posting!(self, p => p.push_ledger(id).await)
    }

    pub async fn send_raw_envelope(&self, envelope: &str) -> Result<String, PostingError> {
        with_posting!(self, p => p.send_raw_envelope(envelope).await)
    }

    pub async fn sync_history(
        &self,
        doc_type: &str,
        doc_key: &str,
    ) -> Result<Vec<SyncLogEntry>, PostingError> {
        with_posting!(self, p => p.sync_history(doc_type, doc_key).await)
    }

    pub async fn recent_sync_entries(
        &self,
        status: Option<SyncStatus>,
        limit: usize,
    ) -> Result<Vec<SyncLogEntry>, PostingError> {
        with_posting!(self, p => p.recent_sync_entries(status, limit).await)
    }

    pub async fn sync_entry(&self, id: SyncLogId) -> Result<Option<SyncLogEntry>, PostingError> {
        with_posting!(self, p => p.sync_entry(id).await)
    }
}
