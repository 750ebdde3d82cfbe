use tracing::instrument;

use retailpos_accounting::{default_parent_group, DocumentKind};
use retailpos_core::LedgerAccountId;

use super::{PostingError, PostingService};
use crate::chart::ChartDirectory;
use crate::settings::SettingsStore;
use crate::sync_log::{logged_attempt, NewSyncLogEntry, SyncLogStore};
use crate::tally::xml;

impl<S, L, C> PostingService<S, L, C>
where
    S: SettingsStore,
    L: SyncLogStore,
    C: ChartDirectory,
{
    /// Push one ledger account as a create-ledger master.
    ///
    /// An unknown ledger fails before any sync-log row is written. A missing
    /// group falls back to the default parent group.
    #[instrument(skip_all, fields(ledger_id = %ledger_id), err(Display))]
    pub async fn push_ledger(&self, ledger_id: LedgerAccountId) -> Result<String, PostingError> {
        let ledger = self
            .chart
            .ledger(ledger_id)
            .await?
            .ok_or(PostingError::LedgerNotFound(ledger_id))?;

        let group = match ledger.group_id {
            Some(group_id) => self.chart.group(group_id).await?,
            None => None,
        };
        let parent = default_parent_group(group.as_ref());

        let message = xml::build_ledger_master(
            &ledger.name,
            parent,
            ledger.signed_opening_balance(),
            ledger.cost_centres,
        );

        let settings = self.settings.load().await?;
        let entry = NewSyncLogEntry::master(
            DocumentKind::Ledger.label(),
            ledger.id,
            &ledger.name,
            &message,
        );
        let send = async {
            self.client
                .push_masters(&settings, &message)
                .await
                .map_err(PostingError::from)
        };
        logged_attempt(&self.log, entry, send).await
    }
}
