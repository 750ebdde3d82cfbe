use tracing::instrument;

use retailpos_accounting::voucher::Posting;
use retailpos_accounting::{
    ExpensePosting, PostingSettings, PurchasePosting, ReceiptPosting, SalesPosting,
    VendorPaymentPosting,
};
use retailpos_core::SyncLogId;

use super::PostingError;
use crate::chart::ChartDirectory;
use crate::settings::SettingsStore;
use crate::sync_log::{logged_attempt, NewSyncLogEntry, SyncLogEntry, SyncLogStore, SyncStatus};
use crate::tally::{xml, TallyClient};

/// Accounting bridge entry points.
///
/// Settings are fetched from the store on every call, so a saved change is
/// picked up by the next posting without a restart.
pub struct PostingService<S, L, C> {
    pub(super) settings: S,
    pub(super) log: L,
    pub(super) chart: C,
    pub(super) client: TallyClient,
}

impl<S, L, C> PostingService<S, L, C>
where
    S: SettingsStore,
    L: SyncLogStore,
    C: ChartDirectory,
{
    pub fn new(settings: S, log: L, chart: C, client: TallyClient) -> Self {
        Self {
            settings,
            log,
            chart,
            client,
        }
    }

    pub async fn settings(&self) -> Result<PostingSettings, PostingError> {
        Ok(self.settings.load().await?)
    }

    /// Validate, normalise and store new settings.
    pub async fn save_settings(
        &self,
        settings: PostingSettings,
    ) -> Result<PostingSettings, PostingError> {
        let settings = settings.normalized()?;
        Ok(self.settings.save(settings).await?)
    }

    pub async fn post_sales(&self, sale: &SalesPosting) -> Result<String, PostingError> {
        self.post_voucher(sale).await
    }

    pub async fn post_purchase(&self, purchase: &PurchasePosting) -> Result<String, PostingError> {
        self.post_voucher(purchase).await
    }

    pub async fn post_receipt(&self, receipt: &ReceiptPosting) -> Result<String, PostingError> {
        self.post_voucher(receipt).await
    }

    pub async fn post_payment_to_vendor(
        &self,
        payment: &VendorPaymentPosting,
    ) -> Result<String, PostingError> {
        self.post_voucher(payment).await
    }

    pub async fn post_expense_paid(&self, expense: &ExpensePosting) -> Result<String, PostingError> {
        self.post_voucher(expense).await
    }

    #[instrument(
        skip_all,
        fields(doc_type = posting.kind().label(), voucher_no = posting.voucher_no()),
        err(Display)
    )]
    async fn post_voucher<P>(&self, posting: &P) -> Result<String, PostingError>
    where
        P: Posting + Sync,
    {
        let settings = self.settings.load().await?;
        let voucher = posting.assemble(&settings.ledgers);
        let message = xml::build_voucher(&voucher);

        let entry = NewSyncLogEntry::voucher(posting.kind().label(), posting.voucher_no(), &message);
        let send = async {
            self.client
                .push_vouchers(&settings, &message)
                .await
                .map_err(PostingError::from)
        };
        logged_attempt(&self.log, entry, send).await
    }

    /// Company names loaded in the remote engine.
    pub async fn list_companies(&self) -> Result<Vec<String>, PostingError> {
        let settings = self.settings.load().await?;
        Ok(self.client.list_companies(&settings).await?)
    }

    /// Forward an operator-supplied envelope unchanged. Not sync-logged.
    pub async fn send_raw_envelope(&self, envelope: &str) -> Result<String, PostingError> {
        let settings = self.settings.load().await?;
        Ok(self.client.push_raw_envelope(&settings, envelope).await?)
    }

    /// Every attempt for one document, newest first.
    pub async fn sync_history(
        &self,
        doc_type: &str,
        doc_key: &str,
    ) -> Result<Vec<SyncLogEntry>, PostingError> {
        Ok(self.log.list_for_document(doc_type, doc_key).await?)
    }

    pub async fn recent_sync_entries(
        &self,
        status: Option<SyncStatus>,
        limit: usize,
    ) -> Result<Vec<SyncLogEntry>, PostingError> {
        Ok(self.log.list_recent(status, limit).await?)
    }

    pub async fn sync_entry(&self, id: SyncLogId) -> Result<Option<SyncLogEntry>, PostingError> {
        Ok(self.log.get(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::chart::InMemoryChartDirectory;
    use crate::settings::InMemorySettingsStore;
    use crate::sync_log::InMemorySyncLogStore;
    use crate::tally::TallyError;

    type TestService = PostingService<
        Arc<InMemorySettingsStore>,
        Arc<InMemorySyncLogStore>,
        Arc<InMemoryChartDirectory>,
    >;

    fn service(endpoint: &str, enabled: bool) -> (TestService, Arc<InMemorySyncLogStore>) {
        let settings = PostingSettings {
            enabled,
            endpoint_url: endpoint.to_string(),
            company_name: "Corner Shop".to_string(),
            ..PostingSettings::default()
        };
        let log = Arc::new(InMemorySyncLogStore::new());
        let client = TallyClient::new(Duration::from_secs(1), Duration::from_secs(5)).unwrap();
        let svc = PostingService::new(
            Arc::new(InMemorySettingsStore::with_settings(settings)),
            log.clone(),
            Arc::new(InMemoryChartDirectory::new()),
            client,
        );
        (svc, log)
    }

    fn sale() -> SalesPosting {
        SalesPosting {
            voucher_no: "S-100".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            party_ledger: "Acme Traders".to_string(),
            is_cash_sale: false,
            subtotal: dec!(100),
            vat: dec!(15),
            rounding_delta: dec!(0),
        }
    }

    #[tokio::test]
    async fn successful_post_logs_one_success_row() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("<VOUCHERNUMBER>S-100</VOUCHERNUMBER>"))
            .and(body_string_contains("<PARTYLEDGERNAME>Acme Traders</PARTYLEDGERNAME>"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<CREATED>1</CREATED>"))
            .expect(1)
            .mount(&server)
            .await;

        let (svc, log) = service(&server.uri(), true);
        let response = svc.post_sales(&sale()).await.unwrap();
        assert_eq!(response, "<CREATED>1</CREATED>");

        let rows = svc.sync_history("SALE", "S-100").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!((rows[0].status, rows[0].attempts), (SyncStatus::Success, 1));
        assert_eq!(rows[0].response_text.as_deref(), Some("<CREATED>1</CREATED>"));
        assert!(rows[0].request_xml.starts_with("<TALLYMESSAGE><VOUCHER VCHTYPE=\"Sales\""));
        assert_eq!(log.all().len(), 1);
    }

    #[tokio::test]
    async fn transport_failure_is_logged_and_propagated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let (svc, log) = service(&server.uri(), true);
        let err = svc.post_sales(&sale()).await.unwrap_err();
        assert!(matches!(err, PostingError::Tally(TallyError::Transport { .. })));

        let rows = log.all();
        assert_eq!(rows.len(), 1);
        assert_eq!((rows[0].status, rows[0].attempts), (SyncStatus::Failed, 1));
        assert_eq!(rows[0].error_text.as_deref(), Some(err.to_string().as_str()));
    }

    #[tokio::test]
    async fn disabled_integration_still_leaves_a_failed_row() {
        let (svc, log) = service("http://127.0.0.1:9", false);
        let err = svc.post_sales(&sale()).await.unwrap_err();
        assert!(matches!(err, PostingError::Tally(TallyError::Configuration(_))));

        let rows = log.all();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, SyncStatus::Failed);
        assert!(rows[0].error_text.as_deref().unwrap().contains("disabled"));
    }

    #[tokio::test]
    async fn each_call_appends_a_new_row() {
        let (svc, _log) = service("http://127.0.0.1:9", false);
        let _ = svc.post_sales(&sale()).await;
        let _ = svc.post_sales(&sale()).await;

        let rows = svc.sync_history("SALE", "S-100").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.attempts == 1));
        assert!(rows[0].created_at >= rows[1].created_at);
    }

    #[tokio::test]
    async fn expenses_are_logged_under_their_own_doc_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("VCHTYPE=\"Payment\""))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let (svc, _log) = service(&server.uri(), true);
        let expense = ExpensePosting {
            voucher_no: "EXP-9".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
            expense_ledger: "Electricity".to_string(),
            from_bank: true,
            amount: dec!(80),
            narration: Some("June bill".to_string()),
        };
        svc.post_expense_paid(&expense).await.unwrap();

        assert_eq!(svc.sync_history("EXPENSE", "EXP-9").await.unwrap().len(), 1);
        assert!(svc.sync_history("PAYMENT", "EXP-9").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn saving_enabled_settings_without_endpoint_is_rejected() {
        let (svc, _log) = service("http://127.0.0.1:9", false);
        let bad = PostingSettings {
            enabled: true,
            endpoint_url: String::new(),
            ..PostingSettings::default()
        };
        assert!(matches!(svc.save_settings(bad).await, Err(PostingError::Domain(_))));

        let good = PostingSettings {
            enabled: true,
            endpoint_url: "http://tally:9000//".to_string(),
            ..PostingSettings::default()
        };
        let saved = svc.save_settings(good).await.unwrap();
        assert_eq!(saved.endpoint_url, "http://tally:9000");
        assert_eq!(svc.settings().await.unwrap(), saved);
    }
}
