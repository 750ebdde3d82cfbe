//! Postgres-backed settings record (`posting_settings`, singleton row `id = 1`).

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use retailpos_accounting::{AutoPostFlags, LedgerNames, PostingSettings};

use super::SettingsStore;
use crate::error::{map_sqlx_error, StoreError};

const SETTINGS_ROW_ID: i16 = 1;

#[derive(Debug, Clone)]
pub struct PostgresSettingsStore {
    pool: PgPool,
}

impl PostgresSettingsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn upsert(&self, s: &PostingSettings, overwrite: bool) -> Result<(), StoreError> {
        let conflict = if overwrite {
            r#"
            ON CONFLICT (id) DO UPDATE SET
                enabled = EXCLUDED.enabled,
                endpoint_url = EXCLUDED.endpoint_url,
                company_name = EXCLUDED.company_name,
                cash_ledger = EXCLUDED.cash_ledger,
                bank_ledger = EXCLUDED.bank_ledger,
                sales_ledger = EXCLUDED.sales_ledger,
                purchase_ledger = EXCLUDED.purchase_ledger,
                vat_output_ledger = EXCLUDED.vat_output_ledger,
                vat_input_ledger = EXCLUDED.vat_input_ledger,
                rounding_ledger = EXCLUDED.rounding_ledger,
                auto_post_sales = EXCLUDED.auto_post_sales,
                auto_post_purchases = EXCLUDED.auto_post_purchases,
                auto_post_receipts = EXCLUDED.auto_post_receipts,
                auto_post_vendor_payments = EXCLUDED.auto_post_vendor_payments,
                auto_post_expenses = EXCLUDED.auto_post_expenses,
                updated_at = NOW()
            "#
        } else {
            "ON CONFLICT (id) DO NOTHING"
        };

        let sql = format!(
            r#"
            INSERT INTO posting_settings (
                id, enabled, endpoint_url, company_name,
                cash_ledger, bank_ledger, sales_ledger, purchase_ledger,
                vat_output_ledger, vat_input_ledger, rounding_ledger,
                auto_post_sales, auto_post_purchases, auto_post_receipts,
                auto_post_vendor_payments, auto_post_expenses
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            {conflict}
            "#
        );

        sqlx::query(&sql)
            .bind(SETTINGS_ROW_ID)
            .bind(s.enabled)
            .bind(&s.endpoint_url)
            .bind(&s.company_name)
            .bind(&s.ledgers.cash)
            .bind(&s.ledgers.bank)
            .bind(&s.ledgers.sales)
            .bind(&s.ledgers.purchase)
            .bind(&s.ledgers.vat_output)
            .bind(&s.ledgers.vat_input)
            .bind(&s.ledgers.rounding)
            .bind(s.auto_post.sales)
            .bind(s.auto_post.purchases)
            .bind(s.auto_post.receipts)
            .bind(s.auto_post.vendor_payments)
            .bind(s.auto_post.expenses)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("upsert_posting_settings", e))?;
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for PostgresSettingsStore {
    #[instrument(skip(self), err)]
    async fn load(&self) -> Result<PostingSettings, StoreError> {
        self.upsert(&PostingSettings::default(), false).await?;

        let row = sqlx::query(
            r#"
            SELECT
                enabled, endpoint_url, company_name,
                cash_ledger, bank_ledger, sales_ledger, purchase_ledger,
                vat_output_ledger, vat_input_ledger, rounding_ledger,
                auto_post_sales, auto_post_purchases, auto_post_receipts,
                auto_post_vendor_payments, auto_post_expenses
            FROM posting_settings
            WHERE id = $1
            "#,
        )
        .bind(SETTINGS_ROW_ID)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_posting_settings", e))?;

        let get_str = |col: &str| -> Result<String, StoreError> {
            row.try_get::<String, _>(col)
                .map_err(|e| map_sqlx_error("load_posting_settings", e))
        };
        let get_bool = |col: &str| -> Result<bool, StoreError> {
            row.try_get::<bool, _>(col)
                .map_err(|e| map_sqlx_error("load_posting_settings", e))
        };

        Ok(PostingSettings {
            enabled: get_bool("enabled")?,
            endpoint_url: get_str("endpoint_url")?,
            company_name: get_str("company_name")?,
            ledgers: LedgerNames {
                cash: get_str("cash_ledger")?,
                bank: get_str("bank_ledger")?,
                sales: get_str("sales_ledger")?,
                purchase: get_str("purchase_ledger")?,
                vat_output: get_str("vat_output_ledger")?,
                vat_input: get_str("vat_input_ledger")?,
                rounding: get_str("rounding_ledger")?,
            },
            auto_post: AutoPostFlags {
                sales: get_bool("auto_post_sales")?,
                purchases: get_bool("auto_post_purchases")?,
                receipts: get_bool("auto_post_receipts")?,
                vendor_payments: get_bool("auto_post_vendor_payments")?,
                expenses: get_bool("auto_post_expenses")?,
            },
        })
    }

    #[instrument(skip(self, settings), err)]
    async fn save(&self, settings: PostingSettings) -> Result<PostingSettings, StoreError> {
        self.upsert(&settings, true).await?;
        Ok(settings)
    }
}
