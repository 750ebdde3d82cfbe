//! Connection pool and schema bootstrap.
//!
//! `account_groups` and `ledger_accounts` belong to the chart-of-accounts
//! owner; they are created here only so a fresh database can be queried.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::error::{map_sqlx_error, StoreError};

const SCHEMA: &[(&str, &str)] = &[
    (
        "posting_settings",
        r#"
        CREATE TABLE IF NOT EXISTS posting_settings (
            id                        SMALLINT PRIMARY KEY CHECK (id = 1),
            enabled                   BOOLEAN NOT NULL DEFAULT FALSE,
            endpoint_url              TEXT NOT NULL,
            company_name              TEXT NOT NULL DEFAULT '',
            cash_ledger               TEXT NOT NULL,
            bank_ledger               TEXT NOT NULL,
            sales_ledger              TEXT NOT NULL,
            purchase_ledger           TEXT NOT NULL,
            vat_output_ledger         TEXT NOT NULL,
            vat_input_ledger          TEXT NOT NULL,
            rounding_ledger           TEXT NOT NULL,
            auto_post_sales           BOOLEAN NOT NULL DEFAULT FALSE,
            auto_post_purchases       BOOLEAN NOT NULL DEFAULT FALSE,
            auto_post_receipts        BOOLEAN NOT NULL DEFAULT FALSE,
            auto_post_vendor_payments BOOLEAN NOT NULL DEFAULT FALSE,
            auto_post_expenses        BOOLEAN NOT NULL DEFAULT FALSE,
            updated_at                TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "accounting_sync_log",
        r#"
        CREATE TABLE IF NOT EXISTS accounting_sync_log (
            id            UUID PRIMARY KEY,
            kind          TEXT NOT NULL,
            doc_type      TEXT NOT NULL,
            doc_key       TEXT NOT NULL,
            ledger_name   TEXT NULL,
            status        TEXT NOT NULL,
            attempts      INTEGER NOT NULL DEFAULT 0,
            request_xml   TEXT NOT NULL,
            response_text TEXT NULL,
            error_text    TEXT NULL,
            created_at    TIMESTAMPTZ NOT NULL,
            updated_at    TIMESTAMPTZ NOT NULL
        )
        "#,
    ),
    (
        "accounting_sync_log_document_idx",
        r#"
        CREATE INDEX IF NOT EXISTS accounting_sync_log_document_idx
            ON accounting_sync_log (doc_type, doc_key, created_at DESC)
        "#,
    ),
    (
        "account_groups",
        r#"
        CREATE TABLE IF NOT EXISTS account_groups (
            id                   UUID PRIMARY KEY,
            name                 TEXT NOT NULL,
            parent_id            UUID NULL REFERENCES account_groups (id),
            nature               TEXT NOT NULL,
            affects_gross_profit BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
    ),
    (
        "ledger_accounts",
        r#"
        CREATE TABLE IF NOT EXISTS ledger_accounts (
            id              UUID PRIMARY KEY,
            name            TEXT NOT NULL,
            group_id        UUID NULL REFERENCES account_groups (id),
            balance_type    TEXT NOT NULL,
            opening_balance NUMERIC(18, 2) NOT NULL DEFAULT 0,
            cost_centres    BOOLEAN NOT NULL DEFAULT FALSE
        )
        "#,
    ),
];

/// Open a pool and make sure the bridge's tables exist.
pub async fn connect(database_url: &str) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))?;
    ensure_schema(&pool).await?;
    Ok(pool)
}

pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for (name, ddl) in SCHEMA {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error(&format!("create {name}"), e))?;
    }
    info!(objects = SCHEMA.len(), "database schema ready");
    Ok(())
}
