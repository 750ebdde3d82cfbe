//! Postgres-backed chart directory over `ledger_accounts` / `account_groups`.
//!
//! These tables belong to the back-office; this adapter only reads them.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};

use retailpos_accounting::{AccountGroup, BalanceType, GroupNature, LedgerAccount};
use retailpos_core::{AccountGroupId, LedgerAccountId};

use super::ChartDirectory;
use crate::error::{map_sqlx_error, StoreError};

#[derive(Debug, Clone)]
pub struct PostgresChartDirectory {
    pool: PgPool,
}

impl PostgresChartDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChartDirectory for PostgresChartDirectory {
    async fn ledger(&self, id: LedgerAccountId) -> Result<Option<LedgerAccount>, StoreError> {
        let Some(row) = sqlx::query(
            r#"
            SELECT id, name, group_id, balance_type, opening_balance, cost_centres
            FROM ledger_accounts
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_ledger_account", e))?
        else {
            return Ok(None);
        };

        let col = |e| map_sqlx_error("decode_ledger_account", e);
        let balance_type: String = row.try_get("balance_type").map_err(col)?;

        Ok(Some(LedgerAccount {
            id,
            name: row.try_get("name").map_err(col)?,
            group_id: row
                .try_get::<Option<uuid::Uuid>, _>("group_id")
                .map_err(col)?
                .map(AccountGroupId::from_uuid),
            balance_type: BalanceType::parse(&balance_type).ok_or_else(|| {
                StoreError::Corrupt(format!("unknown balance type {balance_type:?}"))
            })?,
            opening_balance: row.try_get::<Decimal, _>("opening_balance").map_err(col)?,
            cost_centres: row.try_get("cost_centres").map_err(col)?,
        }))
    }

    async fn group(&self, id: AccountGroupId) -> Result<Option<AccountGroup>, StoreError> {
        let Some(row) = sqlx::query(
            r#"
            SELECT id, name, parent_id, nature, affects_gross_profit
            FROM account_groups
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_account_group", e))?
        else {
            return Ok(None);
        };

        let col = |e| map_sqlx_error("decode_account_group", e);
        let nature: String = row.try_get("nature").map_err(col)?;

        Ok(Some(AccountGroup {
            id,
            name: row.try_get("name").map_err(col)?,
            parent_id: row
                .try_get::<Option<uuid::Uuid>, _>("parent_id")
                .map_err(col)?
                .map(AccountGroupId::from_uuid),
            nature: GroupNature::parse(&nature)
                .ok_or_else(|| StoreError::Corrupt(format!("unknown group nature {nature:?}")))?,
            affects_gross_profit: row.try_get("affects_gross_profit").map_err(col)?,
        }))
    }
}
