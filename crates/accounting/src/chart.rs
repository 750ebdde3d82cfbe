//! Chart-of-accounts input types.
//!
//! Ledgers and groups are owned by the back-office CRUD; this module only
//! reads them to build ledger masters for the remote accounting engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use retailpos_core::{AccountGroupId, LedgerAccountId};

/// Remote parent used when nothing better can be derived.
pub const FALLBACK_PARENT_GROUP: &str = "Sundry Debtors";

/// Native balance side of a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BalanceType {
    Debit,
    Credit,
}

/// Nature of an account group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupNature {
    Asset,
    Liability,
    Income,
    Expense,
}

impl GroupNature {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupNature::Asset => "ASSET",
            GroupNature::Liability => "LIABILITY",
            GroupNature::Income => "INCOME",
            GroupNature::Expense => "EXPENSE",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ASSET" => Some(GroupNature::Asset),
            "LIABILITY" => Some(GroupNature::Liability),
            "INCOME" => Some(GroupNature::Income),
            "EXPENSE" => Some(GroupNature::Expense),
            _ => None,
        }
    }
}

impl BalanceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceType::Debit => "DEBIT",
            BalanceType::Credit => "CREDIT",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBIT" | "DR" => Some(BalanceType::Debit),
            "CREDIT" | "CR" => Some(BalanceType::Credit),
            _ => None,
        }
    }
}

/// Node in the account group tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountGroup {
    pub id: AccountGroupId,
    pub name: String,
    pub parent_id: Option<AccountGroupId>,
    pub nature: GroupNature,
    pub affects_gross_profit: bool,
}

/// A named ledger in the local chart of accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAccount {
    pub id: LedgerAccountId,
    pub name: String,
    pub group_id: Option<AccountGroupId>,
    pub balance_type: BalanceType,
    /// Unsigned magnitude; the sign is implied by `balance_type`.
    pub opening_balance: Decimal,
    pub cost_centres: bool,
}

impl LedgerAccount {
    /// Opening balance as the remote engine expects it: positive for a
    /// debit opening, negative for a credit opening.
    pub fn signed_opening_balance(&self) -> Decimal {
        let magnitude = self.opening_balance.abs();
        match self.balance_type {
            BalanceType::Debit => magnitude,
            BalanceType::Credit => -magnitude,
        }
    }
}

/// Default remote parent group for a ledger filed under `group`.
pub fn default_parent_group(group: Option<&AccountGroup>) -> &'static str {
    let Some(group) = group else {
        return FALLBACK_PARENT_GROUP;
    };

    match group.nature {
        GroupNature::Asset => "Sundry Debtors",
        GroupNature::Liability => "Sundry Creditors",
        GroupNature::Income => "Sales Accounts",
        GroupNature::Expense if group.affects_gross_profit => "Direct Expenses",
        GroupNature::Expense => "Indirect Expenses",
    }
}
