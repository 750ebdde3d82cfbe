//! Business document kinds that can be pushed to the accounting engine.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Sale,
    Purchase,
    Receipt,
    VendorPayment,
    Expense,
    /// Chart-of-accounts ledger master.
    Ledger,
}

impl DocumentKind {
    /// Label stored as `doc_type` in the sync log.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Sale => "SALE",
            DocumentKind::Purchase => "PURCHASE",
            DocumentKind::Receipt => "RECEIPT",
            DocumentKind::VendorPayment => "PAYMENT",
            DocumentKind::Expense => "EXPENSE",
            DocumentKind::Ledger => "LEDGER",
        }
    }
}

impl core::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}
