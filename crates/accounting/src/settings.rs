//! Posting settings: the single active integration configuration.

use serde::{Deserialize, Serialize};

use retailpos_core::{DomainError, DomainResult};

use crate::document::DocumentKind;

pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:9000";

/// Remote ledger names absorbing the fixed sides of generated vouchers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerNames {
    pub cash: String,
    pub bank: String,
    pub sales: String,
    pub purchase: String,
    pub vat_output: String,
    pub vat_input: String,
    pub rounding: String,
}

impl Default for LedgerNames {
    fn default() -> Self {
        Self {
            cash: "Cash".to_string(),
            bank: "Bank".to_string(),
            sales: "Sales".to_string(),
            purchase: "Purchase".to_string(),
            vat_output: "Output VAT".to_string(),
            vat_input: "Input VAT".to_string(),
            rounding: "Round Off".to_string(),
        }
    }
}

impl LedgerNames {
    /// Cash or bank ledger depending on how money moved.
    pub fn cash_or_bank(&self, to_bank: bool) -> &str {
        if to_bank { &self.bank } else { &self.cash }
    }
}

/// Which documents the business flows push without an explicit request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoPostFlags {
    pub sales: bool,
    pub purchases: bool,
    pub receipts: bool,
    pub vendor_payments: bool,
    pub expenses: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostingSettings {
    pub enabled: bool,
    pub endpoint_url: String,
    pub company_name: String,
    pub ledgers: LedgerNames,
    pub auto_post: AutoPostFlags,
}

impl Default for PostingSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint_url: DEFAULT_ENDPOINT_URL.to_string(),
            company_name: String::new(),
            ledgers: LedgerNames::default(),
            auto_post: AutoPostFlags::default(),
        }
    }
}

impl PostingSettings {
    /// Endpoint with surrounding whitespace and trailing slashes removed.
    pub fn endpoint(&self) -> &str {
        self.endpoint_url.trim().trim_end_matches('/')
    }

    /// Company name, `None` when blank.
    pub fn company(&self) -> Option<&str> {
        let company = self.company_name.trim();
        (!company.is_empty()).then_some(company)
    }

    /// Whether `kind` should be pushed automatically after the local commit.
    pub fn auto_post(&self, kind: DocumentKind) -> bool {
        if !self.enabled {
            return false;
        }
        match kind {
            DocumentKind::Sale => self.auto_post.sales,
            DocumentKind::Purchase => self.auto_post.purchases,
            DocumentKind::Receipt => self.auto_post.receipts,
            DocumentKind::VendorPayment => self.auto_post.vendor_payments,
            DocumentKind::Expense => self.auto_post.expenses,
            DocumentKind::Ledger => false,
        }
    }

    /// Enabled settings must name an endpoint.
    pub fn validate(&self) -> DomainResult<()> {
        if self.enabled && self.endpoint().is_empty() {
            return Err(DomainError::validation(
                "endpoint URL is required when the integration is enabled",
            ));
        }
        Ok(())
    }

    /// Validated copy in the canonical stored form.
    pub fn normalized(mut self) -> DomainResult<Self> {
        self.validate()?;
        self.endpoint_url = self.endpoint().to_string();
        self.company_name = self.company_name.trim().to_string();
        Ok(self)
    }
}
