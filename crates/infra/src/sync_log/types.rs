use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use retailpos_core::{LedgerAccountId, SyncLogId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SyncStatus {
    Pending,
    Success,
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "PENDING",
            SyncStatus::Success => "SUCCESS",
            SyncStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Some(SyncStatus::Pending),
            "SUCCESS" => Some(SyncStatus::Success),
            "FAILED" => Some(SyncStatus::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SyncKind {
    Master,
    Voucher,
}

impl SyncKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncKind::Master => "MASTER",
            SyncKind::Voucher => "VOUCHER",
        }
    }
}

/// What a row is about. Masters are keyed by the local ledger id, vouchers
/// by their voucher number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum SyncSubject {
    Master {
        ledger_id: LedgerAccountId,
        ledger_name: String,
    },
    Voucher {
        voucher_no: String,
    },
}

impl SyncSubject {
    pub fn kind(&self) -> SyncKind {
        match self {
            SyncSubject::Master { .. } => SyncKind::Master,
            SyncSubject::Voucher { .. } => SyncKind::Voucher,
        }
    }

    /// Document key used for `(doc_type, doc_key)` lookups.
    pub fn doc_key(&self) -> String {
        match self {
            SyncSubject::Master { ledger_id, .. } => ledger_id.to_string(),
            SyncSubject::Voucher { voucher_no } => voucher_no.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncLogEntry {
    pub id: SyncLogId,
    #[serde(flatten)]
    pub subject: SyncSubject,
    pub doc_type: String,
    pub status: SyncStatus,
    pub attempts: u32,
    pub request_xml: String,
    pub response_text: Option<String>,
    pub error_text: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SyncLogEntry {
    pub fn doc_key(&self) -> String {
        self.subject.doc_key()
    }

    /// Apply a finished attempt in place.
    pub(crate) fn record(&mut self, outcome: &AttemptOutcome, at: DateTime<Utc>) {
        match outcome {
            AttemptOutcome::Success { response } => {
                self.status = SyncStatus::Success;
                self.response_text = Some(response.clone());
            }
            AttemptOutcome::Failure { error } => {
                self.status = SyncStatus::Failed;
                self.error_text = Some(error.clone());
            }
        }
        self.attempts += 1;
        self.updated_at = at;
    }
}

/// A row about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSyncLogEntry {
    pub subject: SyncSubject,
    pub doc_type: String,
    pub request_xml: String,
}

impl NewSyncLogEntry {
    pub fn voucher(
        doc_type: impl Into<String>,
        voucher_no: impl Into<String>,
        request_xml: impl Into<String>,
    ) -> Self {
        Self {
            subject: SyncSubject::Voucher {
                voucher_no: voucher_no.into(),
            },
            doc_type: doc_type.into(),
            request_xml: request_xml.into(),
        }
    }

    pub fn master(
        doc_type: impl Into<String>,
        ledger_id: LedgerAccountId,
        ledger_name: impl Into<String>,
        request_xml: impl Into<String>,
    ) -> Self {
        Self {
            subject: SyncSubject::Master {
                ledger_id,
                ledger_name: ledger_name.into(),
            },
            doc_type: doc_type.into(),
            request_xml: request_xml.into(),
        }
    }

    pub(crate) fn into_pending(self, id: SyncLogId, at: DateTime<Utc>) -> SyncLogEntry {
        SyncLogEntry {
            id,
            subject: self.subject,
            doc_type: self.doc_type,
            status: SyncStatus::Pending,
            attempts: 0,
            request_xml: self.request_xml,
            response_text: None,
            error_text: None,
            created_at: at,
            updated_at: at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success { response: String },
    Failure { error: String },
}
