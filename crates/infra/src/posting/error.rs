use retailpos_core::{DomainError, LedgerAccountId};

use crate::error::StoreError;
use crate::tally::TallyError;

/// Failure of a posting operation. The `Display` text is what the sync log
/// stores as the attempt's error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PostingError {
    #[error(transparent)]
    Tally(#[from] TallyError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("ledger not found: {0}")]
    LedgerNotFound(LedgerAccountId),
}
