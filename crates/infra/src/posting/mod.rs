//! Posting entry points: business documents and ledger masters in, remote
//! response (or error) out, with a sync-log row for every attempt.
//!
//! ```text
//! document
//!   ↓
//! 1. Load posting settings
//!   ↓
//! 2. Assemble balanced voucher lines / ledger master
//!   ↓
//! 3. Encode the inner XML message
//!   ↓
//! 4. Create PENDING sync-log row
//!   ↓
//! 5. Wrap in envelope and POST
//!   ↓
//! 6. Finalise row SUCCESS / FAILED (always), return or re-raise
//! ```
//!
//! Calls are synchronous from the caller's point of view: nothing is queued
//! and a `FAILED` row is never retried here.

mod error;
mod master;
mod service;

pub use error::PostingError;
pub use service::PostingService;
