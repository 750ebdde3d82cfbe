//! Infrastructure layer: Postgres and in-memory stores, configuration, and
//! the HTTP/XML client for the external accounting engine.

pub mod chart;
pub mod config;
pub mod db;
pub mod error;
pub mod posting;
pub mod settings;
pub mod sync_log;
pub mod tally;

pub use error::StoreError;
pub use posting::{PostingError, PostingService};
