//! Tally accounting engine adapter: XML wire encoding and HTTP transport.

pub mod client;
pub mod xml;

pub use client::{parse_company_names, TallyClient, TallyError};
