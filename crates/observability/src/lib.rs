//! Process-wide tracing setup shared by the bridge binaries and tests.

pub mod tracing;

pub use crate::tracing::{init, init_for_tests, DEFAULT_DIRECTIVES};
