//! Admin HTTP surface for the accounting bridge.

pub mod app;
