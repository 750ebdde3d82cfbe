//! Axum router and service wiring.
//!
//! - `services.rs`: store selection (Postgres or in-memory) and the posting service
//! - `routes/`: HTTP handlers
//! - `dto.rs`: request bodies and JSON mapping
//! - `errors.rs`: error to status/JSON mapping

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use retailpos_infra::config::BridgeConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router from process configuration.
pub async fn build_app(config: &BridgeConfig) -> anyhow::Result<Router> {
    let services = AppServices::from_config(config).await?;
    Ok(router(Arc::new(services)))
}

/// Router over already constructed services.
pub fn router(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/accounting", routes::router())
        .layer(Extension(services))
}
