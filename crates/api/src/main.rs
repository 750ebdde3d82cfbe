use anyhow::Context;

use retailpos_infra::config::BridgeConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    retailpos_observability::init();

    let config = BridgeConfig::from_env().context("invalid bridge configuration")?;
    if config.database_url.is_none() {
        tracing::warn!("DATABASE_URL not set; settings and sync log are kept in memory");
    }

    let app = retailpos_api::app::build_app(&config).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
