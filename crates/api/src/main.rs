use anyhow::Context;

use canteen_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    canteen_observability::init();

    let config = ApiConfig::from_env().context("failed to load configuration")?;
    let app = canteen_api::app::build_app(&config)
        .await
        .context("failed to initialise storage")?;

    let listener = tokio::net::TcpListener::bind(config.socket_addr())
        .await
        .with_context(|| format!("failed to bind {}", config.socket_addr()))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        policy = ?config.role_policy,
        "listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
