use anyhow::Context;
use lps_api::{ApiConfig, ApiState, metrics::init_metrics, router, tracing::init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ApiConfig::from_env().context("invalid configuration")?;

    init_tracing(&config.env);
    let metrics = init_metrics()?;

    let pool = lps_db::create_pool(&config.database_url, config.db_max_connections).await?;
    lps_db::ensure_db_and_migrate(&config.database_url, &pool).await?;

    let state = ApiState::new(&config, pool);
    let app = router::app(state, metrics, config.allowed_origins());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, env = ?config.env, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
