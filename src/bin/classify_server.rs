use anyhow::Context;
use industry_lock::adapters::http::{router, AppState};
use industry_lock::core::canary::CanaryCase;
use industry_lock::utils::{logger, validation::Validate};
use industry_lock::{build_local_resolver, ResolverConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init_server_logger();

    let config = match std::env::var("INDUSTRY_LOCK_CONFIG") {
        Ok(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            ResolverConfig::from_file(&path)?
        }
        Err(_) => ResolverConfig::default(),
    };
    config.validate()?;

    let mut state = AppState::new(build_local_resolver(&config).await?);
    if let Ok(path) = std::env::var("INDUSTRY_CANARY_CASES") {
        state = state.with_canary_cases(CanaryCase::from_csv(&path)?);
    }

    let bind = config.bind_address().to_string();
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;
    tracing::info!("🚀 Classification server listening on {}", bind);

    axum::serve(listener, router(state))
        .await
        .context("server error")?;
    Ok(())
}
