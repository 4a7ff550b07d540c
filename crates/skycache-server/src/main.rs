use anyhow::{Context, Result};
use skycache_core::Config;
use skycache_weather::{OpenWeatherClient, SystemClock, WeatherCache, WeatherFetcher};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    skycache_core::init()?;

    let (config, _) = Config::load_validated()?;
    let addr = config.socket_addr()?;

    let client = OpenWeatherClient::new(&config.upstream)
        .context("Failed to build upstream HTTP client")?;
    let cache = match config.cache.max_entries {
        Some(max) => WeatherCache::bounded(max),
        None => WeatherCache::new(),
    };
    let fetcher = Arc::new(WeatherFetcher::new(
        client,
        Arc::new(cache),
        Arc::new(SystemClock),
        config.cache.ttl(),
    ));

    let (bound, server) = warp::serve(skycache_server::routes(fetcher))
        .try_bind_with_graceful_shutdown(addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        "SkyCache listening on http://{} (cache ttl {}s)",
        bound,
        config.cache.ttl_secs
    );
    server.await;

    tracing::info!("SkyCache stopped");
    Ok(())
}
