mod cli;

use crate::cli::{CacheBackendArg, StorageBackendArg, CLI};
use anyhow::{anyhow, Context};
use clap::Parser;
use jiff::SignedDuration;
use snip_cache::{MokaUrlCache, NullCache, RedisUrlCache};
use snip_codec::{CodecSettings, HashidsCodec};
use snip_core::{Repository, UrlCache};
use snip_gateway::{telemetry, App, AppState};
use snip_shortener::{BaseUrl, Shortener, ShortenerConfig, ShortenerService};
use snip_storage::{InMemoryRepository, MySqlRepository};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::try_parse()?;
    telemetry::init(config.log_format).context("failed to install tracing subscriber")?;

    info!(
        listen_addr = %config.listen_addr,
        base_url = %config.base_url,
        storage_backend = %config.storage,
        cache_backend = %config.cache,
        "starting snip gateway"
    );

    let shortener = build_shortener(&config).await?;
    let router = App::router(AppState::new(shortener));

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server failed")?;

    info!("gateway stopped");
    Ok(())
}

async fn build_shortener(config: &CLI) -> anyhow::Result<Arc<dyn Shortener>> {
    let codec = HashidsCodec::new(
        CodecSettings::builder()
            .salt(config.hashids_salt.clone())
            .min_length(config.hashids_min_length)
            .build(),
    )
    .context("invalid hashids settings")?;

    let shortener_config = ShortenerConfig::builder()
        .base_url(BaseUrl::parse(&config.base_url)?)
        .cache_ttl(to_std(config.cache_ttl, "cache ttl")?)
        .cache_timeout(to_std(config.cache_timeout, "cache timeout")?)
        .store_timeout(to_std(config.store_timeout, "store timeout")?)
        .build();

    let repository = build_repository(config).await?;
    let cache = build_cache(config).await?;

    Ok(Arc::new(ShortenerService::new(
        repository,
        cache,
        codec,
        shortener_config,
    )))
}

async fn build_repository(config: &CLI) -> anyhow::Result<Arc<dyn Repository>> {
    match config.storage {
        StorageBackendArg::InMemory => Ok(Arc::new(InMemoryRepository::new())),
        StorageBackendArg::Mysql => {
            let mysql_dsn = config
                .mysql_dsn
                .as_deref()
                .ok_or_else(|| anyhow!("mysql dsn is required when storage backend is mysql"))?;
            let repository = MySqlRepository::connect(mysql_dsn)
                .await
                .context("failed to connect to mysql")?;
            if config.mysql_migrate {
                repository.migrate().await?;
            }
            Ok(Arc::new(repository))
        }
    }
}

async fn build_cache(config: &CLI) -> anyhow::Result<Arc<dyn UrlCache>> {
    match config.cache {
        CacheBackendArg::None => Ok(Arc::new(NullCache::new())),
        CacheBackendArg::Memory => Ok(Arc::new(MokaUrlCache::with_capacity(
            config.cache_capacity,
        ))),
        CacheBackendArg::Redis => {
            let redis_url = config
                .redis_url
                .as_deref()
                .ok_or_else(|| anyhow!("redis url is required when cache backend is redis"))?;
            let cache = RedisUrlCache::connect(redis_url)
                .await
                .context("failed to connect to redis")?;
            Ok(Arc::new(cache))
        }
    }
}

fn to_std(duration: SignedDuration, name: &str) -> anyhow::Result<Duration> {
    Duration::try_from(duration).with_context(|| format!("{name} must not be negative"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
