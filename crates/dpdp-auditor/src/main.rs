mod cache;
mod config;
mod error;
mod matcher;
mod model;
mod passage;
mod report;
mod rules;
mod server;

use std::sync::Arc;

use rmcp::{ServiceExt, transport::stdio};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cache::AuditCache;
use compliance_common::embedding::{EmbeddingProvider, FastEmbedder};
use compliance_common::redis::RedisCache;
use config::Config;
use matcher::RuleMatcher;
use server::DpdpAuditorServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout is reserved for MCP JSON-RPC
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    info!("starting dpdp-auditor MCP server");

    let config = Config::from_env()?;
    info!(
        rules_path = %config.rules_path,
        default_threshold = config.default_threshold,
        redis = config.redis_url.is_some(),
        "configuration loaded"
    );

    let redis_cache = RedisCache::new(config.redis_url.as_deref());
    if !redis_cache.is_enabled() {
        info!("redis not configured, running without cache");
    } else if redis_cache.is_available().await {
        info!("redis connected");
    } else {
        info!("redis unavailable, running without cache");
    }
    let cache = Arc::new(AuditCache::new(redis_cache));

    info!("initializing embedding model (may download on first run)");
    let embedder = FastEmbedder::new().await?;
    info!(dimensions = embedder.dimensions(), "embedding model ready");
    let provider: Arc<dyn EmbeddingProvider> = Arc::new(embedder);

    let load = rules::load_rules(&config.rules_path());
    if let Some(reason) = &load.missing {
        tracing::warn!(
            reason = %reason,
            "no rules loaded; audits will report rules_missing until reload_rules succeeds"
        );
    }
    let source = load.source;
    let rules = load.rules;
    let matcher = tokio::task::spawn_blocking(move || RuleMatcher::new(provider, rules)).await??;

    let server = DpdpAuditorServer::new(Arc::new(matcher), source, cache, config);

    if let Ok(addr) = std::env::var("MCP_TCP_LISTEN_ADDR") {
        let listener = TcpListener::bind(&addr).await?;
        info!(listen_addr = %addr, "MCP server ready, serving on TCP");
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = server.clone();
            tokio::spawn(async move {
                info!(peer = %peer, "MCP client connected");
                let service = server.serve(stream).await.inspect_err(|e| {
                    tracing::error!(error = %e, "MCP server error");
                })?;
                service.waiting().await?;
                info!(peer = %peer, "MCP client disconnected");
                Ok::<(), anyhow::Error>(())
            });
        }
    } else {
        info!("MCP server ready, serving on stdio");
        let service = server.serve(stdio()).await.inspect_err(|e| {
            tracing::error!(error = %e, "MCP server error");
        })?;
        service.waiting().await?;
        info!("MCP server shut down");
    }
    Ok(())
}
