mod client_ip;

pub use client_ip::{client_ip, ClientIpKeyExtractor};

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{HeaderValue, Method},
    Router,
};
use governor::middleware::NoOpMiddleware;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{Config, RateLimitSettings};
use crate::error::{ConfigError, ConfigResult};

const LIMITER_PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Wrap `router` in the rate limit, access log and CORS layers.
///
/// Must be called from within a Tokio runtime: stale rate-limit state is
/// pruned by a background task. Requests must carry `ConnectInfo`, so serve
/// with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn with_middleware(router: Router, config: &Config) -> ConfigResult<Router> {
    Ok(router
        .layer(rate_limit_layer(&config.rate_limit)?)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config)))
}

/// CORS: permissive in dev, only `ALLOWED_ORIGINS` with `GET` in production.
pub fn cors_layer(config: &Config) -> CorsLayer {
    if config.is_dev {
        info!("🔓 CORS: permissive (dev mode)");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid ALLOWED_ORIGINS entry");
                None
            }
        })
        .collect();
    info!(
        "🔒 CORS: restrictive (production mode), {} allowed origin(s)",
        origins.len()
    );

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
}

fn rate_limit_layer(
    limits: &RateLimitSettings,
) -> ConfigResult<GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware>> {
    let replenish_secs = limits.replenish_interval_secs();
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(replenish_secs)
            .burst_size(limits.max_requests)
            .key_extractor(ClientIpKeyExtractor {
                trusted_proxy_hops: limits.trusted_proxy_hops,
            })
            .finish()
            .ok_or(ConfigError::RateLimit {
                max_requests: limits.max_requests,
                replenish_secs,
            })?,
    );

    let limiter = governor_conf.limiter().clone();
    tokio::spawn(async move {
        let mut prune = tokio::time::interval(LIMITER_PRUNE_INTERVAL);
        loop {
            prune.tick().await;
            limiter.retain_recent();
        }
    });

    info!(
        "🚦 Rate limit: {} requests per {:?} per client, {} trusted proxy hop(s)",
        limits.max_requests, limits.window, limits.trusted_proxy_hops
    );

    Ok(GovernorLayer {
        config: governor_conf,
    })
}
