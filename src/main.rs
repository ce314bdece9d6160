use std::net::SocketAddr;

use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use linkcard_server::build_router;
use linkcard_server::config::Config;
use linkcard_server::middleware::with_middleware;
use linkcard_server::resolver::MetadataResolver;
use linkcard_server::state::AppState;

#[tokio::main]
async fn main() {
    // Initialize tracing — JSON in production, human-readable in dev.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "linkcard_server=info,tower_http=info"
            .parse()
            .unwrap()
    });

    if std::env::var("APP_ENV").as_deref() == Ok("production") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("🚀 Linkcard Server starting...");

    let config = Config::from_env().expect("Failed to load configuration");
    info!("📝 Configuration loaded");

    let links = config.load_links().expect("Failed to load link list");
    match &config.links_file {
        Some(path) => info!("🔗 {} links loaded from {}", links.len(), path.display()),
        None => info!("🔗 {} built-in links", links.len()),
    }

    let resolver =
        MetadataResolver::new(links, &config.fetch).expect("Failed to build HTTP client");
    info!(
        "🌐 Fetch policy: overrides {}, timeout {:?}",
        config.fetch.override_policy, config.fetch.timeout
    );

    info!("📂 Static files: {}", config.static_dir.display());

    let app_state = AppState { resolver };

    // Prometheus metrics layer
    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let routes = build_router(app_state, &config.static_dir)
        .route(
            "/metrics",
            get(move || async move { metric_handle.render() }),
        )
        .layer(prometheus_layer);
    let app = with_middleware(routes, &config).expect("Invalid middleware configuration");

    let addr = config.server_addr();
    info!("🎧 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server failed to start");
}
