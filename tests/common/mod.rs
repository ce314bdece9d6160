// Each integration test file is a separate binary; helpers not used in every
// binary would otherwise trigger dead_code warnings from clippy.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::{SocketAddr, TcpListener};
use std::path::PathBuf;
use std::time::Duration;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Method, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tower::ServiceExt;

use linkcard_server::{
    build_app, build_router,
    config::{Config, FetchSettings, LinkSet, OverridePolicy},
    models::LinkOverride,
    resolver::MetadataResolver,
    state::AppState,
};

pub const INDEX_HTML: &str = "<!doctype html><title>Linkcard test page</title>";

/// Fetch settings with a short timeout so a misbehaving test fails fast.
pub fn test_settings(policy: OverridePolicy) -> FetchSettings {
    FetchSettings {
        timeout: Some(Duration::from_secs(3)),
        override_policy: policy,
        ..FetchSettings::default()
    }
}

pub fn link_set(links: &[String]) -> LinkSet {
    LinkSet {
        links: links.to_vec(),
        ..Default::default()
    }
}

pub fn with_override(
    mut set: LinkSet,
    url: &str,
    title: Option<&str>,
    image: Option<&str>,
) -> LinkSet {
    set.overrides.insert(
        url.to_string(),
        LinkOverride {
            title: title.map(str::to_string),
            image: image.map(str::to_string),
        },
    );
    set
}

pub fn resolver(links: LinkSet, policy: OverridePolicy) -> MetadataResolver {
    MetadataResolver::new(links, &test_settings(policy)).expect("Failed to build resolver")
}

/// A URL on a local port nothing listens on, so connecting is refused.
pub fn dead_url(path: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to reserve a local port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}{path}")
}

/// Static directory holding only `index.html`, unique per test name.
pub fn test_static_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("linkcard_test_public_{name}"));
    std::fs::create_dir_all(&dir).expect("Failed to create static dir");
    std::fs::write(dir.join("index.html"), INDEX_HTML).expect("Failed to write index.html");
    dir
}

/// Build the application router around the given links.
pub fn create_test_app(links: LinkSet, policy: OverridePolicy, static_dir: &str) -> Router {
    let state = AppState {
        resolver: resolver(links, policy),
    };
    build_router(state, &test_static_dir(static_dir))
}

/// Configuration from the given variables, serving `static_dir`.
pub fn test_config(vars: &[(&str, &str)], static_dir: &str) -> Config {
    let mut vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    vars.insert(
        "STATIC_DIR".to_string(),
        test_static_dir(static_dir).display().to_string(),
    );
    Config::from_vars(|name| vars.get(name).cloned()).expect("Invalid test configuration")
}

/// The router wrapped in the production middleware stack (CORS, rate limit,
/// access log).
pub fn create_full_app(links: LinkSet, config: &Config) -> Router {
    let state = AppState {
        resolver: resolver(links, config.fetch.override_policy),
    };
    build_app(config, state).expect("Failed to build app")
}

// ── Request helpers ──────────────────────────────────────────────────────────

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, bytes) = get_raw(app, uri).await;
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub async fn get_text(app: Router, uri: &str) -> (StatusCode, String) {
    let (status, bytes) = get_raw(app, uri).await;
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

async fn get_raw(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

/// The address every test request appears to come from.
pub fn peer_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 40_000))
}

/// A request carrying `ConnectInfo`, as `axum::serve` would attach it.
pub fn request(method: Method, uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let mut req = builder.body(Body::empty()).unwrap();
    req.extensions_mut().insert(ConnectInfo(peer_addr()));
    req
}

pub async fn send(app: Router, req: Request<Body>) -> Response<Body> {
    app.oneshot(req).await.unwrap()
}

// ── Upstream page helpers ────────────────────────────────────────────────────

pub fn og_page(title: &str, image: &str) -> String {
    format!(
        r#"<html><head>
            <meta property="og:title" content="{title}"/>
            <meta property="og:image" content="{image}"/>
        </head><body></body></html>"#
    )
}

pub fn plain_page(title: &str) -> String {
    format!("<html><head><title>{title}</title></head><body>hi</body></html>")
}

/// A URL whose server declares a longer body than it sends, then hangs up.
pub async fn truncated_body_url(path: &str) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind truncated-body server");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let head = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 4096\r\n\r\n";
            let partial = og_page("Never Finished", "https://img.example/cut.png");
            let _ = socket.write_all(head.as_bytes()).await;
            let _ = socket.write_all(&partial.as_bytes()[..partial.len() / 2]).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{addr}{path}")
}
