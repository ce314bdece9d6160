pub mod links;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "linkcard-server",
            "version": env!("CARGO_PKG_VERSION"),
            "links": state.resolver.links().len(),
        })),
    )
}
