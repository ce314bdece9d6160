use axum::{extract::State, Json};

use crate::{models::LinkPreviewDto, state::AppState};

/// GET /api/links
///
/// Preview cards for every configured link, in configuration order. Always
/// 200: links that cannot be scraped come back with override or bare data.
pub async fn list_links(State(state): State<AppState>) -> Json<Vec<LinkPreviewDto>> {
    Json(state.resolver.resolve_all().await)
}
