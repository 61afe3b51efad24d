use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use field_core::FieldSnapshot;

use crate::{ApiResponse, AppState};

async fn get_latest_field(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Json<ApiResponse<FieldSnapshot>> {
    let symbol = symbol.to_uppercase();
    match state.broadcast.latest_for(&symbol) {
        Some(snapshot) => Json(ApiResponse::success(snapshot)),
        None => Json(ApiResponse::error(format!("no snapshot yet for {symbol}"))),
    }
}

async fn get_symbols(State(state): State<AppState>) -> Json<ApiResponse<Vec<String>>> {
    Json(ApiResponse::success(state.cfg.symbols.clone()))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/api/field/:symbol/latest", get(get_latest_field))
        .route("/api/symbols", get(get_symbols))
        .route("/health", get(health))
}
