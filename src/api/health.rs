use axum::response::Json;
use serde_json::{Value, json};

/// Liveness check for the callback server while `plartists auth` waits.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
