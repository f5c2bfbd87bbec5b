//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod analysis;
pub mod transactions;

// Re-export all handlers for use in router
pub use analysis::*;
pub use transactions::*;

use axum::Json;

/// GET /api - Service identity probe
pub async fn api_root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "footprint API"
    }))
}
