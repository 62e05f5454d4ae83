use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::AppState;

/// Liveness probe; also pings PostgreSQL when it backs the service.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let mut status = StatusCode::OK;
    let mut database = json!("n/a");
    let mut pool = Value::Null;

    if let Some(postgres) = &state.postgres {
        let stats = postgres.pool_stats();
        pool = json!({
            "size": stats.size,
            "idle": stats.idle,
            "max_size": stats.max_size,
        });

        match sqlx::query("SELECT 1").execute(postgres.pool()).await {
            Ok(_) => database = json!("ok"),
            Err(e) => {
                tracing::warn!(error = %e, "health check database ping failed");
                database = json!("unreachable");
                status = StatusCode::SERVICE_UNAVAILABLE;
            }
        }
    }

    let body = json!({
        "status": if status.is_success() { "healthy" } else { "unhealthy" },
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "storage": state.storage_kind(),
        "checks": { "database": database, "pool": pool },
    });

    (status, Json(body))
}
