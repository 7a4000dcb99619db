use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping the store and report the degraded flag and cache sync state.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.require_fixture_store().await {
        Ok(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "storage health check failed");
            }
        }
        Err(_) => warn!("storage unavailable (degraded mode)"),
    }

    let synced = state.board().read().await.is_synced();
    if state.is_degraded() {
        HealthResponse::degraded(synced)
    } else {
        HealthResponse::ok(synced)
    }
}
