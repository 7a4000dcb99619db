use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Whether the server-side cache has applied a store snapshot.
    pub synced: bool,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(synced: bool) -> Self {
        Self {
            status: "ok".to_string(),
            synced,
        }
    }

    /// Create a health response indicating the system is in degraded mode.
    pub fn degraded(synced: bool) -> Self {
        Self {
            status: "degraded".to_string(),
            synced,
        }
    }
}
