/// Server-side subscriber folding store changes into the shared cache.
pub mod change_feed;
/// OpenAPI documentation generation.
pub mod documentation;
/// Gift-exchange draw, clear and reveal.
pub mod draw_service;
/// Match finalization and status changes by the commissioner.
pub mod finalization_service;
/// Match listing, predictions and store snapshots.
pub mod fixture_service;
/// Health check service.
pub mod health_service;
/// Leaderboard computation with stale fallback.
pub mod leaderboard_service;
/// Insert-if-absent seeding of configured fixtures.
pub mod seed;
/// Participant login and session lookup.
pub mod session_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage connection supervisor toggling degraded mode.
pub mod storage_supervisor;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::{
        config::AppConfig,
        dao::{fixture_store::memory::InMemoryFixtureStore, models::MatchEntity},
        services::seed,
        state::{
            AppState, SharedState,
            auth::{CommissionerGrant, Role},
        },
    };

    pub const SECRET: &str = "whistle";

    /// State with the default roster, two fixtures and an online in-memory store.
    pub async fn seeded_state() -> (SharedState, InMemoryFixtureStore) {
        let config = AppConfig::default()
            .with_commissioner_secret(Some(SECRET.into()))
            .with_fixtures(vec![
                MatchEntity::upcoming(1, "Mexico", "South Africa", "11 Jun", "20:00", "Mexico City"),
                MatchEntity::upcoming(2, "Canada", "Norway", "12 Jun", "15:00", "Toronto"),
            ]);
        let state = AppState::new(config);
        let store = InMemoryFixtureStore::new();
        seed::seed_fixtures(&state, &store).await;
        state.install_fixture_store(Arc::new(store.clone())).await;
        (state, store)
    }

    pub fn commissioner() -> Role {
        let grant = CommissionerGrant::verify(Some(SECRET), SECRET).unwrap();
        Role::Commissioner(grant)
    }

    pub fn participant(id: &str) -> Role {
        Role::Participant(id.into())
    }
}
