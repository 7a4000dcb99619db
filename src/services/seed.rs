use tracing::{info, warn};

use crate::{dao::fixture_store::FixtureStore, state::SharedState};

/// Insert every configured fixture that the store does not know yet.
///
/// Existing matches are never touched, so finalized results survive restarts.
/// Failures are logged and skipped; the next successful connection retries them.
pub async fn seed_fixtures(state: &SharedState, store: &dyn FixtureStore) {
    let fixtures = state.config().fixtures();
    if fixtures.is_empty() {
        return;
    }

    let mut inserted = 0usize;
    for fixture in fixtures {
        match store.seed_match(fixture.clone()).await {
            Ok(true) => inserted += 1,
            Ok(false) => {}
            Err(err) => {
                warn!(match_id = fixture.id, error = %err, "failed to seed fixture");
            }
        }
    }
    info!(inserted, configured = fixtures.len(), "fixture seeding finished");
}
