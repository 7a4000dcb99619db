use tracing::warn;

use crate::{
    dto::leaderboard::LeaderboardResponse,
    services::fixture_service,
    state::{SharedState, scoring::compute_leaderboard},
};

/// Compute the leaderboard from a fresh store read.
///
/// When the store cannot be read the server cache answers instead and the
/// response is flagged `stale`.
pub async fn leaderboard(state: &SharedState) -> LeaderboardResponse {
    match state.require_fixture_store().await {
        Ok(store) => match fixture_service::load_snapshot(store.as_ref()).await {
            Ok(snapshot) => {
                let standings = compute_leaderboard(
                    state.roster(),
                    &snapshot.predictions,
                    &snapshot.matches,
                );
                return LeaderboardResponse::new(&standings, state.roster(), false);
            }
            Err(err) => warn!(error = %err, "leaderboard read failed; serving cached standings"),
        },
        Err(_) => warn!("storage unavailable (degraded mode); serving cached standings"),
    }

    cached(state).await
}

async fn cached(state: &SharedState) -> LeaderboardResponse {
    let standings = state.board().read().await.leaderboard(state.roster());
    LeaderboardResponse::new(&standings, state.roster(), true)
}
