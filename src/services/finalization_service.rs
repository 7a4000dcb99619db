use tracing::info;

use crate::{
    dao::models::MatchPatch,
    dto::fixture::{MatchSummary, ScoreInput},
    error::ServiceError,
    state::{
        SharedState,
        auth::Role,
        fixtures::{Match, MatchId, Score, finalize_patch},
        sync::LocalMutation,
    },
};

/// Record the final score of a match, overwriting any earlier result.
///
/// Re-sending the same finalization leaves the match unchanged.
pub async fn finalize_match(
    state: &SharedState,
    match_id: MatchId,
    input: ScoreInput,
    role: &Role,
) -> Result<MatchSummary, ServiceError> {
    let _grant = role.require_commissioner()?;
    let score = Score::try_from_signed(input.home, input.away)?;

    let _gate = state.write_gate().write().await;
    let store = state.require_fixture_store().await?;

    let mutation = LocalMutation::FinalizeMatch { match_id, score };
    state
        .update_board(|cache| cache.apply_local(&mutation))
        .await;

    let updated = store
        .update_match(match_id, finalize_patch(score))
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("match {match_id}")))?;

    info!(
        match_id,
        home = score.home,
        away = score.away,
        "match finalized"
    );
    Ok(MatchSummary::from(&Match::from(updated)))
}

/// Mark a match as in play, clearing any recorded result.
pub async fn mark_live(
    state: &SharedState,
    match_id: MatchId,
    role: &Role,
) -> Result<MatchSummary, ServiceError> {
    let _grant = role.require_commissioner()?;

    let _gate = state.write_gate().write().await;
    let store = state.require_fixture_store().await?;

    let mutation = LocalMutation::MarkLive { match_id };
    state
        .update_board(|cache| cache.apply_local(&mutation))
        .await;

    let updated = store
        .update_match(match_id, MatchPatch::live())
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("match {match_id}")))?;

    info!(match_id, "match marked live");
    Ok(MatchSummary::from(&Match::from(updated)))
}
