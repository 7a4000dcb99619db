use tracing::info;

use crate::{
    dto::{
        santa::{DrawStatus, RevealResponse},
        session::ParticipantSummary,
    },
    error::ServiceError,
    state::{
        SharedState,
        auth::Role,
        draw::{Draw, draw_roster},
        sync::LocalMutation,
    },
};

/// Draw a fresh gift-exchange cycle over the whole roster, replacing any earlier draw.
pub async fn draw(state: &SharedState, role: &Role) -> Result<DrawStatus, ServiceError> {
    let _grant = role.require_commissioner()?;

    // The thread-local rng is not `Send`, so it must be gone before the first await.
    let draw = {
        let mut rng = rand::rng();
        draw_roster(state.roster(), &mut rng)?
    };

    let _gate = state.write_gate().write().await;
    let store = state.require_fixture_store().await?;

    let mutation = LocalMutation::ReplaceDraw(Some(draw.clone()));
    state
        .update_board(|cache| cache.apply_local(&mutation))
        .await;

    store.replace_draw(draw.clone().into()).await?;
    info!(draw_id = %draw.id, participants = draw.pairings.len(), "gift exchange drawn");

    Ok(DrawStatus::from(Some(&draw)))
}

/// Delete the current draw.
pub async fn clear(state: &SharedState, role: &Role) -> Result<DrawStatus, ServiceError> {
    let _grant = role.require_commissioner()?;

    let _gate = state.write_gate().write().await;
    let store = state.require_fixture_store().await?;

    let mutation = LocalMutation::ReplaceDraw(None);
    state
        .update_board(|cache| cache.apply_local(&mutation))
        .await;

    store.clear_draw().await?;
    info!("gift exchange draw cleared");

    Ok(DrawStatus::from(None))
}

/// Reveal the receiver drawn for `participant_id`. Nobody can look up anyone else's.
pub async fn reveal(state: &SharedState, role: &Role) -> Result<RevealResponse, ServiceError> {
    let participant_id = role
        .participant_id()
        .ok_or_else(|| ServiceError::Unauthorized("only participants have an assignment".into()))?;

    let store = state.require_fixture_store().await?;
    let Some(draw) = store.current_draw().await?.map(Draw::from) else {
        return Ok(RevealResponse::not_drawn());
    };

    let receiver_id = draw.receiver_for(participant_id).ok_or_else(|| {
        ServiceError::NotFound(format!(
            "participant `{participant_id}` is not part of the current draw"
        ))
    })?;
    let receiver = state.roster().get(receiver_id).ok_or_else(|| {
        ServiceError::InvalidState(format!(
            "drawn receiver `{receiver_id}` is no longer on the roster"
        ))
    })?;

    Ok(RevealResponse {
        drawn: true,
        receiver: Some(ParticipantSummary::from(receiver)),
    })
}
