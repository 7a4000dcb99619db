use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    dao::models::ChangeEvent,
    dto::{
        fixture::{MatchSummary, PredictionSummary},
        leaderboard::LeaderboardResponse,
        santa::DrawStatus,
        sse::{
            DrawReplacedEvent, LeaderboardUpdatedEvent, MatchUpdatedEvent,
            PredictionUpsertedEvent, ServerEvent, SystemStatus,
        },
    },
    state::{
        SharedState, SseHub,
        draw::Draw,
        fixtures::{Match, Prediction},
        scoring::Standing,
    },
};

const EVENT_SYSTEM_STATUS: &str = "system.status";
const EVENT_MATCH_UPDATED: &str = "match.updated";
const EVENT_PREDICTION_UPSERTED: &str = "prediction.upserted";
const EVENT_DRAW_REPLACED: &str = "draw.replaced";
const EVENT_LEADERBOARD_UPDATED: &str = "leaderboard.updated";

/// Broadcast a degraded mode transition.
pub fn broadcast_system_status(hub: &SseHub, degraded: bool) {
    send_event(hub, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

/// Relay a store change to public subscribers.
///
/// Draw changes only announce the draw status; pairings stay private.
pub fn broadcast_change(state: &SharedState, event: &ChangeEvent) {
    let hub = state.public_sse();
    match event {
        ChangeEvent::MatchUpdated { new, .. } => {
            let summary = MatchSummary::from(&Match::from(new.clone()));
            send_event(hub, EVENT_MATCH_UPDATED, &MatchUpdatedEvent(summary));
        }
        ChangeEvent::PredictionUpserted { new, .. } => {
            let summary = PredictionSummary::from(&Prediction::from(new.clone()));
            send_event(
                hub,
                EVENT_PREDICTION_UPSERTED,
                &PredictionUpsertedEvent(summary),
            );
        }
        ChangeEvent::DrawReplaced { new, .. } => {
            let draw = new.clone().map(Draw::from);
            let status = DrawStatus::from(draw.as_ref());
            send_event(hub, EVENT_DRAW_REPLACED, &DrawReplacedEvent(status));
        }
    }
}

/// Broadcast freshly computed standings.
pub fn broadcast_leaderboard(state: &SharedState, standings: &[Standing]) {
    let response = LeaderboardResponse::new(standings, state.roster(), false);
    let payload = LeaderboardUpdatedEvent {
        standings: response.standings,
    };
    send_event(state.public_sse(), EVENT_LEADERBOARD_UPDATED, &payload);
}

fn send_event(hub: &SseHub, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(message) => {
            let delivered = hub.broadcast(message);
            debug!(event, delivered, "public SSE event sent");
        }
        Err(err) => warn!(event, error = %err, "failed to serialize public SSE payload"),
    }
}
