use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::{
    fixture::{MatchSummary, PredictionSummary},
    leaderboard::StandingDto,
    santa::DrawStatus,
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream.
    pub stream: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast whenever a match record changes.
pub struct MatchUpdatedEvent(pub MatchSummary);

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast whenever a prediction is placed or edited.
pub struct PredictionUpsertedEvent(pub PredictionSummary);

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast when a draw is made or cleared. Carries no pairing.
pub struct DrawReplacedEvent(pub DrawStatus);

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast after every recomputation of the leaderboard.
pub struct LeaderboardUpdatedEvent {
    pub standings: Vec<StandingDto>,
}
