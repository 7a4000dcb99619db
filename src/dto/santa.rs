//! Gift-exchange wire types. Pairings are only ever revealed one giver at a time.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::{format_system_time, session::ParticipantSummary},
    state::draw::Draw,
};

/// Caller's own assignment.
#[derive(Debug, Serialize, ToSchema)]
pub struct RevealResponse {
    /// False until the commissioner has run a draw.
    pub drawn: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<ParticipantSummary>,
}

impl RevealResponse {
    /// No draw has been made yet.
    pub fn not_drawn() -> Self {
        Self {
            drawn: false,
            receiver: None,
        }
    }
}

/// Draw metadata without any pairing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DrawStatus {
    pub drawn: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawn_at: Option<String>,
    pub participants: usize,
}

impl From<Option<&Draw>> for DrawStatus {
    fn from(value: Option<&Draw>) -> Self {
        match value {
            Some(draw) => Self {
                drawn: true,
                draw_id: Some(draw.id),
                drawn_at: Some(format_system_time(draw.drawn_at)),
                participants: draw.pairings.len(),
            },
            None => Self {
                drawn: false,
                draw_id: None,
                drawn_at: None,
                participants: 0,
            },
        }
    }
}
