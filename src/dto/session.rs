use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{dto::validation::validate_access_code, state::roster::Participant};

/// Public projection of a roster member. Access codes never leave the server.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantSummary {
    pub id: String,
    pub name: String,
    pub avatar: String,
}

impl From<&Participant> for ParticipantSummary {
    fn from(value: &Participant) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
            avatar: value.avatar.clone(),
        }
    }
}

/// Login with a roster identity and its access code.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SessionRequest {
    #[validate(length(min = 1))]
    pub participant_id: String,
    #[validate(custom(function = "validate_access_code"))]
    pub code: String,
}

/// Session issued after a successful login.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Value to send back in the `X-Session-Token` header.
    pub token: String,
    pub participant: ParticipantSummary,
}
