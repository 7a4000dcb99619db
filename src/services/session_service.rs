use tracing::info;
use uuid::Uuid;

use crate::{
    dto::session::{ParticipantSummary, SessionRequest, SessionResponse},
    error::ServiceError,
    state::{SharedState, auth::Role},
};

/// Roster in configured order, without access codes.
pub fn list_participants(state: &SharedState) -> Vec<ParticipantSummary> {
    state.roster().iter().map(ParticipantSummary::from).collect()
}

/// Check an access code and issue a session token, replacing any earlier one.
pub fn open_session(
    state: &SharedState,
    request: SessionRequest,
) -> Result<SessionResponse, ServiceError> {
    let roster = state.roster();
    if !roster.contains(&request.participant_id) {
        return Err(ServiceError::NotFound(format!(
            "participant `{}`",
            request.participant_id
        )));
    }
    let participant = roster
        .authenticate(&request.participant_id, &request.code)
        .ok_or_else(|| ServiceError::Unauthorized("wrong access code".into()))?;

    // One live session per participant; logging in again revokes the old token.
    let sessions = state.sessions();
    sessions.retain(|_, owner| *owner != participant.id);
    let token = Uuid::new_v4().simple().to_string();
    sessions.insert(token.clone(), participant.id.clone());
    info!(participant_id = %participant.id, "participant session opened");

    Ok(SessionResponse {
        token,
        participant: participant.into(),
    })
}

/// Resolve a session token to the participant role it was issued for.
pub fn resolve_session(state: &SharedState, token: &str) -> Result<Role, ServiceError> {
    state
        .sessions()
        .get(token)
        .map(|entry| Role::Participant(entry.value().clone()))
        .ok_or_else(|| ServiceError::Unauthorized("unknown session token".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::AppConfig, state::AppState};

    fn request(id: &str, code: &str) -> SessionRequest {
        SessionRequest {
            participant_id: id.into(),
            code: code.into(),
        }
    }

    #[test]
    fn login_is_case_insensitive_and_resolvable() {
        let state = AppState::new(AppConfig::default());

        let session = open_session(&state, request("p3", "RT74")).unwrap();

        assert_eq!(session.participant.name, "Melih");
        assert_eq!(
            resolve_session(&state, &session.token).unwrap(),
            Role::Participant("p3".into())
        );
    }

    #[test]
    fn wrong_code_and_unknown_participant_are_distinguished() {
        let state = AppState::new(AppConfig::default());

        assert!(matches!(
            open_session(&state, request("p3", "y674")),
            Err(ServiceError::Unauthorized(_))
        ));
        assert!(matches!(
            open_session(&state, request("p42", "rt74")),
            Err(ServiceError::NotFound(_))
        ));
        assert!(state.sessions().is_empty());
    }

    #[test]
    fn relogin_replaces_the_previous_token() {
        let state = AppState::new(AppConfig::default());

        let first = open_session(&state, request("p1", "1hj8")).unwrap();
        let other = open_session(&state, request("p2", "qw89")).unwrap();
        let second = open_session(&state, request("p1", "1HJ8")).unwrap();

        assert_ne!(first.token, second.token);
        assert!(matches!(
            resolve_session(&state, &first.token),
            Err(ServiceError::Unauthorized(_))
        ));
        assert_eq!(
            resolve_session(&state, &second.token).unwrap(),
            Role::Participant("p1".into())
        );
        assert!(resolve_session(&state, &other.token).is_ok());
        assert_eq!(state.sessions().len(), 2);
    }

    #[test]
    fn unknown_token_is_unauthorized() {
        let state = AppState::new(AppConfig::default());
        assert!(matches!(
            resolve_session(&state, "nope"),
            Err(ServiceError::Unauthorized(_))
        ));
    }
}
