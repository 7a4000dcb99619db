use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::{
        fixture::{MatchSummary, PredictionSummary},
        leaderboard::LeaderboardResponse,
        session::{ParticipantSummary, SessionRequest, SessionResponse},
    },
    error::AppError,
    services::{fixture_service, leaderboard_service, session_service},
    state::SharedState,
};

/// Read-only tournament data and participant login.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/participants", get(list_participants))
        .route("/session", post(open_session))
        .route("/matches", get(list_matches))
        .route("/matches/{id}", get(get_match))
        .route("/predictions", get(list_predictions))
        .route("/leaderboard", get(leaderboard))
}

/// List roster members in roster order.
#[utoipa::path(
    get,
    path = "/participants",
    tag = "public",
    responses((status = 200, description = "Roster", body = [ParticipantSummary]))
)]
pub async fn list_participants(State(state): State<SharedState>) -> Json<Vec<ParticipantSummary>> {
    Json(session_service::list_participants(&state))
}

/// Exchange a participant id and access code for a session token.
#[utoipa::path(
    post,
    path = "/session",
    tag = "public",
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Session opened", body = SessionResponse),
        (status = 401, description = "Wrong access code"),
        (status = 404, description = "Unknown participant")
    )
)]
pub async fn open_session(
    State(state): State<SharedState>,
    Json(payload): Json<SessionRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    payload.validate()?;
    Ok(Json(session_service::open_session(&state, payload)?))
}

#[utoipa::path(
    get,
    path = "/matches",
    tag = "public",
    responses((status = 200, description = "Matches ordered by id", body = [MatchSummary]))
)]
pub async fn list_matches(
    State(state): State<SharedState>,
) -> Result<Json<Vec<MatchSummary>>, AppError> {
    Ok(Json(fixture_service::list_matches(&state).await?))
}

#[utoipa::path(
    get,
    path = "/matches/{id}",
    tag = "public",
    params(("id" = u32, Path, description = "Match identifier")),
    responses(
        (status = 200, description = "Match", body = MatchSummary),
        (status = 404, description = "Unknown match")
    )
)]
pub async fn get_match(
    State(state): State<SharedState>,
    Path(id): Path<u32>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(fixture_service::get_match(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/predictions",
    tag = "public",
    responses((status = 200, description = "Every stored prediction", body = [PredictionSummary]))
)]
pub async fn list_predictions(
    State(state): State<SharedState>,
) -> Result<Json<Vec<PredictionSummary>>, AppError> {
    Ok(Json(fixture_service::list_predictions(&state).await?))
}

/// Ranked standings; `stale` is set when the store could not be read.
#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "public",
    responses((status = 200, description = "Leaderboard", body = LeaderboardResponse))
)]
pub async fn leaderboard(State(state): State<SharedState>) -> Json<LeaderboardResponse> {
    Json(leaderboard_service::leaderboard(&state).await)
}
