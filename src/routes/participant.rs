use axum::{
    Extension, Json, Router,
    body::Body,
    extract::{Path, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, put},
};
use validator::Validate;

use crate::{
    dto::{
        fixture::{PredictionSummary, ScoreInput},
        santa::RevealResponse,
    },
    error::AppError,
    services::{draw_service, fixture_service, session_service},
    state::{SharedState, auth::Role},
};

const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Endpoints acting on behalf of a logged-in participant.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/matches/{id}/prediction", put(submit_prediction))
        .route("/santa/me", get(reveal))
        .route_layer(middleware::from_fn_with_state(state, require_session))
}

/// Place or edit the caller's prediction. Finished matches answer 409.
#[utoipa::path(
    put,
    path = "/matches/{id}/prediction",
    tag = "participant",
    params(("X-Session-Token" = String, Header, description = "Token issued by POST /session"),
    ("id" = u32, Path, description = "Match identifier")),
    request_body = ScoreInput,
    responses(
        (status = 200, description = "Prediction saved", body = PredictionSummary),
        (status = 400, description = "Invalid score"),
        (status = 409, description = "Match already finished")
    )
)]
pub async fn submit_prediction(
    State(state): State<SharedState>,
    Extension(role): Extension<Role>,
    Path(id): Path<u32>,
    Json(payload): Json<ScoreInput>,
) -> Result<Json<PredictionSummary>, AppError> {
    payload.validate()?;
    let saved = fixture_service::submit_prediction(&state, &role, id, payload).await?;
    Ok(Json(saved))
}

/// Reveal the caller's own gift-exchange receiver.
#[utoipa::path(
    get,
    path = "/santa/me",
    tag = "participant",
    params(("X-Session-Token" = String, Header, description = "Token issued by POST /session")),
    responses((status = 200, description = "Own assignment, or drawn = false", body = RevealResponse))
)]
pub async fn reveal(
    State(state): State<SharedState>,
    Extension(role): Extension<Role>,
) -> Result<Json<RevealResponse>, AppError> {
    Ok(Json(draw_service::reveal(&state, &role).await?))
}

async fn require_session(
    State(state): State<SharedState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(SESSION_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized("missing session header `X-Session-Token`".into())
        })?;

    let role = session_service::resolve_session(&state, token)?;
    req.extensions_mut().insert(role);
    Ok(next.run(req).await)
}
