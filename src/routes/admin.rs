use axum::{
    Extension, Json, Router,
    body::Body,
    extract::{Path, State},
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::post,
};
use validator::Validate;

use crate::{
    dto::{
        fixture::{MatchSummary, ScoreInput},
        santa::DrawStatus,
    },
    error::AppError,
    services::{draw_service, finalization_service},
    state::{
        SharedState,
        auth::{CommissionerGrant, Role},
    },
};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Commissioner-only endpoints: results and the gift-exchange draw.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/matches/{id}/finalize", post(finalize_match))
        .route("/admin/matches/{id}/live", post(mark_live))
        .route("/admin/santa/draw", post(draw).delete(clear_draw))
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

/// Record or correct the final score of a match.
#[utoipa::path(
    post,
    path = "/admin/matches/{id}/finalize",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Commissioner secret"),
    ("id" = u32, Path, description = "Match identifier")),
    request_body = ScoreInput,
    responses(
        (status = 200, description = "Match finalized", body = MatchSummary),
        (status = 400, description = "Invalid score"),
        (status = 404, description = "Unknown match")
    )
)]
pub async fn finalize_match(
    State(state): State<SharedState>,
    Extension(role): Extension<Role>,
    Path(id): Path<u32>,
    Json(payload): Json<ScoreInput>,
) -> Result<Json<MatchSummary>, AppError> {
    payload.validate()?;
    let updated = finalization_service::finalize_match(&state, id, payload, &role).await?;
    Ok(Json(updated))
}

/// Mark a match as in play and clear its result.
#[utoipa::path(
    post,
    path = "/admin/matches/{id}/live",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Commissioner secret"),
    ("id" = u32, Path, description = "Match identifier")),
    responses((status = 200, description = "Match is live", body = MatchSummary))
)]
pub async fn mark_live(
    State(state): State<SharedState>,
    Extension(role): Extension<Role>,
    Path(id): Path<u32>,
) -> Result<Json<MatchSummary>, AppError> {
    Ok(Json(finalization_service::mark_live(&state, id, &role).await?))
}

/// Draw a new gift-exchange cycle, discarding the previous one.
#[utoipa::path(
    post,
    path = "/admin/santa/draw",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Commissioner secret")),
    responses(
        (status = 200, description = "Draw made; pairings are not returned", body = DrawStatus),
        (status = 400, description = "Roster too small")
    )
)]
pub async fn draw(
    State(state): State<SharedState>,
    Extension(role): Extension<Role>,
) -> Result<Json<DrawStatus>, AppError> {
    Ok(Json(draw_service::draw(&state, &role).await?))
}

#[utoipa::path(
    delete,
    path = "/admin/santa/draw",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Commissioner secret")),
    responses((status = 200, description = "Draw cleared", body = DrawStatus))
)]
pub async fn clear_draw(
    State(state): State<SharedState>,
    Extension(role): Extension<Role>,
) -> Result<Json<DrawStatus>, AppError> {
    Ok(Json(draw_service::clear(&state, &role).await?))
}

async fn require_admin_token(
    State(state): State<SharedState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;

    let grant = CommissionerGrant::verify(state.config().commissioner_secret(), provided)
        .ok_or_else(|| AppError::Unauthorized("invalid admin token".into()))?;

    req.extensions_mut().insert(Role::Commissioner(grant));
    Ok(next.run(req).await)
}
