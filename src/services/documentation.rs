use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Pitch Club Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::public::list_participants,
        crate::routes::public::open_session,
        crate::routes::public::list_matches,
        crate::routes::public::get_match,
        crate::routes::public::list_predictions,
        crate::routes::public::leaderboard,
        crate::routes::participant::submit_prediction,
        crate::routes::participant::reveal,
        crate::routes::admin::finalize_match,
        crate::routes::admin::mark_live,
        crate::routes::admin::draw,
        crate::routes::admin::clear_draw,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::fixture::MatchSummary,
            crate::dto::fixture::MatchStatusDto,
            crate::dto::fixture::ScoreDto,
            crate::dto::fixture::ScoreInput,
            crate::dto::fixture::PredictionSummary,
            crate::dto::session::ParticipantSummary,
            crate::dto::session::SessionRequest,
            crate::dto::session::SessionResponse,
            crate::dto::leaderboard::StandingDto,
            crate::dto::leaderboard::LeaderboardResponse,
            crate::dto::santa::RevealResponse,
            crate::dto::santa::DrawStatus,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::LeaderboardUpdatedEvent,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "public", description = "Fixtures, predictions, standings and login"),
        (name = "participant", description = "Session-authenticated participant operations"),
        (name = "admin", description = "Commissioner operations guarded by X-Admin-Token"),
    )
)]
pub struct ApiDoc;
