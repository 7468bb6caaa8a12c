//! Operator command surface. Authentication is out of scope; these routes
//! are expected to sit behind whatever gate the deployment provides.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::extractors::ValidatedJson;
use crate::repos::players::Player;
use crate::services::round_scheduler::Advance;
use crate::state::app_state::AppState;

const DEFAULT_QUESTIONS_PER_ROUND: u32 = 3;

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub questions_per_round: Option<u32>,
}

#[derive(Debug, Serialize)]
struct WinnersResponse {
    round_id: i64,
    winners: Vec<Player>,
}

#[derive(Debug, Serialize)]
struct AdvanceResponse {
    round_id: i64,
    #[serde(flatten)]
    advance: Advance,
}

#[derive(Debug, Serialize)]
struct FinishResponse {
    session_id: i64,
    finished_now: bool,
}

/// POST /api/admin/sessions
async fn create_session(
    body: ValidatedJson<CreateSessionRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let per_round = body
        .into_inner()
        .questions_per_round
        .unwrap_or(DEFAULT_QUESTIONS_PER_ROUND);
    let session = app_state.orchestrator().create_session(per_round).await?;
    Ok(HttpResponse::Created().json(session))
}

/// GET /api/admin/sessions/{code}
async fn get_snapshot(
    code: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let orchestrator = app_state.orchestrator();
    let session = orchestrator.session_by_code(&code).await?;
    let snapshot = orchestrator.session_snapshot(session.id).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

/// POST /api/admin/sessions/{code}/start
async fn start_session(
    code: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let orchestrator = app_state.orchestrator();
    let session = orchestrator.session_by_code(&code).await?;
    let session = orchestrator.start_session(session.id).await?;
    Ok(HttpResponse::Ok().json(session))
}

/// POST /api/admin/sessions/{code}/rounds
async fn create_round(
    code: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let orchestrator = app_state.orchestrator();
    let session = orchestrator.session_by_code(&code).await?;
    let round = orchestrator.create_round(session.id).await?;
    Ok(HttpResponse::Created().json(round))
}

/// GET /api/admin/sessions/{code}/results
async fn final_results(
    code: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let orchestrator = app_state.orchestrator();
    let session = orchestrator.session_by_code(&code).await?;
    let results = orchestrator.final_results(session.id).await?;
    Ok(HttpResponse::Ok().json(results))
}

/// POST /api/admin/sessions/{code}/finish
async fn finish_session(
    code: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let orchestrator = app_state.orchestrator();
    let session = orchestrator.session_by_code(&code).await?;
    let finished_now = orchestrator.finish_session(session.id).await?;
    Ok(HttpResponse::Ok().json(FinishResponse {
        session_id: session.id,
        finished_now,
    }))
}

/// POST /api/admin/rounds/{id}/advance
async fn advance_question(
    round_id: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let round_id = round_id.into_inner();
    let advance = app_state.orchestrator().advance_question(round_id).await?;
    Ok(HttpResponse::Ok().json(AdvanceResponse { round_id, advance }))
}

/// POST /api/admin/rounds/{id}/end
async fn end_round(
    round_id: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    app_state.orchestrator().end_round(round_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/admin/rounds/{id}/winners
async fn round_winners(
    round_id: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let round_id = round_id.into_inner();
    let winners = app_state
        .orchestrator()
        .resolve_round_winners(round_id)
        .await?;
    Ok(HttpResponse::Ok().json(WinnersResponse { round_id, winners }))
}

/// POST /api/admin/rounds/{id}/spin
///
/// Candidates are the round's current winners.
async fn spin(
    round_id: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let round_id = round_id.into_inner();
    let orchestrator = app_state.orchestrator();
    let round = orchestrator.round(round_id).await?;
    let candidates: Vec<i64> = orchestrator
        .resolve_round_winners(round_id)
        .await?
        .iter()
        .map(|p| p.id)
        .collect();
    let outcome = orchestrator
        .spin_and_award(round.session_id, round_id, &candidates)
        .await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// DELETE /api/admin/players/{id}
async fn remove_player(
    player_id: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    app_state
        .orchestrator()
        .remove_player(player_id.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/admin/prizes
async fn list_prizes(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let prizes = app_state.orchestrator().prizes().await?;
    Ok(HttpResponse::Ok().json(prizes))
}

/// GET /api/admin/stats
async fn catalog_stats(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let stats = app_state.orchestrator().catalog_stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/sessions").route(web::post().to(create_session)))
        .service(web::resource("/sessions/{code}").route(web::get().to(get_snapshot)))
        .service(web::resource("/sessions/{code}/start").route(web::post().to(start_session)))
        .service(web::resource("/sessions/{code}/rounds").route(web::post().to(create_round)))
        .service(web::resource("/sessions/{code}/results").route(web::get().to(final_results)))
        .service(web::resource("/sessions/{code}/finish").route(web::post().to(finish_session)))
        .service(web::resource("/rounds/{id}/advance").route(web::post().to(advance_question)))
        .service(web::resource("/rounds/{id}/end").route(web::post().to(end_round)))
        .service(web::resource("/rounds/{id}/winners").route(web::get().to(round_winners)))
        .service(web::resource("/rounds/{id}/spin").route(web::post().to(spin)))
        .service(web::resource("/players/{id}").route(web::delete().to(remove_player)))
        .service(web::resource("/prizes").route(web::get().to(list_prizes)))
        .service(web::resource("/stats").route(web::get().to(catalog_stats)));
}
