//! Participant-facing routes: session lookup, joining, answering.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::entities::sessions::SessionStatus;
use crate::error::AppError;
use crate::extractors::ValidatedJson;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub player_id: i64,
    pub round_id: i64,
    pub question_id: i64,
    pub answer: String,
}

/// Public view of a session; no player list.
#[derive(Debug, Serialize)]
struct SessionInfo {
    id: i64,
    join_code: String,
    status: SessionStatus,
    questions_per_round: u32,
}

#[derive(Debug, Serialize)]
struct AnswerResponse {
    is_correct: bool,
}

/// GET /api/sessions/{code}
async fn get_session(
    code: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let session = app_state.orchestrator().session_by_code(&code).await?;
    Ok(HttpResponse::Ok().json(SessionInfo {
        id: session.id,
        join_code: session.join_code,
        status: session.status,
        questions_per_round: session.questions_per_round,
    }))
}

/// POST /api/sessions/{code}/join
async fn join_session(
    code: web::Path<String>,
    body: ValidatedJson<JoinRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let name = body.into_inner().name;
    let player = app_state.orchestrator().join_session(&code, &name).await?;
    Ok(HttpResponse::Created().json(player))
}

/// GET /api/players/{id}
async fn get_player(
    player_id: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let player = app_state
        .orchestrator()
        .player(player_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(player))
}

/// POST /api/answers
async fn submit_answer(
    body: ValidatedJson<AnswerRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let outcome = app_state
        .orchestrator()
        .record_answer(req.player_id, req.round_id, req.question_id, &req.answer)
        .await?;
    Ok(HttpResponse::Ok().json(AnswerResponse {
        is_correct: outcome.is_correct,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/sessions/{code}").route(web::get().to(get_session)))
        .service(web::resource("/sessions/{code}/join").route(web::post().to(join_session)))
        .service(web::resource("/players/{id}").route(web::get().to(get_player)))
        .service(web::resource("/answers").route(web::post().to(submit_answer)));
}
