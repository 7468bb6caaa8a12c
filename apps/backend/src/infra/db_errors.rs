//! SeaORM -> DomainError translation helpers.
//!
//! Repos convert `sea_orm::DbErr` into `DomainError` here (usually through
//! `?` and the `From` impl below); handlers then map `DomainError` to
//! `AppError`.

use tracing::{error, warn};

use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::trace_ctx;

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

/// Extract `table.column` from SQLite "UNIQUE constraint failed: table.column" messages.
///
/// Composite indexes list every column (`t.a, t.b`); only the first is returned.
fn extract_sqlite_table_column(error_msg: &str) -> Option<&str> {
    let marker = "UNIQUE constraint failed: ";
    let start = error_msg.find(marker)? + marker.len();
    error_msg[start..]
        .split(|c: char| c.is_whitespace() || c == ',' || c == '"')
        .next()
        .filter(|s| !s.is_empty())
}

fn map_sqlite_table_column_to_conflict(table_column: &str) -> Option<(ConflictKind, &'static str)> {
    match table_column {
        "sessions.join_code" => Some((ConflictKind::JoinCodeConflict, "Join code already exists")),
        "players.session_id" => Some((
            ConflictKind::DuplicateName,
            "Name already taken in this session",
        )),
        "player_answers.player_id" => Some((
            ConflictKind::DuplicateAnswer,
            "Answer already recorded for this question",
        )),
        "rounds.session_id" => Some((
            ConflictKind::Other("RoundNumber".into()),
            "Round number already exists for this session",
        )),
        _ => None,
    }
}

fn map_postgres_constraint_to_conflict(error_msg: &str) -> Option<(ConflictKind, &'static str)> {
    if error_msg.contains("ux_sessions_join_code") {
        return Some((ConflictKind::JoinCodeConflict, "Join code already exists"));
    }
    if error_msg.contains("ux_players_session_name") {
        return Some((
            ConflictKind::DuplicateName,
            "Name already taken in this session",
        ));
    }
    if error_msg.contains("ux_player_answers_player_round_question") {
        return Some((
            ConflictKind::DuplicateAnswer,
            "Answer already recorded for this question",
        ));
    }
    if error_msg.contains("ux_rounds_session_round_no") {
        return Some((
            ConflictKind::Other("RoundNumber".into()),
            "Round number already exists for this session",
        ));
    }
    None
}

/// Translate a `DbErr` into a `DomainError` with a sanitized detail.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let error_msg = e.to_string();
    let trace_id = trace_ctx::trace_id();

    match &e {
        sea_orm::DbErr::RecordNotFound(_) => {
            return DomainError::not_found(NotFoundKind::Other("Record".into()), "Record not found");
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(trace_id = %trace_id, raw_error = %error_msg, "Database unavailable");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        _ => {}
    }

    if mentions_sqlstate(&error_msg, "23505")
        || error_msg.contains("duplicate key value violates unique constraint")
        || error_msg.contains("UNIQUE constraint failed")
    {
        warn!(trace_id = %trace_id, raw_error = %error_msg, "Unique constraint violation");

        if let Some(table_column) = extract_sqlite_table_column(&error_msg) {
            if let Some((kind, detail)) = map_sqlite_table_column_to_conflict(table_column) {
                return DomainError::conflict(kind, detail);
            }
        }

        if let Some((kind, detail)) = map_postgres_constraint_to_conflict(&error_msg) {
            return DomainError::conflict(kind, detail);
        }

        return DomainError::conflict(
            ConflictKind::Other("Unique".into()),
            "Unique constraint violation",
        );
    }

    if mentions_sqlstate(&error_msg, "23503") || error_msg.contains("FOREIGN KEY constraint failed")
    {
        warn!(trace_id = %trace_id, raw_error = %error_msg, "Foreign key constraint violation");
        return DomainError::validation(
            ValidationKind::Other("ForeignKey".into()),
            "Foreign key constraint violation",
        );
    }

    if mentions_sqlstate(&error_msg, "23514") || error_msg.contains("CHECK constraint failed") {
        warn!(trace_id = %trace_id, raw_error = %error_msg, "Check constraint violation");
        return DomainError::validation(
            ValidationKind::Other("Check".into()),
            "Check constraint violation",
        );
    }

    if error_msg.contains("timeout") || error_msg.contains("pool timed out") {
        warn!(trace_id = %trace_id, raw_error = %error_msg, "Database timeout or pool issue");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    error!(trace_id = %trace_id, raw_error = %error_msg, "Unhandled database error");
    DomainError::infra(
        InfraErrorKind::Other("DbErr".into()),
        "Database operation failed",
    )
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        map_db_err(e)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbErr, RuntimeErr};

    use super::*;

    fn exec_err(msg: &str) -> DbErr {
        DbErr::Exec(RuntimeErr::Internal(msg.to_string()))
    }

    #[test]
    fn sqlite_composite_unique_maps_to_duplicate_answer() {
        let err = exec_err(
            "error returned from database: (code: 2067) UNIQUE constraint failed: player_answers.player_id, player_answers.round_id, player_answers.question_id",
        );
        assert!(matches!(
            map_db_err(err),
            DomainError::Conflict(ConflictKind::DuplicateAnswer, _)
        ));
    }

    #[test]
    fn postgres_join_code_unique_maps_to_join_code_conflict() {
        let err = exec_err(
            "duplicate key value violates unique constraint \"ux_sessions_join_code\" SQLSTATE(23505)",
        );
        assert!(matches!(
            map_db_err(err),
            DomainError::Conflict(ConflictKind::JoinCodeConflict, _)
        ));
    }

    #[test]
    fn unknown_unique_falls_back_to_generic_conflict() {
        let err = exec_err("UNIQUE constraint failed: other.thing");
        assert!(matches!(
            map_db_err(err),
            DomainError::Conflict(ConflictKind::Other(_), _)
        ));
    }

    #[test]
    fn record_not_found_maps_to_not_found() {
        let err = DbErr::RecordNotFound("rounds".into());
        assert!(matches!(map_db_err(err), DomainError::NotFound(_, _)));
    }

    #[test]
    fn unrecognized_errors_are_infra() {
        let err = exec_err("syntax error near SELEKT");
        assert!(matches!(map_db_err(err), DomainError::Infra(_, _)));
    }
}
