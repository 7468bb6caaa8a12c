// Unit tests for error mapping - pure domain logic without HTTP or database dependencies
use crate::errors::domain::{
    ConflictKind, DomainError, ExhaustedKind, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::{AppError, ErrorCode};

#[test]
fn maps_validation_to_422() {
    let de = DomainError::validation(ValidationKind::InvalidOption, "option must be A-D");
    let app: AppError = de.into();
    assert_eq!(app.code(), ErrorCode::InvalidOption);
    assert_eq!(app.status().as_u16(), 422);

    let other = DomainError::validation(ValidationKind::Other("x".into()), "bad field");
    let app: AppError = other.into();
    assert_eq!(app.code(), ErrorCode::ValidationError);
}

#[test]
fn maps_conflicts() {
    let dup = DomainError::conflict(ConflictKind::DuplicateAnswer, "already answered");
    let app: AppError = dup.into();
    assert_eq!(app.code().as_str(), "DUPLICATE_ANSWER");
    assert_eq!(app.status().as_u16(), 409);

    let transition = DomainError::invalid_transition("session already finished");
    let app: AppError = transition.into();
    assert_eq!(app.code().as_str(), "INVALID_TRANSITION");
    assert_eq!(app.status().as_u16(), 409);

    let other = DomainError::conflict(ConflictKind::Other("Unique".into()), "generic conflict");
    let app: AppError = other.into();
    assert_eq!(app.code().as_str(), "CONFLICT");
    assert_eq!(app.status().as_u16(), 409);
}

#[test]
fn maps_not_found() {
    let nf = DomainError::not_found(NotFoundKind::Session, "no session");
    let app: AppError = nf.into();
    assert_eq!(app.code().as_str(), "SESSION_NOT_FOUND");
    assert_eq!(app.status().as_u16(), 404);

    let q = DomainError::not_found(NotFoundKind::Question, "no question");
    let app: AppError = q.into();
    assert_eq!(app.code(), ErrorCode::QuestionNotFound);
}

#[test]
fn maps_exhausted_to_conflict_status() {
    let none = DomainError::exhausted(ExhaustedKind::NoPrizesAvailable, "no prizes left");
    let app: AppError = none.into();
    assert_eq!(app.code().as_str(), "NO_PRIZES_AVAILABLE");
    assert_eq!(app.status().as_u16(), 409);

    let winners = DomainError::exhausted(ExhaustedKind::NoWinners, "nobody won");
    let app: AppError = winners.into();
    assert_eq!(app.code(), ErrorCode::NoWinners);
}

#[test]
fn maps_infra() {
    let t = DomainError::infra(InfraErrorKind::Timeout, "timeout");
    let app: AppError = t.into();
    assert_eq!(app.code().as_str(), "DB_TIMEOUT");
    assert_eq!(app.status().as_u16(), 504);
    assert!(matches!(app, AppError::Timeout { .. }));

    let down = DomainError::infra(InfraErrorKind::DbUnavailable, "down");
    let app: AppError = down.into();
    assert_eq!(app.code().as_str(), "DB_UNAVAILABLE");
    assert_eq!(app.status().as_u16(), 503);

    let corr = DomainError::infra(InfraErrorKind::DataCorruption, "bad");
    let app: AppError = corr.into();
    assert_eq!(app.code().as_str(), "DATA_CORRUPTION");
    assert_eq!(app.status().as_u16(), 500);

    let other = DomainError::infra(InfraErrorKind::Other("unknown".to_string()), "other");
    let app: AppError = other.into();
    assert_eq!(app.code().as_str(), "DB_ERROR");
    assert_eq!(app.status().as_u16(), 500);
}
