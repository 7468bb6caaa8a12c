//! Domain-level error type used across services and repos.
//!
//! This error type is HTTP- and DB-agnostic. Handlers return
//! `Result<T, crate::error::AppError>` and convert from `DomainError`
//! through `From<DomainError> for AppError`.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    Timeout,
    DbUnavailable,
    DataCorruption,
    Other(String),
}

/// Lookup misses. Never retried internally.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Session,
    Round,
    Player,
    Question,
    Prize,
    Other(String),
}

/// Rejections of a request that conflicts with current state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    /// Lifecycle transition not allowed from the current status.
    InvalidTransition,
    /// Player name already taken within the session.
    DuplicateName,
    /// Answer already recorded for this (player, round, question).
    DuplicateAnswer,
    /// Prize was depleted between observation and award.
    Depleted,
    JoinCodeConflict,
    Other(String),
}

/// Expected end-of-content conditions the operator UI reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExhaustedKind {
    InsufficientQuestions,
    NoPrizesAvailable,
    NoWinners,
}

/// Input validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    InvalidOption,
    EmptyName,
    InvalidQuestionsPerRound,
    QuestionNotInRound,
    PlayerNotInSession,
    MissingConnectionIdentity,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input/user validation or business rule violation
    Validation(ValidationKind, String),
    /// Semantic conflict
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Content ran out (questions, prizes, winners)
    Exhausted(ExhaustedKind, String),
    /// Infrastructure/operational failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation error {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Exhausted(kind, d) => write!(f, "exhausted {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn exhausted(kind: ExhaustedKind, detail: impl Into<String>) -> Self {
        Self::Exhausted(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    pub fn invalid_transition(detail: impl Into<String>) -> Self {
        Self::Conflict(ConflictKind::InvalidTransition, detail.into())
    }

    /// True for the benign prize-award race.
    pub fn is_depleted(&self) -> bool {
        matches!(self, DomainError::Conflict(ConflictKind::Depleted, _))
    }
}
