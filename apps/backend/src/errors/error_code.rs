//! Error codes surfaced in HTTP problem details.
//!
//! Every code renders as SCREAMING_SNAKE_CASE and is part of the public API,
//! so renaming a variant's string is a breaking change for clients.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Request validation
    InvalidOption,
    EmptyName,
    InvalidQuestionsPerRound,
    QuestionNotInRound,
    PlayerNotInSession,
    MissingConnectionIdentity,
    ValidationError,
    BadRequest,

    // Resource not found
    SessionNotFound,
    RoundNotFound,
    PlayerNotFound,
    QuestionNotFound,
    PrizeNotFound,
    NotFound,

    // State conflicts
    InvalidTransition,
    DuplicateName,
    DuplicateAnswer,
    Depleted,
    JoinCodeConflict,
    Conflict,

    // Content exhausted
    InsufficientQuestions,
    NoPrizesAvailable,
    NoWinners,

    // System
    DbError,
    DbUnavailable,
    DbTimeout,
    DataCorruption,
    Internal,
    ConfigError,
}

impl ErrorCode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidOption => "INVALID_OPTION",
            Self::EmptyName => "EMPTY_NAME",
            Self::InvalidQuestionsPerRound => "INVALID_QUESTIONS_PER_ROUND",
            Self::QuestionNotInRound => "QUESTION_NOT_IN_ROUND",
            Self::PlayerNotInSession => "PLAYER_NOT_IN_SESSION",
            Self::MissingConnectionIdentity => "MISSING_CONNECTION_IDENTITY",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",

            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::RoundNotFound => "ROUND_NOT_FOUND",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::QuestionNotFound => "QUESTION_NOT_FOUND",
            Self::PrizeNotFound => "PRIZE_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::InvalidTransition => "INVALID_TRANSITION",
            Self::DuplicateName => "DUPLICATE_NAME",
            Self::DuplicateAnswer => "DUPLICATE_ANSWER",
            Self::Depleted => "DEPLETED",
            Self::JoinCodeConflict => "JOIN_CODE_CONFLICT",
            Self::Conflict => "CONFLICT",

            Self::InsufficientQuestions => "INSUFFICIENT_QUESTIONS",
            Self::NoPrizesAvailable => "NO_PRIZES_AVAILABLE",
            Self::NoWinners => "NO_WINNERS",

            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
