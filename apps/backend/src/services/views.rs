//! Read models returned to the operator and pushed in GAME_STARTED.

use serde::Serialize;

use crate::repos::players::Player;
use crate::repos::prizes::{Prize, PrizeStats};
use crate::repos::questions::QuestionStats;
use crate::repos::sessions::Session;

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session: Session,
    /// Join order.
    pub players: Vec<Player>,
    /// Award order.
    pub prizes: Vec<Prize>,
    pub questions: QuestionStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalResult {
    pub id: i64,
    pub name: String,
    pub prize_won: Option<String>,
    pub active: bool,
    pub rounds_participated: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub prizes: PrizeStats,
    pub questions: QuestionStats,
}

/// Outcome of a successful spin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpinOutcome {
    pub round_id: i64,
    pub winner: Player,
    pub prize: Prize,
    /// True when the session was finished as a consequence of this spin.
    pub session_finished: bool,
}
