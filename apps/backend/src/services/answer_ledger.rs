//! Answer recording and the round-winner query.

use sea_orm::ConnectionTrait;
use serde::Serialize;
use tracing::debug;

use crate::domain::winners::{round_winners, AnswerRecord};
use crate::domain::AnswerOption;
use crate::entities::sessions::SessionStatus;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::repos::answers::{self, AnswerCreate};
use crate::repos::players::{self, Player};
use crate::repos::{questions, rounds, sessions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
    pub is_correct: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AnswerLedger;

impl AnswerLedger {
    pub fn new() -> Self {
        Self
    }

    /// Persist one answer and report whether it was correct.
    ///
    /// The first submission for a (player, round, question) counts; later
    /// ones fail with `DuplicateAnswer`.
    pub async fn record<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        player_id: i64,
        round_id: i64,
        question_id: i64,
        given: AnswerOption,
    ) -> Result<AnswerOutcome, DomainError> {
        let question = questions::require_question(conn, question_id).await?;
        let round = rounds::require_round(conn, round_id).await?;
        if round.completed {
            return Err(DomainError::invalid_transition(format!(
                "Round {round_id} is already settled"
            )));
        }
        let session = sessions::require_session(conn, round.session_id).await?;
        if session.status != SessionStatus::Running {
            return Err(DomainError::invalid_transition(format!(
                "Session {} is {}; answers are closed",
                session.id, session.status
            )));
        }
        if !round.question_ids.contains(&question_id) {
            return Err(DomainError::validation(
                ValidationKind::QuestionNotInRound,
                format!("Question {question_id} is not part of round {round_id}"),
            ));
        }
        let player = players::require_player(conn, player_id).await?;
        if player.session_id != round.session_id {
            return Err(DomainError::validation(
                ValidationKind::PlayerNotInSession,
                format!("Player {player_id} does not belong to this round's session"),
            ));
        }
        if answers::exists(conn, player_id, round_id, question_id).await? {
            return Err(DomainError::conflict(
                ConflictKind::DuplicateAnswer,
                "Answer already recorded for this question",
            ));
        }

        let is_correct = question.correct_option == given;
        answers::insert_answer(
            conn,
            AnswerCreate {
                player_id,
                round_id,
                question_id,
                given_option: given,
                is_correct,
            },
        )
        .await?;

        debug!(player_id, round_id, question_id, is_correct, "answer recorded");
        Ok(AnswerOutcome { is_correct })
    }

    /// Active players of the round's session who answered every question of
    /// the round correctly, computed from persisted answers.
    pub async fn winners_of<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        round_id: i64,
    ) -> Result<Vec<Player>, DomainError> {
        let round = rounds::require_round(conn, round_id).await?;
        let session_players = players::list_for_session(conn, round.session_id).await?;
        let eligible: Vec<i64> = session_players
            .iter()
            .filter(|p| p.active)
            .map(|p| p.id)
            .collect();

        let records: Vec<AnswerRecord> = answers::list_for_round(conn, round_id)
            .await?
            .into_iter()
            .map(|a| AnswerRecord {
                player_id: a.player_id,
                question_id: a.question_id,
                is_correct: a.is_correct,
            })
            .collect();

        let winner_ids = round_winners(&round.question_ids, &eligible, &records);
        Ok(session_players
            .into_iter()
            .filter(|p| winner_ids.contains(&p.id))
            .collect())
    }
}
