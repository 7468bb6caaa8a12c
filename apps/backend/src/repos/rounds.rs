//! Round repository functions.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;
use time::OffsetDateTime;

use crate::entities::{round_questions, rounds};
use crate::errors::domain::{DomainError, NotFoundKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Round {
    pub id: i64,
    pub session_id: i64,
    pub round_no: u32,
    pub completed: bool,
    pub winner_player_id: Option<i64>,
    pub prize_id: Option<i64>,
    pub prize_awarded: Option<String>,
    /// Ordered, fixed at creation.
    pub question_ids: Vec<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
}

impl Round {
    fn from_parts(m: rounds::Model, question_ids: Vec<i64>) -> Self {
        Self {
            id: m.id,
            session_id: m.session_id,
            round_no: m.round_no.max(0) as u32,
            completed: m.completed,
            winner_player_id: m.winner_player_id,
            prize_id: m.prize_id,
            prize_awarded: m.prize_awarded,
            question_ids,
            created_at: m.created_at,
            completed_at: m.completed_at,
        }
    }
}

/// Highest round number used so far in the session (0 when none).
pub async fn max_round_no<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<u32, DomainError> {
    let last = rounds::Entity::find()
        .filter(rounds::Column::SessionId.eq(session_id))
        .order_by_desc(rounds::Column::RoundNo)
        .one(conn)
        .await?;
    Ok(last.map(|r| r.round_no.max(0) as u32).unwrap_or(0))
}

/// Insert the round row and its ordered question list.
pub async fn create_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
    round_no: u32,
    question_ids: &[i64],
) -> Result<Round, DomainError> {
    let active = rounds::ActiveModel {
        id: NotSet,
        session_id: Set(session_id),
        round_no: Set(round_no as i32),
        completed: Set(false),
        winner_player_id: Set(None),
        prize_id: Set(None),
        prize_awarded: Set(None),
        created_at: Set(OffsetDateTime::now_utc()),
        completed_at: Set(None),
    };
    let round = active.insert(conn).await?;

    if !question_ids.is_empty() {
        let links = question_ids
            .iter()
            .enumerate()
            .map(|(pos, qid)| round_questions::ActiveModel {
                id: NotSet,
                round_id: Set(round.id),
                position: Set(pos as i32),
                question_id: Set(*qid),
            });
        round_questions::Entity::insert_many(links).exec(conn).await?;
    }

    Ok(Round::from_parts(round, question_ids.to_vec()))
}

pub async fn question_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Vec<i64>, DomainError> {
    let ids: Vec<i64> = round_questions::Entity::find()
        .select_only()
        .column(round_questions::Column::QuestionId)
        .filter(round_questions::Column::RoundId.eq(round_id))
        .order_by_asc(round_questions::Column::Position)
        .into_tuple()
        .all(conn)
        .await?;
    Ok(ids)
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Option<Round>, DomainError> {
    let Some(row) = rounds::Entity::find_by_id(round_id).one(conn).await? else {
        return Ok(None);
    };
    let qids = question_ids(conn, round_id).await?;
    Ok(Some(Round::from_parts(row, qids)))
}

pub async fn require_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Round, DomainError> {
    find_by_id(conn, round_id).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Round, format!("Round {round_id} not found"))
    })
}

/// One-way latch: sets winner and prize only while the round is still open.
/// Returns whether the row changed.
pub async fn complete_with_winner<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
    winner_player_id: i64,
    prize_id: i64,
    prize_name: &str,
) -> Result<bool, DomainError> {
    let result = rounds::Entity::update_many()
        .col_expr(rounds::Column::Completed, Expr::value(true))
        .col_expr(rounds::Column::WinnerPlayerId, Expr::value(winner_player_id))
        .col_expr(rounds::Column::PrizeId, Expr::value(prize_id))
        .col_expr(
            rounds::Column::PrizeAwarded,
            Expr::value(prize_name.to_string()),
        )
        .col_expr(
            rounds::Column::CompletedAt,
            Expr::value(OffsetDateTime::now_utc()),
        )
        .filter(rounds::Column::Id.eq(round_id))
        .filter(rounds::Column::Completed.eq(false))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn list_for_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<Vec<rounds::Model>, DomainError> {
    Ok(rounds::Entity::find()
        .filter(rounds::Column::SessionId.eq(session_id))
        .order_by_asc(rounds::Column::RoundNo)
        .all(conn)
        .await?)
}
