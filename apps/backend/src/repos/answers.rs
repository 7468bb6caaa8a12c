//! Answer ledger persistence.

use std::collections::{HashMap, HashSet};

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use time::OffsetDateTime;

use crate::domain::AnswerOption;
use crate::entities::player_answers;
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerCreate {
    pub player_id: i64,
    pub round_id: i64,
    pub question_id: i64,
    pub given_option: AnswerOption,
    pub is_correct: bool,
}

pub async fn exists<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
    round_id: i64,
    question_id: i64,
) -> Result<bool, DomainError> {
    let n = player_answers::Entity::find()
        .filter(player_answers::Column::PlayerId.eq(player_id))
        .filter(player_answers::Column::RoundId.eq(round_id))
        .filter(player_answers::Column::QuestionId.eq(question_id))
        .count(conn)
        .await?;
    Ok(n > 0)
}

pub async fn insert_answer<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: AnswerCreate,
) -> Result<player_answers::Model, DomainError> {
    let active = player_answers::ActiveModel {
        id: NotSet,
        player_id: Set(dto.player_id),
        round_id: Set(dto.round_id),
        question_id: Set(dto.question_id),
        given_option: Set(dto.given_option.as_str().to_string()),
        is_correct: Set(dto.is_correct),
        created_at: Set(OffsetDateTime::now_utc()),
    };
    Ok(active.insert(conn).await?)
}

pub async fn list_for_round<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    round_id: i64,
) -> Result<Vec<player_answers::Model>, DomainError> {
    Ok(player_answers::Entity::find()
        .filter(player_answers::Column::RoundId.eq(round_id))
        .order_by_asc(player_answers::Column::Id)
        .all(conn)
        .await?)
}

/// Number of distinct rounds each player has answered in.
pub async fn rounds_participated<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_ids: &[i64],
) -> Result<HashMap<i64, u32>, DomainError> {
    if player_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let pairs: Vec<(i64, i64)> = player_answers::Entity::find()
        .select_only()
        .column(player_answers::Column::PlayerId)
        .column(player_answers::Column::RoundId)
        .filter(player_answers::Column::PlayerId.is_in(player_ids.iter().copied()))
        .into_tuple()
        .all(conn)
        .await?;

    let mut seen: HashSet<(i64, i64)> = HashSet::new();
    let mut out: HashMap<i64, u32> = HashMap::new();
    for pair in pairs {
        if seen.insert(pair) {
            *out.entry(pair.0).or_insert(0) += 1;
        }
    }
    Ok(out)
}
