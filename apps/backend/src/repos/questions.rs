//! Question catalog repository functions.

use std::collections::HashMap;

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use crate::domain::AnswerOption;
use crate::entities::questions;
use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: i64,
    pub text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_option: AnswerOption,
    pub used: bool,
}

impl TryFrom<questions::Model> for Question {
    type Error = DomainError;

    fn try_from(m: questions::Model) -> Result<Self, Self::Error> {
        let correct_option = m.correct_option.parse::<AnswerOption>().map_err(|_| {
            DomainError::infra(
                InfraErrorKind::DataCorruption,
                format!("Question {} has invalid correct option", m.id),
            )
        })?;
        Ok(Self {
            id: m.id,
            text: m.text,
            option_a: m.option_a,
            option_b: m.option_b,
            option_c: m.option_c,
            option_d: m.option_d,
            correct_option,
            used: m.used,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuestionCreate {
    pub text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_option: AnswerOption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuestionStats {
    pub total: u64,
    pub used: u64,
    pub available: u64,
}

pub async fn insert_question<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: QuestionCreate,
) -> Result<Question, DomainError> {
    let active = questions::ActiveModel {
        id: NotSet,
        text: Set(dto.text),
        option_a: Set(dto.option_a),
        option_b: Set(dto.option_b),
        option_c: Set(dto.option_c),
        option_d: Set(dto.option_d),
        correct_option: Set(dto.correct_option.as_str().to_string()),
        used: Set(false),
    };
    Question::try_from(active.insert(conn).await?)
}

pub async fn require_question<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    question_id: i64,
) -> Result<Question, DomainError> {
    let row = questions::Entity::find_by_id(question_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Question,
                format!("Question {question_id} not found"),
            )
        })?;
    Question::try_from(row)
}

/// Load questions preserving the order of `ids`. Missing ids are skipped.
pub async fn find_many<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ids: &[i64],
) -> Result<Vec<Question>, DomainError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = questions::Entity::find()
        .filter(questions::Column::Id.is_in(ids.iter().copied()))
        .all(conn)
        .await?;
    let mut by_id: HashMap<i64, questions::Model> = rows.into_iter().map(|m| (m.id, m)).collect();
    ids.iter()
        .filter_map(|id| by_id.remove(id))
        .map(Question::try_from)
        .collect()
}

pub async fn unused_ids<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<Vec<i64>, DomainError> {
    let ids: Vec<i64> = questions::Entity::find()
        .select_only()
        .column(questions::Column::Id)
        .filter(questions::Column::Used.eq(false))
        .order_by_asc(questions::Column::Id)
        .into_tuple()
        .all(conn)
        .await?;
    Ok(ids)
}

/// Mark questions used. Returns how many were still unused before the call.
pub async fn mark_used<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ids: &[i64],
) -> Result<u64, DomainError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let result = questions::Entity::update_many()
        .col_expr(questions::Column::Used, Expr::value(true))
        .filter(questions::Column::Id.is_in(ids.iter().copied()))
        .filter(questions::Column::Used.eq(false))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

pub async fn reset_all<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<u64, DomainError> {
    let result = questions::Entity::update_many()
        .col_expr(questions::Column::Used, Expr::value(false))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

pub async fn stats<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<QuestionStats, DomainError> {
    let total = questions::Entity::find().count(conn).await?;
    let used = questions::Entity::find()
        .filter(questions::Column::Used.eq(true))
        .count(conn)
        .await?;
    Ok(QuestionStats {
        total,
        used,
        available: total.saturating_sub(used),
    })
}
