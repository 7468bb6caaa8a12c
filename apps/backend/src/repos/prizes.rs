//! Prize repository functions. `remaining_units` is only ever written here.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};

use crate::entities::prizes;
use crate::errors::domain::{DomainError, NotFoundKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prize {
    pub id: i64,
    pub name: String,
    pub prize_type: String,
    pub initial_units: i32,
    pub remaining_units: i32,
    pub priority: i32,
}

impl From<prizes::Model> for Prize {
    fn from(m: prizes::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            prize_type: m.prize_type,
            initial_units: m.initial_units,
            remaining_units: m.remaining_units,
            priority: m.priority,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PrizeCreate {
    pub name: String,
    #[serde(rename = "type")]
    pub prize_type: String,
    pub units: i32,
    pub priority: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrizeStats {
    pub total_types: u64,
    pub total_units: i64,
    pub available_types: u64,
}

pub async fn insert_prize<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: PrizeCreate,
) -> Result<Prize, DomainError> {
    let units = dto.units.max(0);
    let active = prizes::ActiveModel {
        id: NotSet,
        name: Set(dto.name),
        prize_type: Set(dto.prize_type),
        initial_units: Set(units),
        remaining_units: Set(units),
        priority: Set(dto.priority),
    };
    Ok(Prize::from(active.insert(conn).await?))
}

pub async fn require_prize<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    prize_id: i64,
) -> Result<Prize, DomainError> {
    prizes::Entity::find_by_id(prize_id)
        .one(conn)
        .await?
        .map(Prize::from)
        .ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Prize, format!("Prize {prize_id} not found"))
        })
}

/// Lowest priority rank among prizes with units left; ties break on id.
pub async fn best_available<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Option<Prize>, DomainError> {
    let row = prizes::Entity::find()
        .filter(prizes::Column::RemainingUnits.gt(0))
        .order_by_asc(prizes::Column::Priority)
        .order_by_asc(prizes::Column::Id)
        .one(conn)
        .await?;
    Ok(row.map(Prize::from))
}

pub async fn has_available<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<bool, DomainError> {
    let n = prizes::Entity::find()
        .filter(prizes::Column::RemainingUnits.gt(0))
        .count(conn)
        .await?;
    Ok(n > 0)
}

/// Single conditional UPDATE: decrement only while units remain.
/// Returns false when the prize was already at zero (or does not exist).
pub async fn decrement_if_positive<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    prize_id: i64,
) -> Result<bool, DomainError> {
    let result = prizes::Entity::update_many()
        .col_expr(
            prizes::Column::RemainingUnits,
            Expr::col(prizes::Column::RemainingUnits).sub(1),
        )
        .filter(prizes::Column::Id.eq(prize_id))
        .filter(prizes::Column::RemainingUnits.gt(0))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn reset_all<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<u64, DomainError> {
    let result = prizes::Entity::update_many()
        .col_expr(
            prizes::Column::RemainingUnits,
            Expr::col(prizes::Column::InitialUnits).into(),
        )
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// All prizes in award order.
pub async fn list_all<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<Vec<Prize>, DomainError> {
    let rows = prizes::Entity::find()
        .order_by_asc(prizes::Column::Priority)
        .order_by_asc(prizes::Column::Id)
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(Prize::from).collect())
}

pub async fn count<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<u64, DomainError> {
    Ok(prizes::Entity::find().count(conn).await?)
}

pub async fn stats<C: ConnectionTrait + Send + Sync>(conn: &C) -> Result<PrizeStats, DomainError> {
    let all = list_all(conn).await?;
    Ok(PrizeStats {
        total_types: all.len() as u64,
        total_units: all.iter().map(|p| i64::from(p.remaining_units)).sum(),
        available_types: all.iter().filter(|p| p.remaining_units > 0).count() as u64,
    })
}
