//! Player repository functions.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use time::OffsetDateTime;

use crate::entities::players;
use crate::errors::domain::{DomainError, NotFoundKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub id: i64,
    pub session_id: i64,
    pub name: String,
    pub active: bool,
    pub prize_won: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<players::Model> for Player {
    fn from(m: players::Model) -> Self {
        Self {
            id: m.id,
            session_id: m.session_id,
            name: m.name,
            active: m.active,
            prize_won: m.prize_won,
            created_at: m.created_at,
        }
    }
}

pub async fn create_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
    name: &str,
) -> Result<Player, DomainError> {
    let active = players::ActiveModel {
        id: NotSet,
        session_id: Set(session_id),
        name: Set(name.to_string()),
        active: Set(true),
        prize_won: Set(None),
        created_at: Set(OffsetDateTime::now_utc()),
    };
    Ok(Player::from(active.insert(conn).await?))
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<Option<Player>, DomainError> {
    let row = players::Entity::find_by_id(player_id).one(conn).await?;
    Ok(row.map(Player::from))
}

pub async fn require_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<Player, DomainError> {
    find_by_id(conn, player_id).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Player, format!("Player {player_id} not found"))
    })
}

pub async fn find_by_session_and_name<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
    name: &str,
) -> Result<Option<Player>, DomainError> {
    let row = players::Entity::find()
        .filter(players::Column::SessionId.eq(session_id))
        .filter(players::Column::Name.eq(name))
        .one(conn)
        .await?;
    Ok(row.map(Player::from))
}

/// Players of a session in join order.
pub async fn list_for_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<Vec<Player>, DomainError> {
    let rows = players::Entity::find()
        .filter(players::Column::SessionId.eq(session_id))
        .order_by_asc(players::Column::Id)
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(Player::from).collect())
}

pub async fn active_ids_for_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<Vec<i64>, DomainError> {
    let ids: Vec<i64> = players::Entity::find()
        .select_only()
        .column(players::Column::Id)
        .filter(players::Column::SessionId.eq(session_id))
        .filter(players::Column::Active.eq(true))
        .order_by_asc(players::Column::Id)
        .into_tuple()
        .all(conn)
        .await?;
    Ok(ids)
}

pub async fn count_active<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<u64, DomainError> {
    let n = players::Entity::find()
        .filter(players::Column::SessionId.eq(session_id))
        .filter(players::Column::Active.eq(true))
        .count(conn)
        .await?;
    Ok(n)
}

/// Flip `active` to false and record the prize. Only applies to active
/// players; returns whether the row changed.
pub async fn deactivate_with_prize<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
    prize_name: &str,
) -> Result<bool, DomainError> {
    let result = players::Entity::update_many()
        .col_expr(players::Column::Active, Expr::value(false))
        .col_expr(players::Column::PrizeWon, Expr::value(prize_name.to_string()))
        .filter(players::Column::Id.eq(player_id))
        .filter(players::Column::Active.eq(true))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Delete a player; answers cascade.
pub async fn delete_player<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    player_id: i64,
) -> Result<bool, DomainError> {
    let result = players::Entity::delete_by_id(player_id).exec(conn).await?;
    Ok(result.rows_affected > 0)
}
