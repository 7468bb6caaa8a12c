//! Session repository functions.

use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, Set};
use serde::Serialize;
use time::OffsetDateTime;

use crate::entities::sessions;
use crate::entities::sessions::SessionStatus;
use crate::errors::domain::{DomainError, NotFoundKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub id: i64,
    pub join_code: String,
    pub status: SessionStatus,
    pub questions_per_round: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<sessions::Model> for Session {
    fn from(m: sessions::Model) -> Self {
        Self {
            id: m.id,
            join_code: m.join_code,
            status: m.status,
            questions_per_round: m.questions_per_round.max(0) as u32,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub async fn create_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    join_code: &str,
    questions_per_round: u32,
) -> Result<Session, DomainError> {
    let now = OffsetDateTime::now_utc();
    let active = sessions::ActiveModel {
        id: NotSet,
        join_code: Set(join_code.to_string()),
        status: Set(SessionStatus::Waiting),
        questions_per_round: Set(questions_per_round as i32),
        created_at: Set(now),
        updated_at: Set(now),
    };
    Ok(Session::from(active.insert(conn).await?))
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<Option<Session>, DomainError> {
    let row = sessions::Entity::find_by_id(session_id).one(conn).await?;
    Ok(row.map(Session::from))
}

pub async fn require_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
) -> Result<Session, DomainError> {
    find_by_id(conn, session_id).await?.ok_or_else(|| {
        DomainError::not_found(
            NotFoundKind::Session,
            format!("Session {session_id} not found"),
        )
    })
}

pub async fn find_by_join_code<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    join_code: &str,
) -> Result<Option<Session>, DomainError> {
    let row = sessions::Entity::find()
        .filter(sessions::Column::JoinCode.eq(join_code))
        .one(conn)
        .await?;
    Ok(row.map(Session::from))
}

pub async fn require_by_join_code<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    join_code: &str,
) -> Result<Session, DomainError> {
    find_by_join_code(conn, join_code).await?.ok_or_else(|| {
        DomainError::not_found(
            NotFoundKind::Session,
            format!("Session with code '{join_code}' not found"),
        )
    })
}

pub async fn join_code_exists<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    join_code: &str,
) -> Result<bool, DomainError> {
    Ok(find_by_join_code(conn, join_code).await?.is_some())
}

/// Conditional status change: only applies while the row is in `from`.
/// Returns whether the row changed.
pub async fn transition_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: i64,
    from: SessionStatus,
    to: SessionStatus,
) -> Result<bool, DomainError> {
    let result = sessions::Entity::update_many()
        .col_expr(sessions::Column::Status, Expr::value(to))
        .col_expr(
            sessions::Column::UpdatedAt,
            Expr::value(OffsetDateTime::now_utc()),
        )
        .filter(sessions::Column::Id.eq(session_id))
        .filter(sessions::Column::Status.eq(from))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}
