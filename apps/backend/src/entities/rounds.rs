use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rounds")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "session_id")]
    pub session_id: i64,
    #[sea_orm(column_name = "round_no")]
    pub round_no: i32,
    pub completed: bool,
    #[sea_orm(column_name = "winner_player_id")]
    pub winner_player_id: Option<i64>,
    #[sea_orm(column_name = "prize_id")]
    pub prize_id: Option<i64>,
    #[sea_orm(column_name = "prize_awarded")]
    pub prize_awarded: Option<String>,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
    #[sea_orm(column_name = "completed_at")]
    pub completed_at: Option<OffsetDateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sessions::Entity",
        from = "Column::SessionId",
        to = "super::sessions::Column::Id"
    )]
    Session,
    #[sea_orm(has_many = "super::round_questions::Entity")]
    RoundQuestions,
}

impl Related<super::sessions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl Related<super::round_questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoundQuestions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
