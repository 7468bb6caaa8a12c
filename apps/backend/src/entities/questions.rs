use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_type = "Text")]
    pub text: String,
    #[sea_orm(column_name = "option_a")]
    pub option_a: String,
    #[sea_orm(column_name = "option_b")]
    pub option_b: String,
    #[sea_orm(column_name = "option_c")]
    pub option_c: String,
    #[sea_orm(column_name = "option_d")]
    pub option_d: String,
    #[sea_orm(column_name = "correct_option")]
    pub correct_option: String,
    pub used: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
