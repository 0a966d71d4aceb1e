//! SeaORM Entity for referendum_vote table
//! Unique by (referendum_id, voter)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "referendum_vote")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub referendum_id: i32,
    pub voter: i32,
    pub vote: bool,
    #[sea_orm(column_type = "Double")]
    pub locked_value: f64,
    #[sea_orm(column_type = "Double")]
    pub conviction: f64,
    pub voted_at: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
