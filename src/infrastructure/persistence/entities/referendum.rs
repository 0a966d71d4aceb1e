//! SeaORM Entity for referendum table
//! Unique by (chain_id, referendum_index)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "referendum")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub chain_id: i32,
    pub referendum_index: i64,
    #[sea_orm(column_type = "Text", nullable)]
    pub vote_threshold: Option<String>,
    pub proposal_id: Option<i32>,
    pub started_at: Option<i32>,
    pub ended_at: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub status: Option<String>,
    pub modified_at: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
