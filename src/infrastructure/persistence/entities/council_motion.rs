//! SeaORM Entity for council_motion table
//! Unique by (chain_id, motion_hash)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "council_motion")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub chain_id: i32,
    #[sea_orm(column_type = "Text")]
    pub motion_hash: String,
    pub proposal_index: Option<i64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub section: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub method: Option<String>,
    pub proposed_by: Option<i32>,
    pub from_block: Option<i32>,
    pub to_block: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub status: Option<String>,
    pub modified_at: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
