//! SeaORM Entity for proposal table
//! Keyed by (chain_id, proposal_index) when the index is known, else by motion_hash

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "proposal")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub chain_id: i32,
    pub proposal_index: Option<i64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub motion_hash: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub section: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub method: Option<String>,
    pub proposed_by: Option<i32>,
    pub proposed_at: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub status: Option<String>,
    #[sea_orm(column_name = "type", column_type = "Text")]
    pub proposal_type: String,
    pub modified_at: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
