//! SeaORM Entity for tip_proposal table
//! Unique by (chain_id, motion_hash)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tip_proposal")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub chain_id: i32,
    #[sea_orm(column_type = "Text")]
    pub motion_hash: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub reason: Option<String>,
    pub beneficiary: Option<i32>,
    pub finder: Option<i32>,
    #[sea_orm(column_type = "Double", nullable)]
    pub value: Option<f64>,
    pub proposed_at: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub status: Option<String>,
    pub modified_at: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
