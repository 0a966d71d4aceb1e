//! SeaORM Entity for tip table
//! One row per tip action

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tip")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub tip_proposal_id: i32,
    pub tipper: i32,
    #[sea_orm(column_type = "Double")]
    pub value: f64,
    pub tipped_at: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
