//! SeaORM Entity for council_motion_vote table
//! Unique by (council_motion_id, account_id)

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "council_motion_vote")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub council_motion_id: i32,
    pub account_id: i32,
    pub approved: bool,
    pub block: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
