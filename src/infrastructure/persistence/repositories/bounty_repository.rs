use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, Set,
    Unchanged,
};

use super::{parse_stored, stored_name};
use crate::domain::models::Bounty;
use crate::infrastructure::persistence::entities::bounty;
use crate::infrastructure::persistence::error::DbError;

/// Repository for bounty operations
#[derive(Clone, Debug)]
pub struct BountyRepository {
    conn: DatabaseConnection,
}

impl BountyRepository {
    /// Create a new BountyRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get a bounty by its on-chain id
    pub async fn get_by_bounty_id(&self, chain_id: i32, bounty_id: i64) -> Result<Option<Bounty>, DbError> {
        bounty::Entity::find()
            .filter(bounty::Column::ChainId.eq(chain_id))
            .filter(bounty::Column::BountyId.eq(bounty_id))
            .one(&self.conn)
            .await?
            .map(to_domain)
            .transpose()
    }

    pub async fn insert(&self, bounty: Bounty) -> Result<Bounty, DbError> {
        let mut model = to_active(&bounty);
        model.id = NotSet;
        to_domain(model.insert(&self.conn).await?)
    }

    pub async fn update(&self, bounty: &Bounty) -> Result<(), DbError> {
        to_active(bounty).update(&self.conn).await?;
        Ok(())
    }
}

fn to_active(bounty: &Bounty) -> bounty::ActiveModel {
    bounty::ActiveModel {
        id: Unchanged(bounty.id),
        chain_id: Set(bounty.chain_id),
        bounty_id: Set(bounty.bounty_id),
        description: Set(bounty.description.clone()),
        value: Set(bounty.value),
        proposed_by: Set(bounty.proposed_by),
        proposed_at: Set(bounty.proposed_at),
        status: Set(stored_name(bounty.status)),
        modified_at: Set(bounty.modified_at),
    }
}

fn to_domain(model: bounty::Model) -> Result<Bounty, DbError> {
    Ok(Bounty {
        id: model.id,
        chain_id: model.chain_id,
        bounty_id: model.bounty_id,
        description: model.description,
        value: model.value,
        proposed_by: model.proposed_by,
        proposed_at: model.proposed_at,
        status: parse_stored(model.status)?,
        modified_at: model.modified_at,
    })
}
