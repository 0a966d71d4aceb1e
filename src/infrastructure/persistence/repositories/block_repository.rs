use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, Set, Unchanged,
};

use crate::domain::models::Block;
use crate::infrastructure::persistence::entities::block;
use crate::infrastructure::persistence::error::DbError;

/// Repository for block operations
#[derive(Clone, Debug)]
pub struct BlockRepository {
    conn: DatabaseConnection,
}

impl BlockRepository {
    /// Create a new BlockRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Check whether a block hash has been processed on this chain
    pub async fn exists_by_hash(&self, chain_id: i32, hash: &str) -> Result<bool, DbError> {
        let count = block::Entity::find()
            .filter(block::Column::ChainId.eq(chain_id))
            .filter(block::Column::Hash.eq(hash))
            .count(&self.conn)
            .await?;

        Ok(count > 0)
    }

    /// Insert a block and return it with its id
    pub async fn insert(&self, block: Block) -> Result<Block, DbError> {
        let model = block::ActiveModel {
            id: NotSet,
            chain_id: Set(block.chain_id),
            hash: Set(block.hash),
            number: Set(block.number),
            error: Set(block.error),
            error_message: Set(block.error_message),
        };

        Ok(to_domain(model.insert(&self.conn).await?))
    }

    /// Update the error fields of a block
    pub async fn update(&self, block: &Block) -> Result<(), DbError> {
        let model = block::ActiveModel {
            id: Unchanged(block.id),
            chain_id: Set(block.chain_id),
            hash: Set(block.hash.clone()),
            number: Set(block.number),
            error: Set(block.error),
            error_message: Set(block.error_message.clone()),
        };
        model.update(&self.conn).await?;

        Ok(())
    }

    /// Compare the heights of two block rows
    ///
    /// Returns true when `stored` is absent or unknown, or when `candidate`
    /// is strictly higher.
    pub async fn has_higher_block_number(
        &self,
        candidate: i32,
        stored: Option<i32>,
    ) -> Result<bool, DbError> {
        let candidate_number = block::Entity::find_by_id(candidate)
            .one(&self.conn)
            .await?
            .map(|b| b.number)
            .ok_or_else(|| DbError::NotFound(format!("block row {}", candidate)))?;

        let Some(stored) = stored else {
            return Ok(true);
        };
        let stored_number = block::Entity::find_by_id(stored)
            .one(&self.conn)
            .await?
            .map(|b| b.number);

        Ok(match stored_number {
            Some(stored_number) => candidate_number > stored_number,
            None => true,
        })
    }
}

fn to_domain(model: block::Model) -> Block {
    Block {
        id: model.id,
        chain_id: model.chain_id,
        hash: model.hash,
        number: model.number,
        error: model.error,
        error_message: model.error_message,
    }
}
