use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, Set,
    Unchanged,
};

use super::{parse_stored, stored_name};
use crate::domain::models::{Tip, TipProposal};
use crate::infrastructure::persistence::entities::{tip, tip_proposal};
use crate::infrastructure::persistence::error::DbError;

/// Repository for tip proposals and tips
#[derive(Clone, Debug)]
pub struct TipRepository {
    conn: DatabaseConnection,
}

impl TipRepository {
    /// Create a new TipRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get a tip proposal by its hash
    pub async fn get_proposal(
        &self,
        chain_id: i32,
        motion_hash: &str,
    ) -> Result<Option<TipProposal>, DbError> {
        tip_proposal::Entity::find()
            .filter(tip_proposal::Column::ChainId.eq(chain_id))
            .filter(tip_proposal::Column::MotionHash.eq(motion_hash))
            .one(&self.conn)
            .await?
            .map(to_domain)
            .transpose()
    }

    pub async fn insert_proposal(&self, proposal: TipProposal) -> Result<TipProposal, DbError> {
        let mut model = to_active(&proposal);
        model.id = NotSet;
        to_domain(model.insert(&self.conn).await?)
    }

    pub async fn update_proposal(&self, proposal: &TipProposal) -> Result<(), DbError> {
        to_active(proposal).update(&self.conn).await?;
        Ok(())
    }

    /// Record a single tip
    pub async fn insert_tip(&self, tip: Tip) -> Result<Tip, DbError> {
        let model = tip::ActiveModel {
            id: NotSet,
            tip_proposal_id: Set(tip.tip_proposal_id),
            tipper: Set(tip.tipper),
            value: Set(tip.value),
            tipped_at: Set(tip.tipped_at),
        }
        .insert(&self.conn)
        .await?;

        Ok(Tip { id: model.id, ..tip })
    }
}

fn to_active(proposal: &TipProposal) -> tip_proposal::ActiveModel {
    tip_proposal::ActiveModel {
        id: Unchanged(proposal.id),
        chain_id: Set(proposal.chain_id),
        motion_hash: Set(proposal.motion_hash.clone()),
        reason: Set(proposal.reason.clone()),
        beneficiary: Set(proposal.beneficiary),
        finder: Set(proposal.finder),
        value: Set(proposal.value),
        proposed_at: Set(proposal.proposed_at),
        status: Set(stored_name(proposal.status)),
        modified_at: Set(proposal.modified_at),
    }
}

fn to_domain(model: tip_proposal::Model) -> Result<TipProposal, DbError> {
    Ok(TipProposal {
        id: model.id,
        chain_id: model.chain_id,
        motion_hash: model.motion_hash,
        reason: model.reason,
        beneficiary: model.beneficiary,
        finder: model.finder,
        value: model.value,
        proposed_at: model.proposed_at,
        status: parse_stored(model.status)?,
        modified_at: model.modified_at,
    })
}
