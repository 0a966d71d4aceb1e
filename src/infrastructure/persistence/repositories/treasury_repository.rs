use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, Set,
    Unchanged,
};

use super::{parse_stored, stored_name};
use crate::domain::models::TreasuryProposal;
use crate::infrastructure::persistence::entities::treasury_proposal;
use crate::infrastructure::persistence::error::DbError;

/// Repository for treasury proposal operations
#[derive(Clone, Debug)]
pub struct TreasuryRepository {
    conn: DatabaseConnection,
}

impl TreasuryRepository {
    /// Create a new TreasuryRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get a treasury proposal by its on-chain proposal id
    pub async fn get_by_proposal_id(
        &self,
        chain_id: i32,
        proposal_id: i64,
    ) -> Result<Option<TreasuryProposal>, DbError> {
        treasury_proposal::Entity::find()
            .filter(treasury_proposal::Column::ChainId.eq(chain_id))
            .filter(treasury_proposal::Column::ProposalId.eq(proposal_id))
            .one(&self.conn)
            .await?
            .map(to_domain)
            .transpose()
    }

    pub async fn insert(&self, proposal: TreasuryProposal) -> Result<TreasuryProposal, DbError> {
        let mut model = to_active(&proposal);
        model.id = NotSet;
        to_domain(model.insert(&self.conn).await?)
    }

    pub async fn update(&self, proposal: &TreasuryProposal) -> Result<(), DbError> {
        to_active(proposal).update(&self.conn).await?;
        Ok(())
    }
}

fn to_active(proposal: &TreasuryProposal) -> treasury_proposal::ActiveModel {
    treasury_proposal::ActiveModel {
        id: Unchanged(proposal.id),
        chain_id: Set(proposal.chain_id),
        proposal_id: Set(proposal.proposal_id),
        value: Set(proposal.value),
        beneficiary: Set(proposal.beneficiary),
        council_motion_id: Set(proposal.council_motion_id),
        proposed_by: Set(proposal.proposed_by),
        proposed_at: Set(proposal.proposed_at),
        status: Set(stored_name(proposal.status)),
        modified_at: Set(proposal.modified_at),
    }
}

fn to_domain(model: treasury_proposal::Model) -> Result<TreasuryProposal, DbError> {
    Ok(TreasuryProposal {
        id: model.id,
        chain_id: model.chain_id,
        proposal_id: model.proposal_id,
        value: model.value,
        beneficiary: model.beneficiary,
        council_motion_id: model.council_motion_id,
        proposed_by: model.proposed_by,
        proposed_at: model.proposed_at,
        status: parse_stored(model.status)?,
        modified_at: model.modified_at,
    })
}
