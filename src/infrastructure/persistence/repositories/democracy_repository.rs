use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, Set,
    Unchanged,
};

use super::{parse_stored, stored_name};
use crate::domain::models::{
    Endorsement, PreimageCall, Proposal, ProposalType, Referendum, ReferendumVote,
};
use crate::infrastructure::persistence::entities::{
    endorsement, proposal, referendum, referendum_vote,
};
use crate::infrastructure::persistence::error::DbError;

/// Stored in a proposal's section and method columns when its preimage could
/// not be decoded
pub const UNDECODABLE_PREIMAGE: &str = "ERROR";

/// Repository for democracy proposals, endorsements, referenda and votes
#[derive(Clone, Debug)]
pub struct DemocracyRepository {
    conn: DatabaseConnection,
}

impl DemocracyRepository {
    /// Create a new DemocracyRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get_proposal_by_index(
        &self,
        chain_id: i32,
        proposal_index: i64,
    ) -> Result<Option<Proposal>, DbError> {
        proposal::Entity::find()
            .filter(proposal::Column::ChainId.eq(chain_id))
            .filter(proposal::Column::ProposalIndex.eq(proposal_index))
            .one(&self.conn)
            .await?
            .map(proposal_to_domain)
            .transpose()
    }

    pub async fn get_proposal_by_motion_hash(
        &self,
        chain_id: i32,
        motion_hash: &str,
    ) -> Result<Option<Proposal>, DbError> {
        proposal::Entity::find()
            .filter(proposal::Column::ChainId.eq(chain_id))
            .filter(proposal::Column::MotionHash.eq(motion_hash))
            .one(&self.conn)
            .await?
            .map(proposal_to_domain)
            .transpose()
    }

    pub async fn insert_proposal(&self, proposal: Proposal) -> Result<Proposal, DbError> {
        let mut model = proposal_to_active(&proposal);
        model.id = NotSet;
        proposal_to_domain(model.insert(&self.conn).await?)
    }

    pub async fn update_proposal(&self, proposal: &Proposal) -> Result<(), DbError> {
        proposal_to_active(proposal).update(&self.conn).await?;
        Ok(())
    }

    pub async fn get_endorsement(
        &self,
        proposal_id: i32,
        endorser: i32,
    ) -> Result<Option<Endorsement>, DbError> {
        let result = endorsement::Entity::find()
            .filter(endorsement::Column::ProposalId.eq(proposal_id))
            .filter(endorsement::Column::Endorser.eq(endorser))
            .one(&self.conn)
            .await?;

        Ok(result.map(|model| Endorsement {
            id: model.id,
            proposal_id: model.proposal_id,
            endorser: model.endorser,
            endorsed_at: model.endorsed_at,
        }))
    }

    pub async fn insert_endorsement(&self, endorsement: Endorsement) -> Result<Endorsement, DbError> {
        let model = endorsement::ActiveModel {
            id: NotSet,
            proposal_id: Set(endorsement.proposal_id),
            endorser: Set(endorsement.endorser),
            endorsed_at: Set(endorsement.endorsed_at),
        }
        .insert(&self.conn)
        .await?;

        Ok(Endorsement {
            id: model.id,
            ..endorsement
        })
    }

    pub async fn get_referendum(
        &self,
        chain_id: i32,
        referendum_index: i64,
    ) -> Result<Option<Referendum>, DbError> {
        referendum::Entity::find()
            .filter(referendum::Column::ChainId.eq(chain_id))
            .filter(referendum::Column::ReferendumIndex.eq(referendum_index))
            .one(&self.conn)
            .await?
            .map(referendum_to_domain)
            .transpose()
    }

    pub async fn insert_referendum(&self, referendum: Referendum) -> Result<Referendum, DbError> {
        let mut model = referendum_to_active(&referendum);
        model.id = NotSet;
        referendum_to_domain(model.insert(&self.conn).await?)
    }

    pub async fn update_referendum(&self, referendum: &Referendum) -> Result<(), DbError> {
        referendum_to_active(referendum).update(&self.conn).await?;
        Ok(())
    }

    pub async fn get_referendum_vote(
        &self,
        referendum_id: i32,
        voter: i32,
    ) -> Result<Option<ReferendumVote>, DbError> {
        let result = referendum_vote::Entity::find()
            .filter(referendum_vote::Column::ReferendumId.eq(referendum_id))
            .filter(referendum_vote::Column::Voter.eq(voter))
            .one(&self.conn)
            .await?;

        Ok(result.map(|model| ReferendumVote {
            id: model.id,
            referendum_id: model.referendum_id,
            voter: model.voter,
            vote: model.vote,
            locked_value: model.locked_value,
            conviction: model.conviction,
            voted_at: model.voted_at,
        }))
    }

    pub async fn insert_referendum_vote(&self, vote: ReferendumVote) -> Result<ReferendumVote, DbError> {
        let model = referendum_vote::ActiveModel {
            id: NotSet,
            referendum_id: Set(vote.referendum_id),
            voter: Set(vote.voter),
            vote: Set(vote.vote),
            locked_value: Set(vote.locked_value),
            conviction: Set(vote.conviction),
            voted_at: Set(vote.voted_at),
        }
        .insert(&self.conn)
        .await?;

        Ok(ReferendumVote { id: model.id, ..vote })
    }
}

fn proposal_to_active(proposal: &Proposal) -> proposal::ActiveModel {
    let (section, method) = match &proposal.call {
        Some(PreimageCall::Decoded { section, method }) => {
            (Some(section.clone()), Some(method.clone()))
        }
        Some(PreimageCall::DecodeFailed) => (
            Some(UNDECODABLE_PREIMAGE.to_string()),
            Some(UNDECODABLE_PREIMAGE.to_string()),
        ),
        None => (None, None),
    };

    proposal::ActiveModel {
        id: Unchanged(proposal.id),
        chain_id: Set(proposal.chain_id),
        proposal_index: Set(proposal.proposal_index),
        motion_hash: Set(proposal.motion_hash.clone()),
        section: Set(section),
        method: Set(method),
        proposed_by: Set(proposal.proposed_by),
        proposed_at: Set(proposal.proposed_at),
        status: Set(stored_name(proposal.status)),
        proposal_type: Set(proposal.proposal_type.as_str().to_string()),
        modified_at: Set(proposal.modified_at),
    }
}

fn proposal_to_domain(model: proposal::Model) -> Result<Proposal, DbError> {
    let call = match (model.section, model.method) {
        (Some(section), Some(method))
            if section == UNDECODABLE_PREIMAGE && method == UNDECODABLE_PREIMAGE =>
        {
            Some(PreimageCall::DecodeFailed)
        }
        (Some(section), Some(method)) => Some(PreimageCall::Decoded { section, method }),
        _ => None,
    };
    let proposal_type = model
        .proposal_type
        .parse::<ProposalType>()
        .map_err(DbError::InvalidValue)?;

    Ok(Proposal {
        id: model.id,
        chain_id: model.chain_id,
        proposal_index: model.proposal_index,
        motion_hash: model.motion_hash,
        call,
        proposed_by: model.proposed_by,
        proposed_at: model.proposed_at,
        status: parse_stored(model.status)?,
        proposal_type,
        modified_at: model.modified_at,
    })
}

fn referendum_to_active(referendum: &Referendum) -> referendum::ActiveModel {
    referendum::ActiveModel {
        id: Unchanged(referendum.id),
        chain_id: Set(referendum.chain_id),
        referendum_index: Set(referendum.referendum_index),
        vote_threshold: Set(referendum.vote_threshold.clone()),
        proposal_id: Set(referendum.proposal_id),
        started_at: Set(referendum.started_at),
        ended_at: Set(referendum.ended_at),
        status: Set(stored_name(referendum.status)),
        modified_at: Set(referendum.modified_at),
    }
}

fn referendum_to_domain(model: referendum::Model) -> Result<Referendum, DbError> {
    Ok(Referendum {
        id: model.id,
        chain_id: model.chain_id,
        referendum_index: model.referendum_index,
        vote_threshold: model.vote_threshold,
        proposal_id: model.proposal_id,
        started_at: model.started_at,
        ended_at: model.ended_at,
        status: parse_stored(model.status)?,
        modified_at: model.modified_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ProposalStatus;

    #[test]
    fn test_undecodable_preimage_is_stored_as_sentinel() {
        let mut proposal = Proposal::new(1, ProposalStatus::Proposed, 4);
        proposal.call = Some(PreimageCall::DecodeFailed);

        let model = proposal_to_active(&proposal);
        assert_eq!(model.section.unwrap(), Some("ERROR".to_string()));
        assert_eq!(model.method.unwrap(), Some("ERROR".to_string()));
    }

    #[test]
    fn test_sentinel_reads_back_as_decode_failure() {
        let model = proposal::Model {
            id: 3,
            chain_id: 1,
            proposal_index: None,
            motion_hash: Some("0xpre".to_string()),
            section: Some("ERROR".to_string()),
            method: Some("ERROR".to_string()),
            proposed_by: None,
            proposed_at: None,
            status: Some("Proposed".to_string()),
            proposal_type: "Democracy".to_string(),
            modified_at: Some(4),
        };

        let proposal = proposal_to_domain(model).unwrap();
        assert_eq!(proposal.call, Some(PreimageCall::DecodeFailed));
        assert_eq!(proposal.status, Some(ProposalStatus::Proposed));
    }
}
