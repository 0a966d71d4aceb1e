use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, Set,
    Unchanged,
};

use super::{parse_stored, stored_name};
use crate::domain::models::{CouncilMotion, CouncilMotionVote, Councilor, Councilterm};
use crate::infrastructure::persistence::entities::{
    council_motion, council_motion_vote, councilor, councilterm,
};
use crate::infrastructure::persistence::error::DbError;

/// Repository for council motions, motion votes and council terms
#[derive(Clone, Debug)]
pub struct CouncilRepository {
    conn: DatabaseConnection,
}

impl CouncilRepository {
    /// Create a new CouncilRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get a motion by its hash
    pub async fn get_motion(
        &self,
        chain_id: i32,
        motion_hash: &str,
    ) -> Result<Option<CouncilMotion>, DbError> {
        council_motion::Entity::find()
            .filter(council_motion::Column::ChainId.eq(chain_id))
            .filter(council_motion::Column::MotionHash.eq(motion_hash))
            .one(&self.conn)
            .await?
            .map(motion_to_domain)
            .transpose()
    }

    pub async fn insert_motion(&self, motion: CouncilMotion) -> Result<CouncilMotion, DbError> {
        let mut model = motion_to_active(&motion);
        model.id = NotSet;
        motion_to_domain(model.insert(&self.conn).await?)
    }

    pub async fn update_motion(&self, motion: &CouncilMotion) -> Result<(), DbError> {
        motion_to_active(motion).update(&self.conn).await?;
        Ok(())
    }

    /// Get the vote an account cast on a motion
    pub async fn get_vote(
        &self,
        council_motion_id: i32,
        account_id: i32,
    ) -> Result<Option<CouncilMotionVote>, DbError> {
        let result = council_motion_vote::Entity::find()
            .filter(council_motion_vote::Column::CouncilMotionId.eq(council_motion_id))
            .filter(council_motion_vote::Column::AccountId.eq(account_id))
            .one(&self.conn)
            .await?;

        Ok(result.map(vote_to_domain))
    }

    pub async fn insert_vote(&self, vote: CouncilMotionVote) -> Result<CouncilMotionVote, DbError> {
        let model = council_motion_vote::ActiveModel {
            id: NotSet,
            council_motion_id: Set(vote.council_motion_id),
            account_id: Set(vote.account_id),
            approved: Set(vote.approved),
            block: Set(vote.block),
        };

        Ok(vote_to_domain(model.insert(&self.conn).await?))
    }

    pub async fn insert_term(&self, term: Councilterm) -> Result<Councilterm, DbError> {
        let model = councilterm::ActiveModel {
            id: NotSet,
            chain_id: Set(term.chain_id),
            from_block: Set(term.from_block),
        }
        .insert(&self.conn)
        .await?;

        Ok(Councilterm {
            id: model.id,
            chain_id: model.chain_id,
            from_block: model.from_block,
        })
    }

    pub async fn insert_councilor(&self, councilor: Councilor) -> Result<Councilor, DbError> {
        let model = councilor::ActiveModel {
            id: NotSet,
            councilterm_id: Set(councilor.councilterm_id),
            account_id: Set(councilor.account_id),
        }
        .insert(&self.conn)
        .await?;

        Ok(Councilor {
            id: model.id,
            councilterm_id: model.councilterm_id,
            account_id: model.account_id,
        })
    }
}

fn motion_to_active(motion: &CouncilMotion) -> council_motion::ActiveModel {
    council_motion::ActiveModel {
        id: Unchanged(motion.id),
        chain_id: Set(motion.chain_id),
        motion_hash: Set(motion.motion_hash.clone()),
        proposal_index: Set(motion.proposal_index),
        section: Set(motion.section.clone()),
        method: Set(motion.method.clone()),
        proposed_by: Set(motion.proposed_by),
        from_block: Set(motion.from_block),
        to_block: Set(motion.to_block),
        status: Set(stored_name(motion.status)),
        modified_at: Set(motion.modified_at),
    }
}

fn motion_to_domain(model: council_motion::Model) -> Result<CouncilMotion, DbError> {
    Ok(CouncilMotion {
        id: model.id,
        chain_id: model.chain_id,
        motion_hash: model.motion_hash,
        proposal_index: model.proposal_index,
        section: model.section,
        method: model.method,
        proposed_by: model.proposed_by,
        from_block: model.from_block,
        to_block: model.to_block,
        status: parse_stored(model.status)?,
        modified_at: model.modified_at,
    })
}

fn vote_to_domain(model: council_motion_vote::Model) -> CouncilMotionVote {
    CouncilMotionVote {
        id: model.id,
        council_motion_id: model.council_motion_id,
        account_id: model.account_id,
        approved: model.approved,
        block: model.block,
    }
}
