use async_trait::async_trait;

use crate::domain::models::{
    Account, Block, Bounty, Chain, CouncilMotion, CouncilMotionVote, Councilor, Councilterm,
    Endorsement, Proposal, Referendum, ReferendumVote, Tip, TipProposal, TreasuryProposal,
};
use crate::infrastructure::persistence::connection::DbPool;
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::factory::RepositoryFactory;
use crate::infrastructure::persistence::gateway::GovernanceStore;
use crate::infrastructure::persistence::repositories::Repositories;

/// [`GovernanceStore`] backed by Postgres through SeaORM
#[derive(Clone, Debug)]
pub struct SeaOrmStore {
    repositories: Repositories,
}

impl SeaOrmStore {
    pub fn new(db_pool: &DbPool) -> Self {
        Self {
            repositories: RepositoryFactory::create_repositories(db_pool),
        }
    }
}

#[async_trait]
impl GovernanceStore for SeaOrmStore {
    async fn get_or_create_chain(&self, ws_endpoint: &str) -> Result<Chain, DbError> {
        self.repositories.chain.get_or_create_chain(ws_endpoint).await
    }

    async fn get_or_create_account(&self, address: &str, chain_id: i32) -> Result<Account, DbError> {
        self.repositories
            .chain
            .get_or_create_account(address, chain_id)
            .await
    }

    async fn block_exists(&self, chain_id: i32, hash: &str) -> Result<bool, DbError> {
        self.repositories.block.exists_by_hash(chain_id, hash).await
    }

    async fn insert_block(&self, block: Block) -> Result<Block, DbError> {
        self.repositories.block.insert(block).await
    }

    async fn update_block(&self, block: &Block) -> Result<(), DbError> {
        self.repositories.block.update(block).await
    }

    async fn has_higher_block_number(
        &self,
        candidate: i32,
        stored: Option<i32>,
    ) -> Result<bool, DbError> {
        self.repositories
            .block
            .has_higher_block_number(candidate, stored)
            .await
    }

    async fn get_council_motion(
        &self,
        chain_id: i32,
        motion_hash: &str,
    ) -> Result<Option<CouncilMotion>, DbError> {
        self.repositories.council.get_motion(chain_id, motion_hash).await
    }

    async fn insert_council_motion(&self, motion: CouncilMotion) -> Result<CouncilMotion, DbError> {
        self.repositories.council.insert_motion(motion).await
    }

    async fn update_council_motion(&self, motion: &CouncilMotion) -> Result<(), DbError> {
        self.repositories.council.update_motion(motion).await
    }

    async fn get_council_motion_vote(
        &self,
        council_motion_id: i32,
        account_id: i32,
    ) -> Result<Option<CouncilMotionVote>, DbError> {
        self.repositories
            .council
            .get_vote(council_motion_id, account_id)
            .await
    }

    async fn insert_council_motion_vote(
        &self,
        vote: CouncilMotionVote,
    ) -> Result<CouncilMotionVote, DbError> {
        self.repositories.council.insert_vote(vote).await
    }

    async fn insert_councilterm(&self, term: Councilterm) -> Result<Councilterm, DbError> {
        self.repositories.council.insert_term(term).await
    }

    async fn insert_councilor(&self, councilor: Councilor) -> Result<Councilor, DbError> {
        self.repositories.council.insert_councilor(councilor).await
    }

    async fn get_bounty(&self, chain_id: i32, bounty_id: i64) -> Result<Option<Bounty>, DbError> {
        self.repositories
            .bounty
            .get_by_bounty_id(chain_id, bounty_id)
            .await
    }

    async fn insert_bounty(&self, bounty: Bounty) -> Result<Bounty, DbError> {
        self.repositories.bounty.insert(bounty).await
    }

    async fn update_bounty(&self, bounty: &Bounty) -> Result<(), DbError> {
        self.repositories.bounty.update(bounty).await
    }

    async fn get_treasury_proposal(
        &self,
        chain_id: i32,
        proposal_id: i64,
    ) -> Result<Option<TreasuryProposal>, DbError> {
        self.repositories
            .treasury
            .get_by_proposal_id(chain_id, proposal_id)
            .await
    }

    async fn insert_treasury_proposal(
        &self,
        proposal: TreasuryProposal,
    ) -> Result<TreasuryProposal, DbError> {
        self.repositories.treasury.insert(proposal).await
    }

    async fn update_treasury_proposal(&self, proposal: &TreasuryProposal) -> Result<(), DbError> {
        self.repositories.treasury.update(proposal).await
    }

    async fn get_proposal_by_index(
        &self,
        chain_id: i32,
        proposal_index: i64,
    ) -> Result<Option<Proposal>, DbError> {
        self.repositories
            .democracy
            .get_proposal_by_index(chain_id, proposal_index)
            .await
    }

    async fn get_proposal_by_motion_hash(
        &self,
        chain_id: i32,
        motion_hash: &str,
    ) -> Result<Option<Proposal>, DbError> {
        self.repositories
            .democracy
            .get_proposal_by_motion_hash(chain_id, motion_hash)
            .await
    }

    async fn insert_proposal(&self, proposal: Proposal) -> Result<Proposal, DbError> {
        self.repositories.democracy.insert_proposal(proposal).await
    }

    async fn update_proposal(&self, proposal: &Proposal) -> Result<(), DbError> {
        self.repositories.democracy.update_proposal(proposal).await
    }

    async fn get_endorsement(
        &self,
        proposal_id: i32,
        endorser: i32,
    ) -> Result<Option<Endorsement>, DbError> {
        self.repositories
            .democracy
            .get_endorsement(proposal_id, endorser)
            .await
    }

    async fn insert_endorsement(&self, endorsement: Endorsement) -> Result<Endorsement, DbError> {
        self.repositories.democracy.insert_endorsement(endorsement).await
    }

    async fn get_referendum(
        &self,
        chain_id: i32,
        referendum_index: i64,
    ) -> Result<Option<Referendum>, DbError> {
        self.repositories
            .democracy
            .get_referendum(chain_id, referendum_index)
            .await
    }

    async fn insert_referendum(&self, referendum: Referendum) -> Result<Referendum, DbError> {
        self.repositories.democracy.insert_referendum(referendum).await
    }

    async fn update_referendum(&self, referendum: &Referendum) -> Result<(), DbError> {
        self.repositories.democracy.update_referendum(referendum).await
    }

    async fn get_referendum_vote(
        &self,
        referendum_id: i32,
        voter: i32,
    ) -> Result<Option<ReferendumVote>, DbError> {
        self.repositories
            .democracy
            .get_referendum_vote(referendum_id, voter)
            .await
    }

    async fn insert_referendum_vote(&self, vote: ReferendumVote) -> Result<ReferendumVote, DbError> {
        self.repositories.democracy.insert_referendum_vote(vote).await
    }

    async fn get_tip_proposal(
        &self,
        chain_id: i32,
        motion_hash: &str,
    ) -> Result<Option<TipProposal>, DbError> {
        self.repositories.tip.get_proposal(chain_id, motion_hash).await
    }

    async fn insert_tip_proposal(&self, proposal: TipProposal) -> Result<TipProposal, DbError> {
        self.repositories.tip.insert_proposal(proposal).await
    }

    async fn update_tip_proposal(&self, proposal: &TipProposal) -> Result<(), DbError> {
        self.repositories.tip.update_proposal(proposal).await
    }

    async fn insert_tip(&self, tip: Tip) -> Result<Tip, DbError> {
        self.repositories.tip.insert_tip(tip).await
    }
}
