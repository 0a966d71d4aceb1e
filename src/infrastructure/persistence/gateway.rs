use async_trait::async_trait;

use crate::domain::models::{
    Account, Block, Bounty, Chain, CouncilMotion, CouncilMotionVote, Councilor, Councilterm,
    Endorsement, Proposal, Referendum, ReferendumVote, Tip, TipProposal, TreasuryProposal,
};
use crate::infrastructure::persistence::error::DbError;

/// Storage of the governance read model
///
/// Lookups are by natural key scoped to a chain. Inserts return the entity
/// with its assigned id; updates write every column of the given entity.
#[async_trait]
pub trait GovernanceStore: Send + Sync + std::fmt::Debug {
    async fn get_or_create_chain(&self, ws_endpoint: &str) -> Result<Chain, DbError>;

    async fn get_or_create_account(&self, address: &str, chain_id: i32) -> Result<Account, DbError>;

    // Blocks

    async fn block_exists(&self, chain_id: i32, hash: &str) -> Result<bool, DbError>;

    async fn insert_block(&self, block: Block) -> Result<Block, DbError>;

    async fn update_block(&self, block: &Block) -> Result<(), DbError>;

    /// Whether block `candidate` is strictly higher than block `stored`
    ///
    /// An absent `stored` reference counts as lower than any block.
    async fn has_higher_block_number(
        &self,
        candidate: i32,
        stored: Option<i32>,
    ) -> Result<bool, DbError>;

    // Council

    async fn get_council_motion(
        &self,
        chain_id: i32,
        motion_hash: &str,
    ) -> Result<Option<CouncilMotion>, DbError>;

    async fn insert_council_motion(&self, motion: CouncilMotion) -> Result<CouncilMotion, DbError>;

    async fn update_council_motion(&self, motion: &CouncilMotion) -> Result<(), DbError>;

    async fn get_council_motion_vote(
        &self,
        council_motion_id: i32,
        account_id: i32,
    ) -> Result<Option<CouncilMotionVote>, DbError>;

    async fn insert_council_motion_vote(
        &self,
        vote: CouncilMotionVote,
    ) -> Result<CouncilMotionVote, DbError>;

    async fn insert_councilterm(&self, term: Councilterm) -> Result<Councilterm, DbError>;

    async fn insert_councilor(&self, councilor: Councilor) -> Result<Councilor, DbError>;

    // Bounties

    async fn get_bounty(&self, chain_id: i32, bounty_id: i64) -> Result<Option<Bounty>, DbError>;

    async fn insert_bounty(&self, bounty: Bounty) -> Result<Bounty, DbError>;

    async fn update_bounty(&self, bounty: &Bounty) -> Result<(), DbError>;

    // Treasury

    async fn get_treasury_proposal(
        &self,
        chain_id: i32,
        proposal_id: i64,
    ) -> Result<Option<TreasuryProposal>, DbError>;

    async fn insert_treasury_proposal(
        &self,
        proposal: TreasuryProposal,
    ) -> Result<TreasuryProposal, DbError>;

    async fn update_treasury_proposal(&self, proposal: &TreasuryProposal) -> Result<(), DbError>;

    // Democracy

    async fn get_proposal_by_index(
        &self,
        chain_id: i32,
        proposal_index: i64,
    ) -> Result<Option<Proposal>, DbError>;

    async fn get_proposal_by_motion_hash(
        &self,
        chain_id: i32,
        motion_hash: &str,
    ) -> Result<Option<Proposal>, DbError>;

    async fn insert_proposal(&self, proposal: Proposal) -> Result<Proposal, DbError>;

    async fn update_proposal(&self, proposal: &Proposal) -> Result<(), DbError>;

    async fn get_endorsement(
        &self,
        proposal_id: i32,
        endorser: i32,
    ) -> Result<Option<Endorsement>, DbError>;

    async fn insert_endorsement(&self, endorsement: Endorsement) -> Result<Endorsement, DbError>;

    async fn get_referendum(
        &self,
        chain_id: i32,
        referendum_index: i64,
    ) -> Result<Option<Referendum>, DbError>;

    async fn insert_referendum(&self, referendum: Referendum) -> Result<Referendum, DbError>;

    async fn update_referendum(&self, referendum: &Referendum) -> Result<(), DbError>;

    async fn get_referendum_vote(
        &self,
        referendum_id: i32,
        voter: i32,
    ) -> Result<Option<ReferendumVote>, DbError>;

    async fn insert_referendum_vote(&self, vote: ReferendumVote) -> Result<ReferendumVote, DbError>;

    // Tips

    async fn get_tip_proposal(
        &self,
        chain_id: i32,
        motion_hash: &str,
    ) -> Result<Option<TipProposal>, DbError>;

    async fn insert_tip_proposal(&self, proposal: TipProposal) -> Result<TipProposal, DbError>;

    async fn update_tip_proposal(&self, proposal: &TipProposal) -> Result<(), DbError>;

    async fn insert_tip(&self, tip: Tip) -> Result<Tip, DbError>;
}
