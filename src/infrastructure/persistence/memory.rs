//! In-process implementation of [`GovernanceStore`]
//!
//! Backs `--dry-run` and the test suite. Semantics match the database store:
//! ids are assigned on insert starting at 1, lookups are by natural key.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::models::{
    Account, Block, Bounty, Chain, CouncilMotion, CouncilMotionVote, Councilor, Councilterm,
    Endorsement, Proposal, Referendum, ReferendumVote, Tip, TipProposal, TreasuryProposal,
};
use crate::infrastructure::persistence::error::DbError;
use crate::infrastructure::persistence::gateway::GovernanceStore;

#[derive(Debug, Default)]
struct Tables {
    next_id: i32,
    chains: Vec<Chain>,
    accounts: Vec<Account>,
    blocks: Vec<Block>,
    council_motions: Vec<CouncilMotion>,
    council_motion_votes: Vec<CouncilMotionVote>,
    councilterms: Vec<Councilterm>,
    councilors: Vec<Councilor>,
    bounties: Vec<Bounty>,
    treasury_proposals: Vec<TreasuryProposal>,
    proposals: Vec<Proposal>,
    endorsements: Vec<Endorsement>,
    referenda: Vec<Referendum>,
    referendum_votes: Vec<ReferendumVote>,
    tip_proposals: Vec<TipProposal>,
    tips: Vec<Tip>,
}

impl Tables {
    fn assign_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

/// Replace the row with the same id
fn replace<T: Clone>(rows: &mut [T], id_of: impl Fn(&T) -> i32, row: &T, table: &str) -> Result<(), DbError> {
    let id = id_of(row);
    let slot = rows
        .iter_mut()
        .find(|existing| id_of(existing) == id)
        .ok_or_else(|| DbError::NotFound(format!("{} row {}", table, id)))?;
    *slot = row.clone();
    Ok(())
}

/// Governance store held in process memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        // A panic while holding the lock leaves the rows themselves intact
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn blocks(&self) -> Vec<Block> {
        self.tables().blocks.clone()
    }

    pub fn accounts(&self) -> Vec<Account> {
        self.tables().accounts.clone()
    }

    pub fn council_motions(&self) -> Vec<CouncilMotion> {
        self.tables().council_motions.clone()
    }

    pub fn council_motion_votes(&self) -> Vec<CouncilMotionVote> {
        self.tables().council_motion_votes.clone()
    }

    pub fn councilterms(&self) -> Vec<Councilterm> {
        self.tables().councilterms.clone()
    }

    pub fn councilors(&self) -> Vec<Councilor> {
        self.tables().councilors.clone()
    }

    pub fn bounties(&self) -> Vec<Bounty> {
        self.tables().bounties.clone()
    }

    pub fn treasury_proposals(&self) -> Vec<TreasuryProposal> {
        self.tables().treasury_proposals.clone()
    }

    pub fn proposals(&self) -> Vec<Proposal> {
        self.tables().proposals.clone()
    }

    pub fn endorsements(&self) -> Vec<Endorsement> {
        self.tables().endorsements.clone()
    }

    pub fn referenda(&self) -> Vec<Referendum> {
        self.tables().referenda.clone()
    }

    pub fn referendum_votes(&self) -> Vec<ReferendumVote> {
        self.tables().referendum_votes.clone()
    }

    pub fn tip_proposals(&self) -> Vec<TipProposal> {
        self.tables().tip_proposals.clone()
    }

    pub fn tips(&self) -> Vec<Tip> {
        self.tables().tips.clone()
    }

    /// Address of the account with the given id
    pub fn address_of(&self, account_id: i32) -> Option<String> {
        self.tables()
            .accounts
            .iter()
            .find(|a| a.id == account_id)
            .map(|a| a.address.clone())
    }

    /// Number of rows across all governance tables, blocks excluded
    pub fn governance_row_count(&self) -> usize {
        let t = self.tables();
        t.council_motions.len()
            + t.council_motion_votes.len()
            + t.councilterms.len()
            + t.councilors.len()
            + t.bounties.len()
            + t.treasury_proposals.len()
            + t.proposals.len()
            + t.endorsements.len()
            + t.referenda.len()
            + t.referendum_votes.len()
            + t.tip_proposals.len()
            + t.tips.len()
    }
}

#[async_trait]
impl GovernanceStore for InMemoryStore {
    async fn get_or_create_chain(&self, ws_endpoint: &str) -> Result<Chain, DbError> {
        let mut t = self.tables();
        if let Some(chain) = t.chains.iter().find(|c| c.ws_endpoint == ws_endpoint) {
            return Ok(chain.clone());
        }
        let chain = Chain {
            id: t.assign_id(),
            ws_endpoint: ws_endpoint.to_string(),
        };
        t.chains.push(chain.clone());
        Ok(chain)
    }

    async fn get_or_create_account(&self, address: &str, chain_id: i32) -> Result<Account, DbError> {
        let mut t = self.tables();
        if let Some(account) = t
            .accounts
            .iter()
            .find(|a| a.chain_id == chain_id && a.address == address)
        {
            return Ok(account.clone());
        }
        let account = Account {
            id: t.assign_id(),
            chain_id,
            address: address.to_string(),
        };
        t.accounts.push(account.clone());
        Ok(account)
    }

    async fn block_exists(&self, chain_id: i32, hash: &str) -> Result<bool, DbError> {
        Ok(self
            .tables()
            .blocks
            .iter()
            .any(|b| b.chain_id == chain_id && b.hash == hash))
    }

    async fn insert_block(&self, mut block: Block) -> Result<Block, DbError> {
        let mut t = self.tables();
        block.id = t.assign_id();
        t.blocks.push(block.clone());
        Ok(block)
    }

    async fn update_block(&self, block: &Block) -> Result<(), DbError> {
        replace(&mut self.tables().blocks, |b| b.id, block, "block")
    }

    async fn has_higher_block_number(
        &self,
        candidate: i32,
        stored: Option<i32>,
    ) -> Result<bool, DbError> {
        let t = self.tables();
        let number_of = |id: i32| t.blocks.iter().find(|b| b.id == id).map(|b| b.number);

        let candidate_number = number_of(candidate)
            .ok_or_else(|| DbError::NotFound(format!("block row {}", candidate)))?;
        Ok(match stored.and_then(number_of) {
            Some(stored_number) => candidate_number > stored_number,
            None => true,
        })
    }

    async fn get_council_motion(
        &self,
        chain_id: i32,
        motion_hash: &str,
    ) -> Result<Option<CouncilMotion>, DbError> {
        Ok(self
            .tables()
            .council_motions
            .iter()
            .find(|m| m.chain_id == chain_id && m.motion_hash == motion_hash)
            .cloned())
    }

    async fn insert_council_motion(&self, mut motion: CouncilMotion) -> Result<CouncilMotion, DbError> {
        let mut t = self.tables();
        motion.id = t.assign_id();
        t.council_motions.push(motion.clone());
        Ok(motion)
    }

    async fn update_council_motion(&self, motion: &CouncilMotion) -> Result<(), DbError> {
        replace(&mut self.tables().council_motions, |m| m.id, motion, "council_motion")
    }

    async fn get_council_motion_vote(
        &self,
        council_motion_id: i32,
        account_id: i32,
    ) -> Result<Option<CouncilMotionVote>, DbError> {
        Ok(self
            .tables()
            .council_motion_votes
            .iter()
            .find(|v| v.council_motion_id == council_motion_id && v.account_id == account_id)
            .cloned())
    }

    async fn insert_council_motion_vote(
        &self,
        mut vote: CouncilMotionVote,
    ) -> Result<CouncilMotionVote, DbError> {
        let mut t = self.tables();
        vote.id = t.assign_id();
        t.council_motion_votes.push(vote.clone());
        Ok(vote)
    }

    async fn insert_councilterm(&self, mut term: Councilterm) -> Result<Councilterm, DbError> {
        let mut t = self.tables();
        term.id = t.assign_id();
        t.councilterms.push(term.clone());
        Ok(term)
    }

    async fn insert_councilor(&self, mut councilor: Councilor) -> Result<Councilor, DbError> {
        let mut t = self.tables();
        councilor.id = t.assign_id();
        t.councilors.push(councilor.clone());
        Ok(councilor)
    }

    async fn get_bounty(&self, chain_id: i32, bounty_id: i64) -> Result<Option<Bounty>, DbError> {
        Ok(self
            .tables()
            .bounties
            .iter()
            .find(|b| b.chain_id == chain_id && b.bounty_id == bounty_id)
            .cloned())
    }

    async fn insert_bounty(&self, mut bounty: Bounty) -> Result<Bounty, DbError> {
        let mut t = self.tables();
        bounty.id = t.assign_id();
        t.bounties.push(bounty.clone());
        Ok(bounty)
    }

    async fn update_bounty(&self, bounty: &Bounty) -> Result<(), DbError> {
        replace(&mut self.tables().bounties, |b| b.id, bounty, "bounty")
    }

    async fn get_treasury_proposal(
        &self,
        chain_id: i32,
        proposal_id: i64,
    ) -> Result<Option<TreasuryProposal>, DbError> {
        Ok(self
            .tables()
            .treasury_proposals
            .iter()
            .find(|p| p.chain_id == chain_id && p.proposal_id == proposal_id)
            .cloned())
    }

    async fn insert_treasury_proposal(
        &self,
        mut proposal: TreasuryProposal,
    ) -> Result<TreasuryProposal, DbError> {
        let mut t = self.tables();
        proposal.id = t.assign_id();
        t.treasury_proposals.push(proposal.clone());
        Ok(proposal)
    }

    async fn update_treasury_proposal(&self, proposal: &TreasuryProposal) -> Result<(), DbError> {
        replace(&mut self.tables().treasury_proposals, |p| p.id, proposal, "treasury_proposal")
    }

    async fn get_proposal_by_index(
        &self,
        chain_id: i32,
        proposal_index: i64,
    ) -> Result<Option<Proposal>, DbError> {
        Ok(self
            .tables()
            .proposals
            .iter()
            .find(|p| p.chain_id == chain_id && p.proposal_index == Some(proposal_index))
            .cloned())
    }

    async fn get_proposal_by_motion_hash(
        &self,
        chain_id: i32,
        motion_hash: &str,
    ) -> Result<Option<Proposal>, DbError> {
        Ok(self
            .tables()
            .proposals
            .iter()
            .find(|p| p.chain_id == chain_id && p.motion_hash.as_deref() == Some(motion_hash))
            .cloned())
    }

    async fn insert_proposal(&self, mut proposal: Proposal) -> Result<Proposal, DbError> {
        let mut t = self.tables();
        proposal.id = t.assign_id();
        t.proposals.push(proposal.clone());
        Ok(proposal)
    }

    async fn update_proposal(&self, proposal: &Proposal) -> Result<(), DbError> {
        replace(&mut self.tables().proposals, |p| p.id, proposal, "proposal")
    }

    async fn get_endorsement(
        &self,
        proposal_id: i32,
        endorser: i32,
    ) -> Result<Option<Endorsement>, DbError> {
        Ok(self
            .tables()
            .endorsements
            .iter()
            .find(|e| e.proposal_id == proposal_id && e.endorser == endorser)
            .cloned())
    }

    async fn insert_endorsement(&self, mut endorsement: Endorsement) -> Result<Endorsement, DbError> {
        let mut t = self.tables();
        endorsement.id = t.assign_id();
        t.endorsements.push(endorsement.clone());
        Ok(endorsement)
    }

    async fn get_referendum(
        &self,
        chain_id: i32,
        referendum_index: i64,
    ) -> Result<Option<Referendum>, DbError> {
        Ok(self
            .tables()
            .referenda
            .iter()
            .find(|r| r.chain_id == chain_id && r.referendum_index == referendum_index)
            .cloned())
    }

    async fn insert_referendum(&self, mut referendum: Referendum) -> Result<Referendum, DbError> {
        let mut t = self.tables();
        referendum.id = t.assign_id();
        t.referenda.push(referendum.clone());
        Ok(referendum)
    }

    async fn update_referendum(&self, referendum: &Referendum) -> Result<(), DbError> {
        replace(&mut self.tables().referenda, |r| r.id, referendum, "referendum")
    }

    async fn get_referendum_vote(
        &self,
        referendum_id: i32,
        voter: i32,
    ) -> Result<Option<ReferendumVote>, DbError> {
        Ok(self
            .tables()
            .referendum_votes
            .iter()
            .find(|v| v.referendum_id == referendum_id && v.voter == voter)
            .cloned())
    }

    async fn insert_referendum_vote(&self, mut vote: ReferendumVote) -> Result<ReferendumVote, DbError> {
        let mut t = self.tables();
        vote.id = t.assign_id();
        t.referendum_votes.push(vote.clone());
        Ok(vote)
    }

    async fn get_tip_proposal(
        &self,
        chain_id: i32,
        motion_hash: &str,
    ) -> Result<Option<TipProposal>, DbError> {
        Ok(self
            .tables()
            .tip_proposals
            .iter()
            .find(|p| p.chain_id == chain_id && p.motion_hash == motion_hash)
            .cloned())
    }

    async fn insert_tip_proposal(&self, mut proposal: TipProposal) -> Result<TipProposal, DbError> {
        let mut t = self.tables();
        proposal.id = t.assign_id();
        t.tip_proposals.push(proposal.clone());
        Ok(proposal)
    }

    async fn update_tip_proposal(&self, proposal: &TipProposal) -> Result<(), DbError> {
        replace(&mut self.tables().tip_proposals, |p| p.id, proposal, "tip_proposal")
    }

    async fn insert_tip(&self, mut tip: Tip) -> Result<Tip, DbError> {
        let mut t = self.tables();
        tip.id = t.assign_id();
        t.tips.push(tip.clone());
        Ok(tip)
    }
}
