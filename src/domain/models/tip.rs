use serde::{Deserialize, Serialize};

use super::status::TipProposalStatus;

/// A tip proposal, keyed by its hash within a chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TipProposal {
    pub id: i32,
    pub chain_id: i32,
    pub motion_hash: String,
    pub reason: Option<String>,
    pub beneficiary: Option<i32>,
    pub finder: Option<i32>,
    /// Final payout, known once the tip is closed
    pub value: Option<f64>,
    pub proposed_at: Option<i32>,
    pub status: Option<TipProposalStatus>,
    pub modified_at: Option<i32>,
}

impl TipProposal {
    /// Creates a tip proposal with no known status
    pub fn new(chain_id: i32, motion_hash: String) -> Self {
        Self {
            id: 0,
            chain_id,
            motion_hash,
            reason: None,
            beneficiary: None,
            finder: None,
            value: None,
            proposed_at: None,
            status: None,
            modified_at: None,
        }
    }
}

/// A single tip given on a tip proposal. Every tip action is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tip {
    pub id: i32,
    pub tip_proposal_id: i32,
    pub tipper: i32,
    pub value: f64,
    pub tipped_at: i32,
}
