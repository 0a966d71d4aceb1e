use serde::{Deserialize, Serialize};

use super::status::TreasuryProposalStatus;

/// A treasury spend proposal, keyed by its proposal id within a chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreasuryProposal {
    pub id: i32,
    pub chain_id: i32,
    pub proposal_id: i64,
    pub value: Option<f64>,
    pub beneficiary: Option<i32>,
    pub council_motion_id: Option<i32>,
    pub proposed_by: Option<i32>,
    pub proposed_at: Option<i32>,
    pub status: Option<TreasuryProposalStatus>,
    pub modified_at: Option<i32>,
}

impl TreasuryProposal {
    pub fn new(
        chain_id: i32,
        proposal_id: i64,
        status: TreasuryProposalStatus,
        modified_at: i32,
    ) -> Self {
        Self {
            id: 0,
            chain_id,
            proposal_id,
            value: None,
            beneficiary: None,
            council_motion_id: None,
            proposed_by: None,
            proposed_at: None,
            status: Some(status),
            modified_at: Some(modified_at),
        }
    }
}
