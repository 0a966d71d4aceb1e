use serde::{Deserialize, Serialize};

use super::status::{ProposalStatus, ProposalType, ReferendumStatus};

/// Call behind a noted preimage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreimageCall {
    Decoded { section: String, method: String },
    /// Neither the `Proposal` nor the `Call` schema matched the payload
    DecodeFailed,
}

/// A democracy proposal
///
/// Keyed by its proposal index once known, otherwise by the preimage hash it
/// was noted under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: i32,
    pub chain_id: i32,
    pub proposal_index: Option<i64>,
    pub motion_hash: Option<String>,
    /// Call decoded from the proposal's preimage
    pub call: Option<PreimageCall>,
    pub proposed_by: Option<i32>,
    pub proposed_at: Option<i32>,
    pub status: Option<ProposalStatus>,
    pub proposal_type: ProposalType,
    pub modified_at: Option<i32>,
}

impl Proposal {
    pub fn new(chain_id: i32, status: ProposalStatus, modified_at: i32) -> Self {
        Self {
            id: 0,
            chain_id,
            proposal_index: None,
            motion_hash: None,
            call: None,
            proposed_by: None,
            proposed_at: None,
            status: Some(status),
            proposal_type: ProposalType::Democracy,
            modified_at: Some(modified_at),
        }
    }
}

/// A referendum, keyed by its referendum index within a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referendum {
    pub id: i32,
    pub chain_id: i32,
    pub referendum_index: i64,
    pub vote_threshold: Option<String>,
    pub proposal_id: Option<i32>,
    pub started_at: Option<i32>,
    pub ended_at: Option<i32>,
    pub status: Option<ReferendumStatus>,
    pub modified_at: Option<i32>,
}

impl Referendum {
    /// Creates a referendum with no known status
    pub fn new(chain_id: i32, referendum_index: i64) -> Self {
        Self {
            id: 0,
            chain_id,
            referendum_index,
            vote_threshold: None,
            proposal_id: None,
            started_at: None,
            ended_at: None,
            status: None,
            modified_at: None,
        }
    }
}

/// A referendum vote. One per (referendum, voter); the first one wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferendumVote {
    pub id: i32,
    pub referendum_id: i32,
    pub voter: i32,
    /// `true` for aye
    pub vote: bool,
    pub locked_value: f64,
    /// Voting power multiplier
    pub conviction: f64,
    pub voted_at: i32,
}

/// A second (endorsement) of a proposal. One per (proposal, endorser).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endorsement {
    pub id: i32,
    pub proposal_id: i32,
    pub endorser: i32,
    pub endorsed_at: i32,
}
