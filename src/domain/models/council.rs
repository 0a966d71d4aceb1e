use serde::{Deserialize, Serialize};

use super::status::CouncilMotionStatus;

/// A council motion, keyed by its motion hash within a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouncilMotion {
    pub id: i32,
    pub chain_id: i32,
    pub motion_hash: String,
    pub proposal_index: Option<i64>,
    /// Section of the proposed call
    pub section: Option<String>,
    /// Method of the proposed call
    pub method: Option<String>,
    pub proposed_by: Option<i32>,
    pub from_block: Option<i32>,
    pub to_block: Option<i32>,
    pub status: Option<CouncilMotionStatus>,
    pub modified_at: Option<i32>,
}

impl CouncilMotion {
    /// Creates a motion with no known status
    pub fn new(chain_id: i32, motion_hash: String) -> Self {
        Self {
            id: 0,
            chain_id,
            motion_hash,
            proposal_index: None,
            section: None,
            method: None,
            proposed_by: None,
            from_block: None,
            to_block: None,
            status: None,
            modified_at: None,
        }
    }
}

/// A councilor's vote on a motion. One per (motion, voter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouncilMotionVote {
    pub id: i32,
    pub council_motion_id: i32,
    pub account_id: i32,
    pub approved: bool,
    pub block: i32,
}

/// A council term, opened by a `NewTerm` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Councilterm {
    pub id: i32,
    pub chain_id: i32,
    pub from_block: i32,
}

/// Membership of an account in a council term
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Councilor {
    pub id: i32,
    pub councilterm_id: i32,
    pub account_id: i32,
}
