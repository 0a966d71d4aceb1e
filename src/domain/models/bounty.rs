use serde::{Deserialize, Serialize};

use super::status::BountyStatus;

/// A treasury bounty, keyed by its on-chain bounty id within a chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounty {
    pub id: i32,
    pub chain_id: i32,
    pub bounty_id: i64,
    pub description: Option<String>,
    pub value: Option<f64>,
    pub proposed_by: Option<i32>,
    pub proposed_at: Option<i32>,
    pub status: Option<BountyStatus>,
    pub modified_at: Option<i32>,
}

impl Bounty {
    pub fn new(chain_id: i32, bounty_id: i64, status: BountyStatus, modified_at: i32) -> Self {
        Self {
            id: 0,
            chain_id,
            bounty_id,
            description: None,
            value: None,
            proposed_by: None,
            proposed_at: None,
            status: Some(status),
            modified_at: Some(modified_at),
        }
    }
}
