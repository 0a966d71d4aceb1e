//! SeaORM entities of the governance read model
//!
//! The tables are created by external migration tooling. Status and type
//! columns hold the variant names of the domain enums.

pub mod account;
pub mod block;
pub mod bounty;
pub mod chain;
pub mod council_motion;
pub mod council_motion_vote;
pub mod councilor;
pub mod councilterm;
pub mod endorsement;
pub mod proposal;
pub mod referendum;
pub mod referendum_vote;
pub mod tip;
pub mod tip_proposal;
pub mod treasury_proposal;
