//! Governance indexer
//!
//! Walks a chain's block history backward, decodes extrinsics and their
//! correlated events, and reconciles council, treasury, bounty, democracy and
//! tip activity into a relational read model.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod utils;
