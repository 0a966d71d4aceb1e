use std::str::FromStr;

use crate::infrastructure::persistence::error::DbError;

pub mod block_repository;
pub mod bounty_repository;
pub mod chain_repository;
pub mod council_repository;
pub mod democracy_repository;
pub mod tip_repository;
pub mod treasury_repository;

pub use block_repository::BlockRepository;
pub use bounty_repository::BountyRepository;
pub use chain_repository::ChainRepository;
pub use council_repository::CouncilRepository;
pub use democracy_repository::DemocracyRepository;
pub use tip_repository::TipRepository;
pub use treasury_repository::TreasuryRepository;

/// Collection of all repositories
#[derive(Clone, Debug)]
pub struct Repositories {
    /// Repository for chain and account operations
    pub chain: ChainRepository,
    /// Repository for block operations
    pub block: BlockRepository,
    /// Repository for council motions, votes and terms
    pub council: CouncilRepository,
    /// Repository for bounty operations
    pub bounty: BountyRepository,
    /// Repository for treasury proposal operations
    pub treasury: TreasuryRepository,
    /// Repository for democracy proposals, referenda, votes and endorsements
    pub democracy: DemocracyRepository,
    /// Repository for tip proposals and tips
    pub tip: TipRepository,
}

impl Repositories {
    /// Create a new Repositories instance
    pub fn new(
        chain: ChainRepository,
        block: BlockRepository,
        council: CouncilRepository,
        bounty: BountyRepository,
        treasury: TreasuryRepository,
        democracy: DemocracyRepository,
        tip: TipRepository,
    ) -> Self {
        Self {
            chain,
            block,
            council,
            bounty,
            treasury,
            democracy,
            tip,
        }
    }
}

/// Column form of an optional status
pub(crate) fn stored_name<T: std::fmt::Display>(value: Option<T>) -> Option<String> {
    value.map(|v| v.to_string())
}

/// Parse an optional status column back into its enum
pub(crate) fn parse_stored<T: FromStr<Err = String>>(value: Option<String>) -> Result<Option<T>, DbError> {
    value
        .map(|v| v.parse::<T>().map_err(DbError::InvalidValue))
        .transpose()
}
