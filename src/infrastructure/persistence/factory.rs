use sea_orm::DatabaseConnection;

use crate::infrastructure::persistence::connection::DbPool;
use crate::infrastructure::persistence::repositories::{
    BlockRepository, BountyRepository, ChainRepository, CouncilRepository, DemocracyRepository,
    Repositories, TipRepository, TreasuryRepository,
};

/// Factory for creating repositories
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create all repositories
    pub fn create_repositories(db_pool: &DbPool) -> Repositories {
        let conn = db_pool.get_connection().clone();

        Repositories::new(
            Self::create_chain_repository(conn.clone()),
            Self::create_block_repository(conn.clone()),
            Self::create_council_repository(conn.clone()),
            Self::create_bounty_repository(conn.clone()),
            Self::create_treasury_repository(conn.clone()),
            Self::create_democracy_repository(conn.clone()),
            Self::create_tip_repository(conn),
        )
    }

    /// Create a chain repository
    pub fn create_chain_repository(conn: DatabaseConnection) -> ChainRepository {
        ChainRepository::new(conn)
    }

    /// Create a block repository
    pub fn create_block_repository(conn: DatabaseConnection) -> BlockRepository {
        BlockRepository::new(conn)
    }

    /// Create a council repository
    pub fn create_council_repository(conn: DatabaseConnection) -> CouncilRepository {
        CouncilRepository::new(conn)
    }

    /// Create a bounty repository
    pub fn create_bounty_repository(conn: DatabaseConnection) -> BountyRepository {
        BountyRepository::new(conn)
    }

    /// Create a treasury repository
    pub fn create_treasury_repository(conn: DatabaseConnection) -> TreasuryRepository {
        TreasuryRepository::new(conn)
    }

    /// Create a democracy repository
    pub fn create_democracy_repository(conn: DatabaseConnection) -> DemocracyRepository {
        DemocracyRepository::new(conn)
    }

    /// Create a tip repository
    pub fn create_tip_repository(conn: DatabaseConnection) -> TipRepository {
        TipRepository::new(conn)
    }
}
