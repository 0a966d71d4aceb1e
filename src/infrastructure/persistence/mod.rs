pub mod connection;
pub mod entities;
pub mod error;
pub mod factory;
pub mod gateway;
pub mod memory;
pub mod repositories;
pub mod store;

pub use connection::DbPool;
pub use error::DbError;
pub use factory::RepositoryFactory;
pub use gateway::GovernanceStore;
pub use memory::InMemoryStore;
pub use repositories::Repositories;
pub use store::SeaOrmStore;
