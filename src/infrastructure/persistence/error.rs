use thiserror::Error;

/// Error type for database operations
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SeaORM
    #[error("Database error: {0}")]
    SeaOrmError(#[from] sea_orm::DbErr),
    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
    /// A row that must exist was not found
    #[error("Not found: {0}")]
    NotFound(String),
    /// A stored value could not be mapped back to the domain model
    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
}
