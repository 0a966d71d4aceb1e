use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, Set};

use crate::domain::models::{Account, Chain};
use crate::infrastructure::persistence::entities::{account, chain};
use crate::infrastructure::persistence::error::DbError;

/// Repository for chain and account operations
#[derive(Clone, Debug)]
pub struct ChainRepository {
    conn: DatabaseConnection,
}

impl ChainRepository {
    /// Create a new ChainRepository
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Get the chain served at `ws_endpoint`, registering it on first use
    pub async fn get_or_create_chain(&self, ws_endpoint: &str) -> Result<Chain, DbError> {
        let existing = chain::Entity::find()
            .filter(chain::Column::WsEndpoint.eq(ws_endpoint))
            .one(&self.conn)
            .await?;

        let model = match existing {
            Some(model) => model,
            None => {
                chain::ActiveModel {
                    id: NotSet,
                    ws_endpoint: Set(ws_endpoint.to_string()),
                }
                .insert(&self.conn)
                .await?
            }
        };

        Ok(Chain {
            id: model.id,
            ws_endpoint: model.ws_endpoint,
        })
    }

    /// Get an account by address, creating it on first reference
    pub async fn get_or_create_account(&self, address: &str, chain_id: i32) -> Result<Account, DbError> {
        let existing = account::Entity::find()
            .filter(account::Column::ChainId.eq(chain_id))
            .filter(account::Column::Address.eq(address))
            .one(&self.conn)
            .await?;

        let model = match existing {
            Some(model) => model,
            None => {
                account::ActiveModel {
                    id: NotSet,
                    chain_id: Set(chain_id),
                    address: Set(address.to_string()),
                }
                .insert(&self.conn)
                .await?
            }
        };

        Ok(Account {
            id: model.id,
            chain_id: model.chain_id,
            address: model.address,
        })
    }
}
