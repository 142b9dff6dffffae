mod admin_repo;

use crate::admin_repo::{AdminConnector, AdminCredentials, AdminRepo, AdminRepoError};
use crate::sqlx_repo::admin_repo::SQLxAdminRepo;
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::Connection;
use tracing::{info, instrument};

/// Connects to a MySQL server with a single connection. MySQL sessions start in auto-commit
/// mode and no transaction is ever opened on them.
pub struct SQLxConnector;

#[async_trait]
impl AdminConnector for SQLxConnector {
    #[instrument(skip(self))]
    async fn connect(
        &self,
        credentials: &AdminCredentials,
    ) -> Result<Box<dyn AdminRepo>, AdminRepoError> {
        let options = MySqlConnectOptions::new()
            .host(&credentials.host)
            .port(credentials.port)
            .username(&credentials.user)
            .password(&credentials.password);

        let connection = MySqlConnection::connect_with(&options)
            .await
            .map_err(|e| AdminRepoError::connection_failed(credentials, e))?;
        info!("Connected");

        Ok(Box::new(SQLxAdminRepo::new(connection)))
    }
}
