use crate::account::{Account, Identifier};
use crate::schema::TableDefinition;
use async_trait::async_trait;
use std::fmt::{Debug, Formatter};
use thiserror::Error;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3306;
pub const DEFAULT_ROOT_USER: &str = "root";

/// Opens administrative sessions on a database server.
#[async_trait]
pub trait AdminConnector: Sync + Send {
    async fn connect(
        &self,
        credentials: &AdminCredentials,
    ) -> Result<Box<dyn AdminRepo>, AdminRepoError>;
}

/// A single administrative session. Every statement is committed as soon as it completes.
#[async_trait]
pub trait AdminRepo: Send {
    async fn create_database(&mut self, database: &Identifier) -> Result<(), AdminRepoError>;
    async fn use_database(&mut self, database: &Identifier) -> Result<(), AdminRepoError>;
    async fn create_table(&mut self, table: &TableDefinition) -> Result<(), AdminRepoError>;
    async fn account_exists(&mut self, account: &Account) -> Result<bool, AdminRepoError>;
    async fn create_account(
        &mut self,
        account: &Account,
        password: &str,
    ) -> Result<(), AdminRepoError>;
    async fn set_account_password(
        &mut self,
        account: &Account,
        password: &str,
    ) -> Result<(), AdminRepoError>;
    async fn grant_all_privileges(
        &mut self,
        database: &Identifier,
        account: &Account,
    ) -> Result<(), AdminRepoError>;
    async fn flush_privileges(&mut self) -> Result<(), AdminRepoError>;
    /// Ends the session. Closing an already closed session does nothing.
    async fn close(&mut self) -> Result<(), AdminRepoError>;
}

#[derive(Clone)]
pub struct AdminCredentials {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl AdminCredentials {
    pub fn new(host: String, port: u16, user: String, password: String) -> AdminCredentials {
        AdminCredentials {
            host,
            port,
            user,
            password,
        }
    }
}

impl Debug for AdminCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Error, Debug)]
pub enum AdminRepoError {
    #[error("Unable to connect to {host}:{port} as {user}")]
    ConnectionFailed {
        host: String,
        port: u16,
        user: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Connection is closed")]
    ConnectionClosed,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AdminRepoError {
    pub fn connection_failed(
        credentials: &AdminCredentials,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> AdminRepoError {
        AdminRepoError::ConnectionFailed {
            host: credentials.host.clone(),
            port: credentials.port,
            user: credentials.user.clone(),
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_password() {
        let credentials = AdminCredentials::new(
            DEFAULT_HOST.to_owned(),
            DEFAULT_PORT,
            DEFAULT_ROOT_USER.to_owned(),
            "hunter2".to_owned(),
        );
        let debug = format!("{:?}", credentials);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn connection_failed_keeps_driver_message() {
        let credentials = AdminCredentials::new(
            DEFAULT_HOST.to_owned(),
            DEFAULT_PORT,
            DEFAULT_ROOT_USER.to_owned(),
            String::new(),
        );
        let err = AdminRepoError::connection_failed(&credentials, "Access denied");
        assert_eq!("Unable to connect to localhost:3306 as root", err.to_string());
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!("Access denied", source.to_string());
    }
}
