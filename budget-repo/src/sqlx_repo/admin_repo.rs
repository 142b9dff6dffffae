use crate::account::{Account, Identifier};
use crate::admin_repo::{AdminRepo, AdminRepoError};
use crate::schema::TableDefinition;
use crate::statements;
use anyhow::Context;
use async_trait::async_trait;
use sqlx::mysql::MySqlConnection;
use sqlx::{query_scalar, Connection, Executor};
use tracing::{debug, instrument};

pub struct SQLxAdminRepo {
    connection: Option<MySqlConnection>,
}

impl SQLxAdminRepo {
    pub fn new(connection: MySqlConnection) -> SQLxAdminRepo {
        SQLxAdminRepo {
            connection: Some(connection),
        }
    }

    fn connection(&mut self) -> Result<&mut MySqlConnection, AdminRepoError> {
        self.connection
            .as_mut()
            .ok_or(AdminRepoError::ConnectionClosed)
    }

    // A plain &str is sent over the text protocol, which is needed for USE and works for all
    // the other administrative statements.
    async fn execute<F>(&mut self, statement: &str, context: F) -> Result<(), AdminRepoError>
    where
        F: FnOnce() -> String + Send,
    {
        let connection = self.connection()?;
        let result = connection.execute(statement).await.with_context(context)?;
        debug!(rows_affected = result.rows_affected(), "Statement executed");
        Ok(())
    }
}

#[async_trait]
impl AdminRepo for SQLxAdminRepo {
    #[instrument(skip(self))]
    async fn create_database(&mut self, database: &Identifier) -> Result<(), AdminRepoError> {
        let statement = statements::create_database(database);
        self.execute(&statement, || {
            format!("Unable to create database {}", database)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn use_database(&mut self, database: &Identifier) -> Result<(), AdminRepoError> {
        let statement = statements::use_database(database);
        self.execute(&statement, || {
            format!("Unable to switch to database {}", database)
        })
        .await
    }

    #[instrument(skip(self, table), fields(table = table.name))]
    async fn create_table(&mut self, table: &TableDefinition) -> Result<(), AdminRepoError> {
        self.execute(table.ddl, || format!("Unable to create table {}", table.name))
            .await
    }

    #[instrument(skip(self))]
    async fn account_exists(&mut self, account: &Account) -> Result<bool, AdminRepoError> {
        let count: i64 = query_scalar(statements::ACCOUNT_EXISTS)
            .bind(account.user().as_str())
            .bind(account.host())
            .fetch_one(self.connection()?)
            .await
            .with_context(|| format!("Unable to look up account {}", account))?;
        Ok(count > 0)
    }

    #[instrument(skip(self, password))]
    async fn create_account(
        &mut self,
        account: &Account,
        password: &str,
    ) -> Result<(), AdminRepoError> {
        let statement = statements::create_user(account, password);
        self.execute(&statement, || {
            format!("Unable to create account {}", account)
        })
        .await
    }

    #[instrument(skip(self, password))]
    async fn set_account_password(
        &mut self,
        account: &Account,
        password: &str,
    ) -> Result<(), AdminRepoError> {
        let statement = statements::alter_user_password(account, password);
        self.execute(&statement, || {
            format!("Unable to set password of account {}", account)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn grant_all_privileges(
        &mut self,
        database: &Identifier,
        account: &Account,
    ) -> Result<(), AdminRepoError> {
        let statement = statements::grant_all_privileges(database, account);
        self.execute(&statement, || {
            format!("Unable to grant privileges on {} to {}", database, account)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn flush_privileges(&mut self) -> Result<(), AdminRepoError> {
        self.execute(statements::FLUSH_PRIVILEGES, || {
            "Unable to flush privileges".to_owned()
        })
        .await
    }

    #[instrument(skip(self))]
    async fn close(&mut self) -> Result<(), AdminRepoError> {
        if let Some(connection) = self.connection.take() {
            connection
                .close()
                .await
                .context("Unable to close connection")?;
        }
        Ok(())
    }
}
