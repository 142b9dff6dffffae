use crate::account::{Account, Identifier};
use crate::admin_repo::{AdminRepo, AdminRepoError};
use crate::mem_repo::{Failure, ServerState};
use crate::schema::TableDefinition;
use crate::statements;
use anyhow::anyhow;
use async_trait::async_trait;
use std::sync::{Arc, RwLock, RwLockWriteGuard};

const MASKED_PASSWORD: &str = "********";

pub struct MemAdminRepo {
    state: Arc<RwLock<ServerState>>,
    database: Option<String>,
    open: bool,
}

impl MemAdminRepo {
    pub fn new(state: Arc<RwLock<ServerState>>) -> MemAdminRepo {
        MemAdminRepo {
            state,
            database: None,
            open: true,
        }
    }

    /// Locks the server state for a statement, failing if the session is closed or the
    /// statement was set up to fail.
    fn begin(&self, failure: Failure) -> Result<RwLockWriteGuard<ServerState>, AdminRepoError> {
        if !self.open {
            return Err(AdminRepoError::ConnectionClosed);
        }
        let state = self
            .state
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))?;
        if state.failures.contains(&failure) {
            return Err(anyhow!("Injected failure: {:?}", failure).into());
        }
        Ok(state)
    }
}

#[async_trait]
impl AdminRepo for MemAdminRepo {
    async fn create_database(&mut self, database: &Identifier) -> Result<(), AdminRepoError> {
        let mut state = self.begin(Failure::CreateDatabase)?;
        state
            .databases
            .entry(database.to_string())
            .or_insert_with(Vec::new);
        state
            .statements
            .push(statements::create_database(database));
        Ok(())
    }

    async fn use_database(&mut self, database: &Identifier) -> Result<(), AdminRepoError> {
        let mut state = self.begin(Failure::UseDatabase)?;
        if !state.databases.contains_key(database.as_str()) {
            return Err(anyhow!("1049 (42000): Unknown database '{}'", database).into());
        }
        state.statements.push(statements::use_database(database));
        drop(state);
        self.database = Some(database.to_string());
        Ok(())
    }

    async fn create_table(&mut self, table: &TableDefinition) -> Result<(), AdminRepoError> {
        let mut state = self.begin(Failure::CreateTable(table.name))?;
        let database = self
            .database
            .as_ref()
            .ok_or_else(|| anyhow!("1046 (3D000): No database selected"))?;
        let tables = state
            .databases
            .get_mut(database)
            .ok_or_else(|| anyhow!("1049 (42000): Unknown database '{}'", database))?;

        if let Some(missing) = table
            .references
            .iter()
            .find(|reference| !tables.iter().any(|t| t.as_str() == **reference))
        {
            return Err(anyhow!(
                "1824 (HY000): Failed to open the referenced table '{}'",
                missing
            )
            .into());
        }
        if !tables.iter().any(|t| t == table.name) {
            tables.push(table.name.to_owned());
        }
        state.statements.push(table.ddl.to_owned());
        Ok(())
    }

    async fn account_exists(&mut self, account: &Account) -> Result<bool, AdminRepoError> {
        let state = self.begin(Failure::AccountLookup)?;
        let key = (account.user().to_string(), account.host().to_owned());
        Ok(state.accounts.contains_key(&key))
    }

    async fn create_account(
        &mut self,
        account: &Account,
        password: &str,
    ) -> Result<(), AdminRepoError> {
        let mut state = self.begin(Failure::CreateAccount)?;
        let key = (account.user().to_string(), account.host().to_owned());
        state
            .accounts
            .entry(key)
            .or_insert_with(|| password.to_owned());
        state
            .statements
            .push(statements::create_user(account, MASKED_PASSWORD));
        Ok(())
    }

    async fn set_account_password(
        &mut self,
        account: &Account,
        password: &str,
    ) -> Result<(), AdminRepoError> {
        let mut state = self.begin(Failure::SetAccountPassword)?;
        let key = (account.user().to_string(), account.host().to_owned());
        match state.accounts.get_mut(&key) {
            Some(stored) => *stored = password.to_owned(),
            None => {
                return Err(anyhow!(
                    "1396 (HY000): Operation ALTER USER failed for {}",
                    account.quoted()
                )
                .into())
            }
        }
        state
            .statements
            .push(statements::alter_user_password(account, MASKED_PASSWORD));
        Ok(())
    }

    async fn grant_all_privileges(
        &mut self,
        database: &Identifier,
        account: &Account,
    ) -> Result<(), AdminRepoError> {
        let mut state = self.begin(Failure::Grant)?;
        let key = (account.user().to_string(), account.host().to_owned());
        if !state.accounts.contains_key(&key) {
            return Err(anyhow!(
                "1410 (42000): You are not allowed to create a user with GRANT"
            )
            .into());
        }
        state.grants.insert((
            database.to_string(),
            account.user().to_string(),
            account.host().to_owned(),
        ));
        state
            .statements
            .push(statements::grant_all_privileges(database, account));
        Ok(())
    }

    async fn flush_privileges(&mut self) -> Result<(), AdminRepoError> {
        let mut state = self.begin(Failure::Flush)?;
        state.flushes += 1;
        state
            .statements
            .push(statements::FLUSH_PRIVILEGES.to_owned());
        Ok(())
    }

    async fn close(&mut self) -> Result<(), AdminRepoError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        let mut state = self
            .state
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))?;
        if state.failures.contains(&Failure::Close) {
            return Err(anyhow!("Injected failure: {:?}", Failure::Close).into());
        }
        state.connections_closed += 1;
        Ok(())
    }
}
