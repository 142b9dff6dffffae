//! An in-memory stand-in for a MySQL server, used to exercise provisioning without a database.

mod admin_repo;

use crate::admin_repo::{AdminConnector, AdminCredentials, AdminRepo, AdminRepoError};
use crate::mem_repo::admin_repo::MemAdminRepo;
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Operations that can be made to fail on a [`MemServer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Failure {
    CreateDatabase,
    UseDatabase,
    CreateTable(&'static str),
    AccountLookup,
    CreateAccount,
    SetAccountPassword,
    Grant,
    Flush,
    Close,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServerState {
    /// Tables of each database, in creation order
    pub databases: HashMap<String, Vec<String>>,
    /// Password of each `(user, host)` account
    pub accounts: HashMap<(String, String), String>,
    /// `(database, user, host)` triples holding all privileges
    pub grants: HashSet<(String, String, String)>,
    pub flushes: usize,
    /// Statements that completed, in order. Passwords are masked.
    pub statements: Vec<String>,
    pub connections_opened: usize,
    pub connections_closed: usize,
    pub failures: Vec<Failure>,
}

pub struct MemServer {
    root_user: String,
    root_password: String,
    state: Arc<RwLock<ServerState>>,
}

impl MemServer {
    pub fn new(root_user: &str, root_password: &str) -> MemServer {
        MemServer {
            root_user: root_user.to_owned(),
            root_password: root_password.to_owned(),
            state: Arc::new(RwLock::new(ServerState::default())),
        }
    }

    /// Makes every later attempt of `failure` return an error.
    pub fn fail_on(self, failure: Failure) -> MemServer {
        if let Ok(mut state) = self.state.write() {
            state.failures.push(failure);
        }
        self
    }

    /// Creates an account directly, as if it had been set up before provisioning.
    pub fn with_account(self, user: &str, host: &str, password: &str) -> MemServer {
        if let Ok(mut state) = self.state.write() {
            state
                .accounts
                .insert((user.to_owned(), host.to_owned()), password.to_owned());
        }
        self
    }

    pub fn snapshot(&self) -> ServerState {
        match self.read_lock() {
            Ok(state) => state.clone(),
            Err(_) => ServerState::default(),
        }
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<ServerState>, anyhow::Error> {
        self.state
            .read()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<ServerState>, anyhow::Error> {
        self.state
            .write()
            .map_err(|_| anyhow!("Unable to acquire lock"))
    }
}

#[async_trait]
impl AdminConnector for MemServer {
    async fn connect(
        &self,
        credentials: &AdminCredentials,
    ) -> Result<Box<dyn AdminRepo>, AdminRepoError> {
        if credentials.user != self.root_user || credentials.password != self.root_password {
            let message = format!(
                "1045 (28000): Access denied for user '{}'@'{}' (using password: {})",
                credentials.user,
                credentials.host,
                if credentials.password.is_empty() {
                    "NO"
                } else {
                    "YES"
                }
            );
            return Err(AdminRepoError::connection_failed(credentials, message));
        }

        self.write_lock()?.connections_opened += 1;
        Ok(Box::new(MemAdminRepo::new(self.state.clone())))
    }
}
