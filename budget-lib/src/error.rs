use crate::provision::Stage;
use budget_repo::admin_repo::AdminRepoError;
use std::error::Error as StdError;
use thiserror::Error;

pub const EXIT_INVALID_CONFIG: u8 = 1;
pub const EXIT_LOGIN_FAILED: u8 = 2;
pub const EXIT_SQL_FAILED: u8 = 3;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Root-Login failed")]
    Login(#[source] AdminRepoError),
    #[error("SQL error while {}", .stage.next_step())]
    Sql {
        stage: Stage,
        #[source]
        source: AdminRepoError,
    },
}

impl ProvisionError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ProvisionError::Login(_) => EXIT_LOGIN_FAILED,
            ProvisionError::Sql { .. } => EXIT_SQL_FAILED,
        }
    }
}

/// Renders an error followed by all of its causes, e.g.
/// `Root-Login failed: Unable to connect to localhost:3306 as root: Access denied`.
pub fn report(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
