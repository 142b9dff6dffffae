use crate::password::{DEFAULT_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH};
use crate::provision::ProvisionPlan;
use budget_repo::account::{Account, Identifier, NameError};
use budget_repo::admin_repo::{AdminCredentials, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_ROOT_USER};
use budget_repo::schema::DEFAULT_DATABASE_NAME;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_APP_USER: &str = "budget_user";
pub const DEFAULT_APP_HOST: &str = "localhost";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to read config file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to parse config file {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    InvalidName(#[from] NameError),
    #[error("Password length must be between 1 and {max}, got {0}", max = MAX_PASSWORD_LENGTH)]
    InvalidPasswordLength(usize),
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub root_user: String,
    pub database_name: String,
    pub app_user: String,
    pub app_host: String,
    pub password_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            root_user: DEFAULT_ROOT_USER.to_owned(),
            database_name: DEFAULT_DATABASE_NAME.to_owned(),
            app_user: DEFAULT_APP_USER.to_owned(),
            app_host: DEFAULT_APP_HOST.to_owned(),
            password_length: DEFAULT_PASSWORD_LENGTH,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let config = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        toml::from_str(config.as_str()).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    pub fn credentials(&self, root_password: String) -> AdminCredentials {
        AdminCredentials::new(
            self.host.clone(),
            self.port,
            self.root_user.clone(),
            root_password,
        )
    }

    /// Validates the names and password length and turns them into a plan.
    pub fn plan(&self, reset_existing_password: bool) -> Result<ProvisionPlan, ConfigError> {
        if !(1..=MAX_PASSWORD_LENGTH).contains(&self.password_length) {
            return Err(ConfigError::InvalidPasswordLength(self.password_length));
        }
        Ok(ProvisionPlan {
            database: Identifier::database(&self.database_name)?,
            account: Account::new(&self.app_user, &self.app_host)?,
            password_length: self.password_length,
            reset_existing_password,
        })
    }
}
