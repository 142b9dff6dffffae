use budget_repo::admin_repo::{AdminConnector, AdminCredentials};
use budget_repo::mem_repo::MemServer;
use budget_repo::sqlx_repo::SQLxConnector;
use serde::Deserialize;
use std::fs;

pub const ROOT_PASSWORD: &str = "root-password";

#[derive(Deserialize)]
struct TestConfig {
    host: String,
    port: u16,
    root_user: String,
    root_password: String,
}

#[derive(Debug)]
pub enum RepoType {
    SQLx,
    Mem,
}

pub fn build_connector(repo_type: RepoType) -> (Box<dyn AdminConnector>, AdminCredentials) {
    match repo_type {
        RepoType::SQLx => {
            let config = fs::read_to_string("config_test.toml").unwrap();
            let config: TestConfig = toml::from_str(config.as_str()).unwrap();
            let credentials = AdminCredentials::new(
                config.host,
                config.port,
                config.root_user,
                config.root_password,
            );
            (Box::new(SQLxConnector), credentials)
        }
        RepoType::Mem => {
            let credentials = AdminCredentials::new(
                "localhost".to_owned(),
                3306,
                "root".to_owned(),
                ROOT_PASSWORD.to_owned(),
            );
            (Box::new(MemServer::new("root", ROOT_PASSWORD)), credentials)
        }
    }
}
