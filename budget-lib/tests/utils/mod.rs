use budget_lib::config::Config;
use budget_lib::provision::ProvisionPlan;
use budget_repo::admin_repo::AdminCredentials;
use budget_repo::mem_repo::MemServer;
use rstest::*;
use tracing::info;
use tracing::Level;

pub const ROOT_PASSWORD: &str = "correct horse battery staple";

#[fixture]
#[once]
pub fn tracing_setup() -> () {
    tracing_subscriber::fmt()
        .pretty()
        .with_max_level(Level::DEBUG)
        .init();
    info!("tracing initialized");
}

#[fixture]
pub fn server() -> MemServer {
    MemServer::new("root", ROOT_PASSWORD)
}

#[fixture]
pub fn credentials() -> AdminCredentials {
    Config::default().credentials(ROOT_PASSWORD.to_owned())
}

#[fixture]
pub fn plan() -> ProvisionPlan {
    Config::default().plan(false).unwrap()
}

pub fn account_key() -> (String, String) {
    ("budget_user".to_owned(), "localhost".to_owned())
}
