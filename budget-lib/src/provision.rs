use crate::error::ProvisionError;
use crate::password::gen_password;
use budget_repo::account::{Account, Identifier};
use budget_repo::admin_repo::{AdminConnector, AdminCredentials, AdminRepo, AdminRepoError};
use budget_repo::schema::TABLES;
use std::fmt::{Debug, Display, Formatter};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionPlan {
    pub database: Identifier,
    pub account: Account,
    pub password_length: usize,
    /// Rotate the password of an application account that already exists
    pub reset_existing_password: bool,
}

/// Progress of a provisioning run. Each stage is reached once all statements before it
/// succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    Authenticated,
    SchemaEnsured,
    AppUserEnsured,
    Done,
}

impl Stage {
    pub fn next(self) -> Stage {
        match self {
            Stage::Start => Stage::Authenticated,
            Stage::Authenticated => Stage::SchemaEnsured,
            Stage::SchemaEnsured => Stage::AppUserEnsured,
            Stage::AppUserEnsured | Stage::Done => Stage::Done,
        }
    }

    /// What is being done to get from this stage to the next one.
    pub fn next_step(&self) -> &'static str {
        match self {
            Stage::Start => "logging in",
            Stage::Authenticated => "creating the schema",
            Stage::SchemaEnsured => "setting up the application user",
            Stage::AppUserEnsured => "closing the connection",
            Stage::Done => "finishing",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppUserStatus {
    Created,
    /// The account existed and kept its old password, so the generated one was not applied
    AlreadyExisted,
    PasswordReset,
}

pub struct ProvisionSummary {
    pub database: Identifier,
    pub account: Account,
    pub password: String,
    pub app_user: AppUserStatus,
}

impl ProvisionSummary {
    /// Whether the printed password is the one the server will accept.
    pub fn password_applied(&self) -> bool {
        self.app_user != AppUserStatus::AlreadyExisted
    }
}

impl Debug for ProvisionSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisionSummary")
            .field("database", &self.database)
            .field("account", &self.account)
            .field("password", &"<redacted>")
            .field("app_user", &self.app_user)
            .finish()
    }
}

impl Display for ProvisionSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Done.")?;
        writeln!(f, "Database .........: {}", self.database)?;
        writeln!(f, "App User .........: {}", self.account)?;
        writeln!(f, "App Password .....: {}", self.password)?;
        writeln!(f)?;
        match self.app_user {
            AppUserStatus::AlreadyExisted => {
                writeln!(
                    f,
                    "NOTE: {} already existed and keeps its previous password.",
                    self.account
                )?;
                write!(
                    f,
                    "The password above was NOT applied. Re-run with --reset-password to set it."
                )
            }
            AppUserStatus::PasswordReset => {
                writeln!(f, "The password of the existing account {} was replaced.", self.account)?;
                write!(
                    f,
                    "Store this password securely and use it in your application configuration."
                )
            }
            AppUserStatus::Created => write!(
                f,
                "Store this password securely and use it in your application configuration."
            ),
        }
    }
}

/// Logs in as the administrative user and sets up the database, its tables and the application
/// account. The connection is closed on every path once it has been opened.
pub async fn provision(
    connector: &dyn AdminConnector,
    credentials: &AdminCredentials,
    plan: &ProvisionPlan,
) -> Result<ProvisionSummary, ProvisionError> {
    let mut stage = Stage::Start;
    info!(
        ?stage,
        host = %credentials.host,
        port = credentials.port,
        user = %credentials.user,
        "Logging in"
    );
    let mut repo = connector
        .connect(credentials)
        .await
        .map_err(ProvisionError::Login)?;

    stage = stage.next();
    let result = run(repo.as_mut(), plan, &mut stage).await;

    if let Err(e) = repo.close().await {
        warn!(%e, "Unable to close connection");
    }

    match result {
        Ok(summary) => {
            stage = stage.next();
            info!(?stage, ?summary, "Provisioning finished");
            Ok(summary)
        }
        Err(source) => Err(ProvisionError::Sql { stage, source }),
    }
}

async fn run(
    repo: &mut dyn AdminRepo,
    plan: &ProvisionPlan,
    stage: &mut Stage,
) -> Result<ProvisionSummary, AdminRepoError> {
    repo.create_database(&plan.database).await?;
    repo.use_database(&plan.database).await?;
    for table in TABLES {
        repo.create_table(table).await?;
        info!(table = table.name, "Table ensured");
    }
    *stage = stage.next();
    info!(database = %plan.database, "Schema ensured");

    let password = gen_password(plan.password_length);
    let existed = repo.account_exists(&plan.account).await?;
    repo.create_account(&plan.account, &password).await?;
    let app_user = if !existed {
        AppUserStatus::Created
    } else if plan.reset_existing_password {
        repo.set_account_password(&plan.account, &password).await?;
        AppUserStatus::PasswordReset
    } else {
        warn!(
            account = %plan.account,
            "Account already exists, its password is left unchanged"
        );
        AppUserStatus::AlreadyExisted
    };
    repo.grant_all_privileges(&plan.database, &plan.account)
        .await?;
    repo.flush_privileges().await?;
    *stage = stage.next();
    info!(account = %plan.account, ?app_user, "Application user ensured");

    Ok(ProvisionSummary {
        database: plan.database.clone(),
        account: plan.account.clone(),
        password,
        app_user,
    })
}
