use budget_lib::error::{report, ProvisionError};
use budget_lib::password::{ALPHABET, DEFAULT_PASSWORD_LENGTH};
use budget_lib::provision::{provision, AppUserStatus, ProvisionPlan, Stage};
use budget_repo::admin_repo::AdminCredentials;
use budget_repo::mem_repo::{Failure, MemServer};
use budget_repo::schema::TABLES;
use budget_repo::statements;
use rstest::rstest;
use utils::{account_key, credentials, plan, server, tracing_setup};

mod utils;

#[rstest]
#[actix_rt::test]
async fn test_provision_empty_server(
    _tracing_setup: &(),
    server: MemServer,
    credentials: AdminCredentials,
    plan: ProvisionPlan,
) {
    let summary = provision(&server, &credentials, &plan).await.unwrap();

    assert_eq!("budget_tracker", summary.database.as_str());
    assert_eq!("budget_user@localhost", summary.account.to_string());
    assert_eq!(AppUserStatus::Created, summary.app_user);
    assert!(summary.password_applied());
    assert_eq!(DEFAULT_PASSWORD_LENGTH, summary.password.len());
    assert!(summary.password.chars().all(|c| ALPHABET.contains(c)));

    let state = server.snapshot();
    assert_eq!(
        vec!["users", "categories", "transactions"],
        state.databases["budget_tracker"]
    );
    assert_eq!(summary.password, state.accounts[&account_key()]);
    assert!(state.grants.contains(&(
        "budget_tracker".to_owned(),
        "budget_user".to_owned(),
        "localhost".to_owned()
    )));
    assert_eq!(1, state.flushes);
    assert_eq!(1, state.connections_opened);
    assert_eq!(1, state.connections_closed);
}

#[rstest]
#[actix_rt::test]
async fn test_provision_statement_order(
    _tracing_setup: &(),
    server: MemServer,
    credentials: AdminCredentials,
    plan: ProvisionPlan,
) {
    provision(&server, &credentials, &plan).await.unwrap();

    let mut expected = vec![
        statements::create_database(&plan.database),
        statements::use_database(&plan.database),
    ];
    expected.extend(TABLES.iter().map(|table| table.ddl.to_owned()));
    expected.push(statements::create_user(&plan.account, "********"));
    expected.push(statements::grant_all_privileges(&plan.database, &plan.account));
    expected.push(statements::FLUSH_PRIVILEGES.to_owned());

    assert_eq!(expected, server.snapshot().statements);
}

#[rstest]
#[actix_rt::test]
async fn test_provision_twice(
    _tracing_setup: &(),
    server: MemServer,
    credentials: AdminCredentials,
    plan: ProvisionPlan,
) {
    let first = provision(&server, &credentials, &plan).await.unwrap();
    let after_first = server.snapshot();

    let second = provision(&server, &credentials, &plan).await.unwrap();
    let after_second = server.snapshot();

    assert_eq!(after_first.databases, after_second.databases);
    assert_eq!(after_first.grants, after_second.grants);
    assert_eq!(1, after_second.accounts.len());
    assert_eq!(2, after_second.connections_closed);

    // the existing account keeps the first password, the printed one is stale
    assert_eq!(AppUserStatus::AlreadyExisted, second.app_user);
    assert!(!second.password_applied());
    assert_eq!(first.password, after_second.accounts[&account_key()]);
    assert_ne!(second.password, after_second.accounts[&account_key()]);
    assert!(second.to_string().contains("NOT applied"));
}

#[rstest]
#[actix_rt::test]
async fn test_provision_reset_existing_password(
    _tracing_setup: &(),
    credentials: AdminCredentials,
    plan: ProvisionPlan,
) {
    let mut plan = plan;
    let server = MemServer::new("root", utils::ROOT_PASSWORD).with_account(
        "budget_user",
        "localhost",
        "old password",
    );
    plan.reset_existing_password = true;

    let summary = provision(&server, &credentials, &plan).await.unwrap();

    assert_eq!(AppUserStatus::PasswordReset, summary.app_user);
    assert!(summary.password_applied());
    assert_eq!(summary.password, server.snapshot().accounts[&account_key()]);
}

#[rstest]
#[actix_rt::test]
async fn test_provision_custom_password_length(
    _tracing_setup: &(),
    server: MemServer,
    credentials: AdminCredentials,
    plan: ProvisionPlan,
) {
    let mut plan = plan;
    plan.password_length = 40;

    let summary = provision(&server, &credentials, &plan).await.unwrap();

    assert_eq!(40, summary.password.len());
}

#[rstest]
#[actix_rt::test]
async fn test_provision_wrong_root_password(
    _tracing_setup: &(),
    server: MemServer,
    credentials: AdminCredentials,
    plan: ProvisionPlan,
) {
    let mut credentials = credentials;
    credentials.password = "wrong".to_owned();

    let err = provision(&server, &credentials, &plan).await.unwrap_err();

    assert!(matches!(err, ProvisionError::Login(_)));
    assert_eq!(2, err.exit_code());
    let message = report(&err);
    assert!(message.contains("Root-Login"), "{}", message);
    assert!(message.contains("Access denied"), "{}", message);

    let state = server.snapshot();
    assert_eq!(0, state.connections_opened);
    assert!(state.databases.is_empty());
}

#[rstest]
#[actix_rt::test]
async fn test_provision_fails_creating_foreign_key(
    _tracing_setup: &(),
    credentials: AdminCredentials,
    plan: ProvisionPlan,
) {
    let server = MemServer::new("root", utils::ROOT_PASSWORD)
        .fail_on(Failure::CreateTable("categories"));

    let err = provision(&server, &credentials, &plan).await.unwrap_err();

    assert!(matches!(
        err,
        ProvisionError::Sql {
            stage: Stage::Authenticated,
            ..
        }
    ));
    assert_eq!(3, err.exit_code());
    let message = report(&err);
    assert!(message.starts_with("SQL error while creating the schema"), "{}", message);
    assert!(message.contains("categories"), "{}", message);

    let state = server.snapshot();
    assert_eq!(vec!["users"], state.databases["budget_tracker"]);
    assert!(state.accounts.is_empty());
    assert_eq!(1, state.connections_closed);
}

#[rstest]
#[case::account_lookup(Failure::AccountLookup)]
#[case::create_account(Failure::CreateAccount)]
#[case::grant(Failure::Grant)]
#[case::flush(Failure::Flush)]
#[actix_rt::test]
async fn test_provision_fails_setting_up_app_user(
    _tracing_setup: &(),
    credentials: AdminCredentials,
    plan: ProvisionPlan,
    #[case] failure: Failure,
) {
    let server = MemServer::new("root", utils::ROOT_PASSWORD).fail_on(failure);

    let err = provision(&server, &credentials, &plan).await.unwrap_err();

    assert!(matches!(
        err,
        ProvisionError::Sql {
            stage: Stage::SchemaEnsured,
            ..
        }
    ));
    assert_eq!(3, err.exit_code());
    assert!(report(&err).starts_with("SQL error while setting up the application user"));
    assert_eq!(1, server.snapshot().connections_closed);
}

#[rstest]
#[actix_rt::test]
async fn test_close_failure_does_not_mask_sql_error(
    _tracing_setup: &(),
    credentials: AdminCredentials,
    plan: ProvisionPlan,
) {
    let server = MemServer::new("root", utils::ROOT_PASSWORD)
        .fail_on(Failure::Grant)
        .fail_on(Failure::Close);

    let err = provision(&server, &credentials, &plan).await.unwrap_err();

    assert_eq!(3, err.exit_code());
}

#[rstest]
#[actix_rt::test]
async fn test_close_failure_after_success(
    _tracing_setup: &(),
    credentials: AdminCredentials,
    plan: ProvisionPlan,
) {
    let server = MemServer::new("root", utils::ROOT_PASSWORD).fail_on(Failure::Close);

    let summary = provision(&server, &credentials, &plan).await.unwrap();

    assert_eq!(AppUserStatus::Created, summary.app_user);
}

#[rstest]
#[case::create_database(Failure::CreateDatabase)]
#[case::use_database(Failure::UseDatabase)]
#[case::create_users(Failure::CreateTable("users"))]
#[case::create_transactions(Failure::CreateTable("transactions"))]
#[actix_rt::test]
async fn test_provision_fails_creating_schema(
    _tracing_setup: &(),
    credentials: AdminCredentials,
    plan: ProvisionPlan,
    #[case] failure: Failure,
) {
    let server = MemServer::new("root", utils::ROOT_PASSWORD).fail_on(failure);

    let err = provision(&server, &credentials, &plan).await.unwrap_err();

    assert!(matches!(
        err,
        ProvisionError::Sql {
            stage: Stage::Authenticated,
            ..
        }
    ));
    assert_eq!(3, err.exit_code());
    assert!(report(&err).starts_with("SQL error while creating the schema"));

    let state = server.snapshot();
    assert!(state.accounts.is_empty());
    assert_eq!(1, state.connections_closed);
}

#[rstest]
#[actix_rt::test]
async fn test_provision_fails_resetting_password(
    _tracing_setup: &(),
    credentials: AdminCredentials,
    plan: ProvisionPlan,
) {
    let server = MemServer::new("root", utils::ROOT_PASSWORD)
        .with_account("budget_user", "localhost", "old password")
        .fail_on(Failure::SetAccountPassword);
    let mut plan = plan;
    plan.reset_existing_password = true;

    let err = provision(&server, &credentials, &plan).await.unwrap_err();

    assert!(matches!(
        err,
        ProvisionError::Sql {
            stage: Stage::SchemaEnsured,
            ..
        }
    ));
    assert_eq!(3, err.exit_code());

    let state = server.snapshot();
    assert_eq!("old password", state.accounts[&account_key()]);
    assert!(state.grants.is_empty());
    assert_eq!(1, state.connections_closed);
}
