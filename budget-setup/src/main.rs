#[macro_use]
extern crate tracing;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use budget_lib::config::{Config, ConfigError};
use budget_lib::error::{report, EXIT_INVALID_CONFIG};
use budget_lib::provision::provision;
use budget_lib::tracing::level_from_verbosity;
use budget_repo::sqlx_repo::SQLxConnector;

const CONFIG_FILE_NAME: &str = "budget-setup.toml";
const EXIT_SUCCESS: u8 = 0;
const ROOT_PASSWORD_ENV: &str = "BUDGET_SETUP_ROOT_PASSWORD";
const ROOT_PASSWORD_PROMPT: &str = "MySQL root password: ";

/// One-time setup of the budget tracker database, its tables and its application user.
#[derive(Debug, Parser)]
#[command(name = "budget-setup", version)]
struct Cli {
    /// Database server host [default: localhost]
    #[arg(long)]
    host: Option<String>,
    /// Database server port [default: 3306]
    #[arg(long)]
    port: Option<u16>,
    /// Administrative user to log in as [default: root]
    #[arg(long = "root-user", value_name = "USER")]
    root_user: Option<String>,
    /// Database to create [default: budget_tracker]
    #[arg(long = "database", value_name = "NAME")]
    database_name: Option<String>,
    /// Application user to create [default: budget_user]
    #[arg(long = "app-user", value_name = "USER")]
    app_user: Option<String>,
    /// Host the application user may connect from [default: localhost]
    #[arg(long = "app-host", value_name = "HOST")]
    app_host: Option<String>,
    /// Length of the generated password [default: 22]
    #[arg(long = "password-length", value_name = "N")]
    password_length: Option<usize>,
    /// Replace the password of an application user that already exists
    #[arg(long = "reset-password")]
    reset_password: bool,
    /// TOML file with defaults for the options above
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Log more, repeat for debug output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Overrides values from the config file with the flags that were given.
    fn apply(&self, mut config: Config) -> Config {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(root_user) = &self.root_user {
            config.root_user = root_user.clone();
        }
        if let Some(database_name) = &self.database_name {
            config.database_name = database_name.clone();
        }
        if let Some(app_user) = &self.app_user {
            config.app_user = app_user.clone();
        }
        if let Some(app_host) = &self.app_host {
            config.app_host = app_host.clone();
        }
        if let Some(password_length) = self.password_length {
            config.password_length = password_length;
        }
        config
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(parse_error_exit_code(&e));
        }
    };

    if let Err(e) = budget_lib::tracing::init(level_from_verbosity(cli.verbose)) {
        eprintln!("Unable to initialize logging: {}", e);
    }
    info!("tracing initialized");

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => return fail(&e, EXIT_INVALID_CONFIG),
    };
    let plan = match config.plan(cli.reset_password) {
        Ok(plan) => plan,
        Err(e) => return fail(&e, EXIT_INVALID_CONFIG),
    };
    let root_password = match read_root_password() {
        Ok(password) => password,
        Err(e) => return fail(&e, EXIT_INVALID_CONFIG),
    };
    let credentials = config.credentials(root_password);

    let system = actix_rt::System::new();
    match system.block_on(provision(&SQLxConnector, &credentials, &plan)) {
        Ok(summary) => {
            println!();
            println!("{}", summary);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e, e.exit_code()),
    }
}

/// Usage errors exit with 1 rather than clap's 2, which is reserved for a failed login.
/// `--help` and `--version` also arrive as errors and exit successfully.
fn parse_error_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        EXIT_INVALID_CONFIG
    } else {
        EXIT_SUCCESS
    }
}

fn fail(err: &dyn std::error::Error, exit_code: u8) -> ExitCode {
    let message = report(err);
    error!(exit_code, "{}", message);
    eprintln!("[ERROR] {}", message);
    ExitCode::from(exit_code)
}

fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    let config = match get_config_file(cli.config.clone()) {
        Some(path) => {
            info!(path = %path.display(), "Reading config file");
            Config::from_file(&path)?
        }
        None => Config::default(),
    };
    Ok(cli.apply(config))
}

/// An explicitly given file is always used, so that a wrong path is reported. Otherwise the
/// working directory and then `$CONFIGURATION_DIRECTORY` are searched.
fn get_config_file(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if explicit.is_some() {
        return explicit;
    }
    let config_current_dir = PathBuf::from(CONFIG_FILE_NAME);
    if config_current_dir.exists() {
        return Some(config_current_dir);
    }
    if let Ok(config_env) = std::env::var("CONFIGURATION_DIRECTORY") {
        let config_path = PathBuf::from(config_env).join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }
    }

    None
}

fn read_root_password() -> io::Result<String> {
    if let Ok(password) = std::env::var(ROOT_PASSWORD_ENV) {
        info!("Using root password from {}", ROOT_PASSWORD_ENV);
        return Ok(password);
    }
    rpassword::prompt_password(ROOT_PASSWORD_PROMPT)
}
