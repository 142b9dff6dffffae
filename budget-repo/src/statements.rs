//! Text of the administrative statements issued during provisioning.
//!
//! Names are validated [`Identifier`]s and [`Account`]s and are inserted as is. Passwords are the
//! only free-form values and go through [`quote_literal`].

use crate::account::{Account, Identifier};
use crate::schema::{CHARACTER_SET, COLLATION};

pub const FLUSH_PRIVILEGES: &str = "FLUSH PRIVILEGES";

pub const ACCOUNT_EXISTS: &str = "SELECT COUNT(*) FROM mysql.user WHERE User = ? AND Host = ?";

/// Quotes a string literal, escaping backslashes and single quotes.
pub fn quote_literal(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("''"),
            _ => quoted.push(c),
        }
    }
    quoted.push('\'');
    quoted
}

pub fn create_database(database: &Identifier) -> String {
    format!(
        "CREATE DATABASE IF NOT EXISTS {} CHARACTER SET {} COLLATE {}",
        database.quoted(),
        CHARACTER_SET,
        COLLATION
    )
}

pub fn use_database(database: &Identifier) -> String {
    format!("USE {}", database.quoted())
}

pub fn create_user(account: &Account, password: &str) -> String {
    format!(
        "CREATE USER IF NOT EXISTS {} IDENTIFIED BY {}",
        account.quoted(),
        quote_literal(password)
    )
}

pub fn alter_user_password(account: &Account, password: &str) -> String {
    format!(
        "ALTER USER {} IDENTIFIED BY {}",
        account.quoted(),
        quote_literal(password)
    )
}

pub fn grant_all_privileges(database: &Identifier, account: &Account) -> String {
    format!(
        "GRANT ALL PRIVILEGES ON {}.* TO {}",
        database.quoted(),
        account.quoted()
    )
}
