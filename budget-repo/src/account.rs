use std::fmt::{Display, Formatter};
use thiserror::Error;

pub const MAX_DATABASE_NAME_LEN: usize = 64;
pub const MAX_USER_NAME_LEN: usize = 32;
pub const MAX_HOST_LEN: usize = 255;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NameError {
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },
    #[error("{kind} '{name}' is longer than {max} characters")]
    TooLong {
        kind: &'static str,
        name: String,
        max: usize,
    },
    #[error("{kind} '{name}' contains invalid character '{character}'")]
    InvalidCharacter {
        kind: &'static str,
        name: String,
        character: char,
    },
}

fn validate(
    kind: &'static str,
    name: &str,
    max: usize,
    allowed: impl Fn(char) -> bool,
) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty { kind });
    }
    if name.chars().count() > max {
        return Err(NameError::TooLong {
            kind,
            name: name.to_owned(),
            max,
        });
    }
    if let Some(character) = name.chars().find(|c| !allowed(*c)) {
        return Err(NameError::InvalidCharacter {
            kind,
            name: name.to_owned(),
            character,
        });
    }
    Ok(())
}

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_host_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '-')
}

/// A database or user name that can be embedded in a statement without escaping.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    pub fn database(name: &str) -> Result<Identifier, NameError> {
        validate(
            "Database name",
            name,
            MAX_DATABASE_NAME_LEN,
            is_identifier_char,
        )?;
        Ok(Identifier(name.to_owned()))
    }

    pub fn user(name: &str) -> Result<Identifier, NameError> {
        validate("User name", name, MAX_USER_NAME_LEN, is_identifier_char)?;
        Ok(Identifier(name.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn quoted(&self) -> String {
        format!("`{}`", self.0)
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A MySQL account, i.e. a user name together with the host it may connect from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Account {
    user: Identifier,
    host: String,
}

impl Account {
    pub fn new(user: &str, host: &str) -> Result<Account, NameError> {
        let user = Identifier::user(user)?;
        validate("Account host", host, MAX_HOST_LEN, is_host_char)?;
        Ok(Account {
            user,
            host: host.to_owned(),
        })
    }

    pub fn user(&self) -> &Identifier {
        &self.user
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// The account in the `'user'@'host'` form used by CREATE USER and GRANT
    pub fn quoted(&self) -> String {
        format!("'{}'@'{}'", self.user, self.host)
    }
}

impl Display for Account {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.user, self.host)
    }
}
