//! The user record.

use serde::Serialize;

use crate::error::{Error, Result};

/// Longest accepted username.
pub const MAX_USERNAME_LEN: usize = 150;

/// Longest accepted display name.
pub const MAX_NAME_LEN: usize = 255;

/// An account row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub username: String,
    pub name: String,
    /// May change other non-superusers' `staff_member` flag.
    pub staff_member: bool,
    /// Administrator. Nobody can change this user's `staff_member` flag
    /// through the web flow.
    pub is_superuser: bool,
}

impl User {
    /// A regular user with no flags set.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            name: String::new(),
            staff_member: false,
            is_superuser: false,
        }
    }

    pub(crate) fn from_row(row: &libsql::Row) -> Result<Self> {
        Ok(Self {
            username: row.get(0)?,
            name: row.get(1)?,
            staff_member: crate::db::flag(row, 2)?,
            is_superuser: crate::db::flag(row, 3)?,
        })
    }
}

/// Usernames are 1-150 characters of letters, digits and `@ . + - _`.
pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
        return Err(Error::BadRequest(format!(
            "Username must be 1 to {MAX_USERNAME_LEN} characters"
        )));
    }
    if let Some(c) = username
        .chars()
        .find(|c| !(c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')))
    {
        return Err(Error::BadRequest(format!(
            "Username may not contain {c:?}"
        )));
    }
    Ok(())
}
