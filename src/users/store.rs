//! User persistence.

use libsql::{Connection, params};

use super::model::{User, validate_username};
use crate::error::{Error, Result};
use crate::permission::StaffGrant;

const SELECT: &str = "SELECT username, name, staff_member, is_superuser FROM users";

/// Insert a new user. Fails with `Conflict` if the username is taken.
pub async fn create(conn: &Connection, user: &User) -> Result<()> {
    validate_username(&user.username)?;

    let inserted = conn
        .execute(
            "INSERT INTO users (username, name, staff_member, is_superuser) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (username) DO NOTHING",
            params![
                user.username.as_str(),
                user.name.as_str(),
                user.staff_member as i64,
                user.is_superuser as i64
            ],
        )
        .await?;
    if inserted == 0 {
        return Err(Error::Conflict(format!(
            "user {} already exists",
            user.username
        )));
    }
    tracing::info!(username = %user.username, "Created user");
    Ok(())
}

/// Look a user up by username.
pub async fn get(conn: &Connection, username: &str) -> Result<Option<User>> {
    let mut rows = conn
        .query(&format!("{SELECT} WHERE username = ?1"), params![username])
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(User::from_row(&row)?)),
        None => Ok(None),
    }
}

/// Look a user up by username, failing with `NotFound` if absent.
pub async fn require(conn: &Connection, username: &str) -> Result<User> {
    get(conn, username)
        .await?
        .ok_or_else(|| Error::NotFound(format!("user {username}")))
}

/// Load the authenticated actor. A token naming a deleted or unknown user
/// does not authenticate anybody.
pub async fn require_actor(conn: &Connection, username: &str) -> Result<User> {
    get(conn, username).await?.ok_or(Error::Unauthorized)
}

/// Every user, ordered by username.
pub async fn list(conn: &Connection) -> Result<Vec<User>> {
    let mut rows = conn
        .query(&format!("{SELECT} ORDER BY username"), ())
        .await?;
    let mut users = Vec::new();
    while let Some(row) = rows.next().await? {
        users.push(User::from_row(&row)?);
    }
    Ok(users)
}

/// Change a user's display name.
pub async fn update_name(conn: &Connection, username: &str, name: &str) -> Result<()> {
    let changed = conn
        .execute(
            "UPDATE users SET name = ?1 WHERE username = ?2",
            params![name, username],
        )
        .await?;
    if changed == 0 {
        return Err(Error::NotFound(format!("user {username}")));
    }
    Ok(())
}

/// Set the `staff_member` flag of the user named by `grant`.
pub async fn set_staff_member(conn: &Connection, grant: StaffGrant, value: bool) -> Result<()> {
    let changed = conn
        .execute(
            "UPDATE users SET staff_member = ?1 WHERE username = ?2",
            params![value as i64, grant.target()],
        )
        .await?;
    if changed == 0 {
        return Err(Error::NotFound(format!("user {}", grant.target())));
    }
    tracing::info!(username = %grant.target(), staff_member = value, "Changed staff permission");
    Ok(())
}
