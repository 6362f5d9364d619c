//! Database helpers for user rows.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Postgres, Row, Transaction};
use tracing::{info_span, Instrument};
use uuid::Uuid;

const USER_COLUMNS: &str =
    "id, firstname, lastname, email, username, password_hash, activated, created_at";

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub activated: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a user row.
#[derive(Debug)]
pub struct NewUser {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

/// Outcome when attempting to create a new user.
#[derive(Debug)]
pub enum InsertOutcome {
    Created(UserRecord),
    DuplicateEmail,
}

fn user_from_row(row: &PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        firstname: row.get("firstname"),
        lastname: row.get("lastname"),
        email: row.get("email"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        activated: row.get("activated"),
        created_at: row.get("created_at"),
    }
}

/// Derive a username from the first name plus a short random suffix.
///
/// Collisions are tolerated; usernames are display handles, not identity.
#[must_use]
pub fn derive_username(firstname: &str) -> String {
    let base = firstname
        .split_whitespace()
        .next()
        .unwrap_or(firstname)
        .to_lowercase();
    let id = Uuid::new_v4().to_string();
    let suffix = id.split('-').nth(1).unwrap_or("0000").to_string();
    format!("{base}-{suffix}")
}

/// Insert a user; duplicate emails surface as an outcome, not an error.
///
/// Uniqueness is enforced by the index on `users.email`, so two concurrent
/// registrations for the same email cannot both succeed.
///
/// # Errors
/// Returns an error for any database failure other than a duplicate email.
pub async fn insert_user(pool: &PgPool, new_user: &NewUser) -> Result<InsertOutcome> {
    let query = r"
        INSERT INTO users (firstname, lastname, email, username, password_hash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, firstname, lastname, email, username, password_hash, activated, created_at
    ";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(&new_user.firstname)
        .bind(&new_user.lastname)
        .bind(&new_user.email)
        .bind(&new_user.username)
        .bind(&new_user.password_hash)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(InsertOutcome::Created(user_from_row(&row))),
        Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::DuplicateEmail),
        Err(err) => Err(err).context("failed to insert user"),
    }
}

/// # Errors
/// Returns an error if the lookup fails.
pub async fn lookup_user_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = %query
    );
    let row = sqlx::query(&query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by email")?;
    Ok(row.as_ref().map(user_from_row))
}

/// # Errors
/// Returns an error if the lookup fails.
pub async fn lookup_user(pool: &PgPool, user_id: Uuid) -> Result<Option<UserRecord>> {
    let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = %query
    );
    let row = sqlx::query(&query)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user")?;
    Ok(row.as_ref().map(user_from_row))
}

/// Flip the user to activated; harmless if the user already is.
///
/// # Errors
/// Returns an error if the update fails.
pub async fn activate_user(tx: &mut Transaction<'_, Postgres>, user_id: Uuid) -> Result<bool> {
    let query = "UPDATE users SET activated = TRUE WHERE id = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(user_id)
        .execute(&mut **tx)
        .instrument(span)
        .await
        .context("failed to activate user")?;
    Ok(result.rows_affected() > 0)
}

/// # Errors
/// Returns an error if the update fails.
pub async fn update_password_hash(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    password_hash: &str,
) -> Result<bool> {
    let query = "UPDATE users SET password_hash = $2 WHERE id = $1";
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(user_id)
        .bind(password_hash)
        .execute(&mut **tx)
        .instrument(span)
        .await
        .context("failed to update password hash")?;
    Ok(result.rows_affected() > 0)
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[test]
    fn derive_username_uses_first_token_lowercased() {
        let username = derive_username("Jane Ann");
        let mut parts = username.splitn(2, '-');
        assert_eq!(parts.next(), Some("jane"));
        let suffix = parts.next().expect("suffix");
        assert_eq!(suffix.len(), 4);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn derive_username_is_collision_tolerant_not_unique() {
        // Low-entropy suffixes are fine; two calls just rarely match.
        let first = derive_username("jane");
        let second = derive_username("jane");
        assert!(first.starts_with("jane-"));
        assert!(second.starts_with("jane-"));
    }

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &'static str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn is_unique_violation_matches_sqlstate() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("99999"),
        }));
        assert!(!is_unique_violation(&err));

        let err = sqlx::Error::RowNotFound;
        assert!(!is_unique_violation(&err));
    }
}
