//! Single-use, time-limited codes for account activation and password reset.
//!
//! Codes are high-entropy random values stored as issued; lookups only see
//! codes that have not been consumed, so a successful activation or reset
//! cannot be replayed.

use anyhow::{Context, Result};
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{info_span, Instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind {
    Activation,
    Reset,
}

impl CodeKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Activation => "Activation",
            Self::Reset => "Reset",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SingleUseCode {
    pub code: String,
    pub user_id: Uuid,
    /// Target email at the time of request; set for reset codes only.
    pub email: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl SingleUseCode {
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Remaining lifetime in whole hours, rounded up, for email copy.
    #[must_use]
    pub fn ttl_hours(&self) -> i64 {
        let minutes = (self.expires_at - Utc::now()).num_minutes();
        ((minutes + 59) / 60).max(1)
    }
}

/// Generate a high-entropy code for email links.
///
/// 32 random bytes make collisions across live codes cryptographically
/// negligible, so the code value alone identifies the record.
///
/// # Errors
/// Returns an error if the system RNG fails.
pub fn generate_code() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate code")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// Persist a new code for the user, expiring after `ttl`.
///
/// Reset codes also carry the email the request was made for.
///
/// # Errors
/// Returns an error if code generation or the insert fails.
pub async fn issue(
    pool: &PgPool,
    user_id: Uuid,
    kind: CodeKind,
    ttl: Duration,
    email: Option<&str>,
) -> Result<SingleUseCode> {
    let code = generate_code()?;
    let expires_at = Utc::now() + ttl;

    match kind {
        CodeKind::Activation => {
            let query = r"
                INSERT INTO activation_codes (code, user_id, expires_at)
                VALUES ($1, $2, $3)
            ";
            let span = info_span!(
                "db.query",
                db.system = "postgresql",
                db.operation = "INSERT",
                db.statement = query
            );
            sqlx::query(query)
                .bind(&code)
                .bind(user_id)
                .bind(expires_at)
                .execute(pool)
                .instrument(span)
                .await
                .context("failed to insert activation code")?;
        }
        CodeKind::Reset => {
            let query = r"
                INSERT INTO reset_codes (code, user_id, email, expires_at)
                VALUES ($1, $2, $3, $4)
            ";
            let span = info_span!(
                "db.query",
                db.system = "postgresql",
                db.operation = "INSERT",
                db.statement = query
            );
            sqlx::query(query)
                .bind(&code)
                .bind(user_id)
                .bind(email.unwrap_or_default())
                .bind(expires_at)
                .execute(pool)
                .instrument(span)
                .await
                .context("failed to insert reset code")?;
        }
    }

    Ok(SingleUseCode {
        code,
        user_id,
        email: email.map(str::to_string),
        expires_at,
    })
}

/// Look up a live (unconsumed) code by value.
///
/// Consumed codes are indistinguishable from codes that never existed.
///
/// # Errors
/// Returns an error if the lookup fails.
pub async fn find(pool: &PgPool, kind: CodeKind, code: &str) -> Result<Option<SingleUseCode>> {
    let query = match kind {
        CodeKind::Activation => {
            r"
            SELECT code, user_id, NULL::text AS email, expires_at
            FROM activation_codes
            WHERE code = $1
              AND consumed_at IS NULL
            "
        }
        CodeKind::Reset => {
            r"
            SELECT code, user_id, email, expires_at
            FROM reset_codes
            WHERE code = $1
              AND consumed_at IS NULL
            "
        }
    };
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(code)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup code")?;

    Ok(row.map(|row| SingleUseCode {
        code: row.get("code"),
        user_id: row.get("user_id"),
        email: row.get("email"),
        expires_at: row.get("expires_at"),
    }))
}

/// Mark a code consumed; returns false when it was already consumed or absent.
///
/// Runs inside the caller's transaction so consuming the code and applying
/// its effect commit together.
///
/// # Errors
/// Returns an error if the update fails.
pub async fn consume(
    tx: &mut Transaction<'_, Postgres>,
    kind: CodeKind,
    code: &str,
) -> Result<bool> {
    let query = match kind {
        CodeKind::Activation => {
            r"
            UPDATE activation_codes
            SET consumed_at = NOW()
            WHERE code = $1
              AND consumed_at IS NULL
            RETURNING user_id
            "
        }
        CodeKind::Reset => {
            r"
            UPDATE reset_codes
            SET consumed_at = NOW()
            WHERE code = $1
              AND consumed_at IS NULL
            RETURNING user_id
            "
        }
    };
    let span = info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(code)
        .fetch_optional(&mut **tx)
        .instrument(span)
        .await
        .context("failed to consume code")?;

    Ok(row.is_some())
}
