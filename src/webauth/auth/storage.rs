//! Postgres credential store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Connection, PgPool, Row};
use tracing::Instrument;

use super::store::{CredentialStore, InsertOutcome, SessionRecord};
use super::token::SessionTokens;

/// Table definition applied at startup.
pub const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

fn query_span(operation: &'static str, statement: &'static str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

pub(super) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// `CredentialStore` over a shared `PgPool`.
#[derive(Clone, Debug)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the users table if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error if the statement fails.
    pub async fn apply_schema(&self) -> Result<()> {
        sqlx::query(SCHEMA_SQL)
            .execute(&self.pool)
            .instrument(query_span("CREATE", "CREATE TABLE IF NOT EXISTS users"))
            .await
            .context("failed to apply schema")?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<InsertOutcome> {
        let query = "INSERT INTO users (username, hash_password) VALUES ($1, $2)";
        let result = sqlx::query(query)
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Created),
            Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Conflict),
            Err(err) => Err(err).context("failed to insert user"),
        }
    }

    async fn password_hash(&self, username: &str) -> Result<Option<String>> {
        let query = "SELECT hash_password FROM users WHERE username = $1";
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to lookup password hash")?;

        Ok(row.map(|row| row.get("hash_password")))
    }

    async fn set_session(&self, username: &str, tokens: &SessionTokens) -> Result<bool> {
        // The triple goes out in one UPDATE so it is never half written.
        let query = r"
            UPDATE users
            SET session_token = $1, csrf_token = $2, token_expiry = $3
            WHERE username = $4
        ";
        let result = sqlx::query(query)
            .bind(&tokens.session_token)
            .bind(&tokens.csrf_token)
            .bind(tokens.expires_at)
            .bind(username)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to update session tokens")?;

        Ok(result.rows_affected() == 1)
    }

    async fn username_for_session(&self, session_token: &str) -> Result<Option<String>> {
        let query = "SELECT username FROM users WHERE session_token = $1";
        let row = sqlx::query(query)
            .bind(session_token)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to lookup session owner")?;

        Ok(row.map(|row| row.get("username")))
    }

    async fn session(&self, username: &str) -> Result<Option<SessionRecord>> {
        let query =
            "SELECT session_token, csrf_token, token_expiry FROM users WHERE username = $1";
        let row = sqlx::query(query)
            .bind(username)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to lookup session")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let session_token: Option<String> = row.get("session_token");
        let csrf_token: Option<String> = row.get("csrf_token");
        let expires_at: Option<DateTime<Utc>> = row.get("token_expiry");

        Ok(match (session_token, csrf_token, expires_at) {
            (Some(session_token), Some(csrf_token), Some(expires_at)) => Some(SessionRecord {
                session_token,
                csrf_token,
                expires_at,
            }),
            _ => None,
        })
    }

    async fn clear_session(&self, username: &str) -> Result<()> {
        // Logout is idempotent; zero affected rows is fine.
        let query = r"
            UPDATE users
            SET session_token = NULL, csrf_token = NULL, token_expiry = NULL
            WHERE username = $1
        ";
        sqlx::query(query)
            .bind(username)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to clear session tokens")?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let acquire_span = tracing::info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .context("failed to acquire database connection")?;

        let ping_span = tracing::info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .context("failed to ping database")
    }
}
