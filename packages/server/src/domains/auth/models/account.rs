use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::Role;

/// Account - one row per (phone number, role)
///
/// The transaction PIN lives here as a bcrypt hash. It is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Account {
    pub id: Uuid,
    pub phone_number: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub transaction_pin: Option<String>,
    pub pin_failed_attempts: i32,
    pub pin_locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of resolve-or-create
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResolvedAccount {
    #[sqlx(flatten)]
    pub account: Account,
    /// True when this call inserted the row
    pub created: bool,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Account {
    /// Find account by ID
    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Find account by phone number and role
    pub async fn find_by_phone(
        phone_number: &str,
        role: Role,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM accounts WHERE phone_number = $1 AND role = $2")
            .bind(phone_number)
            .bind(role)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    /// Resolve or create the account for a verified phone number.
    ///
    /// A single upsert on the `(phone_number, role)` unique constraint, so
    /// concurrent verifications of a new number converge on one row.
    /// `xmax = 0` holds only for freshly inserted tuples.
    pub async fn resolve_or_create(
        phone_number: &str,
        role: Role,
        pool: &PgPool,
    ) -> Result<ResolvedAccount> {
        sqlx::query_as::<_, ResolvedAccount>(
            r#"
            INSERT INTO accounts (phone_number, role)
            VALUES ($1, $2)
            ON CONFLICT (phone_number, role)
            DO UPDATE SET updated_at = NOW()
            RETURNING *, (xmax = 0) AS created
            "#,
        )
        .bind(phone_number)
        .bind(role)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Store a new PIN hash and clear any lockout. Returns false when no row matched.
    pub async fn set_transaction_pin(id: Uuid, pin_hash: &str, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET transaction_pin = $2,
                pin_failed_attempts = 0,
                pin_locked_until = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(pin_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a failed PIN attempt.
    ///
    /// Reaching `max_attempts` locks the PIN for `lock_secs` and restarts the
    /// counter. Done in one statement so parallel attempts cannot undercount.
    pub async fn record_pin_failure(
        id: Uuid,
        max_attempts: i32,
        lock_secs: i64,
        pool: &PgPool,
    ) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE accounts
            SET pin_locked_until = CASE
                    WHEN pin_failed_attempts + 1 >= $2
                    THEN NOW() + make_interval(secs => $3)
                    ELSE pin_locked_until
                END,
                pin_failed_attempts = CASE
                    WHEN pin_failed_attempts + 1 >= $2 THEN 0
                    ELSE pin_failed_attempts + 1
                END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(max_attempts)
        .bind(lock_secs as f64)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    /// Clear the failure counter after a correct PIN
    pub async fn reset_pin_failures(id: Uuid, pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET pin_failed_attempts = 0, pin_locked_until = NULL, updated_at = NOW()
            WHERE id = $1 AND (pin_failed_attempts <> 0 OR pin_locked_until IS NOT NULL)
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub fn has_pin(&self) -> bool {
        self.transaction_pin.is_some()
    }

    /// Remaining lockout at `now`, if any
    pub fn pin_locked_for(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.pin_locked_until
            .filter(|until| *until > now)
            .map(|until| until - now)
    }
}
