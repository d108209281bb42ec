use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A card shared with a user, pending until the user enters the SMS code
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SharedCard {
    pub id: Uuid,
    pub card_id: String,
    pub shared_with_user: String,
    pub shared_by_admin: Uuid,
    pub phone_number: String,
    #[serde(skip_serializing)]
    pub otp_hash: String,
    pub is_verified: bool,
    pub failed_attempts: i32,
    pub shared_at: DateTime<Utc>,
    pub verified_at: Option<DateTime<Utc>>,
}

/// A pending share plus whether its code has expired, judged by database time
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PendingShare {
    #[sqlx(flatten)]
    pub share: SharedCard,
    pub expired: bool,
}

impl SharedCard {
    /// Claim the pending slot for (card, recipient).
    ///
    /// Returns None when a pending share already exists. The partial unique
    /// index makes the check and the insert one atomic step.
    pub async fn create_pending(
        card_id: &str,
        shared_with_user: &str,
        shared_by_admin: Uuid,
        phone_number: &str,
        otp_hash: &str,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO shared_cards (card_id, shared_with_user, shared_by_admin, phone_number, otp_hash)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (card_id, shared_with_user) WHERE NOT is_verified
            DO NOTHING
            RETURNING *
            "#,
        )
        .bind(card_id)
        .bind(shared_with_user)
        .bind(shared_by_admin)
        .bind(phone_number)
        .bind(otp_hash)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Drop a pending share whose code has expired so it can be re-shared
    pub async fn delete_expired_pending(
        card_id: &str,
        shared_with_user: &str,
        ttl_secs: i64,
        pool: &PgPool,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM shared_cards
            WHERE card_id = $1
              AND shared_with_user = $2
              AND NOT is_verified
              AND shared_at <= NOW() - make_interval(secs => $3)
            "#,
        )
        .bind(card_id)
        .bind(shared_with_user)
        .bind(ttl_secs as f64)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Find the pending share for (card, recipient).
    ///
    /// Expiry uses the same clock and comparison as `delete_expired_pending`.
    pub async fn find_pending(
        card_id: &str,
        shared_with_user: &str,
        ttl_secs: i64,
        pool: &PgPool,
    ) -> Result<Option<PendingShare>> {
        sqlx::query_as::<_, PendingShare>(
            r#"
            SELECT *, shared_at <= NOW() - make_interval(secs => $3) AS expired
            FROM shared_cards
            WHERE card_id = $1 AND shared_with_user = $2 AND NOT is_verified
            "#,
        )
        .bind(card_id)
        .bind(shared_with_user)
        .bind(ttl_secs as f64)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn delete(id: Uuid, pool: &PgPool) -> Result<()> {
        sqlx::query("DELETE FROM shared_cards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Mark verified. Returns None if it was verified or removed concurrently.
    pub async fn mark_verified(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE shared_cards
            SET is_verified = TRUE, verified_at = NOW()
            WHERE id = $1 AND NOT is_verified
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Count a wrong code and return the new total
    pub async fn record_failed_attempt(id: Uuid, pool: &PgPool) -> Result<i32> {
        let attempts = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE shared_cards
            SET failed_attempts = failed_attempts + 1
            WHERE id = $1
            RETURNING failed_attempts
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(attempts)
    }
}
