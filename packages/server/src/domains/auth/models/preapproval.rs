use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::Role;

/// Preapproval - a phone number allowed to authenticate under a role
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Preapproval {
    pub id: Uuid,
    pub phone_number: String,
    pub role: Role,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Preapproval {
    /// Check if phone number is pre-approved for role
    pub async fn exists(phone_number: &str, role: Role, pool: &PgPool) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM preapprovals WHERE phone_number = $1 AND role = $2)",
        )
        .bind(phone_number)
        .bind(role)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Add a phone number to the allow-list. Adding twice returns the existing row.
    pub async fn create(
        phone_number: &str,
        role: Role,
        approved_by: Option<Uuid>,
        pool: &PgPool,
    ) -> Result<Self> {
        let preapproval = sqlx::query_as::<_, Preapproval>(
            r#"
            INSERT INTO preapprovals (phone_number, role, approved_by)
            VALUES ($1, $2, $3)
            ON CONFLICT (phone_number, role)
            DO UPDATE SET phone_number = EXCLUDED.phone_number
            RETURNING *
            "#,
        )
        .bind(phone_number)
        .bind(role)
        .bind(approved_by)
        .fetch_one(pool)
        .await?;
        Ok(preapproval)
    }

    /// Remove a phone number from the allow-list. Returns false when absent.
    pub async fn delete(phone_number: &str, role: Role, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query("DELETE FROM preapprovals WHERE phone_number = $1 AND role = $2")
            .bind(phone_number)
            .bind(role)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List allow-list entries, newest first, optionally for one role
    pub async fn list(role: Option<Role>, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Preapproval>(
            r#"
            SELECT * FROM preapprovals
            WHERE $1::account_role IS NULL OR role = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(role)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }
}
