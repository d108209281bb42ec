//! Test fixtures for creating accounts and allow-list entries.

use phone_gate::domains::auth::models::Account;
use phone_gate::domains::auth::{Preapproval, Role};
use phone_gate::server::middleware::AuthUser;
use sqlx::PgPool;
use uuid::Uuid;

/// A fresh E.164 number so tests sharing the database never collide
pub fn unique_phone() -> String {
    let n = Uuid::new_v4().as_u128() % 10_000_000;
    format!("+1555{:07}", n)
}

/// A fresh card id
pub fn unique_card_id() -> String {
    format!("card-{}", Uuid::new_v4())
}

/// Create (or fetch) an account and return the session identity for it
pub async fn create_account(phone_number: &str, role: Role, pool: &PgPool) -> AuthUser {
    let resolved = Account::resolve_or_create(phone_number, role, pool)
        .await
        .expect("Failed to create account");

    AuthUser {
        account_id: resolved.account.id,
        phone_number: resolved.account.phone_number,
        role: resolved.account.role,
    }
}

/// A signed-in admin backed by a real account row
pub async fn create_admin(pool: &PgPool) -> AuthUser {
    create_account(&unique_phone(), Role::Admin, pool).await
}

/// Put a phone number on the allow-list
pub async fn preapprove(phone_number: &str, role: Role, pool: &PgPool) -> Preapproval {
    Preapproval::create(phone_number, role, None, pool)
        .await
        .expect("Failed to create preapproval")
}
