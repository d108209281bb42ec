use chrono::Utc;
use tracing::{info, warn};

use super::{load_owned_account, locked};
use crate::common::ApiError;
use crate::domains::auth::models::Account;
use crate::domains::pin::{verify_pin_hash, MAX_PIN_ATTEMPTS, PIN_LOCK_SECS};
use crate::kernel::ServerDeps;
use crate::server::middleware::AuthUser;

/// Check a PIN against the stored hash.
///
/// A locked PIN is refused without comparing. A mismatch counts toward the
/// lockout; a match clears the counter.
pub async fn verify_pin(
    actor: &AuthUser,
    role: Option<&str>,
    phone_number: Option<&str>,
    pin: Option<&str>,
    deps: &ServerDeps,
) -> Result<(), ApiError> {
    let pin = match pin {
        Some(pin) if !pin.is_empty() && role.is_some() && phone_number.is_some() => pin,
        _ => return Err(ApiError::missing_fields()),
    };

    let account = load_owned_account(actor, phone_number, role, deps).await?;

    if let Some(remaining) = account.pin_locked_for(Utc::now()) {
        return Err(locked(remaining));
    }

    let pin_hash = account
        .transaction_pin
        .as_deref()
        .ok_or_else(|| ApiError::NotFound("PIN not found".to_string()))?;

    if verify_pin_hash(pin, pin_hash).await? {
        Account::reset_pin_failures(account.id, &deps.db_pool).await?;
        info!(account_id = %account.id, "PIN verified");
        return Ok(());
    }

    let updated =
        Account::record_pin_failure(account.id, MAX_PIN_ATTEMPTS, PIN_LOCK_SECS, &deps.db_pool)
            .await?;

    if let Some(remaining) = updated.pin_locked_for(Utc::now()) {
        warn!(account_id = %account.id, "PIN locked after repeated failures");
        return Err(locked(remaining));
    }

    warn!(
        account_id = %account.id,
        failed_attempts = updated.pin_failed_attempts,
        "Invalid PIN"
    );
    Err(ApiError::Unauthorized("Invalid PIN".to_string()))
}
