use chrono::Utc;
use tracing::{info, warn};

use super::{load_owned_account, locked};
use crate::common::ApiError;
use crate::domains::auth::models::Account;
use crate::domains::pin::{hash_pin, validate_pin};
use crate::kernel::ServerDeps;
use crate::server::middleware::AuthUser;

/// Set (or replace) the transaction PIN.
///
/// Refused while the PIN is locked, since setting a PIN resets the failure
/// counter.
pub async fn set_pin(
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
    validate_pin(pin)?;

    let account = load_owned_account(actor, phone_number, role, deps).await?;
    if let Some(remaining) = account.pin_locked_for(Utc::now()) {
        warn!(account_id = %account.id, "PIN change refused while locked");
        return Err(locked(remaining));
    }

    let pin_hash = hash_pin(pin).await?;

    if !Account::set_transaction_pin(account.id, &pin_hash, &deps.db_pool).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!(account_id = %account.id, "Transaction PIN set");
    Ok(())
}
