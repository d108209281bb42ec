//! PIN activities
//!
//! Every activity requires a session for the same phone number and role as
//! the request targets.

mod check_pin;
mod set_pin;
mod verify_pin;

pub use check_pin::check_pin;
pub use set_pin::set_pin;
pub use verify_pin::verify_pin;

use crate::common::{normalize_phone_number, ApiError};
use crate::domains::auth::activities::parse_role;
use crate::domains::auth::models::Account;
use crate::kernel::ServerDeps;
use crate::server::middleware::AuthUser;

fn locked(remaining: chrono::Duration) -> ApiError {
    ApiError::Locked {
        message: "PIN locked after too many failed attempts".to_string(),
        retry_after_secs: remaining.num_seconds().max(1) as u64,
    }
}

/// Resolve the account a PIN request targets and make sure the caller owns it.
async fn load_owned_account(
    actor: &AuthUser,
    phone: Option<&str>,
    role: Option<&str>,
    deps: &ServerDeps,
) -> Result<Account, ApiError> {
    let phone = phone
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(ApiError::missing_fields)?;
    let role = parse_role(role)?;
    let phone_number = normalize_phone_number(phone)?;

    if !actor.owns(&phone_number, role) {
        return Err(ApiError::Forbidden(
            "Session does not match this account".to_string(),
        ));
    }

    Account::find_by_id(actor.account_id, &deps.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}
