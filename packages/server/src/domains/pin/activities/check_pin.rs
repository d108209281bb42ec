use super::load_owned_account;
use crate::common::ApiError;
use crate::kernel::ServerDeps;
use crate::server::middleware::AuthUser;

/// Whether the account has a PIN set
pub async fn check_pin(
    actor: &AuthUser,
    role: Option<&str>,
    phone_number: Option<&str>,
    deps: &ServerDeps,
) -> Result<bool, ApiError> {
    let account = load_owned_account(actor, phone_number, role, deps).await?;
    Ok(account.has_pin())
}
