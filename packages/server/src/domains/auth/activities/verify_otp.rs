//! Verify OTP activity

use tracing::{error, info};

use super::check_role::{ensure_preapproved, parse_role};
use crate::common::{is_numeric_code, normalize_phone_number, ApiError};
use crate::domains::auth::models::Account;
use crate::domains::auth::types::{OtpVerified, SessionInfo, UserInfo};
use crate::kernel::ServerDeps;

/// Verify OTP code, resolve or create the account, and issue a session.
///
/// Order: validate input → pre-approval gate → Twilio check → upsert
/// account → mint JWT. Nothing is written unless Twilio approves the code.
pub async fn verify_otp(
    phone: Option<&str>,
    code: Option<&str>,
    role: Option<&str>,
    deps: &ServerDeps,
) -> Result<OtpVerified, ApiError> {
    let (phone, code) = match (
        phone.filter(|p| !p.trim().is_empty()),
        code.filter(|c| !c.trim().is_empty()),
    ) {
        (Some(phone), Some(code)) => (phone, code.trim()),
        _ => return Err(ApiError::missing_fields()),
    };
    let role = parse_role(role)?;
    let phone_number = normalize_phone_number(phone)?;

    if !is_numeric_code(code, 4, 10) {
        return Err(ApiError::BadRequest("Invalid OTP".to_string()));
    }

    ensure_preapproved(&phone_number, role, deps).await?;

    let approved = deps
        .twilio
        .verify_otp(&phone_number, code)
        .await
        .map_err(|e| {
            error!(phone_number = %phone_number, error = %e, "OTP verification request failed");
            ApiError::Provider(e.to_string())
        })?;

    if !approved {
        info!(phone_number = %phone_number, "OTP rejected");
        return Err(ApiError::BadRequest("Invalid OTP".to_string()));
    }

    let resolved = Account::resolve_or_create(&phone_number, role, &deps.db_pool).await?;
    let account = resolved.account;
    if resolved.created {
        info!(account_id = %account.id, role = %role, "Created new account for {}", phone_number);
    }

    deps.otp_throttle.clear(&phone_number).await;

    let issued = deps
        .jwt_service
        .create_token(account.id, account.phone_number.clone(), account.role)?;

    info!(account_id = %account.id, role = %role, "OTP verified");

    Ok(OtpVerified {
        session: SessionInfo::from(issued),
        user: UserInfo::from_account(&account, resolved.created),
    })
}
