//! Share a card behind an SMS code

use rand::Rng;
use tracing::{error, info};

use crate::common::{hash_code, to_e164_with_default, ApiError};
use crate::domains::cards::models::SharedCard;
use crate::domains::cards::SHARE_OTP_TTL_SECS;
use crate::kernel::ServerDeps;
use crate::server::middleware::AuthUser;

/// Uniform 6-digit code
pub fn generate_share_otp() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

pub fn share_message(otp: &str) -> String {
    format!("Your OTP to access the shared card is: {}", otp)
}

fn required<'a>(value: Option<&'a str>) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(ApiError::missing_fields)
}

/// Share a card with a user.
///
/// Claims the pending slot first, then sends the SMS; if the SMS fails the
/// claim is rolled back so the admin can retry.
pub async fn share_card(
    actor: &AuthUser,
    card_id: Option<&str>,
    shared_with_user: Option<&str>,
    phone_number: Option<&str>,
    deps: &ServerDeps,
) -> Result<SharedCard, ApiError> {
    actor.require_admin()?;
    let card_id = required(card_id)?;
    let shared_with_user = required(shared_with_user)?;
    let phone_number = to_e164_with_default(
        required(phone_number)?,
        &deps.share_card_country_code,
    )?;

    let expired = SharedCard::delete_expired_pending(
        card_id,
        shared_with_user,
        SHARE_OTP_TTL_SECS,
        &deps.db_pool,
    )
    .await?;
    if expired > 0 {
        info!(card_id, shared_with_user, "Discarded expired pending share");
    }

    let otp = generate_share_otp();
    let shared = SharedCard::create_pending(
        card_id,
        shared_with_user,
        actor.account_id,
        &phone_number,
        &hash_code(&otp),
        &deps.db_pool,
    )
    .await?
    .ok_or_else(|| {
        ApiError::Conflict("Card already shared and pending verification.".to_string())
    })?;

    if let Err(e) = deps.twilio.send_sms(&phone_number, &share_message(&otp)).await {
        error!(card_id, error = %e, "Failed to send share OTP");
        SharedCard::delete(shared.id, &deps.db_pool).await?;
        return Err(ApiError::Provider(e.to_string()));
    }

    info!(
        share_id = %shared.id,
        card_id,
        shared_with_user,
        shared_by_admin = %actor.account_id,
        "Card shared with OTP"
    );
    Ok(shared)
}
