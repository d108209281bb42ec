//! Redeem a share code

use tracing::{info, warn};

use crate::common::{hash_code, is_numeric_code, ApiError};
use crate::domains::cards::models::SharedCard;
use crate::domains::cards::{MAX_SHARE_OTP_ATTEMPTS, SHARE_OTP_TTL_SECS};
use crate::kernel::ServerDeps;
use crate::server::middleware::AuthUser;

/// Verify the code for a pending share and mark it verified.
///
/// Only a session for the phone number the code was sent to may redeem it.
/// Expired shares and shares with too many wrong guesses are discarded; the
/// admin has to share again.
pub async fn verify_shared_card(
    actor: &AuthUser,
    card_id: Option<&str>,
    shared_with_user: Option<&str>,
    otp: Option<&str>,
    deps: &ServerDeps,
) -> Result<SharedCard, ApiError> {
    let (card_id, shared_with_user, otp) = match (card_id, shared_with_user, otp) {
        (Some(c), Some(u), Some(o)) if !c.trim().is_empty() && !u.trim().is_empty() => {
            (c.trim(), u.trim(), o.trim())
        }
        _ => return Err(ApiError::missing_fields()),
    };
    if !is_numeric_code(otp, 6, 6) {
        return Err(ApiError::BadRequest("Invalid OTP".to_string()));
    }

    let pending =
        SharedCard::find_pending(card_id, shared_with_user, SHARE_OTP_TTL_SECS, &deps.db_pool)
            .await?
            .ok_or_else(|| ApiError::NotFound("No pending share for this card".to_string()))?;
    let shared = pending.share;

    // Checked before the code so other numbers cannot burn the attempts
    if actor.phone_number != shared.phone_number {
        warn!(share_id = %shared.id, account_id = %actor.account_id, "Share verify from another number");
        return Err(ApiError::Forbidden(
            "This card was not shared with your number".to_string(),
        ));
    }

    if pending.expired {
        SharedCard::delete(shared.id, &deps.db_pool).await?;
        return Err(ApiError::BadRequest("OTP expired".to_string()));
    }

    if hash_code(otp) != shared.otp_hash {
        let attempts = SharedCard::record_failed_attempt(shared.id, &deps.db_pool).await?;
        warn!(share_id = %shared.id, attempts, "Wrong share OTP");
        if attempts >= MAX_SHARE_OTP_ATTEMPTS {
            SharedCard::delete(shared.id, &deps.db_pool).await?;
            return Err(ApiError::BadRequest(
                "Too many wrong attempts, share the card again".to_string(),
            ));
        }
        return Err(ApiError::BadRequest("Invalid OTP".to_string()));
    }

    let verified = SharedCard::mark_verified(shared.id, &deps.db_pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("No pending share for this card".to_string()))?;

    info!(share_id = %verified.id, card_id, shared_with_user, "Shared card verified");
    Ok(verified)
}
