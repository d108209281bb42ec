//! Send OTP activity

use tracing::{error, info, warn};

use super::check_role::{ensure_preapproved, parse_role};
use crate::common::{normalize_phone_number, ApiError};
use crate::domains::auth::types::OtpSent;
use crate::kernel::{ServerDeps, ThrottleRejection};

/// Send an OTP to a phone number.
///
/// The pre-approval gate for `role` runs first; only allow-listed numbers
/// (or configured admin identifiers) ever receive an SMS. The throttle slot
/// is reserved before calling Twilio and released again if Twilio fails, so
/// a provider outage does not lock the caller out.
pub async fn send_otp(
    phone: Option<&str>,
    role: Option<&str>,
    deps: &ServerDeps,
) -> Result<OtpSent, ApiError> {
    let phone = phone
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Phone number is required".to_string()))?;
    let role = parse_role(role)?;
    let phone_number = normalize_phone_number(phone)?;

    ensure_preapproved(&phone_number, role, deps).await?;

    if let Err(rejection) = deps.otp_throttle.reserve(&phone_number).await {
        let retry_after_secs = rejection.retry_after().as_secs().max(1);
        warn!(
            phone_number = %phone_number,
            retry_after_secs,
            "OTP request throttled"
        );
        let message = match rejection {
            ThrottleRejection::Cooldown { .. } => "OTP already sent, please wait before retrying",
            ThrottleRejection::WindowExhausted { .. } => "Too many OTP requests, try again later",
        };
        return Err(ApiError::RateLimited {
            message: message.to_string(),
            retry_after_secs,
        });
    }

    match deps.twilio.send_otp(&phone_number).await {
        Ok(sid) => {
            info!(phone_number = %phone_number, sid = %sid, "OTP sent");
            Ok(OtpSent { phone_number, sid })
        }
        Err(e) => {
            error!(phone_number = %phone_number, error = %e, "Failed to send OTP");
            deps.otp_throttle.release(&phone_number).await;
            Err(ApiError::Provider(e.to_string()))
        }
    }
}
