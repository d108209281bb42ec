//! Transaction PIN routes (session required)

use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};

use super::auth::MessageResponse;
use crate::common::ApiError;
use crate::domains::pin::activities;
use crate::server::app::AppState;
use crate::server::middleware::RequireAuth;

#[derive(Debug, Deserialize)]
pub struct PinRequest {
    pub role: Option<String>,
    #[serde(alias = "phone", alias = "phoneNumber")]
    pub phone_number: Option<String>,
    pub pin: Option<String>,
}

/// POST /set-pin
pub async fn set_pin_handler(
    Extension(state): Extension<AppState>,
    RequireAuth(actor): RequireAuth,
    Json(request): Json<PinRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    activities::set_pin(
        &actor,
        request.role.as_deref(),
        request.phone_number.as_deref(),
        request.pin.as_deref(),
        &state.deps,
    )
    .await?;

    Ok(MessageResponse::ok("PIN set successfully"))
}

#[derive(Debug, Serialize)]
pub struct CheckPinResponse {
    pub success: bool,
    #[serde(rename = "pinSet")]
    pub pin_set: bool,
}

/// POST /check-pin
pub async fn check_pin_handler(
    Extension(state): Extension<AppState>,
    RequireAuth(actor): RequireAuth,
    Json(request): Json<PinRequest>,
) -> Result<Json<CheckPinResponse>, ApiError> {
    let pin_set = activities::check_pin(
        &actor,
        request.role.as_deref(),
        request.phone_number.as_deref(),
        &state.deps,
    )
    .await?;

    Ok(Json(CheckPinResponse {
        success: true,
        pin_set,
    }))
}

/// POST /verify-pin
pub async fn verify_pin_handler(
    Extension(state): Extension<AppState>,
    RequireAuth(actor): RequireAuth,
    Json(request): Json<PinRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    activities::verify_pin(
        &actor,
        request.role.as_deref(),
        request.phone_number.as_deref(),
        request.pin.as_deref(),
        &state.deps,
    )
    .await?;

    Ok(MessageResponse::ok("PIN verified"))
}
