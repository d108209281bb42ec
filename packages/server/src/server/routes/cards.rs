//! Card sharing routes

use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};

use crate::common::ApiError;
use crate::domains::cards::activities;
use crate::domains::cards::SharedCard;
use crate::server::app::AppState;
use crate::server::middleware::RequireAuth;

#[derive(Debug, Deserialize)]
pub struct ShareCardRequest {
    pub card_id: Option<String>,
    pub shared_with_user: Option<String>,
    #[serde(alias = "phone", alias = "phoneNumber")]
    pub phone_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SharedCardResponse {
    pub success: bool,
    pub message: String,
    pub data: SharedCard,
}

/// POST /share-card (admin session; the sharer is the session's account)
pub async fn share_card_handler(
    Extension(state): Extension<AppState>,
    RequireAuth(actor): RequireAuth,
    Json(request): Json<ShareCardRequest>,
) -> Result<Json<SharedCardResponse>, ApiError> {
    let shared = activities::share_card(
        &actor,
        request.card_id.as_deref(),
        request.shared_with_user.as_deref(),
        request.phone_number.as_deref(),
        &state.deps,
    )
    .await?;

    Ok(Json(SharedCardResponse {
        success: true,
        message: "Card shared with OTP".to_string(),
        data: shared,
    }))
}

#[derive(Debug, Deserialize)]
pub struct VerifySharedCardRequest {
    pub card_id: Option<String>,
    pub shared_with_user: Option<String>,
    pub otp: Option<String>,
}

/// POST /share-card/verify (session of the number the code was sent to)
pub async fn verify_shared_card_handler(
    Extension(state): Extension<AppState>,
    RequireAuth(actor): RequireAuth,
    Json(request): Json<VerifySharedCardRequest>,
) -> Result<Json<SharedCardResponse>, ApiError> {
    let verified = activities::verify_shared_card(
        &actor,
        request.card_id.as_deref(),
        request.shared_with_user.as_deref(),
        request.otp.as_deref(),
        &state.deps,
    )
    .await?;

    Ok(Json(SharedCardResponse {
        success: true,
        message: "Shared card verified".to_string(),
        data: verified,
    }))
}
