//! OTP login routes

use axum::{extract::Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::common::ApiError;
use crate::domains::auth::activities;
use crate::domains::auth::types::{SessionInfo, UserInfo};
use crate::server::app::AppState;
use crate::server::middleware::ClientIp;

#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    #[serde(alias = "phoneNumber", alias = "phone_number")]
    pub phone: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendOtpResponse {
    pub success: bool,
    pub message: String,
    pub sid: String,
}

/// POST /send-otp
pub async fn send_otp_handler(
    Extension(state): Extension<AppState>,
    client_ip: Option<Extension<ClientIp>>,
    Json(request): Json<SendOtpRequest>,
) -> Result<Json<SendOtpResponse>, ApiError> {
    info!(client_ip = ?client_ip.map(|Extension(ClientIp(ip))| ip), "send-otp");

    let sent = activities::send_otp(
        request.phone.as_deref(),
        request.role.as_deref(),
        &state.deps,
    )
    .await?;

    Ok(Json(SendOtpResponse {
        success: true,
        message: "OTP sent successfully".to_string(),
        sid: sent.sid,
    }))
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(alias = "phoneNumber", alias = "phone_number")]
    pub phone: Option<String>,
    pub code: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpResponse {
    pub success: bool,
    pub message: String,
    pub session: SessionInfo,
    pub user: UserInfo,
}

/// POST /verify-otp
pub async fn verify_otp_handler(
    Extension(state): Extension<AppState>,
    client_ip: Option<Extension<ClientIp>>,
    Json(request): Json<VerifyOtpRequest>,
) -> Result<Json<VerifyOtpResponse>, ApiError> {
    info!(client_ip = ?client_ip.map(|Extension(ClientIp(ip))| ip), "verify-otp");

    let verified = activities::verify_otp(
        request.phone.as_deref(),
        request.code.as_deref(),
        request.role.as_deref(),
        &state.deps,
    )
    .await?;

    Ok(Json(VerifyOtpResponse {
        success: true,
        message: "OTP verified successfully".to_string(),
        session: verified.session,
        user: verified.user,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CheckRoleRequest {
    #[serde(alias = "phoneNumber", alias = "phone_number")]
    pub phone: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
        })
    }
}

/// POST /check-role
pub async fn check_role_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<CheckRoleRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let message = activities::check_role(
        request.phone.as_deref(),
        request.role.as_deref(),
        &state.deps,
    )
    .await?;

    Ok(MessageResponse::ok(message))
}
