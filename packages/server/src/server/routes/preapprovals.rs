//! Allow-list administration routes (admin session)

use axum::{
    extract::{Extension, Query},
    Json,
};
use serde::{Deserialize, Serialize};

use super::auth::MessageResponse;
use crate::common::ApiError;
use crate::domains::auth::activities;
use crate::domains::auth::Preapproval;
use crate::server::app::AppState;
use crate::server::middleware::RequireAuth;

#[derive(Debug, Deserialize)]
pub struct PreapprovalRequest {
    #[serde(alias = "phone", alias = "phoneNumber")]
    pub phone_number: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListPreapprovalsQuery {
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PreapprovalResponse {
    pub success: bool,
    pub message: String,
    pub data: Preapproval,
}

#[derive(Debug, Serialize)]
pub struct PreapprovalListResponse {
    pub success: bool,
    pub data: Vec<Preapproval>,
}

/// GET /admin/preapprovals?role=user
pub async fn list_preapprovals_handler(
    Extension(state): Extension<AppState>,
    RequireAuth(actor): RequireAuth,
    Query(query): Query<ListPreapprovalsQuery>,
) -> Result<Json<PreapprovalListResponse>, ApiError> {
    let data = activities::list_preapprovals(&actor, query.role.as_deref(), &state.deps).await?;
    Ok(Json(PreapprovalListResponse {
        success: true,
        data,
    }))
}

/// POST /admin/preapprovals
pub async fn add_preapproval_handler(
    Extension(state): Extension<AppState>,
    RequireAuth(actor): RequireAuth,
    Json(request): Json<PreapprovalRequest>,
) -> Result<Json<PreapprovalResponse>, ApiError> {
    let data = activities::add_preapproval(
        &actor,
        request.phone_number.as_deref(),
        request.role.as_deref(),
        &state.deps,
    )
    .await?;

    Ok(Json(PreapprovalResponse {
        success: true,
        message: "Phone number pre-approved".to_string(),
        data,
    }))
}

/// DELETE /admin/preapprovals
pub async fn remove_preapproval_handler(
    Extension(state): Extension<AppState>,
    RequireAuth(actor): RequireAuth,
    Json(request): Json<PreapprovalRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    activities::remove_preapproval(
        &actor,
        request.phone_number.as_deref(),
        request.role.as_deref(),
        &state.deps,
    )
    .await?;

    Ok(MessageResponse::ok("Pre-approval removed"))
}
