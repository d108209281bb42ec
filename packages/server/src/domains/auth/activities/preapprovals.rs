//! Allow-list management (admin only)

use tracing::info;

use super::check_role::parse_role;
use crate::common::{normalize_phone_number, ApiError};
use crate::domains::auth::models::Preapproval;
use crate::kernel::ServerDeps;
use crate::server::middleware::AuthUser;

/// Pre-approve a phone number for a role. Idempotent.
pub async fn add_preapproval(
    actor: &AuthUser,
    phone: Option<&str>,
    role: Option<&str>,
    deps: &ServerDeps,
) -> Result<Preapproval, ApiError> {
    actor.require_admin()?;
    let phone = phone
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(ApiError::missing_fields)?;
    let role = parse_role(role)?;
    let phone_number = normalize_phone_number(phone)?;

    let preapproval =
        Preapproval::create(&phone_number, role, Some(actor.account_id), &deps.db_pool).await?;
    info!(
        phone_number = %phone_number,
        role = %role,
        approved_by = %actor.account_id,
        "Phone number pre-approved"
    );
    Ok(preapproval)
}

/// Remove a phone number from a role's allow-list.
///
/// Existing accounts keep working until their session expires, but the
/// number can no longer pass the gate to get a new one.
pub async fn remove_preapproval(
    actor: &AuthUser,
    phone: Option<&str>,
    role: Option<&str>,
    deps: &ServerDeps,
) -> Result<(), ApiError> {
    actor.require_admin()?;
    let phone = phone
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(ApiError::missing_fields)?;
    let role = parse_role(role)?;
    let phone_number = normalize_phone_number(phone)?;

    if !Preapproval::delete(&phone_number, role, &deps.db_pool).await? {
        return Err(ApiError::NotFound("Pre-approval not found".to_string()));
    }
    info!(phone_number = %phone_number, role = %role, removed_by = %actor.account_id, "Pre-approval removed");
    Ok(())
}

/// List allow-list entries, optionally filtered by role
pub async fn list_preapprovals(
    actor: &AuthUser,
    role: Option<&str>,
    deps: &ServerDeps,
) -> Result<Vec<Preapproval>, ApiError> {
    actor.require_admin()?;
    let role = match role {
        Some(r) => Some(parse_role(Some(r))?),
        None => None,
    };
    Ok(Preapproval::list(role, &deps.db_pool).await?)
}
