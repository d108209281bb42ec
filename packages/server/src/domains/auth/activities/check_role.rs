//! Pre-approval gate

use tracing::{debug, info};

use crate::common::{normalize_phone_number, ApiError};
use crate::domains::auth::models::{Preapproval, Role};
use crate::kernel::ServerDeps;

/// Parse a role from request input. Missing → 400 `Missing fields`,
/// unknown → 400 `Invalid role`.
pub fn parse_role(role: Option<&str>) -> Result<Role, ApiError> {
    let role = role
        .filter(|r| !r.trim().is_empty())
        .ok_or_else(ApiError::missing_fields)?;
    role.parse()
        .map_err(|_| ApiError::BadRequest("Invalid role".to_string()))
}

/// Check if a phone number is listed in ADMIN_IDENTIFIERS.
///
/// Entries are compared after normalization so formatting differences in
/// configuration do not matter. Unparseable entries match verbatim only.
pub fn is_admin_identifier(phone_number: &str, admin_identifiers: &[String]) -> bool {
    admin_identifiers.iter().any(|admin_id| {
        match normalize_phone_number(admin_id) {
            Ok(normalized) => normalized == phone_number,
            Err(_) => admin_id == phone_number,
        }
    })
}

/// Fail unless `phone_number` (already normalized) may authenticate as `role`.
pub async fn ensure_preapproved(
    phone_number: &str,
    role: Role,
    deps: &ServerDeps,
) -> Result<(), ApiError> {
    match role {
        Role::Admin => {
            if is_admin_identifier(phone_number, &deps.admin_identifiers)
                || Preapproval::exists(phone_number, Role::Admin, &deps.db_pool).await?
            {
                Ok(())
            } else {
                info!(phone_number, "Admin login refused: not an admin identifier");
                Err(ApiError::Forbidden("Admin not pre-approved".to_string()))
            }
        }
        Role::User => {
            if Preapproval::exists(phone_number, Role::User, &deps.db_pool).await? {
                Ok(())
            } else {
                info!(phone_number, "User login refused: not pre-approved");
                Err(ApiError::Forbidden(
                    "User not pre-approved by Admin".to_string(),
                ))
            }
        }
    }
}

/// Check whether a phone number may proceed to OTP for a role.
///
/// Returns the message shown to the client on success.
pub async fn check_role(
    phone: Option<&str>,
    role: Option<&str>,
    deps: &ServerDeps,
) -> Result<String, ApiError> {
    let phone = phone
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Phone and role are required".to_string()))?;
    if role.map_or(true, |r| r.trim().is_empty()) {
        return Err(ApiError::BadRequest(
            "Phone and role are required".to_string(),
        ));
    }
    let role = parse_role(role)?;
    let phone_number = normalize_phone_number(phone)?;

    ensure_preapproved(&phone_number, role, deps).await?;
    debug!(phone_number = %phone_number, role = %role, "Pre-approval check passed");

    Ok(match role {
        Role::Admin => "Admin can proceed to OTP".to_string(),
        Role::User => "User can proceed to OTP".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert_eq!(parse_role(Some("admin")).unwrap(), Role::Admin);
        assert_eq!(parse_role(Some("user")).unwrap(), Role::User);

        let missing = parse_role(None).unwrap_err();
        assert_eq!(missing.to_string(), "Missing fields");

        let blank = parse_role(Some("  ")).unwrap_err();
        assert_eq!(blank.to_string(), "Missing fields");

        let invalid = parse_role(Some("root")).unwrap_err();
        assert_eq!(invalid.to_string(), "Invalid role");
    }

    #[test]
    fn test_is_admin_identifier_phone() {
        let admin_identifiers = vec!["+1234567890".to_string(), "+15551234567".to_string()];

        assert!(is_admin_identifier("+1234567890", &admin_identifiers));
        assert!(is_admin_identifier("+15551234567", &admin_identifiers));
        assert!(!is_admin_identifier("+9876543210", &admin_identifiers));
    }

    #[test]
    fn test_is_admin_identifier_normalizes_config() {
        let admin_identifiers = vec!["+1 (555) 123-4567".to_string()];
        assert!(is_admin_identifier("+15551234567", &admin_identifiers));
    }

    #[test]
    fn test_is_admin_identifier_empty_list() {
        assert!(!is_admin_identifier("+15551234567", &[]));
    }
}
