//! Auth domain data types
//!
//! Simple, serializable types returned by auth activities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::IssuedToken;
use super::models::{Account, Role};

/// Result of sending an OTP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpSent {
    pub phone_number: String,
    /// Verification SID from the provider
    pub sid: String,
}

/// Session handed to the client after verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for SessionInfo {
    fn from(issued: IssuedToken) -> Self {
        Self {
            access_token: issued.token,
            token_type: "bearer".to_string(),
            expires_in: issued.expires_in,
            expires_at: issued.expires_at,
        }
    }
}

/// Public view of the authenticated account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: Uuid,
    pub phone_number: String,
    pub role: Role,
    /// True when this verification created the account
    pub created: bool,
}

impl UserInfo {
    pub fn from_account(account: &Account, created: bool) -> Self {
        Self {
            id: account.id,
            phone_number: account.phone_number.clone(),
            role: account.role,
            created,
        }
    }
}

/// Result of verifying an OTP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpVerified {
    pub session: SessionInfo,
    pub user: UserInfo,
}
