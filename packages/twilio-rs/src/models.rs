use serde::{Deserialize, Serialize};

/// Response from `POST /v2/Services/{sid}/Verifications`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OTPResponse {
    pub sid: String,
    pub to: String,
    pub channel: String,
    pub status: String,
    #[serde(default)]
    pub valid: bool,
    pub date_created: Option<String>,
}

/// Response from `POST /v2/Services/{sid}/VerificationCheck`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OTPVerifyResponse {
    pub sid: Option<String>,
    pub to: String,
    pub status: String,
    #[serde(default)]
    pub valid: bool,
}

impl OTPVerifyResponse {
    /// Check result used when Twilio has no pending verification for the
    /// recipient (expired, already approved, or never sent).
    pub fn not_found(recipient: &str) -> Self {
        Self {
            sid: None,
            to: recipient.to_string(),
            status: "not_found".to_string(),
            valid: false,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status == "approved"
    }
}

/// Response from `POST /2010-04-01/Accounts/{sid}/Messages.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub sid: String,
    pub to: String,
    pub from: Option<String>,
    pub status: String,
}
