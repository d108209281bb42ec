// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (like "resolve the account") lives in domain activities that use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseTwilioService)

use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// Twilio Service Trait (Infrastructure - SMS/OTP)
// =============================================================================

#[async_trait]
pub trait BaseTwilioService: Send + Sync {
    /// Start an SMS verification for the phone number. Returns the verification SID.
    async fn send_otp(&self, phone_number: &str) -> Result<String>;

    /// Check a code. `Ok(false)` means the provider answered and the code was
    /// not approved; `Err` means the provider could not be reached.
    async fn verify_otp(&self, phone_number: &str, code: &str) -> Result<bool>;

    /// Send a plain SMS message
    async fn send_sms(&self, phone_number: &str, body: &str) -> Result<()>;
}
