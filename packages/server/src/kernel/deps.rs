//! Server dependencies for activities (using traits for testability)
//!
//! This module provides the central dependency container used by all domain activities.
//! All external services use trait abstractions to enable testing.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use twilio::TwilioService;

use crate::domains::auth::JwtService;
use crate::kernel::{BaseTwilioService, OtpThrottle};

// =============================================================================
// TwilioService Adapter (implements BaseTwilioService trait)
// =============================================================================

/// Wrapper around TwilioService that implements BaseTwilioService trait
pub struct TwilioAdapter(pub Arc<TwilioService>);

impl TwilioAdapter {
    pub fn new(service: Arc<TwilioService>) -> Self {
        Self(service)
    }
}

#[async_trait]
impl BaseTwilioService for TwilioAdapter {
    async fn send_otp(&self, phone_number: &str) -> Result<String> {
        self.0
            .send_otp(phone_number)
            .await
            .map(|verification| verification.sid)
            .map_err(Into::into)
    }

    async fn verify_otp(&self, phone_number: &str, code: &str) -> Result<bool> {
        self.0
            .verify_otp(phone_number, code)
            .await
            .map(|check| check.is_approved())
            .map_err(Into::into)
    }

    async fn send_sms(&self, phone_number: &str, body: &str) -> Result<()> {
        self.0
            .send_sms(phone_number, body)
            .await
            .map(|_| ())
            .map_err(Into::into)
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to activities (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    pub twilio: Arc<dyn BaseTwilioService>,
    /// The only session authority: every session is a JWT minted here
    pub jwt_service: Arc<JwtService>,
    /// Per-phone OTP cooldown and hourly cap
    pub otp_throttle: Arc<OtpThrottle>,
    /// Phone numbers always allowed to authenticate as admin
    pub admin_identifiers: Vec<String>,
    /// Prefix for bare national numbers in share-card SMS
    pub share_card_country_code: String,
}

impl ServerDeps {
    /// Create new ServerDeps with the given dependencies
    pub fn new(
        db_pool: PgPool,
        twilio: Arc<dyn BaseTwilioService>,
        jwt_service: Arc<JwtService>,
        otp_throttle: Arc<OtpThrottle>,
        admin_identifiers: Vec<String>,
        share_card_country_code: String,
    ) -> Self {
        Self {
            db_pool,
            twilio,
            jwt_service,
            otp_throttle,
            admin_identifiers,
            share_card_country_code,
        }
    }
}
