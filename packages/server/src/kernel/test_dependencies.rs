// TestDependencies - mock implementations for testing
//
// Provides mock services that can be injected into ServerDeps for tests.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{BaseTwilioService, OtpThrottle, ServerDeps};
use crate::domains::auth::JwtService;

// =============================================================================
// Mock Twilio Service
// =============================================================================

/// Code the mock approves unless configured otherwise
pub const MOCK_APPROVED_CODE: &str = "123456";

pub struct MockTwilioService {
    approved_code: String,
    fail_requests: bool,
    fail_sms: bool,
    sent_otps: Arc<Mutex<Vec<String>>>,
    verify_calls: Arc<Mutex<Vec<(String, String)>>>,
    sent_sms: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockTwilioService {
    pub fn new() -> Self {
        Self {
            approved_code: MOCK_APPROVED_CODE.to_string(),
            fail_requests: false,
            fail_sms: false,
            sent_otps: Arc::new(Mutex::new(Vec::new())),
            verify_calls: Arc::new(Mutex::new(Vec::new())),
            sent_sms: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Approve a different code
    pub fn with_approved_code(mut self, code: &str) -> Self {
        self.approved_code = code.to_string();
        self
    }

    /// Make Verify calls fail as if Twilio were unreachable
    pub fn failing(mut self) -> Self {
        self.fail_requests = true;
        self
    }

    /// Make Messages API calls fail
    pub fn failing_sms(mut self) -> Self {
        self.fail_sms = true;
        self
    }

    /// Phone numbers an OTP was sent to, in order
    pub fn sent_otps(&self) -> Vec<String> {
        self.sent_otps.lock().unwrap().clone()
    }

    /// (phone, code) pairs that were checked
    pub fn verify_calls(&self) -> Vec<(String, String)> {
        self.verify_calls.lock().unwrap().clone()
    }

    /// (phone, body) pairs sent through the Messages API
    pub fn sent_sms(&self) -> Vec<(String, String)> {
        self.sent_sms.lock().unwrap().clone()
    }
}

impl Default for MockTwilioService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseTwilioService for MockTwilioService {
    async fn send_otp(&self, phone_number: &str) -> Result<String> {
        if self.fail_requests {
            anyhow::bail!("Twilio returned an error (503): service unavailable");
        }
        let mut sent = self.sent_otps.lock().unwrap();
        sent.push(phone_number.to_string());
        Ok(format!("VE_mock_{}", sent.len()))
    }

    async fn verify_otp(&self, phone_number: &str, code: &str) -> Result<bool> {
        if self.fail_requests {
            anyhow::bail!("Twilio returned an error (503): service unavailable");
        }
        self.verify_calls
            .lock()
            .unwrap()
            .push((phone_number.to_string(), code.to_string()));
        Ok(code == self.approved_code)
    }

    async fn send_sms(&self, phone_number: &str, body: &str) -> Result<()> {
        if self.fail_sms {
            anyhow::bail!("Twilio returned an error (400): invalid 'To' number");
        }
        self.sent_sms
            .lock()
            .unwrap()
            .push((phone_number.to_string(), body.to_string()));
        Ok(())
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

pub const TEST_JWT_SECRET: &str = "test_secret_key";
pub const TEST_JWT_ISSUER: &str = "test_issuer";

#[derive(Clone)]
pub struct TestDependencies {
    pub twilio: Arc<MockTwilioService>,
    pub jwt_service: Arc<JwtService>,
    pub otp_throttle: Arc<OtpThrottle>,
    pub admin_identifiers: Vec<String>,
    pub share_card_country_code: String,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            twilio: Arc::new(MockTwilioService::new()),
            jwt_service: Arc::new(JwtService::new(TEST_JWT_SECRET, TEST_JWT_ISSUER.to_string())),
            otp_throttle: Arc::new(OtpThrottle::new(Duration::from_secs(60), 5)),
            admin_identifiers: Vec::new(),
            share_card_country_code: "+91".to_string(),
        }
    }

    /// Set a mock Twilio service
    pub fn mock_twilio(mut self, twilio: MockTwilioService) -> Self {
        self.twilio = Arc::new(twilio);
        self
    }

    /// Set the throttle limits
    pub fn otp_limits(mut self, cooldown: Duration, max_per_hour: u32) -> Self {
        self.otp_throttle = Arc::new(OtpThrottle::new(cooldown, max_per_hour));
        self
    }

    /// Phone numbers that may always authenticate as admin
    pub fn admin_identifiers(mut self, identifiers: &[&str]) -> Self {
        self.admin_identifiers = identifiers.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Convert into ServerDeps for testing
    pub fn into_deps(self, db_pool: PgPool) -> Arc<ServerDeps> {
        Arc::new(ServerDeps::new(
            db_pool,
            self.twilio,
            self.jwt_service,
            self.otp_throttle,
            self.admin_identifiers,
            self.share_card_country_code,
        ))
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
