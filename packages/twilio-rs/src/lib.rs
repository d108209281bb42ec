// https://dev.to/hackmamba/how-to-build-a-one-time-passwordotp-verification-api-with-rust-and-twilio-22il

use std::collections::HashMap;

pub mod models;
use reqwest::{Client, StatusCode};
use tracing::{debug, error};

pub use crate::models::{MessageResponse, OTPResponse, OTPVerifyResponse};

const VERIFY_BASE_URL: &str = "https://verify.twilio.com";
const API_BASE_URL: &str = "https://api.twilio.com";

#[derive(Debug, thiserror::Error)]
pub enum TwilioError {
    #[error("Request to Twilio failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Twilio returned an error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Error parsing Twilio response: {0}")]
    Decode(String),

    #[error("No sender phone number configured for SMS")]
    MissingSender,
}

#[derive(Debug, Clone)]
pub struct TwilioOptions {
    pub account_sid: String,
    pub auth_token: String,
    pub service_id: String,
    /// Sender for plain SMS (Messages API). Verify does not need it.
    pub from_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TwilioService {
    options: TwilioOptions,
    client: Client,
    verify_base_url: String,
    api_base_url: String,
}

impl TwilioService {
    pub fn new(options: TwilioOptions) -> Self {
        Self {
            options,
            client: Client::new(),
            verify_base_url: VERIFY_BASE_URL.to_string(),
            api_base_url: API_BASE_URL.to_string(),
        }
    }

    /// Point the client at different hosts (local fakes in tests).
    pub fn with_base_urls(mut self, verify_base_url: &str, api_base_url: &str) -> Self {
        self.verify_base_url = verify_base_url.trim_end_matches('/').to_string();
        self.api_base_url = api_base_url.trim_end_matches('/').to_string();
        self
    }

    /// Start a verification. Twilio generates and delivers the code.
    pub async fn send_otp(&self, recipient: &str) -> Result<OTPResponse, TwilioError> {
        let url = format!(
            "{base}/v2/Services/{serv_id}/Verifications",
            base = self.verify_base_url,
            serv_id = self.options.service_id
        );

        // Determine channel based on recipient format (email vs phone)
        let channel = if recipient.contains('@') {
            "email"
        } else {
            "sms"
        };

        let mut form_body: HashMap<&str, &str> = HashMap::new();
        form_body.insert("To", recipient);
        form_body.insert("Channel", channel);

        let response = self
            .client
            .post(url)
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .form(&form_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Twilio rejected verification request");
            return Err(TwilioError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<OTPResponse>()
            .await
            .map_err(|e| TwilioError::Decode(e.to_string()))
    }

    /// Check a code against the pending verification for `recipient`.
    ///
    /// Twilio answers 404 when there is no pending verification (expired,
    /// already approved, or never started). That is reported as a
    /// non-approved check rather than an error.
    pub async fn verify_otp(
        &self,
        recipient: &str,
        code: &str,
    ) -> Result<OTPVerifyResponse, TwilioError> {
        let url = format!(
            "{base}/v2/Services/{serv_id}/VerificationCheck",
            base = self.verify_base_url,
            serv_id = self.options.service_id,
        );

        let mut form_body: HashMap<&str, &str> = HashMap::new();
        form_body.insert("To", recipient);
        form_body.insert("Code", code);

        let response = self
            .client
            .post(url)
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .form(&form_body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(recipient, "No pending verification");
            return Ok(OTPVerifyResponse::not_found(recipient));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Twilio rejected verification check");
            return Err(TwilioError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<OTPVerifyResponse>()
            .await
            .map_err(|e| TwilioError::Decode(e.to_string()))
    }

    /// Send a plain SMS through the Messages API.
    pub async fn send_sms(&self, to: &str, body: &str) -> Result<MessageResponse, TwilioError> {
        let from = self
            .options
            .from_number
            .as_deref()
            .ok_or(TwilioError::MissingSender)?;

        let url = format!(
            "{base}/2010-04-01/Accounts/{account_sid}/Messages.json",
            base = self.api_base_url,
            account_sid = self.options.account_sid
        );

        let mut form_body: HashMap<&str, &str> = HashMap::new();
        form_body.insert("To", to);
        form_body.insert("From", from);
        form_body.insert("Body", body);

        let response = self
            .client
            .post(url)
            .basic_auth(&self.options.account_sid, Some(&self.options.auth_token))
            .form(&form_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Twilio rejected message");
            return Err(TwilioError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<MessageResponse>()
            .await
            .map_err(|e| TwilioError::Decode(e.to_string()))
    }
}
