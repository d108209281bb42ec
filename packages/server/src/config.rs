use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub twilio_account_sid: String,
    pub twilio_auth_token: String,
    pub twilio_verify_service_sid: String,
    /// Sender for share-card SMS (Messages API)
    pub twilio_phone_number: Option<String>,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    /// Phone numbers always allowed to authenticate as admin
    pub admin_identifiers: Vec<String>,
    pub otp_cooldown_secs: u64,
    pub otp_max_per_hour: u32,
    /// Prefix applied to bare national numbers when sharing cards
    pub share_card_country_code: String,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: parse_or("PORT", 8080)?,
            twilio_account_sid: env::var("TWILIO_ACCOUNT_SID")
                .context("TWILIO_ACCOUNT_SID must be set")?,
            twilio_auth_token: env::var("TWILIO_AUTH_TOKEN")
                .context("TWILIO_AUTH_TOKEN must be set")?,
            twilio_verify_service_sid: env::var("TWILIO_VERIFY_SERVICE_SID")
                .context("TWILIO_VERIFY_SERVICE_SID must be set")?,
            twilio_phone_number: env::var("TWILIO_PHONE_NUMBER")
                .ok()
                .filter(|s| !s.is_empty()),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "phone-gate".to_string()),
            admin_identifiers: parse_list(&env::var("ADMIN_IDENTIFIERS").unwrap_or_default()),
            otp_cooldown_secs: parse_or("OTP_COOLDOWN_SECS", 60)?,
            otp_max_per_hour: parse_or("OTP_MAX_PER_HOUR", 5)?,
            share_card_country_code: env::var("SHARE_CARD_COUNTRY_CODE")
                .unwrap_or_else(|_| "+91".to_string()),
            rate_limit_per_second: parse_or("RATE_LIMIT_PER_SECOND", 10)?,
            rate_limit_burst: parse_or("RATE_LIMIT_BURST", 20)?,
        })
    }
}

fn parse_or<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number", name)),
        _ => Ok(default),
    }
}

/// Split a comma-separated list, dropping blanks.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
