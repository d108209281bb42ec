use anyhow::{Context, Result};

use crate::common::{is_numeric_code, ApiError};

/// bcrypt work factor
pub const BCRYPT_COST: u32 = 10;

/// PINs are 4-6 ASCII digits
pub fn validate_pin(pin: &str) -> Result<(), ApiError> {
    if is_numeric_code(pin, 4, 6) {
        Ok(())
    } else {
        Err(ApiError::BadRequest("PIN must be 4 to 6 digits".to_string()))
    }
}

/// Hash a PIN with a fresh salt. bcrypt is CPU-bound, so it runs on the
/// blocking pool.
pub async fn hash_pin(pin: &str) -> Result<String> {
    let pin = pin.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(pin, BCRYPT_COST))
        .await
        .context("PIN hashing task panicked")?
        .context("Failed to hash PIN")
}

/// Compare a PIN against a stored bcrypt hash
pub async fn verify_pin_hash(pin: &str, hash: &str) -> Result<bool> {
    let pin = pin.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(pin, &hash))
        .await
        .context("PIN verification task panicked")?
        .context("Stored PIN hash is malformed")
}
