use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};

use super::errors::ApiError;

lazy_static! {
    // E.164: '+' then 8-15 digits, no leading zero in the country code
    static ref E164_REGEX: Regex = Regex::new(r"^\+[1-9][0-9]{7,14}$").unwrap();

    // Formatting characters people type between digits
    static ref SEPARATORS_REGEX: Regex = Regex::new(r"[\s\-.()]").unwrap();
}

/// Normalize a phone number to E.164.
///
/// Strips spaces, dashes, dots and parentheses; an international `00`
/// prefix becomes `+`. Anything that is not E.164 afterwards is rejected.
pub fn normalize_phone_number(raw: &str) -> Result<String, ApiError> {
    let stripped = SEPARATORS_REGEX.replace_all(raw.trim(), "");
    let candidate = match stripped.strip_prefix("00") {
        Some(rest) => format!("+{}", rest),
        None => stripped.into_owned(),
    };

    if E164_REGEX.is_match(&candidate) {
        Ok(candidate)
    } else {
        Err(ApiError::BadRequest(format!(
            "Invalid phone number: {}",
            raw.trim()
        )))
    }
}

/// Normalize a number that may be written without a country code.
///
/// Bare national numbers get `country_code` prepended (a single leading
/// trunk `0` is dropped first).
pub fn to_e164_with_default(raw: &str, country_code: &str) -> Result<String, ApiError> {
    let stripped = SEPARATORS_REGEX.replace_all(raw.trim(), "");
    if stripped.starts_with('+') || stripped.starts_with("00") {
        return normalize_phone_number(&stripped);
    }

    let national = stripped.strip_prefix('0').unwrap_or(&*stripped);
    normalize_phone_number(&format!("{}{}", country_code, national))
}

/// SHA-256 hex digest of a one-time code. Codes are never stored raw.
pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// True when `code` is all ASCII digits and its length is within bounds.
pub fn is_numeric_code(code: &str, min_len: usize, max_len: usize) -> bool {
    (min_len..=max_len).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_digit())
}
