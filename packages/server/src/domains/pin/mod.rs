//! PIN domain - secondary transaction PIN for sensitive in-app actions
//!
//! The PIN is stored on the account as a bcrypt hash. Repeated failures
//! lock verification for a while.

pub mod activities;
pub mod hashing;

pub use hashing::{hash_pin, validate_pin, verify_pin_hash};

/// Consecutive failures before the PIN locks
pub const MAX_PIN_ATTEMPTS: i32 = 5;

/// Lock duration once MAX_PIN_ATTEMPTS is reached
pub const PIN_LOCK_SECS: i64 = 15 * 60;
