//! Cards domain - sharing a card with a user behind a one-time SMS code
//!
//! Independent of the login flow: the code is generated here, delivered as a
//! plain SMS, and stored only as a digest.

pub mod activities;
pub mod models;

pub use models::SharedCard;

/// How long a share code stays valid
pub const SHARE_OTP_TTL_SECS: i64 = 10 * 60;

/// Wrong guesses before a pending share is discarded
pub const MAX_SHARE_OTP_ATTEMPTS: i32 = 5;
