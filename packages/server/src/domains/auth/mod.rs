//! Auth domain - handles authentication via OTP (phone number)
//!
//! Responsibilities:
//! - Pre-approval gate per role
//! - Phone-based OTP authentication via Twilio Verify
//! - Atomic account resolve-or-create
//! - Session (JWT) issuance

pub mod activities;
pub mod jwt;
pub mod models;
pub mod types;

pub use jwt::{Claims, IssuedToken, JwtService};
pub use models::{Account, Preapproval, Role};
