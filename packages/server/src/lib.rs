// Phone gate - API server
//
// Phone-number OTP login gated by an admin-managed allow-list, transaction
// PINs for signed-in accounts, and OTP-protected card sharing.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
