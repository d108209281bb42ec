//! Auth domain activities - business logic functions
//!
//! Activities take raw request values, validate them, and return typed
//! results or an `ApiError`. HTTP handlers are thin wrappers around these.

mod check_role;
mod preapprovals;
mod send_otp;
mod verify_otp;

pub use check_role::{check_role, ensure_preapproved, is_admin_identifier, parse_role};
pub use preapprovals::{add_preapproval, list_preapprovals, remove_preapproval};
pub use send_otp::send_otp;
pub use verify_otp::verify_otp;
