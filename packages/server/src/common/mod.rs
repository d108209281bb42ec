// Common types and utilities shared across the application

pub mod errors;
pub mod phone;

pub use errors::ApiError;
pub use phone::{hash_code, is_numeric_code, normalize_phone_number, to_e164_with_default};
