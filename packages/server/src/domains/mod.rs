// Business domains
pub mod auth;
pub mod cards;
pub mod pin;
