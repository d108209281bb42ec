// HTTP routes
pub mod auth;
pub mod cards;
pub mod health;
pub mod pin;
pub mod preapprovals;

pub use auth::*;
pub use cards::*;
pub use health::*;
pub use pin::*;
pub use preapprovals::*;
