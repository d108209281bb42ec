pub mod account;
pub mod preapproval;
pub mod role;

pub use account::*;
pub use preapproval::*;
pub use role::*;
