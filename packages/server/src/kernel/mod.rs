//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod otp_throttle;
pub mod test_dependencies;
pub mod traits;

pub use deps::{ServerDeps, TwilioAdapter};
pub use otp_throttle::{OtpThrottle, ThrottleRejection};
pub use test_dependencies::{MockTwilioService, TestDependencies};
pub use traits::*;
