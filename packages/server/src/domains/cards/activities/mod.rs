mod share_card;
mod verify_shared_card;

pub use share_card::{generate_share_otp, share_card, share_message};
pub use verify_shared_card::verify_shared_card;
