pub mod shared_card;

pub use shared_card::*;
