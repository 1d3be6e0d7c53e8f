mod types;
mod client;

pub use types::*;
pub use client::{is_offline_error, TripClient};
