pub mod client;
pub mod error;
pub mod service;

pub use client::HttpAuctionService;
pub use error::{server_message, ApiError};
pub use service::AuctionService;
