//! Auction Console
//!
//! Terminal client for a live player auction: browse players, follow bids,
//! bid under the one-player lock rule and, as an admin, close sales.

pub mod api;
pub mod bidding;
pub mod config;
pub mod console;
pub mod logging;
pub mod state;
pub mod types;
pub mod utils;

pub use api::{AuctionService, HttpAuctionService};
pub use bidding::{next_minimum_bid, BidLock, EligibilityGate};
pub use console::{BidConsole, ConsoleError};
pub use types::{Amount, Bid, Player, PlayerDetail, Tier};
