use async_trait::async_trait;

use super::ApiError;
use crate::types::{
    Ack, Amount, BidReceipt, Player, PlayerDetail, PlayerForm, PlayerStats, SignupForm, StatsEntry,
    User, UserPurse,
};

/// Everything the console needs from the auction service
///
/// The service is authoritative for players, bids and purses. Implementations
/// only transport requests; no rule checking happens here.
#[async_trait]
pub trait AuctionService: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<User, ApiError>;

    async fn signup(&self, form: &SignupForm) -> Result<Ack, ApiError>;

    async fn players(&self) -> Result<Vec<Player>, ApiError>;

    async fn player_detail(&self, player_id: &str) -> Result<PlayerDetail, ApiError>;

    async fn place_bid(
        &self,
        player_id: &str,
        amount: Amount,
        bidder_id: &str,
    ) -> Result<BidReceipt, ApiError>;

    async fn exit_auction(&self, player_id: &str, user_id: &str) -> Result<Ack, ApiError>;

    async fn mark_sold(&self, player_id: &str) -> Result<Ack, ApiError>;

    async fn release_player(&self, player_id: &str) -> Result<Ack, ApiError>;

    async fn purses(&self) -> Result<Vec<UserPurse>, ApiError>;

    async fn add_player(&self, form: &PlayerForm) -> Result<Ack, ApiError>;

    async fn update_player(&self, player_id: &str, form: &PlayerForm) -> Result<Player, ApiError>;

    /// Match figures for the players owned by `user_id`
    async fn player_stats(&self, user_id: &str) -> Result<Vec<PlayerStats>, ApiError>;

    async fn record_stats(&self, entry: &StatsEntry) -> Result<Ack, ApiError>;
}
