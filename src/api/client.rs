use async_trait::async_trait;
use reqwest::{multipart, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::server_message;
use super::{ApiError, AuctionService};
use crate::types::{
    Ack, Amount, BidReceipt, Player, PlayerDetail, PlayerForm, PlayerStats, SignupForm, StatsEntry,
    StatsList, User, UserPurse,
};
use crate::utils::{AmountStyle, AmountUnit};

/// reqwest-backed auction service client
#[derive(Clone)]
pub struct HttpAuctionService {
    client: Client,
    base_url: String,
}

impl HttpAuctionService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Auction service refused request");
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: server_message(&body),
            });
        }

        debug!(%url, status = status.as_u16(), bytes = body.len(), "Auction service response");
        decode_body(&body)
    }
}

/// Empty success bodies decode as `{}` so plain acknowledgements still parse
fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let body = if body.trim().is_empty() { "{}" } else { body };
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn player_form_json(form: &PlayerForm) -> serde_json::Value {
    json!({
        "name": form.name,
        "role": form.role,
        "style": form.style,
        "basePrice": form.base_price,
        "playerType": form.tier.as_str(),
    })
}

#[async_trait]
impl AuctionService for HttpAuctionService {
    async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let request = self
            .client
            .post(self.url("users/login"))
            .json(&json!({ "email": email, "password": password }));
        self.send(request).await
    }

    async fn signup(&self, form: &SignupForm) -> Result<Ack, ApiError> {
        let request = self.client.post(self.url("users/signup")).json(form);
        self.send(request).await
    }

    async fn players(&self) -> Result<Vec<Player>, ApiError> {
        self.send(self.client.get(self.url("players/data"))).await
    }

    async fn player_detail(&self, player_id: &str) -> Result<PlayerDetail, ApiError> {
        let path = format!("player/{}/bids", player_id);
        self.send(self.client.get(self.url(&path))).await
    }

    async fn place_bid(
        &self,
        player_id: &str,
        amount: Amount,
        bidder_id: &str,
    ) -> Result<BidReceipt, ApiError> {
        let request = self
            .client
            .put(self.url(&format!("bids/{}/bid", player_id)))
            .json(&json!({ "bidAmount": amount, "bidder": bidder_id }));
        self.send(request).await
    }

    async fn exit_auction(&self, player_id: &str, user_id: &str) -> Result<Ack, ApiError> {
        let request = self
            .client
            .post(self.url(&format!("bids/{}/exit", player_id)))
            .json(&json!({ "userId": user_id }));
        self.send(request).await
    }

    async fn mark_sold(&self, player_id: &str) -> Result<Ack, ApiError> {
        let request = self
            .client
            .post(self.url("bids/bid/sold"))
            .json(&json!({ "playerID": player_id }));
        self.send(request).await
    }

    async fn release_player(&self, player_id: &str) -> Result<Ack, ApiError> {
        let request = self
            .client
            .post(self.url("bids/release-player"))
            .json(&json!({ "playerId": player_id }));
        self.send(request).await
    }

    async fn purses(&self) -> Result<Vec<UserPurse>, ApiError> {
        self.send(self.client.get(self.url("users/purses"))).await
    }

    async fn add_player(&self, form: &PlayerForm) -> Result<Ack, ApiError> {
        let unit = AmountUnit::for_base_price(form.base_price).label(AmountStyle::Compact);
        let mut fields = multipart::Form::new()
            .text("name", form.name.clone())
            .text("type", form.tier.as_str())
            .text("role", form.role.clone())
            .text("basePrice", form.base_price.to_string())
            .text("basePriceUnit", unit)
            .text("style", form.style.clone());
        if let Some(score) = &form.score {
            fields = fields.text("overallScore", score.clone());
        }

        let request = self.client.post(self.url("player")).multipart(fields);
        self.send(request).await
    }

    async fn update_player(&self, player_id: &str, form: &PlayerForm) -> Result<Player, ApiError> {
        let request = self
            .client
            .put(self.url(&format!("players/{}", player_id)))
            .json(&player_form_json(form));
        self.send(request).await
    }

    async fn player_stats(&self, user_id: &str) -> Result<Vec<PlayerStats>, ApiError> {
        let request = self
            .client
            .get(self.url("player-stats/list"))
            .query(&[("userId", user_id)]);
        let list: StatsList = self.send(request).await?;
        Ok(list.players)
    }

    async fn record_stats(&self, entry: &StatsEntry) -> Result<Ack, ApiError> {
        let request = self.client.post(self.url("player-stats/store")).json(entry);
        self.send(request).await
    }
}
