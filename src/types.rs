use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Currency amount in whole rupees
pub type Amount = u64;
pub type PlayerId = String;
pub type UserId = String;

/// Player category, determines the bid increment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Gold,
    Silver,
    Emerald,
    Sapphire,
    #[serde(other)]
    Unknown,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Gold, Tier::Silver, Tier::Emerald, Tier::Sapphire];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Gold => "Gold",
            Tier::Silver => "Silver",
            Tier::Emerald => "Emerald",
            Tier::Sapphire => "Sapphire",
            Tier::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to a user as embedded in player and bid records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidderRef {
    #[serde(deserialize_with = "de::id")]
    pub id: UserId,
    #[serde(default)]
    pub name: String,
}

/// Team a sold player was assigned to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TeamRecord")]
pub struct TeamRef {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "teamName", skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
}

impl TeamRef {
    /// Matches a team filter against the owner's name or the team name
    pub fn matches(&self, filter: &str) -> bool {
        let filter = filter.trim();
        self.user_name.eq_ignore_ascii_case(filter)
            || self
                .team_name
                .as_deref()
                .map(|t| t.eq_ignore_ascii_case(filter))
                .unwrap_or(false)
    }
}

#[derive(Deserialize)]
struct TeamRecord {
    #[serde(rename = "userId", default, deserialize_with = "de::opt_id")]
    user_id: Option<String>,
    #[serde(default, deserialize_with = "de::opt_id")]
    id: Option<String>,
    #[serde(rename = "userName", default)]
    user_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "teamName", default)]
    team_name: Option<String>,
}

impl TryFrom<TeamRecord> for TeamRef {
    type Error = String;

    fn try_from(raw: TeamRecord) -> Result<Self, Self::Error> {
        Ok(TeamRef {
            user_id: raw
                .user_id
                .or(raw.id)
                .ok_or_else(|| "team record without userId".to_string())?,
            user_name: raw.user_name.or(raw.name).unwrap_or_default(),
            team_name: raw.team_name,
        })
    }
}

/// Cached copy of a player as served by the auction service
///
/// Endpoints disagree on key names (`id`/`_id`, `currentBid`/`biddingPrice`,
/// `status`/`sold`, ...) and some send both, so decoding goes through a raw
/// record that keeps every spelling and then picks one value per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PlayerRecord")]
pub struct Player {
    pub id: PlayerId,

    pub name: String,

    #[serde(rename = "type")]
    pub tier: Tier,

    pub role: Option<String>,

    pub style: Option<String>,

    pub score: Option<String>,

    #[serde(rename = "basePrice")]
    pub base_price: Amount,

    #[serde(rename = "currentBid")]
    pub current_bid: Option<Amount>,

    #[serde(rename = "currentBidder")]
    pub current_bidder: Option<BidderRef>,

    pub sold: bool,

    #[serde(rename = "soldPrice")]
    pub sold_price: Option<Amount>,

    pub team: Option<TeamRef>,
}

/// Every key spelling a player record may arrive with
#[derive(Deserialize)]
struct PlayerRecord {
    #[serde(default, deserialize_with = "de::opt_id")]
    id: Option<String>,
    #[serde(rename = "_id", default, deserialize_with = "de::opt_id")]
    object_id: Option<String>,

    #[serde(default)]
    name: String,

    #[serde(rename = "type", default)]
    kind: Option<Tier>,
    #[serde(rename = "playerType", default)]
    player_type: Option<Tier>,

    #[serde(default)]
    role: Option<String>,

    #[serde(default)]
    style: Option<String>,
    #[serde(rename = "battingStyle", default)]
    batting_style: Option<String>,

    #[serde(rename = "overallScore", default, deserialize_with = "de::opt_score")]
    overall_score: Option<String>,
    #[serde(default, deserialize_with = "de::opt_score")]
    score: Option<String>,

    #[serde(rename = "basePrice", default)]
    base_price: Option<Amount>,

    #[serde(rename = "currentBid", default)]
    current_bid: Option<Amount>,
    #[serde(rename = "biddingPrice", default)]
    bidding_price: Option<Amount>,

    #[serde(rename = "currentBidder", default)]
    current_bidder: Option<BidderRef>,

    #[serde(default, deserialize_with = "de::opt_sold_flag")]
    status: Option<bool>,
    #[serde(default, deserialize_with = "de::opt_sold_flag")]
    sold: Option<bool>,

    #[serde(rename = "soldPrice", default)]
    sold_price: Option<Amount>,
    #[serde(rename = "boughtValue", default)]
    bought_value: Option<Amount>,

    #[serde(default)]
    team: Option<TeamRef>,
}

impl TryFrom<PlayerRecord> for Player {
    type Error = String;

    fn try_from(raw: PlayerRecord) -> Result<Self, Self::Error> {
        let id = raw
            .id
            .or(raw.object_id)
            .ok_or_else(|| format!("player record without id: {}", raw.name))?;

        Ok(Player {
            id,
            name: raw.name,
            tier: raw.kind.or(raw.player_type).unwrap_or(Tier::Unknown),
            role: raw.role,
            style: raw.style.or(raw.batting_style),
            score: raw.overall_score.or(raw.score),
            base_price: raw.base_price.unwrap_or_default(),
            current_bid: raw.current_bid.or(raw.bidding_price),
            current_bidder: raw.current_bidder,
            sold: raw.status.or(raw.sold).unwrap_or(false),
            sold_price: raw.sold_price.or(raw.bought_value),
            team: raw.team,
        })
    }
}

fn unknown_tier() -> Tier {
    Tier::Unknown
}

impl Player {
    /// Highest bid so far, or the base price when nobody has bid yet
    pub fn last_amount(&self) -> Amount {
        self.current_bid.unwrap_or(self.base_price)
    }

    pub fn has_bids(&self) -> bool {
        self.current_bid.is_some()
    }

    pub fn is_current_bidder(&self, user_id: &str) -> bool {
        self.current_bidder
            .as_ref()
            .map(|b| b.id == user_id)
            .unwrap_or(false)
    }
}

/// A single bid on a player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BidRecord")]
pub struct Bid {
    pub id: String,

    #[serde(rename = "bidAmount")]
    pub amount: Amount,

    pub bidder: BidderRef,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    /// False once the bidder exited the auction for this player
    #[serde(rename = "isBidOn")]
    pub active: bool,
}

#[derive(Deserialize)]
struct BidRecord {
    #[serde(default, deserialize_with = "de::opt_id")]
    id: Option<String>,
    #[serde(rename = "_id", default, deserialize_with = "de::opt_id")]
    object_id: Option<String>,
    #[serde(rename = "bidAmount")]
    amount: Amount,
    bidder: BidderRef,
    #[serde(rename = "createdAt")]
    created_at: DateTime<Utc>,
    #[serde(rename = "isBidOn", default)]
    active: Option<bool>,
}

impl TryFrom<BidRecord> for Bid {
    type Error = String;

    fn try_from(raw: BidRecord) -> Result<Self, Self::Error> {
        Ok(Bid {
            id: raw
                .id
                .or(raw.object_id)
                .ok_or_else(|| "bid record without id".to_string())?,
            amount: raw.amount,
            bidder: raw.bidder,
            created_at: raw.created_at,
            active: raw.active.unwrap_or(true),
        })
    }
}

/// Response of `GET /player/{id}/bids`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDetail {
    pub player: Player,

    #[serde(rename = "topTwoBids", default)]
    pub top_two_bids: Vec<Bid>,

    #[serde(rename = "allBids", default)]
    pub all_bids: Vec<Bid>,
}

impl PlayerDetail {
    /// Amount the next bid is computed from: newest top bid, then the player's own fallback
    pub fn last_amount(&self) -> Amount {
        self.top_two_bids
            .first()
            .map(|b| b.amount)
            .unwrap_or_else(|| self.player.last_amount())
    }

    /// Mark every bid of `user_id` as inactive, mirroring an auction exit
    pub fn deactivate_bids_of(&mut self, user_id: &str) {
        for bid in self
            .top_two_bids
            .iter_mut()
            .chain(self.all_bids.iter_mut())
            .filter(|b| b.bidder.id == user_id)
        {
            bid.active = false;
        }
    }
}

/// Logged-in user as returned by the login endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "UserRecord")]
pub struct User {
    pub id: UserId,

    pub name: String,

    #[serde(rename = "isAdmin")]
    pub is_admin: bool,

    #[serde(rename = "teamName")]
    pub team_name: Option<String>,

    pub purse: Option<Amount>,
}

#[derive(Deserialize)]
struct UserRecord {
    #[serde(default, deserialize_with = "de::opt_id")]
    id: Option<String>,
    #[serde(rename = "_id", default, deserialize_with = "de::opt_id")]
    object_id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(rename = "isAdmin", default)]
    is_admin: bool,
    #[serde(rename = "teamName", default)]
    team_name: Option<String>,
    #[serde(default)]
    purse: Option<Amount>,
    #[serde(rename = "purseValue", default)]
    purse_value: Option<Amount>,
}

impl TryFrom<UserRecord> for User {
    type Error = String;

    fn try_from(raw: UserRecord) -> Result<Self, Self::Error> {
        Ok(User {
            id: raw
                .id
                .or(raw.object_id)
                .ok_or_else(|| format!("user record without id: {}", raw.name))?,
            name: raw.name,
            is_admin: raw.is_admin,
            team_name: raw.team_name,
            purse: raw.purse.or(raw.purse_value),
        })
    }
}

/// One team's purse with the players it bought or is bidding on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPurse {
    #[serde(rename = "userName")]
    pub user_name: String,

    #[serde(rename = "purseValue", default)]
    pub purse_value: Amount,

    #[serde(default)]
    pub players: Vec<PursePlayer>,
}

impl UserPurse {
    pub fn bought(&self) -> impl Iterator<Item = &PursePlayer> {
        self.players.iter().filter(|p| !p.is_bid_on)
    }

    pub fn bidding(&self) -> impl Iterator<Item = &PursePlayer> {
        self.players.iter().filter(|p| p.is_bid_on)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PursePlayer {
    pub name: String,

    #[serde(rename = "type", default = "unknown_tier")]
    pub tier: Tier,

    #[serde(rename = "boughtValue", default)]
    pub bought_value: Option<Amount>,

    #[serde(rename = "biddingPrice", default)]
    pub bidding_price: Option<Amount>,

    #[serde(rename = "isBidOn", default)]
    pub is_bid_on: bool,
}

/// Outcome of an accepted bid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BidReceipt {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(rename = "newBid", default)]
    pub new_bid: Option<Bid>,
}

/// Plain `{message}` acknowledgement used by most mutating endpoints
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

/// Fields collected by the signup prompt
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip)]
    pub confirm_password: String,
    #[serde(rename = "teamName")]
    pub team_name: String,
    #[serde(rename = "playStationId")]
    pub play_station_id: String,
}

/// Fields for adding or editing a player
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerForm {
    pub name: String,
    pub tier: Tier,
    pub role: String,
    pub style: String,
    pub base_price: Amount,
    pub score: Option<String>,
}

/// Per-match numbers and totals for one of the user's players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    #[serde(rename = "playerId", deserialize_with = "de::id")]
    pub player_id: PlayerId,

    #[serde(default)]
    pub name: String,

    #[serde(rename = "matchPerformance", default)]
    pub match_performance: MatchPerformance,

    #[serde(rename = "totalStats", default)]
    pub total_stats: TotalStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchPerformance {
    #[serde(default)]
    pub batting: Vec<BattingPerformance>,
    #[serde(default)]
    pub bowling: Vec<BowlingPerformance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattingPerformance {
    #[serde(rename = "match", default)]
    pub match_name: String,
    #[serde(default)]
    pub against: String,
    #[serde(default)]
    pub runs: u32,
    #[serde(default)]
    pub balls: u32,
    #[serde(default)]
    pub mom: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BowlingPerformance {
    #[serde(rename = "match", default)]
    pub match_name: String,
    #[serde(default)]
    pub against: String,
    #[serde(default, deserialize_with = "de::opt_score")]
    pub overs: Option<String>,
    #[serde(default)]
    pub wickets: u32,
    #[serde(default)]
    pub runs: u32,
    #[serde(default)]
    pub mom: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalStats {
    #[serde(default)]
    pub batting: BattingTotals,
    #[serde(default)]
    pub bowling: BowlingTotals,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattingTotals {
    #[serde(default)]
    pub runs: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BowlingTotals {
    #[serde(default)]
    pub wickets: u32,
}

/// Response of `GET /player-stats/list`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StatsList {
    #[serde(default)]
    pub players: Vec<PlayerStats>,
}

/// One match's figures for a sold player, as posted to `/player-stats/store`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsEntry {
    #[serde(rename = "playerId")]
    pub player_id: PlayerId,

    /// Team that owns the player
    #[serde(rename = "userId")]
    pub user_id: UserId,

    #[serde(rename = "opponentUserId")]
    pub opponent_user_id: UserId,

    #[serde(rename = "battingStats", skip_serializing_if = "Option::is_none")]
    pub batting: Option<BattingEntry>,

    #[serde(rename = "bowlingStats", skip_serializing_if = "Option::is_none")]
    pub bowling: Option<BowlingEntry>,

    #[serde(rename = "isMom")]
    pub is_mom: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattingEntry {
    pub opponent: UserId,
    pub runs: u32,
    pub balls: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BowlingEntry {
    pub opponent: UserId,
    #[serde(rename = "runsGiven")]
    pub runs_given: u32,
    #[serde(rename = "ballsBowled")]
    pub balls_bowled: u32,
}

/// Figures collected by the stats prompt, before they are tied to a team
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsForm {
    pub opponent_user_id: UserId,
    /// Runs and balls faced
    pub batting: Option<(u32, u32)>,
    /// Runs given and balls bowled
    pub bowling: Option<(u32, u32)>,
    pub is_mom: bool,
}

mod de {
    use super::*;
    use serde::de::Error;
    use serde_json::Value;

    /// Backend ids arrive as strings or numbers depending on the endpoint
    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match Value::deserialize(d)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(D::Error::custom(format!("invalid id: {}", other))),
        }
    }

    pub fn opt_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            Value::Number(n) => Ok(Some(n.to_string())),
            other => Err(D::Error::custom(format!("invalid id: {}", other))),
        }
    }

    /// `status: "Sold"` on some endpoints, `sold: true` on others
    pub fn opt_sold_flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Bool(b) => Some(b),
            Value::String(s) => Some(s.eq_ignore_ascii_case("sold")),
            _ => None,
        })
    }

    pub fn opt_score<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(s) if !s.is_empty() => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }
}
