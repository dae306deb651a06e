use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::types::{Bid, Player, PlayerDetail, PlayerId, TeamRef};
use crate::utils::matches_search;

#[derive(Debug, Default)]
struct ViewInner {
    players: Vec<Player>,
    details: HashMap<PlayerId, PlayerDetail>,
    /// When we first saw bids on a player; anchors the overall countdown
    bidding_seen: HashMap<PlayerId, DateTime<Utc>>,
    refreshed_at: Option<DateTime<Utc>>,
}

/// One page of a filtered player list
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerPage {
    pub players: Vec<Player>,
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

/// Cached, read-only copy of auction service state
///
/// The service owns every player and bid. This only mirrors the last fetch,
/// plus local edits made between a successful mutation and the next refresh.
#[derive(Clone, Default)]
pub struct AuctionView {
    inner: Arc<RwLock<ViewInner>>,
}

impl AuctionView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the player list with a fresh server copy
    pub fn replace_players(&self, players: Vec<Player>, now: DateTime<Utc>) {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        for player in &players {
            if let Some(cached) = inner.players.iter().find(|p| p.id == player.id) {
                if cached.sold && player.sold && cached.sold_price != player.sold_price {
                    warn!(
                        player = %player.id,
                        "Server changed the price of a sold player; keeping server copy"
                    );
                }
            }
            if player.has_bids() && !player.sold {
                inner.bidding_seen.entry(player.id.clone()).or_insert(now);
            }
        }

        let live: Vec<PlayerId> = players.iter().map(|p| p.id.clone()).collect();
        inner.details.retain(|id, _| live.contains(id));
        inner.bidding_seen.retain(|id, _| live.contains(id));

        debug!("Cached {} players", players.len());
        inner.players = players;
        inner.refreshed_at = Some(now);
    }

    /// Store a fetched detail and fold its player record into the list
    pub fn store_detail(&self, detail: PlayerDetail, now: DateTime<Utc>) {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        if !detail.all_bids.is_empty() && !detail.player.sold {
            inner
                .bidding_seen
                .entry(detail.player.id.clone())
                .or_insert(now);
        }

        match inner.players.iter_mut().find(|p| p.id == detail.player.id) {
            Some(slot) => *slot = detail.player.clone(),
            None => inner.players.push(detail.player.clone()),
        }
        inner.details.insert(detail.player.id.clone(), detail);
    }

    /// Fold an accepted bid into the cache
    ///
    /// Ignored when the player is sold or the bid does not beat the cached
    /// highest amount; bids per player only ever go up.
    pub fn apply_bid(&self, player_id: &str, bid: &Bid, now: DateTime<Utc>) -> bool {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let Some(player) = inner.players.iter_mut().find(|p| p.id == player_id) else {
            return false;
        };
        if player.sold || player.current_bid.map(|c| bid.amount <= c).unwrap_or(false) {
            debug!(player = %player_id, amount = bid.amount, "Stale bid not applied");
            return false;
        }

        player.current_bid = Some(bid.amount);
        player.current_bidder = Some(bid.bidder.clone());
        let updated = player.clone();

        if let Some(detail) = inner.details.get_mut(player_id) {
            detail.player = updated;
            detail.all_bids.push(bid.clone());
            detail.top_two_bids.insert(0, bid.clone());
            detail.top_two_bids.truncate(2);
        }
        inner.bidding_seen.entry(player_id.to_string()).or_insert(now);
        true
    }

    /// Flag the user's bids on a player inactive after an exit
    pub fn deactivate_bids(&self, player_id: &str, user_id: &str) {
        if let Some(detail) = self.inner.write().details.get_mut(player_id) {
            detail.deactivate_bids_of(user_id);
        }
    }

    pub fn players(&self) -> Vec<Player> {
        self.inner.read().players.clone()
    }

    pub fn player(&self, player_id: &str) -> Option<Player> {
        self.inner
            .read()
            .players
            .iter()
            .find(|p| p.id == player_id)
            .cloned()
    }

    pub fn detail(&self, player_id: &str) -> Option<PlayerDetail> {
        self.inner.read().details.get(player_id).cloned()
    }

    pub fn bidding_seen(&self, player_id: &str) -> Option<DateTime<Utc>> {
        self.inner.read().bidding_seen.get(player_id).copied()
    }

    /// Sold players, optionally only those bought by one team
    pub fn sold_players(&self, team: Option<&str>) -> Vec<Player> {
        self.inner
            .read()
            .players
            .iter()
            .filter(|p| p.sold)
            .filter(|p| match team {
                Some(filter) => p.team.as_ref().map(|t| t.matches(filter)).unwrap_or(false),
                None => true,
            })
            .cloned()
            .collect()
    }

    /// Teams that own at least one sold player, in first-seen order
    pub fn teams(&self) -> Vec<TeamRef> {
        let inner = self.inner.read();
        let mut teams: Vec<TeamRef> = Vec::new();
        for team in inner.players.iter().filter(|p| p.sold).filter_map(|p| p.team.as_ref()) {
            if !teams.iter().any(|t| t.user_id == team.user_id) {
                teams.push(team.clone());
            }
        }
        teams
    }

    /// Search by name, then cut out one page (1-based, clamped to range)
    pub fn page(&self, term: &str, page: usize, per_page: usize) -> PlayerPage {
        let per_page = per_page.max(1);
        let matches: Vec<Player> = self
            .inner
            .read()
            .players
            .iter()
            .filter(|p| matches_search(&p.name, term))
            .cloned()
            .collect();

        let total_matches = matches.len();
        let total_pages = total_matches.div_ceil(per_page).max(1);
        let page = page.clamp(1, total_pages);

        PlayerPage {
            players: matches
                .into_iter()
                .skip((page - 1) * per_page)
                .take(per_page)
                .collect(),
            page,
            total_pages,
            total_matches,
        }
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.inner.read().refreshed_at
    }

    pub fn clear(&self) {
        *self.inner.write() = ViewInner::default();
    }
}
