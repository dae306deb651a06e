use chrono::{Duration, Utc};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::ConsoleError;
use super::validate::{validate_player_form, validate_signup, validate_stats};
use crate::api::AuctionService;
use crate::bidding::{increment, next_minimum_bid, EligibilityGate, GateError};
use crate::config::Config;
use crate::state::{AuctionView, PlayerPage, SessionContext, SessionStore};
use crate::types::{
    Amount, BattingEntry, BowlingEntry, Player, PlayerDetail, PlayerForm, PlayerId, PlayerStats,
    SignupForm, StatsEntry, StatsForm, TeamRef, UserPurse,
};
use crate::utils::{format_amount, AmountParseError, Countdown};

const DEFAULT_REJECTION: &str =
    "Your bid was not accepted. Someone may have bid first; check the latest bid and try again.";

/// Settings the controller needs from the config file
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleSettings {
    pub page_size: usize,
    pub overall_timer: Duration,
    pub last_bid_timer: Duration,
}

impl ConsoleSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_size: config.page_size(),
            overall_timer: config.overall_timer(),
            last_bid_timer: config.last_bid_timer(),
        }
    }
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Everything shown when a player's bid screen is opened
#[derive(Debug, Clone)]
pub struct PlayerInsight {
    pub detail: PlayerDetail,
    pub increment: Amount,
    pub next_minimum: Amount,
    /// Whether the current session could bid right now
    pub eligibility: Result<(), GateError>,
    pub overall: Option<Countdown>,
    pub last_bid: Option<Countdown>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BidOutcome {
    pub player_id: PlayerId,
    pub amount: Amount,
    pub message: String,
}

/// Marks a bid as submitted; cleared on drop
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The only place that talks to the auction service
///
/// Owns the logged-in session, the bid lock and the cached view, and brings
/// them back in step with the service after every mutating call.
pub struct BidConsole {
    service: Arc<dyn AuctionService>,
    sessions: SessionStore,
    session: RwLock<Option<SessionContext>>,
    gate: Mutex<EligibilityGate>,
    view: AuctionView,
    settings: ConsoleSettings,
    bid_in_flight: AtomicBool,
}

impl BidConsole {
    pub fn new(
        service: Arc<dyn AuctionService>,
        sessions: SessionStore,
        settings: ConsoleSettings,
    ) -> Self {
        Self {
            service,
            sessions,
            session: RwLock::new(None),
            gate: Mutex::new(EligibilityGate::new()),
            view: AuctionView::new(),
            settings,
            bid_in_flight: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> Option<SessionContext> {
        self.session.read().clone()
    }

    pub fn locked_player(&self) -> Option<PlayerId> {
        self.gate.lock().locked_player().cloned()
    }

    pub fn view(&self) -> &AuctionView {
        &self.view
    }

    /// Pick up the session saved by a previous run, if any
    pub fn restore_session(&self) -> Option<SessionContext> {
        let restored = self.sessions.load();
        if let Some(session) = &restored {
            info!("Restored session for {}", session.name);
        }
        *self.session.write() = restored.clone();
        restored
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<SessionContext, ConsoleError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ConsoleError::validation("Please enter your email and password."));
        }

        let user = self
            .service
            .login(email.trim(), password)
            .await
            .map_err(|e| ConsoleError::api("Login failed. Please check your credentials.", e))?;

        let session = SessionContext::from_user(&user);
        if let Err(e) = self.sessions.save(&session) {
            warn!("Logged in but could not remember the session: {}", e);
        }
        *self.session.write() = Some(session.clone());
        self.gate.lock().clear();
        self.view.clear();

        info!(user = %session.user_id, admin = session.is_admin, "Logged in as {}", session.name);
        self.resync(None).await;
        Ok(session)
    }

    pub async fn signup(&self, form: &SignupForm) -> Result<String, ConsoleError> {
        validate_signup(form)?;

        let ack = self
            .service
            .signup(form)
            .await
            .map_err(|e| ConsoleError::api("Error signing up", e))?;

        info!("Signed up {}", form.email);
        Ok(ack
            .message
            .unwrap_or_else(|| "Signup successful! Please log in.".to_string()))
    }

    pub fn logout(&self) {
        if let Err(e) = self.sessions.clear() {
            warn!("Could not remove saved session: {}", e);
        }
        if let Some(session) = self.session.write().take() {
            info!("Logged out {}", session.name);
        }
        self.gate.lock().clear();
        self.view.clear();
    }

    /// Reload the player list and let it overwrite the bid lock
    pub async fn refresh(&self) -> Result<usize, ConsoleError> {
        let players = self
            .service
            .players()
            .await
            .map_err(|e| ConsoleError::api("Failed to fetch players.", e))?;

        if let Some(session) = self.session() {
            if !session.is_admin {
                self.gate.lock().reconcile(&session.user_id, &players);
            }
        }

        let count = players.len();
        self.view.replace_players(players, Utc::now());
        debug!("Refreshed {} players", count);
        Ok(count)
    }

    pub fn players(&self, search: &str, page: usize) -> PlayerPage {
        self.view.page(search, page, self.settings.page_size)
    }

    /// Sold players, narrowed to one team by owner or team name
    pub fn sold_players(&self, team: Option<&str>) -> Vec<Player> {
        self.view.sold_players(team)
    }

    pub fn teams(&self) -> Vec<TeamRef> {
        self.view.teams()
    }

    /// Fetch a player's bids and work out what the next bid must be
    pub async fn inspect(&self, player_id: &str) -> Result<PlayerInsight, ConsoleError> {
        let detail = self.fetch_detail(player_id).await?;
        let session = self.session();
        let eligibility = self.gate.lock().check(session.as_ref(), &detail.player);

        let last = detail.last_amount();
        let (overall, last_bid) = if detail.player.sold {
            (None, None)
        } else {
            (
                self.view
                    .bidding_seen(player_id)
                    .map(|seen| Countdown::started_at(seen, self.settings.overall_timer)),
                detail
                    .top_two_bids
                    .first()
                    .map(|bid| Countdown::started_at(bid.created_at, self.settings.last_bid_timer)),
            )
        };
        debug!(player = %player_id, last, "Inspected player");

        Ok(PlayerInsight {
            increment: increment(detail.player.tier, last),
            next_minimum: next_minimum_bid(detail.player.tier, last),
            detail,
            eligibility,
            overall,
            last_bid,
        })
    }

    /// Open the bid screen for a player; refused up front when the gate says no
    pub async fn open_bid(&self, player_id: &str) -> Result<PlayerInsight, ConsoleError> {
        let session = self.require_session()?;
        let player = self.lookup_player(player_id).await?;
        self.gate.lock().check(Some(&session), &player)?;

        let insight = self.inspect(player_id).await?;
        insight.eligibility.clone()?;
        Ok(insight)
    }

    /// Submit a bid; `None` bids the next minimum
    pub async fn place_bid(
        &self,
        player_id: &str,
        amount: Option<Amount>,
    ) -> Result<BidOutcome, ConsoleError> {
        let session = self.require_session()?;
        let player = self.lookup_player(player_id).await?;
        self.gate.lock().check(Some(&session), &player)?;

        let last = self
            .view
            .detail(player_id)
            .map(|d| d.last_amount())
            .unwrap_or_else(|| player.last_amount());
        let minimum = next_minimum_bid(player.tier, last);
        let amount = match amount {
            None => minimum,
            Some(0) => return Err(AmountParseError::Zero.into()),
            Some(a) if a < minimum => {
                return Err(ConsoleError::validation(format!(
                    "Bid must be at least {}.",
                    format_amount(minimum)
                )))
            }
            Some(a) => a,
        };

        let flight = InFlight::acquire(&self.bid_in_flight).ok_or(ConsoleError::BidInFlight)?;
        info!(player = %player_id, amount, "Submitting bid of {}", format_amount(amount));

        let result = self
            .service
            .place_bid(player_id, amount, &session.user_id)
            .await;
        drop(flight);

        match result {
            Ok(receipt) => {
                self.gate.lock().record_bid(player_id);
                if let Some(bid) = &receipt.new_bid {
                    self.view.apply_bid(player_id, bid, Utc::now());
                }
                self.resync(Some(player_id)).await;
                Ok(BidOutcome {
                    player_id: player_id.to_string(),
                    amount,
                    message: receipt
                        .message
                        .unwrap_or_else(|| "Bid placed successfully!".to_string()),
                })
            }
            Err(e) if e.is_rejection() => {
                warn!(player = %player_id, amount, "Bid rejected: {}", e);
                self.resync(Some(player_id)).await;
                Err(ConsoleError::Rejected {
                    message: e.server_message().unwrap_or(DEFAULT_REJECTION).to_string(),
                })
            }
            Err(e) => Err(ConsoleError::api("Failed to place bid.", e)),
        }
    }

    /// Leave the auction for a player, or for the locked one when `None`
    pub async fn exit_auction(&self, player_id: Option<&str>) -> Result<String, ConsoleError> {
        let session = self.require_session()?;
        if session.is_admin {
            return Err(GateError::AdminCannotBid.into());
        }

        let player_id = match player_id {
            Some(id) => id.to_string(),
            None => self
                .locked_player()
                .ok_or_else(|| ConsoleError::validation("You are not bidding on any player."))?,
        };

        let ack = self
            .service
            .exit_auction(&player_id, &session.user_id)
            .await
            .map_err(|e| ConsoleError::api("Failed to exit the auction.", e))?;

        self.gate.lock().exit(&player_id);
        self.view.deactivate_bids(&player_id, &session.user_id);
        info!(player = %player_id, "Exited auction");
        self.resync(Some(&player_id)).await;

        Ok(ack
            .message
            .unwrap_or_else(|| "You have exited the auction for this player.".to_string()))
    }

    pub async fn mark_sold(&self, player_id: &str) -> Result<String, ConsoleError> {
        self.require_admin("mark players as sold")?;
        let player = self.lookup_player(player_id).await?;
        if player.sold {
            return Err(GateError::PlayerSold.into());
        }

        let ack = self
            .service
            .mark_sold(player_id)
            .await
            .map_err(|e| ConsoleError::api("Failed to mark player as sold.", e))?;

        self.gate.lock().release_sold(player_id);
        info!(player = %player_id, "Marked {} as sold", player.name);
        self.resync(Some(player_id)).await;

        Ok(ack
            .message
            .unwrap_or_else(|| "Player marked as sold successfully.".to_string()))
    }

    pub async fn release_player(&self, player_id: &str) -> Result<String, ConsoleError> {
        self.require_admin("release players")?;

        let ack = self
            .service
            .release_player(player_id)
            .await
            .map_err(|e| ConsoleError::api("Failed to release player.", e))?;

        info!(player = %player_id, "Released player");
        self.resync(Some(player_id)).await;

        Ok(ack
            .message
            .unwrap_or_else(|| "Player released successfully.".to_string()))
    }

    pub async fn add_player(&self, form: &PlayerForm) -> Result<String, ConsoleError> {
        self.require_admin("add players")?;
        validate_player_form(form)?;

        let ack = self
            .service
            .add_player(form)
            .await
            .map_err(|e| ConsoleError::api("Error adding player.", e))?;

        info!("Added player {} ({})", form.name, form.tier);
        self.resync(None).await;

        Ok(ack
            .message
            .unwrap_or_else(|| "Player added successfully!".to_string()))
    }

    pub async fn update_player(
        &self,
        player_id: &str,
        form: &PlayerForm,
    ) -> Result<Player, ConsoleError> {
        self.require_admin("edit players")?;
        validate_player_form(form)?;

        let updated = self
            .service
            .update_player(player_id, form)
            .await
            .map_err(|e| ConsoleError::api("Error updating player.", e))?;

        info!(player = %player_id, "Updated player {}", updated.name);
        self.resync(Some(player_id)).await;
        Ok(updated)
    }

    pub async fn purses(&self) -> Result<Vec<UserPurse>, ConsoleError> {
        self.service
            .purses()
            .await
            .map_err(|e| ConsoleError::api("Failed to fetch user purse data.", e))
    }

    /// Match figures for the players the logged-in user owns
    pub async fn player_stats(&self) -> Result<Vec<PlayerStats>, ConsoleError> {
        let session = self.require_session()?;
        self.service
            .player_stats(&session.user_id)
            .await
            .map_err(|e| ConsoleError::api("Failed to fetch player stats.", e))
    }

    /// Store one match's figures for a sold player against its owning team
    pub async fn record_stats(&self, player_id: &str, form: &StatsForm) -> Result<String, ConsoleError> {
        self.require_admin("record player stats")?;
        let player = self.lookup_player(player_id).await?;
        let team = match (&player.team, player.sold) {
            (Some(team), true) => team.clone(),
            _ => {
                return Err(ConsoleError::validation(
                    "Stats can only be recorded for sold players.",
                ))
            }
        };
        validate_stats(form, &team)?;

        let opponent = form.opponent_user_id.trim().to_string();
        let entry = StatsEntry {
            player_id: player.id.clone(),
            user_id: team.user_id.clone(),
            opponent_user_id: opponent.clone(),
            batting: form.batting.map(|(runs, balls)| BattingEntry {
                opponent: opponent.clone(),
                runs,
                balls,
            }),
            bowling: form.bowling.map(|(runs_given, balls_bowled)| BowlingEntry {
                opponent: opponent.clone(),
                runs_given,
                balls_bowled,
            }),
            is_mom: form.is_mom,
        };

        let ack = self
            .service
            .record_stats(&entry)
            .await
            .map_err(|e| ConsoleError::api("Error saving player stats.", e))?;

        info!(player = %player_id, team = %team.user_id, opponent = %opponent, "Recorded stats for {}", player.name);
        Ok(ack
            .message
            .unwrap_or_else(|| "Player stats saved.".to_string()))
    }

    fn require_session(&self) -> Result<SessionContext, ConsoleError> {
        self.session()
            .ok_or(ConsoleError::Gate(GateError::Unauthenticated))
    }

    fn require_admin(&self, action: &'static str) -> Result<SessionContext, ConsoleError> {
        let session = self.require_session()?;
        if !session.is_admin {
            return Err(ConsoleError::Forbidden(action));
        }
        Ok(session)
    }

    /// Cached player, falling back to one refresh when it is not cached yet
    async fn lookup_player(&self, player_id: &str) -> Result<Player, ConsoleError> {
        if let Some(player) = self.view.player(player_id) {
            return Ok(player);
        }
        self.refresh().await?;
        self.view
            .player(player_id)
            .ok_or_else(|| ConsoleError::UnknownPlayer(player_id.to_string()))
    }

    async fn fetch_detail(&self, player_id: &str) -> Result<PlayerDetail, ConsoleError> {
        let detail = self
            .service
            .player_detail(player_id)
            .await
            .map_err(|e| ConsoleError::api("Failed to fetch player details.", e))?;
        self.view.store_detail(detail.clone(), Utc::now());
        Ok(detail)
    }

    /// Best-effort reload after a mutating call; failures only get logged
    async fn resync(&self, player_id: Option<&str>) {
        if let Err(e) = self.refresh().await {
            warn!("Refresh after update failed: {}", e);
        }
        if let Some(id) = player_id {
            if let Err(e) = self.fetch_detail(id).await {
                warn!(player = %id, "Detail refresh failed: {}", e);
            }
        }
    }
}
