use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};

use crate::state::SessionContext;
use crate::types::{Player, PlayerId};

/// Shown when the user tries to bid on a second player while locked
pub const LOCK_CONFLICT_MESSAGE: &str =
    "You can only bid on the player you last bid on. Exit that auction first to switch.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    #[error("You are not logged in. Please log in to place a bid.")]
    Unauthenticated,
    #[error("{}", LOCK_CONFLICT_MESSAGE)]
    LockConflict { locked_to: PlayerId },
    #[error("Admins cannot bid; use sell or release instead.")]
    AdminCannotBid,
    #[error("This player has already been sold.")]
    PlayerSold,
    #[error("You already hold the highest bid on this player.")]
    AlreadyHighestBidder,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BidLock {
    #[default]
    Unlocked,
    LockedTo(PlayerId),
}

impl BidLock {
    pub fn player(&self) -> Option<&PlayerId> {
        match self {
            BidLock::Unlocked => None,
            BidLock::LockedTo(id) => Some(id),
        }
    }

    fn holds(&self, player_id: &str) -> bool {
        self.player().map(|id| id == player_id).unwrap_or(false)
    }
}

/// Per-user bid lock: the player last bid on, until exit or sale
#[derive(Debug, Default)]
pub struct EligibilityGate {
    lock: BidLock,
    /// Players the user left while possibly still leading them
    exited: HashSet<PlayerId>,
}

impl EligibilityGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) -> &BidLock {
        &self.lock
    }

    pub fn locked_player(&self) -> Option<&PlayerId> {
        self.lock.player()
    }

    /// Decide whether `session` may open a bid on `player`
    pub fn check(&self, session: Option<&SessionContext>, player: &Player) -> Result<(), GateError> {
        let session = session.ok_or(GateError::Unauthenticated)?;

        if session.is_admin {
            return Err(GateError::AdminCannotBid);
        }
        if player.sold {
            return Err(GateError::PlayerSold);
        }
        if let BidLock::LockedTo(locked_to) = &self.lock {
            if locked_to != &player.id {
                return Err(GateError::LockConflict {
                    locked_to: locked_to.clone(),
                });
            }
        }
        if player.is_current_bidder(&session.user_id) {
            return Err(GateError::AlreadyHighestBidder);
        }
        Ok(())
    }

    pub fn has_exited(&self, player_id: &str) -> bool {
        self.exited.contains(player_id)
    }

    /// A bid on `player_id` was accepted by the service
    pub fn record_bid(&mut self, player_id: &str) {
        self.exited.remove(player_id);
        self.transition(BidLock::LockedTo(player_id.to_string()));
    }

    /// The user left the auction for `player_id`; returns whether a lock was released
    pub fn exit(&mut self, player_id: &str) -> bool {
        self.exited.insert(player_id.to_string());
        if self.lock.holds(player_id) {
            self.transition(BidLock::Unlocked);
            true
        } else {
            false
        }
    }

    /// A sale ends the auction for everyone, including whoever was locked to it
    pub fn release_sold(&mut self, player_id: &str) -> bool {
        self.exited.remove(player_id);
        if self.lock.holds(player_id) {
            self.transition(BidLock::Unlocked);
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.exited.clear();
        self.transition(BidLock::Unlocked);
    }

    /// Rebuild the lock from a fresh player list
    ///
    /// The lock becomes the unsold player currently led by `user_id`, unless
    /// the user exited it. A local lock on a player the server still lists as
    /// unsold is kept after being outbid; only an exit or a sale releases it.
    pub fn reconcile(&mut self, user_id: &str, players: &[Player]) {
        self.exited
            .retain(|id| players.iter().any(|p| &p.id == id && !p.sold));

        let led = players
            .iter()
            .find(|p| !p.sold && p.is_current_bidder(user_id) && !self.exited.contains(&p.id))
            .map(|p| p.id.clone());

        let next = match (led, &self.lock) {
            (Some(id), _) => BidLock::LockedTo(id),
            (None, BidLock::LockedTo(id))
                if players.iter().any(|p| &p.id == id && !p.sold) =>
            {
                BidLock::LockedTo(id.clone())
            }
            (None, _) => BidLock::Unlocked,
        };
        self.transition(next);
    }

    fn transition(&mut self, next: BidLock) {
        if self.lock != next {
            info!("Bid lock changed: {:?} -> {:?}", self.lock, next);
            self.lock = next;
        } else {
            debug!("Bid lock unchanged: {:?}", self.lock);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BidderRef, Tier};

    fn player(id: &str) -> Player {
        Player {
            id: id.to_string(),
            name: format!("Player {}", id),
            tier: Tier::Gold,
            role: None,
            style: None,
            score: None,
            base_price: 5_000_000,
            current_bid: None,
            current_bidder: None,
            sold: false,
            sold_price: None,
            team: None,
        }
    }

    fn led_by(id: &str, user: &str) -> Player {
        Player {
            current_bid: Some(10_000_000),
            current_bidder: Some(BidderRef {
                id: user.to_string(),
                name: user.to_string(),
            }),
            ..player(id)
        }
    }

    fn bidder() -> SessionContext {
        SessionContext::new("u1", "Alpha", false)
    }

    #[test]
    fn test_first_bid_locks() {
        let mut gate = EligibilityGate::new();
        assert!(gate.check(Some(&bidder()), &player("a")).is_ok());
        gate.record_bid("a");
        assert_eq!(gate.lock(), &BidLock::LockedTo("a".to_string()));
    }

    #[test]
    fn test_locked_user_cannot_open_other_player() {
        let mut gate = EligibilityGate::new();
        gate.record_bid("a");

        let err = gate.check(Some(&bidder()), &player("b")).unwrap_err();
        assert_eq!(
            err,
            GateError::LockConflict {
                locked_to: "a".to_string()
            }
        );
        assert_eq!(err.to_string(), LOCK_CONFLICT_MESSAGE);
        assert!(gate.check(Some(&bidder()), &player("a")).is_ok());
    }

    #[test]
    fn test_exit_and_sale_release_lock() {
        let mut gate = EligibilityGate::new();
        gate.record_bid("a");
        assert!(!gate.exit("b"));
        assert!(gate.exit("a"));
        assert_eq!(gate.lock(), &BidLock::Unlocked);

        gate.record_bid("c");
        assert!(gate.release_sold("c"));
        assert!(gate.check(Some(&bidder()), &player("b")).is_ok());
    }

    #[test]
    fn test_rejections_without_lock() {
        let gate = EligibilityGate::new();
        assert_eq!(
            gate.check(None, &player("a")),
            Err(GateError::Unauthenticated)
        );

        let admin = SessionContext::new("admin", "Boss", true);
        assert_eq!(
            gate.check(Some(&admin), &player("a")),
            Err(GateError::AdminCannotBid)
        );

        let sold = Player {
            sold: true,
            ..player("a")
        };
        assert_eq!(gate.check(Some(&bidder()), &sold), Err(GateError::PlayerSold));

        assert_eq!(
            gate.check(Some(&bidder()), &led_by("a", "u1")),
            Err(GateError::AlreadyHighestBidder)
        );
    }

    #[test]
    fn test_reconcile_follows_server() {
        let mut gate = EligibilityGate::new();

        gate.reconcile("u1", &[player("a"), led_by("b", "u1")]);
        assert_eq!(gate.locked_player(), Some(&"b".to_string()));

        // outbid but never exited: still locked
        gate.reconcile("u1", &[player("a"), led_by("b", "u2")]);
        assert_eq!(gate.locked_player(), Some(&"b".to_string()));

        let sold = Player {
            sold: true,
            ..led_by("b", "u2")
        };
        gate.reconcile("u1", &[player("a"), sold]);
        assert_eq!(gate.lock(), &BidLock::Unlocked);

        gate.record_bid("gone");
        gate.reconcile("u1", &[player("a")]);
        assert_eq!(gate.lock(), &BidLock::Unlocked);
    }

    #[test]
    fn test_exit_while_leading_stays_released() {
        let mut gate = EligibilityGate::new();
        gate.record_bid("a");
        assert!(gate.exit("a"));

        // server still lists the user as top bidder on a
        gate.reconcile("u1", &[led_by("a", "u1"), player("b")]);
        assert_eq!(gate.lock(), &BidLock::Unlocked);
        assert!(gate.has_exited("a"));
        assert!(gate.check(Some(&bidder()), &player("b")).is_ok());

        // a fresh bid on a takes it back
        gate.record_bid("a");
        assert!(!gate.has_exited("a"));
        gate.reconcile("u1", &[led_by("a", "u1"), player("b")]);
        assert_eq!(gate.locked_player(), Some(&"a".to_string()));
    }

    #[test]
    fn test_exit_memory_dropped_on_sale() {
        let mut gate = EligibilityGate::new();
        gate.record_bid("a");
        gate.exit("a");

        let sold = Player {
            sold: true,
            ..led_by("a", "u1")
        };
        gate.reconcile("u1", &[sold]);
        assert!(!gate.has_exited("a"));
    }
}
