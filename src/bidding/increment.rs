use crate::types::{Amount, Player, Tier};

/// Step used for premium tiers and for Silver once bidding gets expensive
pub const HIGH_INCREMENT: Amount = 5_000_000;
/// Step for cheap Silver players and for tiers we don't recognise
pub const LOW_INCREMENT: Amount = 1_000_000;
/// Silver switches to the high step at this amount (inclusive)
pub const SILVER_THRESHOLD: Amount = 10_000_000;

/// Increment to add on top of `last_amount` for a player of `tier`
pub fn increment(tier: Tier, last_amount: Amount) -> Amount {
    match tier {
        Tier::Gold | Tier::Emerald | Tier::Sapphire => HIGH_INCREMENT,
        Tier::Silver if last_amount >= SILVER_THRESHOLD => HIGH_INCREMENT,
        Tier::Silver | Tier::Unknown => LOW_INCREMENT,
    }
}

/// Smallest bid the service will accept after `last_amount`
pub fn next_minimum_bid(tier: Tier, last_amount: Amount) -> Amount {
    last_amount.saturating_add(increment(tier, last_amount))
}

impl Player {
    pub fn next_minimum_bid(&self) -> Amount {
        next_minimum_bid(self.tier, self.last_amount())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_premium_tiers_always_step_five_million() {
        for tier in [Tier::Gold, Tier::Emerald, Tier::Sapphire] {
            for last in [0, 1, 999_999, 9_999_999, 10_000_000, 250_000_000] {
                assert_eq!(increment(tier, last), 5_000_000, "{tier} at {last}");
            }
        }
    }

    #[test]
    fn test_silver_threshold() {
        assert_eq!(increment(Tier::Silver, 0), 1_000_000);
        assert_eq!(increment(Tier::Silver, 9_999_999), 1_000_000);
        assert_eq!(increment(Tier::Silver, 10_000_000), 5_000_000);
        assert_eq!(increment(Tier::Silver, 40_000_000), 5_000_000);
    }

    #[test]
    fn test_unknown_tier_defaults_low() {
        assert_eq!(increment(Tier::Unknown, 0), 1_000_000);
        assert_eq!(increment(Tier::Unknown, 50_000_000), 1_000_000);
    }

    #[test]
    fn test_silver_scenarios() {
        assert_eq!(next_minimum_bid(Tier::Silver, 8_000_000), 9_000_000);
        assert_eq!(next_minimum_bid(Tier::Silver, 12_000_000), 17_000_000);
    }

    #[test]
    fn test_next_minimum_saturates() {
        assert_eq!(next_minimum_bid(Tier::Gold, Amount::MAX - 1), Amount::MAX);
    }

    #[test]
    fn test_player_uses_base_price_without_bids() {
        let player: Player = serde_json::from_value(serde_json::json!({
            "id": "p1", "name": "X", "type": "Silver", "basePrice": 8000000
        }))
        .unwrap();
        assert_eq!(player.next_minimum_bid(), 9_000_000);

        let bid_on = Player {
            current_bid: Some(12_000_000),
            ..player
        };
        assert_eq!(bid_on.next_minimum_bid(), 17_000_000);
    }
}
