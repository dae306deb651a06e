use chrono::{DateTime, Utc};
use std::fmt::Write;

use super::controller::PlayerInsight;
use crate::state::{PlayerPage, SessionContext};
use crate::types::{Bid, Player, PlayerStats, UserPurse};
use crate::utils::{fit_column, format_amount_with, format_crore, to_title_case, AmountStyle};

pub const HELP: &str = "\
Commands:
  players [search]        list players, optionally filtered by name
  page <n>                show another page of the last list
  sold [team]             list sold players, optionally for one team
  show <id>               player details, bids and the next minimum bid
  bid <id> [amount]       bid on a player (defaults to the next minimum)
                          amounts like 9000000, 90 lakh or 1.5cr
  exit [id]               leave the auction you are bidding in
  purses                  team purses with bought and bidding players
  stats                   match figures for your players
  refresh                 reload players from the server
  whoami                  show the logged-in user
  logout                  log out
  quit                    leave the console
Admin only:
  sell <id>               mark a player as sold
  release <id>            release a sold player
  add-player              add a new player
  edit <id>               edit a player
  record-stats <id>       record match figures for a sold player";

const ID_WIDTH: usize = 26;
const NAME_WIDTH: usize = 22;
const TIER_WIDTH: usize = 9;
const AMOUNT_WIDTH: usize = 16;
const BIDDER_WIDTH: usize = 14;

fn dash() -> String {
    "-".to_string()
}

fn status(player: &Player) -> &'static str {
    if player.sold {
        "Sold"
    } else if player.has_bids() {
        "Bidding"
    } else {
        "Open"
    }
}

pub fn render_player_page(page: &PlayerPage, style: AmountStyle, locked: Option<&str>) -> String {
    let mut out = String::new();
    if page.players.is_empty() {
        out.push_str("No players found.");
        return out;
    }

    let _ = writeln!(
        out,
        "  {} {} {} {} {} {} Status",
        fit_column("ID", ID_WIDTH),
        fit_column("Name", NAME_WIDTH),
        fit_column("Type", TIER_WIDTH),
        fit_column("Base", AMOUNT_WIDTH),
        fit_column("Current bid", AMOUNT_WIDTH),
        fit_column("Bidder", BIDDER_WIDTH),
    );
    for player in &page.players {
        let marker = if locked == Some(player.id.as_str()) { "*" } else { " " };
        let current = player
            .current_bid
            .or(player.sold_price)
            .map(|a| format_amount_with(a, style))
            .unwrap_or_else(dash);
        let bidder = player
            .current_bidder
            .as_ref()
            .map(|b| b.name.clone())
            .unwrap_or_else(dash);
        let _ = writeln!(
            out,
            "{} {} {} {} {} {} {} {}",
            marker,
            fit_column(&player.id, ID_WIDTH),
            fit_column(&player.name, NAME_WIDTH),
            fit_column(player.tier.as_str(), TIER_WIDTH),
            fit_column(&format_amount_with(player.base_price, style), AMOUNT_WIDTH),
            fit_column(&current, AMOUNT_WIDTH),
            fit_column(&bidder, BIDDER_WIDTH),
            status(player),
        );
    }
    let _ = write!(
        out,
        "Page {} of {} ({} players)",
        page.page, page.total_pages, page.total_matches
    );
    if locked.is_some() {
        out.push_str("  * your current auction");
    }
    out
}

pub fn render_sold(players: &[Player], style: AmountStyle) -> String {
    if players.is_empty() {
        return "No players have been sold yet.".to_string();
    }

    let mut out = String::new();
    for player in players {
        let price = player
            .sold_price
            .or(player.current_bid)
            .map(|a| format_amount_with(a, style))
            .unwrap_or_else(dash);
        let team = player
            .team
            .as_ref()
            .map(|t| t.user_name.clone())
            .or_else(|| player.current_bidder.as_ref().map(|b| b.name.clone()))
            .unwrap_or_else(dash);
        let _ = writeln!(
            out,
            "{} {} {} {}",
            fit_column(&player.name, NAME_WIDTH),
            fit_column(player.tier.as_str(), TIER_WIDTH),
            fit_column(&price, AMOUNT_WIDTH),
            team
        );
    }
    out.pop();
    out
}

fn bid_line(bid: &Bid, style: AmountStyle) -> String {
    format!(
        "{} {} {}{}",
        fit_column(&bid.bidder.name, BIDDER_WIDTH),
        fit_column(&format_amount_with(bid.amount, style), AMOUNT_WIDTH),
        bid.created_at.format("%d %b %H:%M"),
        if bid.active { "" } else { "  Out" }
    )
}

pub fn render_insight(insight: &PlayerInsight, style: AmountStyle, now: DateTime<Utc>) -> String {
    let player = &insight.detail.player;
    let mut out = String::new();

    let _ = writeln!(out, "{} ({}) [{}]", player.name, player.tier, player.id);
    let profile: Vec<String> = [&player.role, &player.style]
        .into_iter()
        .flatten()
        .map(|s| to_title_case(s))
        .chain(player.score.as_ref().map(|s| format!("score {}", s)))
        .collect();
    if !profile.is_empty() {
        let _ = writeln!(out, "{}", profile.join(" | "));
    }
    let _ = writeln!(out, "Base price: {}", format_amount_with(player.base_price, style));

    if player.sold {
        let price = player
            .sold_price
            .or(player.current_bid)
            .map(|a| format_amount_with(a, style))
            .unwrap_or_else(dash);
        let _ = writeln!(out, "Sold for {}", price);
    } else {
        let _ = writeln!(
            out,
            "Next minimum bid: {} (increment {})",
            format_amount_with(insight.next_minimum, style),
            format_amount_with(insight.increment, style)
        );
        if let Some(overall) = &insight.overall {
            let _ = writeln!(out, "Auction closes in: {}", overall.render(now));
        }
        if let Some(last_bid) = &insight.last_bid {
            let _ = writeln!(out, "Since last bid:    {}", last_bid.render(now));
        }
        if let Err(reason) = &insight.eligibility {
            let _ = writeln!(out, "You cannot bid: {}", reason);
        }
    }

    if insight.detail.top_two_bids.is_empty() {
        out.push_str("No bids yet.");
        return out;
    }
    out.push_str("Top bids:\n");
    for bid in &insight.detail.top_two_bids {
        let _ = writeln!(out, "  {}", bid_line(bid, style));
    }
    if insight.detail.all_bids.len() > insight.detail.top_two_bids.len() {
        out.push_str("History:\n");
        for bid in insight.detail.all_bids.iter().rev() {
            let _ = writeln!(out, "  {}", bid_line(bid, style));
        }
    }
    out.pop();
    out
}

pub fn render_purses(purses: &[UserPurse]) -> String {
    if purses.is_empty() {
        return "No teams found.".to_string();
    }

    let mut out = String::new();
    for purse in purses {
        let _ = writeln!(
            out,
            "{}: purse {}",
            purse.user_name,
            format_crore(purse.purse_value)
        );
        for player in purse.bought() {
            let _ = writeln!(
                out,
                "  bought   {} {} {}",
                fit_column(&player.name, NAME_WIDTH),
                fit_column(player.tier.as_str(), TIER_WIDTH),
                player.bought_value.map(format_crore).unwrap_or_else(dash)
            );
        }
        for player in purse.bidding() {
            let _ = writeln!(
                out,
                "  bidding  {} {} {}",
                fit_column(&player.name, NAME_WIDTH),
                fit_column(player.tier.as_str(), TIER_WIDTH),
                player.bidding_price.map(format_crore).unwrap_or_else(dash)
            );
        }
    }
    out.pop();
    out
}

pub fn render_stats(stats: &[PlayerStats]) -> String {
    if stats.is_empty() {
        return "No stats recorded for your players yet.".to_string();
    }

    let mut out = String::new();
    for player in stats {
        let _ = writeln!(
            out,
            "{} runs {}, wickets {}",
            fit_column(&player.name, NAME_WIDTH),
            player.total_stats.batting.runs,
            player.total_stats.bowling.wickets
        );
        for innings in &player.match_performance.batting {
            let _ = writeln!(
                out,
                "  bat   {} vs {}: {} ({} balls){}",
                innings.match_name,
                innings.against,
                innings.runs,
                innings.balls,
                if innings.mom { "  MOM" } else { "" }
            );
        }
        for spell in &player.match_performance.bowling {
            let _ = writeln!(
                out,
                "  bowl  {} vs {}: {}/{} in {} overs{}",
                spell.match_name,
                spell.against,
                spell.wickets,
                spell.runs,
                spell.overs.as_deref().unwrap_or("-"),
                if spell.mom { "  MOM" } else { "" }
            );
        }
    }
    out.pop();
    out
}

pub fn render_session(session: &SessionContext, locked: Option<&str>) -> String {
    let mut out = format!("Logged in as {}", session.name);
    if let Some(team) = &session.team_name {
        let _ = write!(out, " ({})", team);
    }
    if session.is_admin {
        out.push_str(" [admin]");
    }
    if let Some(id) = locked {
        let _ = write!(out, "\nCurrently bidding on player {}", id);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidding::GateError;
    use crate::types::{
        BattingPerformance, BidderRef, MatchPerformance, PlayerDetail, PursePlayer, Tier, TotalStats,
    };
    use crate::utils::Countdown;
    use chrono::{Duration, TimeZone};

    fn player() -> Player {
        Player {
            id: "p1".to_string(),
            name: "Rohit Sharma".to_string(),
            tier: Tier::Silver,
            role: Some("batsman".to_string()),
            style: None,
            score: Some("91".to_string()),
            base_price: 8_000_000,
            current_bid: Some(12_000_000),
            current_bidder: Some(BidderRef {
                id: "u1".to_string(),
                name: "Alpha".to_string(),
            }),
            sold: false,
            sold_price: None,
            team: None,
        }
    }

    fn bid(amount: u64, name: &str, active: bool) -> Bid {
        Bid {
            id: format!("b{}", amount),
            amount,
            bidder: BidderRef {
                id: name.to_lowercase(),
                name: name.to_string(),
            },
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            active,
        }
    }

    #[test]
    fn test_player_page_marks_locked_player() {
        let page = PlayerPage {
            players: vec![player()],
            page: 1,
            total_pages: 1,
            total_matches: 1,
        };
        let text = render_player_page(&page, AmountStyle::Long, Some("p1"));
        assert!(text.contains("1.20 Crore"));
        assert!(text.contains("80.00 Lakh"));
        assert!(text.contains("Bidding"));
        assert!(text.lines().nth(1).unwrap().starts_with('*'));
        assert!(text.ends_with("* your current auction"));
    }

    #[test]
    fn test_insight_shows_countdowns_and_exits() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let insight = PlayerInsight {
            detail: PlayerDetail {
                player: player(),
                top_two_bids: vec![bid(12_000_000, "Alpha", true), bid(9_000_000, "Bravo", false)],
                all_bids: vec![
                    bid(9_000_000, "Bravo", false),
                    bid(10_000_000, "Alpha", true),
                    bid(12_000_000, "Alpha", true),
                ],
            },
            increment: 5_000_000,
            next_minimum: 17_000_000,
            eligibility: Err(GateError::AlreadyHighestBidder),
            overall: Some(Countdown::started_at(start, Duration::hours(72))),
            last_bid: Some(Countdown::started_at(start, Duration::hours(48))),
        };

        let text = render_insight(&insight, AmountStyle::Long, start + Duration::hours(1));
        assert!(text.contains("Batsman | score 91"));
        assert!(text.contains("Next minimum bid: 1.70 Crore (increment 50.00 Lakh)"));
        assert!(text.contains("Auction closes in: 71h 0m 0s"));
        assert!(text.contains("Since last bid:    47h 0m 0s"));
        assert!(text.contains("You cannot bid: You already hold the highest bid"));
        assert!(text.contains("History:"));
        assert_eq!(text.matches("  Out").count(), 2);
    }

    #[test]
    fn test_purses_in_crores() {
        let purses = vec![UserPurse {
            user_name: "Alpha".to_string(),
            purse_value: 1_000_000_000,
            players: vec![
                PursePlayer {
                    name: "Rohit Sharma".to_string(),
                    tier: Tier::Gold,
                    bought_value: Some(125_000_000),
                    bidding_price: None,
                    is_bid_on: false,
                },
                PursePlayer {
                    name: "Virat Kohli".to_string(),
                    tier: Tier::Gold,
                    bought_value: None,
                    bidding_price: Some(50_000_000),
                    is_bid_on: true,
                },
            ],
        }];
        let text = render_purses(&purses);
        assert!(text.starts_with("Alpha: purse ₹100.00 Cr"));
        assert!(text.contains("bought   Rohit Sharma"));
        assert!(text.contains("₹12.50 Cr"));
        assert!(text.contains("bidding  Virat Kohli"));
    }

    #[test]
    fn test_stats_lines() {
        let mut totals = TotalStats::default();
        totals.batting.runs = 54;
        let stats = vec![PlayerStats {
            player_id: "p1".to_string(),
            name: "Rohit Sharma".to_string(),
            match_performance: MatchPerformance {
                batting: vec![BattingPerformance {
                    match_name: "Match 3".to_string(),
                    against: "Bravo".to_string(),
                    runs: 54,
                    balls: 31,
                    mom: true,
                }],
                bowling: vec![],
            },
            total_stats: totals,
        }];
        let text = render_stats(&stats);
        assert!(text.starts_with("Rohit Sharma"));
        assert!(text.contains("runs 54, wickets 0"));
        assert!(text.ends_with("  bat   Match 3 vs Bravo: 54 (31 balls)  MOM"));
    }

    #[test]
    fn test_empty_screens() {
        assert_eq!(render_sold(&[], AmountStyle::Long), "No players have been sold yet.");
        assert_eq!(render_purses(&[]), "No teams found.");
        assert_eq!(render_stats(&[]), "No stats recorded for your players yet.");
    }
}
