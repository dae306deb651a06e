use thiserror::Error;

use crate::types::{Amount, PlayerId};
use crate::utils::{parse_amount, AmountParseError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    /// List players, optionally filtered by name
    Players { search: String },
    Page(usize),
    /// Sold players, optionally only one team's
    Sold { team: Option<String> },
    Show(PlayerId),
    Bid {
        player_id: PlayerId,
        amount: Option<Amount>,
    },
    /// Leave an auction; `None` means the player currently bid on
    Exit(Option<PlayerId>),
    Sell(PlayerId),
    Release(PlayerId),
    Purses,
    AddPlayer,
    Edit(PlayerId),
    /// Match figures for the user's own players
    Stats,
    RecordStats(PlayerId),
    Refresh,
    Whoami,
    Logout,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type 'help' for the list of commands.")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
    #[error("'{0}' is not a page number.")]
    InvalidPage(String),
    #[error(transparent)]
    Amount(#[from] AmountParseError),
}

/// Parse one console line; blank lines yield `None`
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match head.to_lowercase().as_str() {
        "help" | "h" | "?" => Command::Help,
        "players" | "list" | "ls" | "search" => Command::Players {
            search: rest.join(" "),
        },
        "page" | "p" => {
            let raw = single(&rest, "page <number>")?;
            let page = raw
                .parse::<usize>()
                .ok()
                .filter(|p| *p > 0)
                .ok_or_else(|| CommandError::InvalidPage(raw.to_string()))?;
            Command::Page(page)
        }
        "sold" => Command::Sold {
            team: Some(rest.join(" ")).filter(|t| !t.is_empty()),
        },
        "show" | "open" | "view" => Command::Show(single(&rest, "show <player-id>")?.to_string()),
        "bid" => {
            let (player_id, amount) = rest
                .split_first()
                .ok_or(CommandError::Usage("bid <player-id> [amount]"))?;
            let amount = if amount.is_empty() {
                None
            } else {
                Some(parse_amount(&amount.join(" "))?)
            };
            Command::Bid {
                player_id: player_id.to_string(),
                amount,
            }
        }
        "exit" | "leave" => match rest.as_slice() {
            [] => Command::Exit(None),
            [id] => Command::Exit(Some(id.to_string())),
            _ => return Err(CommandError::Usage("exit [player-id]")),
        },
        "sell" => Command::Sell(single(&rest, "sell <player-id>")?.to_string()),
        "release" => Command::Release(single(&rest, "release <player-id>")?.to_string()),
        "purses" | "purse" | "teams" => Command::Purses,
        "add-player" | "add" => Command::AddPlayer,
        "edit" | "edit-player" => Command::Edit(single(&rest, "edit <player-id>")?.to_string()),
        "stats" => Command::Stats,
        "record-stats" | "add-stats" => {
            Command::RecordStats(single(&rest, "record-stats <player-id>")?.to_string())
        }
        "refresh" | "r" => Command::Refresh,
        "whoami" | "profile" => Command::Whoami,
        "logout" => Command::Logout,
        "quit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn single<'a>(rest: &[&'a str], usage: &'static str) -> Result<&'a str, CommandError> {
    match rest {
        [one] => Ok(*one),
        _ => Err(CommandError::Usage(usage)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        parse_command(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn test_bid_with_and_without_amount() {
        assert_eq!(
            parse("bid 65f1 "),
            Command::Bid {
                player_id: "65f1".to_string(),
                amount: None
            }
        );
        assert_eq!(
            parse("BID 65f1 1.5 cr"),
            Command::Bid {
                player_id: "65f1".to_string(),
                amount: Some(15_000_000)
            }
        );
        assert_eq!(
            parse_command("bid"),
            Err(CommandError::Usage("bid <player-id> [amount]"))
        );
        assert_eq!(
            parse_command("bid 65f1 0"),
            Err(CommandError::Amount(AmountParseError::Zero))
        );
    }

    #[test]
    fn test_listing_and_paging() {
        assert_eq!(
            parse("players rohit sharma"),
            Command::Players {
                search: "rohit sharma".to_string()
            }
        );
        assert_eq!(parse("ls"), Command::Players { search: String::new() });
        assert_eq!(parse("page 3"), Command::Page(3));
        assert_eq!(
            parse_command("page 0"),
            Err(CommandError::InvalidPage("0".to_string()))
        );
    }

    #[test]
    fn test_exit_and_admin_commands() {
        assert_eq!(parse("exit"), Command::Exit(None));
        assert_eq!(parse("exit abc"), Command::Exit(Some("abc".to_string())));
        assert_eq!(parse("sell abc"), Command::Sell("abc".to_string()));
        assert_eq!(parse("release abc"), Command::Release("abc".to_string()));
        assert_eq!(
            parse_command("sell"),
            Err(CommandError::Usage("sell <player-id>"))
        );
    }

    #[test]
    fn test_sold_and_stats_commands() {
        assert_eq!(parse("sold"), Command::Sold { team: None });
        assert_eq!(
            parse("sold Royal Chargers"),
            Command::Sold {
                team: Some("Royal Chargers".to_string())
            }
        );
        assert_eq!(parse("stats"), Command::Stats);
        assert_eq!(parse("record-stats abc"), Command::RecordStats("abc".to_string()));
        assert_eq!(
            parse_command("record-stats"),
            Err(CommandError::Usage("record-stats <player-id>"))
        );
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_command("dance now"),
            Err(CommandError::Unknown("dance".to_string()))
        );
    }
}
