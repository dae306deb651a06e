use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::utils::AmountStyle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root of the auction service REST API, without trailing slash
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Background refresh period; 0 turns polling off
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    #[serde(default = "default_players_per_page")]
    pub players_per_page: usize,

    #[serde(default)]
    pub amount_style: AmountStyle,

    #[serde(default = "default_overall_timer_hours")]
    pub overall_timer_hours: i64,

    #[serde(default = "default_last_bid_timer_hours")]
    pub last_bid_timer_hours: i64,

    #[serde(default)]
    pub session_file: Option<PathBuf>,
}

fn default_api_base_url() -> String {
    "https://cpl.in.net/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_refresh_interval_secs() -> u64 {
    30
}

fn default_players_per_page() -> usize {
    4
}

fn default_overall_timer_hours() -> i64 {
    72
}

fn default_last_bid_timer_hours() -> i64 {
    48
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            players_per_page: default_players_per_page(),
            amount_style: AmountStyle::default(),
            overall_timer_hours: default_overall_timer_hours(),
            last_bid_timer_hours: default_last_bid_timer_hours(),
            session_file: None,
        }
    }
}

/// Zero, negative or out-of-range hours fall back to the default
fn timer_hours(hours: i64, default: i64) -> Duration {
    Duration::try_hours(hours)
        .filter(|d| *d > Duration::zero())
        .unwrap_or_else(|| Duration::hours(default))
}

impl Config {
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }

    /// None when background polling is switched off
    pub fn refresh_interval(&self) -> Option<std::time::Duration> {
        (self.refresh_interval_secs > 0)
            .then(|| std::time::Duration::from_secs(self.refresh_interval_secs))
    }

    pub fn overall_timer(&self) -> Duration {
        timer_hours(self.overall_timer_hours, default_overall_timer_hours())
    }

    pub fn last_bid_timer(&self) -> Duration {
        timer_hours(self.last_bid_timer_hours, default_last_bid_timer_hours())
    }

    /// Where the logged-in user is remembered between runs
    pub fn session_path(&self) -> PathBuf {
        self.session_file.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("auction-console")
                .join("session.json")
        })
    }

    /// Page size, never zero
    pub fn page_size(&self) -> usize {
        self.players_per_page.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            api_base_url = "http://localhost:3000/api"
            amount_style = "compact"
            refresh_interval_secs = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.api_base_url, "http://localhost:3000/api");
        assert_eq!(config.amount_style, AmountStyle::Compact);
        assert_eq!(config.refresh_interval(), None);
        assert_eq!(config.players_per_page, 4);
        assert_eq!(config.overall_timer(), Duration::hours(72));
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_bad_timer_hours_use_defaults() {
        let config = Config {
            overall_timer_hours: i64::MAX,
            last_bid_timer_hours: -5,
            ..Config::default()
        };
        assert_eq!(config.overall_timer(), Duration::hours(72));
        assert_eq!(config.last_bid_timer(), Duration::hours(48));

        let config = Config {
            overall_timer_hours: 0,
            last_bid_timer_hours: 12,
            ..Config::default()
        };
        assert_eq!(config.overall_timer(), Duration::hours(72));
        assert_eq!(config.last_bid_timer(), Duration::hours(12));
    }

    #[test]
    fn test_page_size_never_zero() {
        let config = Config {
            players_per_page: 0,
            ..Config::default()
        };
        assert_eq!(config.page_size(), 1);
    }
}
