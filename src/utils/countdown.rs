use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    deadline: DateTime<Utc>,
}

impl Countdown {
    pub fn started_at(start: DateTime<Utc>, length: Duration) -> Self {
        Self {
            deadline: start + length,
        }
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    /// Time left, never negative
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        (self.deadline - now).max(Duration::zero())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.remaining(now) <= Duration::zero()
    }

    pub fn render(&self, now: DateTime<Utc>) -> String {
        format_remaining(self.remaining(now))
    }
}

/// "71h 59m 59s"; hours are not wrapped into days
pub fn format_remaining(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{}h {}m {}s", hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(Duration::hours(72)), "72h 0m 0s");
        assert_eq!(format_remaining(Duration::seconds(3_725)), "1h 2m 5s");
        assert_eq!(format_remaining(Duration::seconds(-10)), "0h 0m 0s");
    }

    #[test]
    fn test_countdown_clamps_at_zero() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let countdown = Countdown::started_at(start, Duration::hours(48));

        assert_eq!(countdown.render(start + Duration::seconds(1)), "47h 59m 59s");
        assert!(!countdown.is_expired(start + Duration::hours(47)));
        assert!(countdown.is_expired(start + Duration::hours(49)));
        assert_eq!(countdown.render(start + Duration::hours(49)), "0h 0m 0s");
    }
}
