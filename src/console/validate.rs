use super::error::ConsoleError;
use crate::types::{PlayerForm, SignupForm, StatsForm, TeamRef, Tier};

pub fn validate_signup(form: &SignupForm) -> Result<(), ConsoleError> {
    let required = [
        ("Name", &form.name),
        ("Email", &form.email),
        ("Password", &form.password),
        ("Team name", &form.team_name),
    ];
    if let Some((label, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
        return Err(ConsoleError::validation(format!("{} is required.", label)));
    }

    let email = form.email.trim();
    let well_formed = email
        .split_once('@')
        .map(|(user, domain)| !user.is_empty() && domain.contains('.') && !domain.ends_with('.'))
        .unwrap_or(false);
    if !well_formed {
        return Err(ConsoleError::validation("Please enter a valid email address."));
    }

    if form.password != form.confirm_password {
        return Err(ConsoleError::validation("Passwords do not match"));
    }
    Ok(())
}

pub fn validate_player_form(form: &PlayerForm) -> Result<(), ConsoleError> {
    if form.name.trim().is_empty() {
        return Err(ConsoleError::validation("Player name is required."));
    }
    if form.tier == Tier::Unknown {
        return Err(ConsoleError::validation(
            "Player type must be Gold, Silver, Emerald or Sapphire.",
        ));
    }
    if form.base_price == 0 {
        return Err(ConsoleError::validation("Base price must be greater than zero."));
    }
    Ok(())
}

/// Checks match figures for a player owned by `team`
pub fn validate_stats(form: &StatsForm, team: &TeamRef) -> Result<(), ConsoleError> {
    if form.opponent_user_id.trim().is_empty() {
        return Err(ConsoleError::validation("Please select an opponent."));
    }
    if form.opponent_user_id == team.user_id {
        return Err(ConsoleError::validation("A team cannot play against itself."));
    }
    if form.batting.is_none() && form.bowling.is_none() {
        return Err(ConsoleError::validation("Enter batting or bowling figures."));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup() -> SignupForm {
        SignupForm {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            password: "hunter22".to_string(),
            confirm_password: "hunter22".to_string(),
            team_name: "Chargers".to_string(),
            play_station_id: String::new(),
        }
    }

    #[test]
    fn test_valid_signup_passes() {
        assert!(validate_signup(&signup()).is_ok());
    }

    #[test]
    fn test_signup_rejections() {
        let missing = SignupForm {
            team_name: " ".to_string(),
            ..signup()
        };
        assert_eq!(
            validate_signup(&missing).unwrap_err().to_string(),
            "Team name is required."
        );

        for email in ["asha", "@example.com", "asha@example", "asha@example."] {
            let form = SignupForm {
                email: email.to_string(),
                ..signup()
            };
            assert!(validate_signup(&form).is_err(), "{} accepted", email);
        }

        let mismatch = SignupForm {
            confirm_password: "hunter23".to_string(),
            ..signup()
        };
        assert_eq!(
            validate_signup(&mismatch).unwrap_err().to_string(),
            "Passwords do not match"
        );
    }

    #[test]
    fn test_player_form_rules() {
        let form = PlayerForm {
            name: "Rohit Sharma".to_string(),
            tier: Tier::Gold,
            role: "Batsman".to_string(),
            style: "RHB".to_string(),
            base_price: 5_000_000,
            score: None,
        };
        assert!(validate_player_form(&form).is_ok());
        assert!(validate_player_form(&PlayerForm {
            base_price: 0,
            ..form.clone()
        })
        .is_err());
        assert!(validate_player_form(&PlayerForm {
            tier: Tier::Unknown,
            ..form
        })
        .is_err());
    }

    #[test]
    fn test_stats_rules() {
        let team = TeamRef {
            user_id: "u1".to_string(),
            user_name: "Alpha".to_string(),
            team_name: None,
        };
        let form = StatsForm {
            opponent_user_id: "u2".to_string(),
            batting: Some((40, 22)),
            bowling: None,
            is_mom: false,
        };
        assert!(validate_stats(&form, &team).is_ok());

        let own = StatsForm {
            opponent_user_id: "u1".to_string(),
            ..form.clone()
        };
        assert_eq!(
            validate_stats(&own, &team).unwrap_err().to_string(),
            "A team cannot play against itself."
        );

        let empty = StatsForm {
            batting: None,
            ..form.clone()
        };
        assert!(validate_stats(&empty, &team).is_err());
        assert!(validate_stats(&StatsForm::default(), &team).is_err());
    }
}
