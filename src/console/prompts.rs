use dialoguer::{Confirm, Input, Password, Select};

use crate::types::{Player, PlayerForm, SignupForm, StatsForm, TeamRef, Tier};
use crate::utils::parse_amount;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChoice {
    Login,
    Signup,
    Quit,
}

pub fn prompt_auth_choice() -> dialoguer::Result<AuthChoice> {
    let choice = Select::new()
        .with_prompt("Welcome to the auction")
        .items(&["Log in", "Sign up", "Quit"])
        .default(0)
        .interact()?;
    Ok(match choice {
        0 => AuthChoice::Login,
        1 => AuthChoice::Signup,
        _ => AuthChoice::Quit,
    })
}

pub fn prompt_login() -> dialoguer::Result<(String, String)> {
    let email: String = Input::new().with_prompt("Email").interact_text()?;
    let password = Password::new().with_prompt("Password").interact()?;
    Ok((email, password))
}

/// Collects the form as typed; checks happen in the controller
pub fn prompt_signup() -> dialoguer::Result<SignupForm> {
    let name: String = Input::new().with_prompt("Name").interact_text()?;
    let email: String = Input::new().with_prompt("Email").interact_text()?;
    let password = Password::new().with_prompt("Password").interact()?;
    let confirm_password = Password::new().with_prompt("Confirm password").interact()?;
    let team_name: String = Input::new().with_prompt("Team name").interact_text()?;
    let play_station_id: String = Input::new()
        .with_prompt("PlayStation ID (optional)")
        .allow_empty(true)
        .interact_text()?;

    Ok(SignupForm {
        name,
        email,
        password,
        confirm_password,
        team_name,
        play_station_id,
    })
}

/// Add-player form, pre-filled from `existing` when editing
pub fn prompt_player_form(existing: Option<&Player>) -> dialoguer::Result<PlayerForm> {
    let mut name = Input::<String>::new().with_prompt("Player name");
    if let Some(player) = existing {
        name = name.default(player.name.clone());
    }
    let name = name.interact_text()?;

    let current_tier = existing
        .and_then(|p| Tier::ALL.iter().position(|t| *t == p.tier))
        .unwrap_or(0);
    let tier_names: Vec<&str> = Tier::ALL.iter().map(|t| t.as_str()).collect();
    let tier = Select::new()
        .with_prompt("Player type")
        .items(&tier_names)
        .default(current_tier)
        .interact()?;

    let role: String = Input::new()
        .with_prompt("Role")
        .with_initial_text(existing.and_then(|p| p.role.clone()).unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;
    let style: String = Input::new()
        .with_prompt("Style")
        .with_initial_text(existing.and_then(|p| p.style.clone()).unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    let mut base_price = Input::<String>::new()
        .with_prompt("Base price (e.g. 50 lakh)")
        .validate_with(|input: &String| -> Result<(), String> {
            parse_amount(input).map(|_| ()).map_err(|e| e.to_string())
        });
    if let Some(player) = existing {
        base_price = base_price.default(player.base_price.to_string());
    }
    let base_price = parse_amount(&base_price.interact_text()?).unwrap_or(0);

    let score: String = Input::new()
        .with_prompt("Overall score (optional)")
        .with_initial_text(existing.and_then(|p| p.score.clone()).unwrap_or_default())
        .allow_empty(true)
        .interact_text()?;

    Ok(PlayerForm {
        name,
        tier: Tier::ALL[tier],
        role: role.trim().to_string(),
        style: style.trim().to_string(),
        base_price,
        score: Some(score.trim().to_string()).filter(|s| !s.is_empty()),
    })
}

/// Match figures for a sold player; the opponent list leaves out `own`
pub fn prompt_stats_form(teams: &[TeamRef], own: &TeamRef) -> dialoguer::Result<StatsForm> {
    let opponents: Vec<&TeamRef> = teams.iter().filter(|t| t.user_id != own.user_id).collect();
    let labels: Vec<String> = opponents
        .iter()
        .map(|t| t.team_name.clone().unwrap_or_else(|| t.user_name.clone()))
        .collect();
    let opponent_user_id = if opponents.is_empty() {
        Input::<String>::new()
            .with_prompt("Opponent user id")
            .interact_text()?
    } else {
        let pick = Select::new()
            .with_prompt("Opponent")
            .items(&labels)
            .default(0)
            .interact()?;
        opponents[pick].user_id.clone()
    };

    let batting = if confirm("Record batting figures?")? {
        let runs: u32 = Input::new().with_prompt("Runs").interact_text()?;
        let balls: u32 = Input::new().with_prompt("Balls faced").interact_text()?;
        Some((runs, balls))
    } else {
        None
    };
    let bowling = if confirm("Record bowling figures?")? {
        let runs: u32 = Input::new().with_prompt("Runs given").interact_text()?;
        let balls: u32 = Input::new().with_prompt("Balls bowled").interact_text()?;
        Some((runs, balls))
    } else {
        None
    };
    let is_mom = confirm("Man of the match?")?;

    Ok(StatsForm {
        opponent_user_id,
        batting,
        bowling,
        is_mom,
    })
}

pub fn confirm(prompt: &str) -> dialoguer::Result<bool> {
    Confirm::new().with_prompt(prompt).default(false).interact()
}
