use anyhow::{Context, Result};
use auction_console::{
    api::HttpAuctionService,
    config::ConfigLoader,
    console::{
        parse_command,
        prompts::{
            confirm, prompt_auth_choice, prompt_login, prompt_player_form, prompt_signup,
            prompt_stats_form, AuthChoice,
        },
        render, BidConsole, Command, ConsoleError, ConsoleSettings, ErrorKind,
    },
    logging::init_logger,
    state::SessionStore,
    utils::{format_rupees, AmountStyle},
};
use chrono::Utc;
use std::sync::Arc;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tracing::{debug, error, info, warn};

const VERSION: &str = env!("CARGO_PKG_VERSION");

enum Flow {
    Continue,
    Quit,
}

/// Where the player list currently stands
struct Listing {
    search: String,
    page: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger()?;
    info!("Starting Auction Console v{}", VERSION);

    let config_loader = ConfigLoader::new();
    let config = config_loader.load()?;
    info!("Auction service: {}", config.api_base_url);

    let service = HttpAuctionService::new(&config.api_base_url, config.request_timeout())
        .context("Failed to build HTTP client")?;
    let console = Arc::new(BidConsole::new(
        Arc::new(service),
        SessionStore::new(config.session_path()),
        ConsoleSettings::from_config(&config),
    ));
    let style = config.amount_style;

    match console.restore_session() {
        Some(session) => info!("Welcome back, {}", session.name),
        None => {
            if !authenticate(&console).await? {
                info!("Goodbye");
                return Ok(());
            }
        }
    }

    if let Err(e) = console.refresh().await {
        warn!("Could not load players: {}", e);
    }

    // Keep the cached view and bid lock in step with other bidders
    if let Some(period) = config.refresh_interval() {
        let background = console.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match background.refresh().await {
                    Ok(count) => debug!("Background refresh: {} players", count),
                    Err(e) => warn!("Background refresh failed: {}", e),
                }
            }
        });
        info!("Refreshing players every {}s", period.as_secs());
    } else {
        info!("Background refresh disabled; use 'refresh' to reload");
    }

    let mut listing = Listing {
        search: String::new(),
        page: 1,
    };
    println!("{}", render::HELP);
    show_page(&console, &listing, style);

    let mut lines = BufReader::new(stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        debug!("Console command: {:?}", command);
        match run_command(&console, command, &mut listing, style).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => report(&e),
        }
    }

    info!("Goodbye");
    Ok(())
}

/// Log in or sign up until a session exists; false when the user quits
async fn authenticate(console: &BidConsole) -> Result<bool> {
    loop {
        match prompt_auth_choice()? {
            AuthChoice::Login => {
                let (email, password) = prompt_login()?;
                match console.login(&email, &password).await {
                    Ok(session) => {
                        println!("{}", render::render_session(&session, None));
                        return Ok(true);
                    }
                    Err(e) => report(&e),
                }
            }
            AuthChoice::Signup => {
                let form = prompt_signup()?;
                match console.signup(&form).await {
                    Ok(message) => println!("{}", message),
                    Err(e) => report(&e),
                }
            }
            AuthChoice::Quit => return Ok(false),
        }
    }
}

async fn run_command(
    console: &BidConsole,
    command: Command,
    listing: &mut Listing,
    style: AmountStyle,
) -> Result<Flow, ConsoleError> {
    match command {
        Command::Help => println!("{}", render::HELP),
        Command::Players { search } => {
            listing.search = search;
            listing.page = 1;
            show_page(console, listing, style);
        }
        Command::Page(page) => {
            listing.page = page;
            show_page(console, listing, style);
        }
        Command::Sold { team } => {
            let sold = console.sold_players(team.as_deref());
            println!("{}", render::render_sold(&sold, style));
        }
        Command::Show(player_id) => {
            let insight = console.inspect(&player_id).await?;
            println!("{}", render::render_insight(&insight, style, Utc::now()));
        }
        Command::Bid { player_id, amount } => {
            let outcome = console.place_bid(&player_id, amount).await?;
            println!("{} ({})", outcome.message, format_rupees(outcome.amount));
            let insight = console.inspect(&outcome.player_id).await?;
            println!("{}", render::render_insight(&insight, style, Utc::now()));
        }
        Command::Exit(player_id) => {
            let message = console.exit_auction(player_id.as_deref()).await?;
            println!("{}", message);
        }
        Command::Sell(player_id) => {
            if ask(confirm(&format!("Mark player {} as sold?", player_id))) == Some(true) {
                println!("{}", console.mark_sold(&player_id).await?);
            }
        }
        Command::Release(player_id) => {
            if ask(confirm(&format!("Release player {}?", player_id))) == Some(true) {
                println!("{}", console.release_player(&player_id).await?);
            }
        }
        Command::Purses => println!("{}", render::render_purses(&console.purses().await?)),
        Command::AddPlayer => {
            if let Some(form) = ask(prompt_player_form(None)) {
                println!("{}", console.add_player(&form).await?);
            }
        }
        Command::Edit(player_id) => {
            let existing = console
                .view()
                .player(&player_id)
                .ok_or_else(|| ConsoleError::UnknownPlayer(player_id.clone()))?;
            if let Some(form) = ask(prompt_player_form(Some(&existing))) {
                let updated = console.update_player(&player_id, &form).await?;
                println!("Player {} updated.", updated.name);
            }
        }
        Command::Stats => println!("{}", render::render_stats(&console.player_stats().await?)),
        Command::RecordStats(player_id) => {
            let owner = console
                .view()
                .player(&player_id)
                .and_then(|p| p.team)
                .ok_or_else(|| ConsoleError::validation("Stats can only be recorded for sold players."))?;
            if let Some(form) = ask(prompt_stats_form(&console.teams(), &owner)) {
                println!("{}", console.record_stats(&player_id, &form).await?);
            }
        }
        Command::Refresh => {
            let count = console.refresh().await?;
            println!("Loaded {} players.", count);
            show_page(console, listing, style);
        }
        Command::Whoami => match console.session() {
            Some(session) => println!(
                "{}",
                render::render_session(&session, console.locked_player().as_deref())
            ),
            None => println!("Not logged in."),
        },
        Command::Logout => {
            console.logout();
            println!("Logged out.");
            let signed_in = authenticate(console).await.unwrap_or_else(|e| {
                error!("Login prompt failed: {}", e);
                false
            });
            if !signed_in {
                return Ok(Flow::Quit);
            }
            show_page(console, listing, style);
        }
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn show_page(console: &BidConsole, listing: &Listing, style: AmountStyle) {
    let page = console.players(&listing.search, listing.page);
    let locked = console.locked_player();
    println!(
        "{}",
        render::render_player_page(&page, style, locked.as_deref())
    );
}

/// Prompt results that failed are logged and treated as cancelled
fn ask<T>(result: dialoguer::Result<T>) -> Option<T> {
    result
        .map_err(|e| warn!("Prompt cancelled: {}", e))
        .ok()
}

fn report(err: &ConsoleError) {
    match err.kind() {
        ErrorKind::Network => error!("{}", err),
        ErrorKind::Stale | ErrorKind::LockConflict => warn!("{}", err),
        _ => info!("{}", err),
    }
}
