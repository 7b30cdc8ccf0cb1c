//! Buzzword Bingo - Unified CLI
//!
//! Game master (with or without a screen) and terminal player in one binary.

#![warn(missing_docs)]

use anyhow::{Context, Result};
use buzzword_bingo::cli::{Cli, Command, PlayerArgs};
use buzzword_bingo::tui::{self, CardView, HostView};
use buzzword_bingo::{
    Card, ClientError, ClientOutcome, Coordinator, CoordinatorEvent, EventLog, FileWordSource,
    GameOutcome, GameSettings, Input, PlayerAgent, WordDeck, WordSource, connect, launcher,
    run_player,
};
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info, instrument, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,buzzword_bingo=debug";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let settings = GameSettings::load_or_default(&cli.config)?;

    match cli.command {
        Command::Host(args) => run_host(args.apply(settings)).await,
        Command::Serve(args) => run_serve(args.apply(settings)).await,
        Command::Player(args) => run_player_process(args, settings).await,
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Sends tracing output to a file so it does not corrupt the screen.
fn init_file_tracing(role: &str) -> Result<()> {
    let path = format!("buzzword_bingo-{role}.log");
    let log_file =
        std::fs::File::create(&path).with_context(|| format!("Failed to create {path}"))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

fn init_stderr_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Loads the vocabulary and checks the settings against it.
#[instrument(skip(settings))]
fn load_deck(settings: &GameSettings) -> Result<WordDeck> {
    let vocabulary = FileWordSource::new(settings.words_file()).load_vocabulary()?;
    settings.validate(vocabulary.len())?;
    Ok(match settings.seed() {
        Some(seed) => WordDeck::with_seed(vocabulary, *seed),
        None => WordDeck::new(vocabulary),
    })
}

async fn bind(settings: &GameSettings) -> Result<TcpListener> {
    let address = format!("{}:{}", settings.host(), settings.port());
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!(%address, "Listening for players");
    Ok(listener)
}

/// Runs a whole game on `listener`.
async fn play_game(
    settings: GameSettings,
    deck: WordDeck,
    listener: TcpListener,
    events: mpsc::UnboundedSender<CoordinatorEvent>,
    log: EventLog,
) -> Result<GameOutcome> {
    let timing = settings.timing();
    let coordinator = Coordinator::new(settings, deck, timing, events, log);
    let active = coordinator
        .accept_players(listener)
        .await
        .context("Failed while accepting players")?;
    Ok(active.run().await.finish().await)
}

/// Run the game master headless
#[instrument(skip_all, fields(players = settings.player_count()))]
async fn run_serve(settings: GameSettings) -> Result<()> {
    init_stderr_tracing();
    info!("Starting Buzzword Bingo game master");

    let deck = load_deck(&settings)?;
    let listener = bind(&settings).await?;
    let log = EventLog::coordinator(settings.log_dir());
    let (events, _) = mpsc::unbounded_channel();

    tokio::select! {
        outcome = play_game(settings, deck, listener, events, log.clone()) => {
            let outcome = outcome?;
            match outcome.winner_name() {
                Some(name) => println!("{} has won after {} rounds", name, outcome.rounds()),
                None => println!("No winner ({})", outcome.reason()),
            }
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted");
            log.append("Aborted");
        }
    }
    Ok(())
}

/// Run the game master with a host screen and launched players
#[instrument(skip_all, fields(players = settings.player_count()))]
async fn run_host(settings: GameSettings) -> Result<()> {
    init_file_tracing("host")?;
    info!("Starting Buzzword Bingo host");

    let deck = load_deck(&settings)?;
    let listener = bind(&settings).await?;
    let log = EventLog::coordinator(settings.log_dir());
    let (events_tx, mut events) = mpsc::unbounded_channel();

    let _players = launcher::spawn_players(&settings, &settings.player_launches())?;
    let announcement = settings.announcement();
    let mut view = HostView::new(*settings.player_count());
    let mut game = tokio::spawn(play_game(settings, deck, listener, events_tx, log.clone()));

    let mut terminal = tui::setup_terminal()?;
    let (input_tx, mut inputs) = mpsc::unbounded_channel();
    let _input_thread = tui::spawn_input_thread(input_tx);

    let result: Result<()> = async {
        loop {
            terminal.draw(|frame| view.draw(frame))?;
            tokio::select! {
                Some(event) = events.recv() => view.apply(&event),
                joined = &mut game => {
                    joined.context("Game task failed")??;
                    while let Ok(event) = events.try_recv() {
                        view.apply(&event);
                    }
                    terminal.draw(|frame| view.draw(frame))?;
                    tui::hold_until_quit(&mut inputs, announcement).await;
                    return Ok(());
                }
                Some(input) = inputs.recv() => {
                    if input == Input::Quit {
                        warn!("Host quit before the game ended");
                        game.abort();
                        log.append("Aborted");
                        return Ok(());
                    }
                }
            }
        }
    }
    .await;

    tui::restore_terminal(&mut terminal)?;
    if let Some(outcome) = view.outcome() {
        info!(?outcome, "Host finished");
    }
    result
}

/// Run one player
#[instrument(skip_all, fields(player = args.id))]
async fn run_player_process(args: PlayerArgs, settings: GameSettings) -> Result<()> {
    let launch = args.into_launch(&settings);
    let number = launch.player_id().number();
    init_file_tracing(&format!("player-{number}"))?;
    info!(name = %launch.player_name(), "Starting player");

    let log = EventLog::player(launch.log_dir(), number);
    let vocabulary = FileWordSource::new(launch.words_file()).load_vocabulary()?;
    let mut deck = match launch.seed() {
        Some(seed) => WordDeck::with_seed(vocabulary, *seed),
        None => WordDeck::new(vocabulary),
    };
    let card = Card::deal(&mut deck, *launch.card_size()).context("Failed to deal a card")?;

    let connection = match connect(launch.server_host(), *launch.server_port()).await {
        Ok(connection) => connection,
        Err(e @ ClientError::ConnectionRefused { .. }) => {
            error!(error = %e, "Cannot reach the game master");
            log.append(e.to_string());
            eprintln!("{e}");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let mut agent = PlayerAgent::new(
        *launch.player_id(),
        launch.player_name().clone(),
        card,
        log.clone(),
    );
    let terminal = tui::setup_terminal()?;
    let mut view = CardView::new(terminal);
    let (input_tx, mut inputs) = mpsc::unbounded_channel();
    let _input_thread = tui::spawn_input_thread(input_tx);

    let result = run_player(connection, &mut agent, &mut inputs, &mut view).await;
    if matches!(result, Ok(ClientOutcome::Won | ClientOutcome::Lost)) {
        tui::hold_until_quit(&mut inputs, settings.announcement()).await;
    }

    tui::restore_terminal(view.terminal_mut())?;
    match result {
        Ok(outcome) => {
            info!(%outcome, "Player finished");
            Ok(())
        }
        Err(e) => {
            log.append(format!("Connection error: {}", e));
            Err(e).context(format!("{} lost the game connection", launch.player_name()))
        }
    }
}
