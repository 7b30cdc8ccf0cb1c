//! End-to-end games over loopback TCP with scripted players.

use buzzword_bingo::{
    AgentPhase, Card, ClaimPolicy, ClientError, ClientOutcome, Coordinator, CoordinatorEvent,
    EndReason, EventLog, GameOutcome, GameSettings, Input, PlayerAgent, PlayerId, Renderer,
    RoundTiming, WordDeck, connect, run_player,
};
use std::io;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

fn timing() -> RoundTiming {
    RoundTiming::new(
        Duration::from_millis(200),
        Duration::from_millis(50),
        Duration::from_millis(10),
        Duration::from_millis(50),
    )
}

/// Marks every drawn word it finds on the card.
struct Bot {
    inputs: mpsc::UnboundedSender<Input>,
    answered: Option<String>,
}

impl Renderer for Bot {
    fn render(&mut self, agent: &PlayerAgent, _: Option<&str>) -> io::Result<()> {
        if *agent.phase() != AgentPhase::Playing {
            return Ok(());
        }
        let Some(word) = agent.pending_word() else {
            return Ok(());
        };
        if self.answered.as_deref() == Some(word.as_str()) {
            return Ok(());
        }
        self.answered = Some(word.clone());

        if let Some((row, col)) = agent.card().locate(word) {
            let cursor = agent.cursor();
            let vertical = if row > cursor.row() { Input::Down } else { Input::Up };
            let horizontal = if col > cursor.col() { Input::Right } else { Input::Left };
            for _ in 0..row.abs_diff(cursor.row()) {
                let _ = self.inputs.send(vertical);
            }
            for _ in 0..col.abs_diff(cursor.col()) {
                let _ = self.inputs.send(horizontal);
            }
            let _ = self.inputs.send(Input::Confirm);
        }
        Ok(())
    }
}

/// Never touches the keyboard.
struct Idle;

impl Renderer for Idle {
    fn render(&mut self, _: &PlayerAgent, _: Option<&str>) -> io::Result<()> {
        Ok(())
    }
}

struct Host {
    port: u16,
    game: JoinHandle<GameOutcome>,
    events: mpsc::UnboundedReceiver<CoordinatorEvent>,
}

async fn host(players: usize, size: usize, vocabulary: Vec<String>, log: EventLog) -> Host {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    let settings = GameSettings::default()
        .with_player_count(players)
        .with_card_size(size)
        .with_claim_policy(ClaimPolicy::MinimumDraws);
    let deck = WordDeck::with_seed(vocabulary, 11);
    let (tx, events) = mpsc::unbounded_channel();

    let game = tokio::spawn(async move {
        Coordinator::new(settings, deck, timing(), tx, log)
            .accept_players(listener)
            .await
            .expect("players join")
            .run()
            .await
            .finish()
            .await
    });
    Host { port, game, events }
}

fn spawn_player(
    port: u16,
    index: usize,
    vocabulary: Vec<String>,
    size: usize,
    active: bool,
) -> JoinHandle<Result<ClientOutcome, ClientError>> {
    tokio::spawn(async move {
        let mut deck = WordDeck::with_seed(vocabulary, 100 + index as u64);
        let card = Card::deal(&mut deck, size).expect("card dealt");
        let connection = connect("127.0.0.1", port).await?;
        let name = format!("Bot {}", index + 1);
        let mut agent = PlayerAgent::new(PlayerId::new(index), name, card, EventLog::disabled());
        let (tx, mut rx) = mpsc::unbounded_channel();
        if active {
            let mut bot = Bot {
                inputs: tx,
                answered: None,
            };
            run_player(connection, &mut agent, &mut rx, &mut bot).await
        } else {
            let _keep_open = tx;
            run_player(connection, &mut agent, &mut rx, &mut Idle).await
        }
    })
}

async fn within<T>(handle: JoinHandle<T>) -> T {
    tokio::time::timeout(Duration::from_secs(10), handle)
        .await
        .expect("finished in time")
        .expect("task joined")
}

#[tokio::test]
async fn test_single_player_wins_first_round() {
    let dir = tempfile::tempdir().expect("temp dir");
    let log = EventLog::coordinator(dir.path());
    let vocabulary = words(&["synergy"]);

    let host = host(1, 1, vocabulary.clone(), log.clone()).await;
    let player = spawn_player(host.port, 0, vocabulary, 1, true);

    let outcome = within(host.game).await;
    assert_eq!(*outcome.winner(), Some(PlayerId::new(0)));
    assert_eq!(*outcome.reason(), EndReason::Winner);
    assert_eq!(*outcome.rounds(), 1);
    assert_eq!(within(player).await.expect("player ok"), ClientOutcome::Won);

    let journal = std::fs::read_to_string(log.path().expect("journal path")).expect("journal");
    assert!(journal.contains("Start of game"));
    assert!(journal.contains("Round 1: drawn word is synergy"));
    assert!(journal.contains("Player 1 has won!"));
    assert!(journal.contains("End of game"));
}

#[tokio::test]
async fn test_two_players_get_exactly_one_winner() {
    let vocabulary = words(&["alpha", "beta", "gamma", "delta"]);
    let mut host = host(2, 2, vocabulary.clone(), EventLog::disabled()).await;
    let first = spawn_player(host.port, 0, vocabulary.clone(), 2, true);
    let second = spawn_player(host.port, 1, vocabulary, 2, true);

    let outcome = within(host.game).await;
    let winner = outcome.winner().expect("someone won");
    assert!(winner == PlayerId::new(0) || winner == PlayerId::new(1));
    // Any two marks on a 2x2 card complete a line.
    assert_eq!(*outcome.rounds(), 2);

    assert!(within(first).await.is_ok());
    assert!(within(second).await.is_ok());

    let mut game_over_events = 0;
    while let Ok(event) = host.events.try_recv() {
        if let CoordinatorEvent::GameOver(reported) = event {
            assert_eq!(reported, outcome);
            game_over_events += 1;
        }
    }
    assert_eq!(game_over_events, 1);
}

#[tokio::test]
async fn test_idle_player_exhausts_the_deck() {
    let vocabulary = words(&["alpha", "beta", "gamma"]);
    let host = host(1, 1, vocabulary.clone(), EventLog::disabled()).await;
    let player = spawn_player(host.port, 0, vocabulary, 1, false);

    let outcome = within(host.game).await;
    assert_eq!(*outcome.reason(), EndReason::DeckExhausted);
    assert_eq!(*outcome.winner(), None);
    assert_eq!(*outcome.rounds(), 3);
    assert_eq!(within(player).await.expect("player ok"), ClientOutcome::Lost);
}

#[tokio::test]
async fn test_game_continues_after_a_player_leaves() {
    let vocabulary = words(&["alpha", "beta", "gamma", "delta"]);
    let mut host = host(2, 2, vocabulary.clone(), EventLog::disabled()).await;

    let quitter = tokio::net::TcpStream::connect(("127.0.0.1", host.port))
        .await
        .expect("connect");
    // Let the quitter be admitted first so it gets id 0.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let stayer = spawn_player(host.port, 1, vocabulary, 2, true);
    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(quitter);

    let outcome = within(host.game).await;
    assert_eq!(*outcome.winner(), Some(PlayerId::new(1)));
    assert_eq!(within(stayer).await.expect("player ok"), ClientOutcome::Won);

    let mut left = Vec::new();
    while let Ok(event) = host.events.try_recv() {
        if let CoordinatorEvent::PlayerLeft { player, .. } = event {
            left.push(player);
        }
    }
    assert_eq!(left, vec![PlayerId::new(0)]);
}

#[tokio::test]
async fn test_player_without_master_is_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);
    let result = within(spawn_player(port, 0, words(&["alpha"]), 1, true)).await;
    assert!(matches!(result, Err(ClientError::ConnectionRefused { .. })));
}
