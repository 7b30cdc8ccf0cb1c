//! Typestate round engine for the coordinator.
//!
//! The coordinator phase is encoded in the type parameter:
//! - `Coordinator<WaitingForPlayers>` admits connections until the roster is full
//! - `Coordinator<RoundActive>` draws, broadcasts and counts down
//! - `Coordinator<GameOver>` broadcasts the sentinel and reports the outcome
//!
//! Only `RoundActive` can draw words, and only `GameOver` can finish.

use crate::arbitration::{Arbiter, PlayerId};
use crate::config::GameSettings;
use crate::event_log::EventLog;
use crate::protocol::ServerMessage;
use crate::session::{PlayerSession, SessionExit, SessionHandle};
use bingo_core::WordDeck;
use derive_getters::Getters;
use std::marker::PhantomData;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

/// How long `finish` waits for sessions to flush the sentinel.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Shortest countdown tick interval.
const MIN_TICK: Duration = Duration::from_millis(1);

/// Typestate marker: waiting for the roster to fill.
#[derive(Debug, Clone, Copy)]
pub struct WaitingForPlayers;

/// Typestate marker: rounds are being played.
#[derive(Debug, Clone, Copy)]
pub struct RoundActive;

/// Typestate marker: the game has ended.
#[derive(Debug, Clone, Copy)]
pub struct GameOver;

/// Pacing of one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct RoundTiming {
    /// How long a drawn word stays live.
    countdown: Duration,
    /// Remaining time at which the final-seconds warning fires.
    warning: Duration,
    /// Pause after a round without a winner.
    pause: Duration,
    /// Interval between countdown ticks.
    tick: Duration,
}

impl RoundTiming {
    /// Creates round pacing. A tick shorter than 1ms is raised to 1ms.
    pub fn new(countdown: Duration, warning: Duration, pause: Duration, tick: Duration) -> Self {
        Self {
            countdown,
            warning,
            pause,
            tick: tick.max(MIN_TICK),
        }
    }
}

/// The live word and round counter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
pub struct DrawState {
    /// Word broadcast most recently.
    current_word: Option<String>,
    /// Rounds played so far.
    round: u32,
}

/// Why the game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum EndReason {
    /// A player's claim was committed.
    Winner,
    /// Every word was drawn without a winner.
    DeckExhausted,
    /// Every player disconnected.
    AllPlayersLeft,
}

/// Final result of a game.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GameOutcome {
    /// The committed winner, if any.
    winner: Option<PlayerId>,
    /// Display name of the winner.
    winner_name: Option<String>,
    /// Rounds played.
    rounds: u32,
    /// Why the game ended.
    reason: EndReason,
}

/// Progress reports for the host view and for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorEvent {
    /// A connection was admitted.
    PlayerJoined {
        /// Assigned id.
        player: PlayerId,
        /// Display name.
        name: String,
        /// Remote address.
        address: String,
    },
    /// A word was drawn and broadcast.
    RoundStarted {
        /// Round number, from 1.
        round: u32,
        /// The drawn word.
        word: String,
    },
    /// Countdown progress.
    Tick {
        /// Time left in the round.
        remaining: Duration,
    },
    /// The countdown crossed the warning threshold.
    FinalSeconds,
    /// A claim was refused by the claim policy.
    ClaimRejected {
        /// Claiming player.
        player: PlayerId,
        /// Words the player had received.
        words_seen: usize,
    },
    /// A session ended before the game did.
    PlayerLeft {
        /// Departed player.
        player: PlayerId,
        /// What ended the session.
        reason: String,
    },
    /// The game ended.
    GameOver(GameOutcome),
}

/// Result of admitting a connection.
pub enum Admission {
    /// More players are expected.
    Waiting(Coordinator<WaitingForPlayers>),
    /// The roster is full and rounds can begin.
    Ready(Coordinator<RoundActive>),
}

/// Result of playing one round.
pub enum RoundTransition {
    /// No winner yet; play the next round.
    Continue(Coordinator<RoundActive>),
    /// The game has ended.
    Over(Coordinator<GameOver>),
}

/// Owns the deck, the draw state, the arbiter and every session.
pub struct Coordinator<S> {
    settings: GameSettings,
    timing: RoundTiming,
    deck: WordDeck,
    draw: DrawState,
    arbiter: Arbiter,
    sessions: Vec<SessionHandle>,
    tasks: JoinSet<SessionExit>,
    events: mpsc::UnboundedSender<CoordinatorEvent>,
    log: EventLog,
    end: Option<EndReason>,
    _state: PhantomData<S>,
}

// ─────────────────────────────────────────────────────────────
//  Shared helpers
// ─────────────────────────────────────────────────────────────

impl<S> Coordinator<S> {
    /// Returns the current draw state.
    pub fn draw_state(&self) -> &DrawState {
        &self.draw
    }

    /// Returns the ids of sessions still connected.
    pub fn players(&self) -> Vec<PlayerId> {
        self.sessions.iter().map(SessionHandle::player).collect()
    }

    /// Returns the shared arbiter.
    pub fn arbiter(&self) -> &Arbiter {
        &self.arbiter
    }

    fn emit(&self, event: CoordinatorEvent) {
        // The receiver is optional; a closed channel only means nobody watches.
        let _ = self.events.send(event);
    }

    fn transition<T>(self) -> Coordinator<T> {
        Coordinator {
            settings: self.settings,
            timing: self.timing,
            deck: self.deck,
            draw: self.draw,
            arbiter: self.arbiter,
            sessions: self.sessions,
            tasks: self.tasks,
            events: self.events,
            log: self.log,
            end: self.end,
            _state: PhantomData,
        }
    }

    /// Drops a departed session from the broadcast set.
    fn remove_session(&mut self, player: PlayerId, reason: String) {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.player() != player);
        if self.sessions.len() == before {
            return;
        }
        warn!(%player, %reason, remaining = self.sessions.len(), "Player left");
        self.log.append(format!("{} disconnected: {}", player, reason));
        self.emit(CoordinatorEvent::PlayerLeft { player, reason });
    }

    fn session_exited(&mut self, exit: Result<SessionExit, tokio::task::JoinError>) {
        match exit {
            Ok(SessionExit { player, result }) => {
                let reason = match result {
                    Ok(end) => format!("{end:?}"),
                    Err(e) => e.to_string(),
                };
                self.remove_session(player, reason);
            }
            Err(e) => warn!(error = %e, "Session task failed"),
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  WaitingForPlayers
// ─────────────────────────────────────────────────────────────

impl Coordinator<WaitingForPlayers> {
    /// Creates a coordinator with an empty roster.
    #[instrument(
        skip_all,
        fields(players = settings.player_count(), card_size = settings.card_size())
    )]
    pub fn new(
        settings: GameSettings,
        deck: WordDeck,
        timing: RoundTiming,
        events: mpsc::UnboundedSender<CoordinatorEvent>,
        log: EventLog,
    ) -> Self {
        log.append("Start of game");
        Self {
            settings,
            timing,
            deck,
            draw: DrawState::default(),
            arbiter: Arbiter::new(),
            sessions: Vec::new(),
            tasks: JoinSet::new(),
            events,
            log,
            end: None,
            _state: PhantomData,
        }
    }

    /// Accepts TCP connections until every player has joined.
    ///
    /// # Errors
    ///
    /// Returns the listener's I/O error if accepting fails.
    #[instrument(skip_all)]
    pub async fn accept_players(
        self,
        listener: TcpListener,
    ) -> std::io::Result<Coordinator<RoundActive>> {
        info!(expected = self.settings.player_count(), "Waiting for players");
        let mut waiting = self;
        loop {
            let (stream, address) = listener.accept().await?;
            if let Err(e) = stream.set_nodelay(true) {
                debug!(error = %e, "Could not disable Nagle");
            }
            match waiting.admit(stream, address.to_string()) {
                Admission::Waiting(next) => waiting = next,
                Admission::Ready(active) => return Ok(active),
            }
        }
    }

    /// Turns one connection into a session with the next player id.
    #[instrument(skip(self, stream))]
    pub fn admit<T>(mut self, stream: T, address: String) -> Admission
    where
        T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let player = PlayerId::new(self.sessions.len());
        let (session, handle) = PlayerSession::new(
            player,
            stream,
            self.arbiter.clone(),
            *self.settings.claim_policy(),
            *self.settings.card_size(),
            self.events.clone(),
            self.log.clone(),
        );
        self.tasks.spawn(session.run_to_exit());
        self.sessions.push(handle);

        let name = self.settings.player_name(player);
        info!(%player, %name, %address, "Player joined");
        self.log.append(format!("{} ({}) connected from {}", name, player, address));
        self.emit(CoordinatorEvent::PlayerJoined {
            player,
            name,
            address,
        });

        if self.sessions.len() >= *self.settings.player_count() {
            info!("All players connected");
            Admission::Ready(self.transition())
        } else {
            Admission::Waiting(self)
        }
    }
}

// ─────────────────────────────────────────────────────────────
//  RoundActive
// ─────────────────────────────────────────────────────────────

impl Coordinator<RoundActive> {
    /// Plays rounds until the game ends.
    #[instrument(skip_all)]
    pub async fn run(self) -> Coordinator<GameOver> {
        let mut active = self;
        loop {
            match active.play_round().await {
                RoundTransition::Continue(next) => active = next,
                RoundTransition::Over(done) => return done,
            }
        }
    }

    /// Draws one word, broadcasts it and waits for a winner or the deadline.
    #[instrument(skip_all, fields(round = self.draw.round + 1))]
    pub async fn play_round(mut self) -> RoundTransition {
        if self.arbiter.winner().is_some() {
            return self.end_with(EndReason::Winner);
        }

        let word = match self.deck.draw_next() {
            Ok(word) => word,
            Err(e) => {
                warn!(error = %e, "No words left to draw");
                return self.end_with(EndReason::DeckExhausted);
            }
        };

        self.draw.round += 1;
        self.draw.current_word = Some(word.clone());
        info!(round = self.draw.round, %word, "Word drawn");
        self.log
            .append(format!("Round {}: drawn word is {}", self.draw.round, word));
        self.emit(CoordinatorEvent::RoundStarted {
            round: self.draw.round,
            word: word.clone(),
        });

        self.broadcast(ServerMessage::Word(word));
        if self.sessions.is_empty() {
            return self.end_with(EndReason::AllPlayersLeft);
        }

        let countdown = *self.timing.countdown();
        if let Some(reason) = self.wait_for_winner(countdown, true).await {
            return self.end_with(reason);
        }

        debug!("Round ended without a winner");
        let pause = *self.timing.pause();
        if let Some(reason) = self.wait_for_winner(pause, false).await {
            return self.end_with(reason);
        }
        RoundTransition::Continue(self)
    }

    /// Sends a message to every live session, dropping closed ones.
    fn broadcast(&mut self, message: ServerMessage) {
        let closed: Vec<PlayerId> = self
            .sessions
            .iter()
            .filter(|s| !s.send(message.clone()))
            .map(SessionHandle::player)
            .collect();
        for player in closed {
            self.remove_session(player, "connection closed".to_string());
        }
    }

    /// Waits `window` for a committed claim.
    ///
    /// Returns the reason to end the game, or `None` when the window elapsed.
    async fn wait_for_winner(&mut self, window: Duration, ticking: bool) -> Option<EndReason> {
        let deadline = Instant::now() + window;
        let tick = *self.timing.tick();
        let mut ticker = tokio::time::interval_at(Instant::now() + tick, tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut warned = false;

        loop {
            let arbiter = self.arbiter.clone();
            tokio::select! {
                winner = arbiter.decided() => {
                    debug!(%winner, "Claim committed during countdown");
                    return Some(EndReason::Winner);
                }
                _ = tokio::time::sleep_until(deadline) => return None,
                _ = ticker.tick(), if ticking => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    self.emit(CoordinatorEvent::Tick { remaining });
                    if !warned && remaining <= *self.timing.warning() {
                        warned = true;
                        self.emit(CoordinatorEvent::FinalSeconds);
                    }
                }
                Some(exit) = self.tasks.join_next() => {
                    self.session_exited(exit);
                    if self.sessions.is_empty() {
                        return Some(EndReason::AllPlayersLeft);
                    }
                }
            }
        }
    }

    fn end_with(mut self, reason: EndReason) -> RoundTransition {
        info!(%reason, rounds = self.draw.round, "Game over");
        self.end = Some(reason);
        RoundTransition::Over(self.transition())
    }
}

// ─────────────────────────────────────────────────────────────
//  GameOver
// ─────────────────────────────────────────────────────────────

impl Coordinator<GameOver> {
    /// Broadcasts the sentinel, journals the result and reports the outcome.
    #[instrument(skip_all)]
    pub async fn finish(mut self) -> GameOutcome {
        // A claim racing the last deadline still counts.
        let winner = self.arbiter.winner();
        let reason = match winner {
            Some(_) => EndReason::Winner,
            None => self.end.unwrap_or(EndReason::DeckExhausted),
        };
        let winner_name = winner.map(|id| self.settings.player_name(id));

        for session in &self.sessions {
            session.send(ServerMessage::GameOver);
        }
        self.sessions.clear();

        let flushed = tokio::time::timeout(FLUSH_TIMEOUT, async {
            while self.tasks.join_next().await.is_some() {}
        })
        .await;
        if flushed.is_err() {
            warn!("Sessions did not close in time");
            self.tasks.abort_all();
        }

        match &winner_name {
            Some(name) => self.log.append(format!("{} has won!", name)),
            None => self.log.append(format!("No winner ({})", reason)),
        }
        self.log.append("End of game");

        let outcome = GameOutcome {
            winner,
            winner_name,
            rounds: self.draw.round,
            reason,
        };
        info!(?outcome, "Game finished");
        self.emit(CoordinatorEvent::GameOver(outcome.clone()));
        outcome
    }
}
