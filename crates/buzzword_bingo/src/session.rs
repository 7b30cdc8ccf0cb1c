//! Coordinator-side conduit for one connected player.

use crate::arbitration::{Arbiter, ClaimOutcome, PlayerId};
use crate::config::ClaimPolicy;
use crate::coordinator::CoordinatorEvent;
use crate::event_log::EventLog;
use crate::protocol::{self, ClientMessage, ProtocolError, ServerMessage};
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tracing::{debug, info, instrument, warn};

/// Why a session stopped without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The game-over sentinel was delivered.
    GameOver,
    /// The coordinator dropped the session handle.
    Closed,
}

/// Failures that end a session. Each one counts as a disconnect.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SessionError {
    /// The player closed the connection.
    #[display("Connection closed by player")]
    #[from(ignore)]
    Disconnected,

    /// Reading or writing a line failed.
    #[display("Transport error: {_0}")]
    Transport(LinesCodecError),

    /// The player sent something outside the protocol.
    #[display("Protocol error: {_0}")]
    Protocol(ProtocolError),
}

/// Final report of a session task.
#[derive(Debug)]
pub struct SessionExit {
    /// Player the session served.
    pub player: PlayerId,
    /// How the session ended.
    pub result: Result<SessionEnd, SessionError>,
}

/// The coordinator's sending half of a session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    player: PlayerId,
    outbound: mpsc::UnboundedSender<ServerMessage>,
}

impl SessionHandle {
    /// Returns the player behind this session.
    pub fn player(&self) -> PlayerId {
        self.player
    }

    /// Queues a message; returns false if the session has already ended.
    pub fn send(&self, message: ServerMessage) -> bool {
        self.outbound.send(message).is_ok()
    }
}

/// One player's connection, driven by its own task.
///
/// Forwards drawn words to the player and feeds win claims into the
/// [`Arbiter`]. Owns no game state beyond its buffers.
pub struct PlayerSession<T> {
    player: PlayerId,
    connection: Framed<T, LinesCodec>,
    outbound: mpsc::UnboundedReceiver<ServerMessage>,
    arbiter: Arbiter,
    policy: ClaimPolicy,
    card_size: usize,
    words_forwarded: usize,
    events: mpsc::UnboundedSender<CoordinatorEvent>,
    log: EventLog,
}

impl<T> PlayerSession<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a connection and returns the session with its handle.
    #[instrument(skip(stream, arbiter, events, log))]
    pub fn new(
        player: PlayerId,
        stream: T,
        arbiter: Arbiter,
        policy: ClaimPolicy,
        card_size: usize,
        events: mpsc::UnboundedSender<CoordinatorEvent>,
        log: EventLog,
    ) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = Self {
            player,
            connection: Framed::new(stream, protocol::codec()),
            outbound: rx,
            arbiter,
            policy,
            card_size,
            words_forwarded: 0,
            events,
            log,
        };
        let handle = SessionHandle {
            player,
            outbound: tx,
        };
        (session, handle)
    }

    /// Runs the session and tags the result with the player id.
    pub async fn run_to_exit(self) -> SessionExit {
        let player = self.player;
        let result = self.run().await;
        SessionExit { player, result }
    }

    /// Pumps messages in both directions until the game ends or the
    /// connection fails.
    #[instrument(skip(self), fields(player = %self.player))]
    pub async fn run(mut self) -> Result<SessionEnd, SessionError> {
        info!("Session started");
        loop {
            tokio::select! {
                outbound = self.outbound.recv() => match outbound {
                    Some(message) => {
                        let game_over = message == ServerMessage::GameOver;
                        if matches!(message, ServerMessage::Word(_)) {
                            self.words_forwarded += 1;
                        }
                        self.connection.send(message.encode()).await?;
                        if game_over {
                            info!("Delivered game over");
                            return Ok(SessionEnd::GameOver);
                        }
                    }
                    None => {
                        debug!("Handle dropped");
                        return Ok(SessionEnd::Closed);
                    }
                },
                inbound = self.connection.next() => match inbound {
                    Some(Ok(line)) => self.handle_line(&line)?,
                    Some(Err(e)) => {
                        warn!(error = %e, "Receive failed");
                        return Err(e.into());
                    }
                    None => {
                        info!("Player disconnected");
                        return Err(SessionError::Disconnected);
                    }
                },
            }
        }
    }

    #[instrument(skip(self), fields(player = %self.player))]
    fn handle_line(&mut self, line: &str) -> Result<(), SessionError> {
        match ClientMessage::decode(line)? {
            ClientMessage::WinClaim => {
                self.handle_claim();
                Ok(())
            }
        }
    }

    fn handle_claim(&mut self) {
        if self.policy == ClaimPolicy::MinimumDraws && self.words_forwarded < self.card_size {
            warn!(
                words_seen = self.words_forwarded,
                needed = self.card_size,
                "Rejecting premature win claim"
            );
            self.log.append(format!(
                "Rejected claim from {} after {} words",
                self.player, self.words_forwarded
            ));
            let _ = self.events.send(CoordinatorEvent::ClaimRejected {
                player: self.player,
                words_seen: self.words_forwarded,
            });
            return;
        }

        match self.arbiter.claim(self.player) {
            ClaimOutcome::Accepted => info!("Win claim accepted"),
            ClaimOutcome::AlreadyDecided(winner) => {
                debug!(%winner, "Win claim lost the race")
            }
        }
    }
}
