//! Player-side network loop.
//!
//! Network messages and local input are awaited together, so a slow player
//! never delays drawn words and a quiet coordinator never blocks input.

use crate::agent::{AgentAction, Input, PlayerAgent};
use crate::protocol::{self, ClientMessage, ProtocolError, ServerMessage};
use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tracing::{debug, info, instrument, warn};

/// Failures on the player side of a connection.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum ClientError {
    /// Nobody is listening at the coordinator address.
    #[display("Connection to {address} refused; is the game master running?")]
    #[from(ignore)]
    ConnectionRefused {
        /// Address that refused.
        address: String,
    },

    /// The coordinator closed the connection before the game ended.
    #[display("Connection to the game master was lost")]
    #[from(ignore)]
    ConnectionLost,

    /// Socket failure.
    #[display("I/O error: {_0}")]
    Io(std::io::Error),

    /// Line framing failure.
    #[display("Transport error: {_0}")]
    Transport(LinesCodecError),

    /// The coordinator sent something undecodable.
    #[display("Protocol error: {_0}")]
    Protocol(ProtocolError),
}

/// How the player's game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ClientOutcome {
    /// This player claimed the win before the game ended.
    Won,
    /// Someone else won, or nobody did.
    Lost,
    /// The player left.
    Quit,
}

/// Draws the player's screen.
pub trait Renderer {
    /// Renders the agent state with an optional one-line notice.
    fn render(&mut self, agent: &PlayerAgent, notice: Option<&str>) -> std::io::Result<()>;
}

/// Connects to the coordinator.
///
/// # Errors
///
/// Returns [`ClientError::ConnectionRefused`] when nothing listens at the
/// address, or [`ClientError::Io`] for other socket failures.
#[instrument]
pub async fn connect(
    host: &str,
    port: u16,
) -> Result<Framed<TcpStream, LinesCodec>, ClientError> {
    let address = format!("{host}:{port}");
    let stream = match TcpStream::connect(&address).await {
        Ok(stream) => stream,
        Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
            warn!(%address, "Connection refused");
            return Err(ClientError::ConnectionRefused { address });
        }
        Err(e) => return Err(e.into()),
    };
    if let Err(e) = stream.set_nodelay(true) {
        debug!(error = %e, "Could not disable Nagle");
    }
    info!(%address, "Connected to game master");
    Ok(Framed::new(stream, protocol::codec()))
}

/// Plays one game until the sentinel arrives or the player quits.
///
/// Sends at most one win claim.
///
/// # Errors
///
/// Fails when the connection breaks, the coordinator sends an undecodable
/// line, or rendering fails.
#[instrument(skip_all, fields(player = %agent.id()))]
pub async fn run_player<T, R>(
    mut connection: Framed<T, LinesCodec>,
    agent: &mut PlayerAgent,
    inputs: &mut mpsc::UnboundedReceiver<Input>,
    renderer: &mut R,
) -> Result<ClientOutcome, ClientError>
where
    T: AsyncRead + AsyncWrite + Unpin,
    R: Renderer,
{
    let mut claimed = false;
    let mut inputs_open = true;
    let mut notice: Option<String> = None;

    loop {
        renderer.render(agent, notice.as_deref())?;

        tokio::select! {
            line = connection.next() => {
                let line = match line {
                    Some(line) => line?,
                    None => {
                        warn!("Game master closed the connection");
                        return Err(ClientError::ConnectionLost);
                    }
                };
                let message = ServerMessage::decode(&line)?;
                let game_over = message == ServerMessage::GameOver;
                agent.receive(message);
                notice = None;
                if game_over {
                    let outcome = if claimed {
                        ClientOutcome::Won
                    } else {
                        ClientOutcome::Lost
                    };
                    info!(%outcome, "Game over received");
                    renderer.render(agent, None)?;
                    return Ok(outcome);
                }
            }
            input = inputs.recv(), if inputs_open => {
                let Some(input) = input else {
                    debug!("Input source closed");
                    inputs_open = false;
                    continue;
                };
                match agent.handle(input) {
                    AgentAction::Claim(line) => {
                        if !claimed {
                            claimed = true;
                            info!(%line, "Sending win claim");
                            connection.send(ClientMessage::WinClaim.encode()).await?;
                        }
                    }
                    AgentAction::Rejected(e) => notice = Some(e.to_string()),
                    AgentAction::Quit => {
                        info!("Player quit");
                        return Ok(ClientOutcome::Quit);
                    }
                    AgentAction::Moved(_) | AgentAction::Marked { .. } => notice = None,
                    AgentAction::Ignored => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentPhase;
    use crate::arbitration::PlayerId;
    use crate::event_log::EventLog;
    use bingo_core::Card;
    use tokio::io::duplex;

    struct Silent;

    impl Renderer for Silent {
        fn render(&mut self, _: &PlayerAgent, _: Option<&str>) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Reports every rendered phase.
    struct Watching(mpsc::UnboundedSender<AgentPhase>);

    impl Renderer for Watching {
        fn render(&mut self, agent: &PlayerAgent, _: Option<&str>) -> std::io::Result<()> {
            let _ = self.0.send(*agent.phase());
            Ok(())
        }
    }

    fn agent() -> PlayerAgent {
        let card = Card::new(1, vec!["synergy".into()]).expect("card");
        PlayerAgent::new(PlayerId::new(0), "Ada".into(), card, EventLog::disabled())
    }

    #[tokio::test]
    async fn test_refused_connection_is_reported() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        drop(listener);
        let result = connect("127.0.0.1", port).await;
        assert!(matches!(result, Err(ClientError::ConnectionRefused { .. })));
    }

    #[tokio::test]
    async fn test_claim_sent_once_then_game_over() {
        let (client, server) = duplex(1024);
        let mut server = Framed::new(server, protocol::codec());
        let (tx, rx) = mpsc::unbounded_channel();
        let (phase_tx, mut phases) = mpsc::unbounded_channel();
        let mut agent = agent();

        let game = tokio::spawn(async move {
            let mut renderer = Watching(phase_tx);
            let connection = Framed::new(client, protocol::codec());
            let mut rx = rx;
            let outcome = run_player(connection, &mut agent, &mut rx, &mut renderer).await;
            (outcome, agent)
        });

        server.send("synergy".to_string()).await.expect("send word");
        while let Some(phase) = phases.recv().await {
            if phase == AgentPhase::Playing {
                break;
            }
        }
        tx.send(Input::Confirm).expect("input");
        tx.send(Input::Confirm).expect("input");
        assert_eq!(server.next().await.and_then(Result::ok).as_deref(), Some("WIN"));

        server.send("WIN".to_string()).await.expect("send sentinel");
        let (outcome, agent) = game.await.expect("joined");
        assert_eq!(outcome.expect("clean end"), ClientOutcome::Won);
        assert!(agent.card().has_winning_pattern());

        // Only one claim ever left the player.
        assert!(server.next().await.is_none());
    }

    #[tokio::test]
    async fn test_sentinel_without_claim_is_a_loss() {
        let (client, server) = duplex(1024);
        let mut server = Framed::new(server, protocol::codec());
        let (_tx, mut rx) = mpsc::unbounded_channel();
        let mut agent = agent();

        server.send("WIN".to_string()).await.expect("send sentinel");
        let connection = Framed::new(client, protocol::codec());
        let outcome = run_player(connection, &mut agent, &mut rx, &mut Silent)
            .await
            .expect("clean end");
        assert_eq!(outcome, ClientOutcome::Lost);
    }

    #[tokio::test]
    async fn test_closed_connection_is_lost() {
        let (client, server) = duplex(1024);
        drop(server);
        let (_tx, mut rx) = mpsc::unbounded_channel();
        let mut agent = agent();
        let connection = Framed::new(client, protocol::codec());
        let result = run_player(connection, &mut agent, &mut rx, &mut Silent).await;
        assert!(matches!(result, Err(ClientError::ConnectionLost)));
    }
}
