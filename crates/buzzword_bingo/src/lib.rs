//! Buzzword Bingo library - networked word bingo
//!
//! One game master draws words and broadcasts them to independent player
//! processes over TCP. Each player marks its own card and claims the win;
//! the first claim committed to the [`Arbiter`] ends the game for everyone.
//!
//! # Architecture
//!
//! - **Coordinator**: typestate round engine owning the deck and the arbiter
//! - **Session**: one task per connection, forwarding words and claims
//! - **Agent**: a player's card, cursor and claim logic
//! - **Client**: the player-side network loop
//! - **Protocol**: newline-framed words and the `WIN` sentinel
//!
//! # Example
//!
//! ```no_run
//! use buzzword_bingo::{Coordinator, EventLog, GameSettings, WordDeck};
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = GameSettings::default().with_player_count(1).with_card_size(1);
//! let deck = WordDeck::new(vec!["synergy".to_string()]);
//! let (events, _rx) = mpsc::unbounded_channel();
//! let timing = settings.timing();
//!
//! let listener = TcpListener::bind("127.0.0.1:65432").await?;
//! let outcome = Coordinator::new(settings, deck, timing, events, EventLog::disabled())
//!     .accept_players(listener)
//!     .await?
//!     .run()
//!     .await
//!     .finish()
//!     .await;
//! println!("{:?}", outcome.winner());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod agent;
pub mod arbitration;
pub mod cli;
pub mod client;
pub mod config;
pub mod coordinator;
pub mod event_log;
pub mod launcher;
pub mod protocol;
pub mod session;
pub mod tui;
pub mod vocabulary;

// Crate-level exports - core game types
pub use bingo_core::{Card, CardError, Cell, DeckError, Line, WordDeck};

// Crate-level exports - coordination
pub use arbitration::{Arbiter, ClaimOutcome, PlayerId};
pub use coordinator::{
    Admission, Coordinator, CoordinatorEvent, DrawState, EndReason, GameOutcome, GameOver,
    RoundActive, RoundTiming, RoundTransition, WaitingForPlayers,
};
pub use session::{PlayerSession, SessionEnd, SessionError, SessionHandle};

// Crate-level exports - player side
pub use agent::{AgentAction, AgentPhase, Cursor, Input, PlayerAgent, SelectionError};
pub use client::{ClientError, ClientOutcome, Renderer, connect, run_player};

// Crate-level exports - configuration and collaborators
pub use config::{ClaimPolicy, ConfigError, GameSettings, PlayerLaunch};
pub use event_log::EventLog;
pub use protocol::{ClientMessage, ProtocolError, ServerMessage};
pub use vocabulary::{FileWordSource, StaticWords, VocabularyError, WordSource};
