//! Per-player state machine: card, cursor, pending word and claim logic.

use crate::arbitration::PlayerId;
use crate::event_log::EventLog;
use crate::protocol::ServerMessage;
use bingo_core::{Card, Line};
use derive_getters::Getters;
use tracing::{debug, info, instrument, warn};

/// Local input, already translated from key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Input {
    /// Move the cursor up one row.
    Up,
    /// Move the cursor down one row.
    Down,
    /// Move the cursor left one column.
    Left,
    /// Move the cursor right one column.
    Right,
    /// Mark the cell under the cursor.
    Confirm,
    /// Leave the game.
    Quit,
}

/// Selected cell, always inside the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    row: usize,
    col: usize,
}

impl Cursor {
    /// Creates a cursor at the given cell.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Row of the selected cell.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Column of the selected cell.
    pub fn col(&self) -> usize {
        self.col
    }

    /// Moves one step, staying inside a `size`×`size` grid.
    fn step(&mut self, input: Input, size: usize) -> bool {
        let last = size.saturating_sub(1);
        let (row, col) = match input {
            Input::Up => (self.row.saturating_sub(1), self.col),
            Input::Down => ((self.row + 1).min(last), self.col),
            Input::Left => (self.row, self.col.saturating_sub(1)),
            Input::Right => (self.row, (self.col + 1).min(last)),
            Input::Confirm | Input::Quit => return false,
        };
        let moved = (row, col) != (self.row, self.col);
        self.row = row;
        self.col = col;
        moved
    }
}

/// Where the agent is in its game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum AgentPhase {
    /// No word has arrived yet.
    AwaitingWord,
    /// A word is live and can be marked.
    Playing,
    /// This agent completed a line and claimed the win.
    Won,
    /// The game ended without a win for this agent, or the player quit.
    Ended,
}

impl AgentPhase {
    /// True once no further words or selections are processed.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Ended)
    }
}

/// A selection that cannot be marked.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum SelectionError {
    /// The selected cell does not hold the drawn word.
    #[display("{selected} at ({row},{col}) is not the drawn word {drawn}")]
    InvalidSelection {
        /// Selected row.
        row: usize,
        /// Selected column.
        col: usize,
        /// Word in the selected cell.
        selected: String,
        /// Word currently drawn.
        drawn: String,
    },
}

/// What an input did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentAction {
    /// The cursor moved.
    Moved(Cursor),
    /// A cell was marked without completing a line.
    Marked {
        /// Marked row.
        row: usize,
        /// Marked column.
        col: usize,
        /// The word in the cell.
        word: String,
    },
    /// A mark completed a line; the caller must send one win claim.
    Claim(Line),
    /// The selection was refused; nothing changed.
    Rejected(SelectionError),
    /// The input had no effect.
    Ignored,
    /// The player wants to leave.
    Quit,
}

/// One player's side of the game.
///
/// Owns the card exclusively. Words arrive through [`PlayerAgent::receive`];
/// local input goes through [`PlayerAgent::handle`].
#[derive(Debug, Getters)]
pub struct PlayerAgent {
    /// This player's id.
    id: PlayerId,
    /// Display name.
    name: String,
    /// The player's card.
    card: Card,
    /// Selected cell.
    cursor: Cursor,
    /// Current phase.
    phase: AgentPhase,
    /// Most recent drawn word.
    pending_word: Option<String>,
    /// Words received so far.
    words_received: usize,
    #[getter(skip)]
    log: EventLog,
}

impl PlayerAgent {
    /// Creates an agent around a freshly dealt card.
    #[instrument(skip(card, log), fields(card_size = card.size()))]
    pub fn new(id: PlayerId, name: String, card: Card, log: EventLog) -> Self {
        log.append("Start of game");
        log.append(format!("Card size: ({0}x{0})", card.size()));
        Self {
            id,
            name,
            card,
            cursor: Cursor::default(),
            phase: AgentPhase::AwaitingWord,
            pending_word: None,
            words_received: 0,
            log,
        }
    }

    /// Applies a message from the coordinator and returns the new phase.
    #[instrument(skip(self), fields(player = %self.id))]
    pub fn receive(&mut self, message: ServerMessage) -> AgentPhase {
        match message {
            ServerMessage::Word(word) => {
                if self.phase.is_terminal() {
                    debug!(%word, "Ignoring word after the game ended");
                    return self.phase;
                }
                debug!(%word, on_card = self.card.contains(&word), "Word received");
                self.words_received += 1;
                self.pending_word = Some(word);
                self.phase = AgentPhase::Playing;
            }
            ServerMessage::GameOver => {
                if self.phase != AgentPhase::Won {
                    info!("Game over without a win");
                    self.log.append("Game over");
                    self.phase = AgentPhase::Ended;
                }
                self.log.append("End of game");
            }
        }
        self.phase
    }

    /// Applies one local input.
    #[instrument(skip(self), fields(player = %self.id, phase = %self.phase))]
    pub fn handle(&mut self, input: Input) -> AgentAction {
        if input == Input::Quit {
            if !self.phase.is_terminal() {
                self.log.append("Left the game");
                self.phase = AgentPhase::Ended;
            }
            return AgentAction::Quit;
        }
        if self.phase.is_terminal() {
            return AgentAction::Ignored;
        }
        if input == Input::Confirm {
            return self.confirm();
        }
        if self.cursor.step(input, self.card.size()) {
            AgentAction::Moved(self.cursor)
        } else {
            AgentAction::Ignored
        }
    }

    /// Marks the cursor cell if it holds the pending word.
    fn confirm(&mut self) -> AgentAction {
        let Some(drawn) = self.pending_word.clone() else {
            debug!("Confirm before any word arrived");
            return AgentAction::Ignored;
        };
        let (row, col) = (self.cursor.row(), self.cursor.col());
        let selected = match self.card.cell(row, col) {
            Some(cell) => cell.word().to_string(),
            None => return AgentAction::Ignored,
        };

        if selected != drawn {
            let error = SelectionError::InvalidSelection {
                row,
                col,
                selected,
                drawn,
            };
            warn!(%error, "Selection rejected");
            self.log.append(format!("Rejected: {}", error));
            return AgentAction::Rejected(error);
        }

        if let Err(e) = self.card.mark(row, col) {
            warn!(error = %e, "Mark failed");
            return AgentAction::Ignored;
        }
        self.log.append(format!("{} ({},{})", selected, col, row));

        match self.card.completed_line() {
            Some(line) => {
                info!(%line, "Winning pattern completed");
                self.log.append("Victory");
                self.phase = AgentPhase::Won;
                AgentAction::Claim(line)
            }
            None => AgentAction::Marked {
                row,
                col,
                word: selected,
            },
        }
    }
}
