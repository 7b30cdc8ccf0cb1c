//! Terminal front-ends for the host and the players.

mod card_view;
mod host_view;
pub mod input;

pub use card_view::{CELL_WORD_WIDTH, CardView, status_text, truncate};
pub use host_view::HostView;

use crate::agent::Input;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// How long the input thread blocks before checking for shutdown.
const INPUT_POLL: Duration = Duration::from_millis(100);

/// Terminal type used by both front-ends.
pub type Screen = Terminal<CrosstermBackend<Stdout>>;

/// Switches to raw mode and the alternate screen.
#[instrument]
pub fn setup_terminal() -> io::Result<Screen> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))
        .map_err(|e| io::Error::other(e.to_string()))?;
    debug!("Terminal ready");
    Ok(terminal)
}

/// Leaves the alternate screen and restores the cursor.
#[instrument(skip(terminal))]
pub fn restore_terminal(terminal: &mut Screen) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    debug!("Terminal restored");
    Ok(())
}

/// Reads key presses on a dedicated thread and forwards them as [`Input`].
///
/// The thread stops once the receiver is dropped.
#[instrument(skip(tx))]
pub fn spawn_input_thread(tx: mpsc::UnboundedSender<Input>) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        info!("Input thread started");
        while !tx.is_closed() {
            match event::poll(INPUT_POLL) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        let Some(input) = input::translate(key.code) else {
                            continue;
                        };
                        if tx.send(input).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "Failed to read terminal event");
                        break;
                    }
                },
                Ok(false) => {}
                Err(e) => {
                    warn!(error = %e, "Failed to poll terminal events");
                    break;
                }
            }
        }
        debug!("Input thread stopped");
    })
}

/// Waits until the player presses quit or `timeout` elapses.
pub async fn hold_until_quit(inputs: &mut mpsc::UnboundedReceiver<Input>, timeout: Duration) {
    let wait = async {
        while let Some(input) = inputs.recv().await {
            if input == Input::Quit {
                break;
            }
        }
    };
    if tokio::time::timeout(timeout, wait).await.is_err() {
        debug!("Announcement time elapsed");
    }
}
