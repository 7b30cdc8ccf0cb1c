//! Player process management for the `host` command.

use crate::config::{ConfigError, GameSettings, PlayerLaunch};
use anyhow::{Context, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::{Child, Command};
use tracing::{debug, info, instrument, warn};

/// Spawned player processes. Kills them on drop.
#[derive(Debug, Default)]
pub struct ProcessGuards {
    children: Vec<Child>,
}

impl ProcessGuards {
    /// True if nothing was spawned.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Drop for ProcessGuards {
    fn drop(&mut self) {
        if self.children.is_empty() {
            return;
        }
        info!(count = self.children.len(), "Cleaning up player processes");
        for child in &mut self.children {
            debug!(pid = ?child.id(), "Killing player process");
            let _ = child.start_kill();
        }
    }
}

/// Builds the command that opens one player in its own terminal window.
///
/// Players draw their card on the terminal they run in, so a launched player
/// always needs the `terminal` prefix.
///
/// # Errors
///
/// Returns [`ConfigError`] if `terminal` is empty.
#[instrument(skip(exe, terminal), fields(player = %launch.player_id()))]
pub fn player_command(
    exe: &Path,
    terminal: &[String],
    launch: &PlayerLaunch,
) -> Result<Command, ConfigError> {
    let Some((program, prefix)) = terminal.split_first() else {
        warn!("No terminal command configured");
        return Err(ConfigError::new(
            "terminal_command is empty; launched players need a terminal window. \
             Set terminal_command or start players with the `player` command",
        ));
    };
    let mut command = Command::new(program);
    command
        .args(prefix)
        .arg(exe)
        .args(launch.to_args())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    Ok(command)
}

/// Starts one player process per launch.
///
/// # Errors
///
/// Fails if no terminal command is configured, the current executable cannot
/// be located, or a process cannot be spawned. Processes started before the
/// failure are killed.
#[instrument(skip_all, fields(players = launches.len()))]
pub fn spawn_players(
    settings: &GameSettings,
    launches: &[PlayerLaunch],
) -> Result<ProcessGuards> {
    let exe = std::env::current_exe().context("Failed to get current executable path")?;
    let mut guards = ProcessGuards::default();

    for launch in launches {
        let mut command = player_command(&exe, settings.terminal_command(), launch)?;
        let child = command
            .spawn()
            .with_context(|| format!("Failed to spawn process for {}", launch.player_id()))?;
        info!(player = %launch.player_id(), pid = ?child.id(), "Player process spawned");
        guards.children.push(child);
    }

    if guards.is_empty() {
        warn!("No player processes were started");
    }
    Ok(guards)
}
