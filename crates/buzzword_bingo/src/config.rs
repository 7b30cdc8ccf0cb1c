//! Game configuration loaded from TOML and overridden from the command line.

use crate::arbitration::PlayerId;
use crate::coordinator::RoundTiming;
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// How the coordinator treats a player's win claim.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClaimPolicy {
    /// Commit every claim as reported.
    Trust,
    /// Reject claims made before the player has seen `card_size` words.
    #[default]
    MinimumDraws,
}

/// Settings shared by the coordinator and the players it launches.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[serde(default)]
#[setters(prefix = "with_", strip_option)]
pub struct GameSettings {
    /// Number of players the coordinator waits for.
    player_count: usize,

    /// Edge length of every card.
    card_size: usize,

    /// Display names, one per player, or empty for `Player <n>`.
    player_names: Vec<String>,

    /// Vocabulary file, one word per line.
    words_file: PathBuf,

    /// Address the coordinator binds and players connect to.
    host: String,

    /// Port the coordinator binds and players connect to.
    port: u16,

    /// Seconds each drawn word stays live.
    countdown_secs: u64,

    /// Seconds remaining when the final-seconds warning fires.
    countdown_warning_secs: u64,

    /// Pause between rounds without a winner.
    round_pause_secs: u64,

    /// How long the final result stays on screen.
    announcement_secs: u64,

    /// Directory for the game journals.
    log_dir: PathBuf,

    /// Command prefix that opens a terminal window per launched player.
    terminal_command: Vec<String>,

    /// Win claim handling.
    claim_policy: ClaimPolicy,

    /// Seed for reproducible decks.
    seed: Option<u64>,
}

#[instrument]
fn default_terminal_command() -> Vec<String> {
    let parts: &[&str] = if cfg!(windows) {
        &["cmd", "/c", "start", "cmd", "/k"]
    } else {
        &["x-terminal-emulator", "-e"]
    };
    parts.iter().map(|s| s.to_string()).collect()
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            player_count: 2,
            card_size: 5,
            player_names: Vec::new(),
            words_file: PathBuf::from("words.txt"),
            host: "127.0.0.1".to_string(),
            port: 65432,
            countdown_secs: 30,
            countdown_warning_secs: 10,
            round_pause_secs: 4,
            announcement_secs: 300,
            log_dir: PathBuf::from("."),
            terminal_command: default_terminal_command(),
            claim_policy: ClaimPolicy::default(),
            seed: None,
        }
    }
}

impl GameSettings {
    /// Loads settings from a TOML file; missing keys take their defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading settings from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses settings from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        info!(
            players = settings.player_count,
            card_size = settings.card_size,
            "Settings loaded"
        );
        Ok(settings)
    }

    /// Loads the file if it exists, otherwise returns the defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            info!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Checks the settings against the loaded vocabulary.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when there are no players, the card is empty,
    /// the vocabulary cannot fill a card, or the name list has the wrong length.
    #[instrument(skip(self))]
    pub fn validate(&self, vocabulary_len: usize) -> Result<(), ConfigError> {
        if self.player_count == 0 {
            return Err(ConfigError::new("At least one player is required"));
        }
        if self.card_size == 0 {
            return Err(ConfigError::new("Card size must be at least 1"));
        }
        let needed = self.card_size * self.card_size;
        if needed > vocabulary_len {
            warn!(needed, vocabulary_len, "Vocabulary too small");
            return Err(ConfigError::new(format!(
                "A {0}x{0} card needs {1} words but the vocabulary has {2}",
                self.card_size, needed, vocabulary_len
            )));
        }
        if !self.player_names.is_empty() && self.player_names.len() != self.player_count {
            return Err(ConfigError::new(format!(
                "{} player names given for {} players",
                self.player_names.len(),
                self.player_count
            )));
        }
        Ok(())
    }

    /// Returns the display name for a player.
    pub fn player_name(&self, id: PlayerId) -> String {
        self.player_names
            .get(id.index())
            .cloned()
            .unwrap_or_else(|| format!("Player {}", id.number()))
    }

    /// Converts the second-based settings into round timing.
    pub fn timing(&self) -> RoundTiming {
        RoundTiming::new(
            Duration::from_secs(self.countdown_secs),
            Duration::from_secs(self.countdown_warning_secs),
            Duration::from_secs(self.round_pause_secs),
            Duration::from_secs(1),
        )
    }

    /// Returns how long the final result stays on screen.
    pub fn announcement(&self) -> Duration {
        Duration::from_secs(self.announcement_secs)
    }

    /// Builds the launch configuration for every player.
    #[instrument(skip(self))]
    pub fn player_launches(&self) -> Vec<PlayerLaunch> {
        (0..self.player_count)
            .map(PlayerId::new)
            .map(|id| PlayerLaunch {
                player_id: id,
                player_count: self.player_count,
                card_size: self.card_size,
                player_name: self.player_name(id),
                server_host: self.host.clone(),
                server_port: self.port,
                words_file: self.words_file.clone(),
                log_dir: self.log_dir.clone(),
                seed: self.seed.map(|s| s.wrapping_add(id.index() as u64 + 1)),
            })
            .collect()
    }
}

/// Everything one player process needs to join a game.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_new::new)]
pub struct PlayerLaunch {
    player_id: PlayerId,
    player_count: usize,
    card_size: usize,
    player_name: String,
    server_host: String,
    server_port: u16,
    words_file: PathBuf,
    log_dir: PathBuf,
    seed: Option<u64>,
}

impl PlayerLaunch {
    /// Renders the `player` subcommand arguments for this launch.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "player".to_string(),
            "--id".to_string(),
            self.player_id.index().to_string(),
            "--count".to_string(),
            self.player_count.to_string(),
            "--size".to_string(),
            self.card_size.to_string(),
            "--name".to_string(),
            self.player_name.clone(),
            "--host".to_string(),
            self.server_host.clone(),
            "--port".to_string(),
            self.server_port.to_string(),
            "--words".to_string(),
            self.words_file.display().to_string(),
            "--log-dir".to_string(),
            self.log_dir.display().to_string(),
        ];
        if let Some(seed) = self.seed {
            args.push("--seed".to_string());
            args.push(seed.to_string());
        }
        args
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = GameSettings::from_toml(
            r#"
            player_count = 3
            card_size = 4
            claim_policy = "trust"
            "#,
        )
        .expect("valid toml");
        assert_eq!(*settings.player_count(), 3);
        assert_eq!(*settings.card_size(), 4);
        assert_eq!(*settings.claim_policy(), ClaimPolicy::Trust);
        assert_eq!(*settings.port(), 65432);
        assert_eq!(*settings.countdown_secs(), 30);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = GameSettings::from_toml("player_count = \"many\"").unwrap_err();
        assert!(err.message.contains("Failed to parse config"));
    }

    #[test]
    fn test_validate_rejects_small_vocabulary() {
        let settings = GameSettings::default().with_card_size(3);
        assert!(settings.validate(8).is_err());
        assert!(settings.validate(9).is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_players_and_size() {
        assert!(GameSettings::default().with_player_count(0).validate(100).is_err());
        assert!(GameSettings::default().with_card_size(0).validate(100).is_err());
    }

    #[test]
    fn test_validate_checks_name_count() {
        let settings = GameSettings::default()
            .with_player_count(2)
            .with_player_names(vec!["Ada".to_string()]);
        assert!(settings.validate(100).is_err());
    }

    #[test]
    fn test_player_names_fall_back_to_numbers() {
        let settings = GameSettings::default().with_player_names(vec!["Ada".into(), "Bo".into()]);
        assert_eq!(settings.player_name(PlayerId::new(1)), "Bo");
        assert_eq!(GameSettings::default().player_name(PlayerId::new(1)), "Player 2");
    }

    #[test]
    fn test_launch_args_round_trip_into_player_command() {
        let settings = GameSettings::default()
            .with_player_count(2)
            .with_card_size(3)
            .with_seed(10);
        let launches = settings.player_launches();
        assert_eq!(launches.len(), 2);

        let args = launches[1].to_args();
        assert_eq!(&args[..3], &["player", "--id", "1"]);
        assert!(args.windows(2).any(|w| w == ["--name", "Player 2"]));
        assert!(args.windows(2).any(|w| w == ["--seed", "12"]));
    }
}
