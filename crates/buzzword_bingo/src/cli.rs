//! Command-line interface for buzzword_bingo.

use crate::arbitration::PlayerId;
use crate::config::{ClaimPolicy, GameSettings, PlayerLaunch};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Buzzword Bingo - networked word bingo for the terminal
#[derive(Parser, Debug)]
#[command(name = "buzzword_bingo")]
#[command(
    about = "Networked word bingo: one game master, many terminal players",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Settings file; missing keys and a missing file fall back to defaults
    #[arg(long, global = true, default_value = "bingo.toml")]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the game master, open one terminal per player and show the host screen
    Host(GameArgs),

    /// Run the game master without a screen or player launch
    Serve(GameArgs),

    /// Join a game as one player (normally started by `host`)
    Player(PlayerArgs),
}

/// Overrides for the settings file.
#[derive(Args, Debug, Default)]
pub struct GameArgs {
    /// Number of players to wait for
    #[arg(short = 'n', long)]
    pub players: Option<usize>,

    /// Card edge length
    #[arg(short, long)]
    pub size: Option<usize>,

    /// Vocabulary file, one word per line
    #[arg(short, long)]
    pub words: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Seconds each word stays live
    #[arg(long)]
    pub countdown: Option<u64>,

    /// Directory for game journals
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Win claim handling
    #[arg(long, value_enum)]
    pub claim_policy: Option<ClaimPolicy>,

    /// Seed for a reproducible game
    #[arg(long)]
    pub seed: Option<u64>,

    /// Player names, in joining order
    #[arg(long = "name", value_name = "NAME")]
    pub names: Vec<String>,
}

impl GameArgs {
    /// Applies the given overrides on top of `settings`.
    pub fn apply(self, mut settings: GameSettings) -> GameSettings {
        if let Some(players) = self.players {
            settings = settings.with_player_count(players);
        }
        if let Some(size) = self.size {
            settings = settings.with_card_size(size);
        }
        if let Some(words) = self.words {
            settings = settings.with_words_file(words);
        }
        if let Some(host) = self.host {
            settings = settings.with_host(host);
        }
        if let Some(port) = self.port {
            settings = settings.with_port(port);
        }
        if let Some(countdown) = self.countdown {
            settings = settings.with_countdown_secs(countdown);
        }
        if let Some(dir) = self.log_dir {
            settings = settings.with_log_dir(dir);
        }
        if let Some(policy) = self.claim_policy {
            settings = settings.with_claim_policy(policy);
        }
        if let Some(seed) = self.seed {
            settings = settings.with_seed(seed);
        }
        if !self.names.is_empty() {
            settings = settings.with_player_names(self.names);
        }
        settings
    }
}

/// Arguments a launched player receives.
#[derive(Args, Debug)]
pub struct PlayerArgs {
    /// Zero-based player id
    #[arg(long)]
    pub id: usize,

    /// Total number of players
    #[arg(long)]
    pub count: usize,

    /// Card edge length
    #[arg(long)]
    pub size: usize,

    /// Display name
    #[arg(long)]
    pub name: String,

    /// Game master address
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Game master port
    #[arg(long)]
    pub port: u16,

    /// Vocabulary file; defaults to the settings file value
    #[arg(long)]
    pub words: Option<PathBuf>,

    /// Journal directory; defaults to the settings file value
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Seed for a reproducible card
    #[arg(long)]
    pub seed: Option<u64>,
}

impl PlayerArgs {
    /// Resolves the launch configuration, filling gaps from `settings`.
    pub fn into_launch(self, settings: &GameSettings) -> PlayerLaunch {
        PlayerLaunch::new(
            PlayerId::new(self.id),
            self.count,
            self.size,
            self.name,
            self.host,
            self.port,
            self.words.unwrap_or_else(|| settings.words_file().clone()),
            self.log_dir.unwrap_or_else(|| settings.log_dir().clone()),
            self.seed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_overrides_settings() {
        let cli = Cli::parse_from([
            "buzzword_bingo",
            "host",
            "-n",
            "3",
            "--size",
            "4",
            "--claim-policy",
            "trust",
            "--name",
            "Ada",
            "--name",
            "Bo",
            "--name",
            "Cy",
        ]);
        let Command::Host(args) = cli.command else {
            panic!("expected host");
        };
        let settings = args.apply(GameSettings::default());
        assert_eq!(*settings.player_count(), 3);
        assert_eq!(*settings.card_size(), 4);
        assert_eq!(*settings.claim_policy(), ClaimPolicy::Trust);
        assert_eq!(settings.player_names().len(), 3);
        assert_eq!(*settings.port(), 65432);
    }

    #[test]
    fn test_launch_args_parse_as_player_command() {
        let settings = GameSettings::default().with_seed(5);
        let launch = settings.player_launches().remove(0);

        let mut argv = vec!["buzzword_bingo".to_string()];
        argv.extend(launch.to_args());
        let cli = Cli::parse_from(argv);
        let Command::Player(args) = cli.command else {
            panic!("expected player");
        };
        assert_eq!(args.into_launch(&settings), launch);
    }

    #[test]
    fn test_clap_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
