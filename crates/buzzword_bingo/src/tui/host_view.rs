//! Coordinator screen: round, drawn word, countdown, roster and result.

use crate::arbitration::PlayerId;
use crate::coordinator::{CoordinatorEvent, EndReason, GameOutcome};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use std::collections::VecDeque;
use std::time::Duration;

/// Lines kept in the activity panel.
const ACTIVITY_LINES: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
struct RosterEntry {
    player: PlayerId,
    name: String,
    connected: bool,
}

/// State of the host screen, folded from [`CoordinatorEvent`]s.
#[derive(Debug, Clone, Default)]
pub struct HostView {
    expected_players: usize,
    round: u32,
    word: Option<String>,
    remaining: Option<Duration>,
    final_seconds: bool,
    roster: Vec<RosterEntry>,
    activity: VecDeque<String>,
    outcome: Option<GameOutcome>,
}

impl HostView {
    /// Creates a view waiting for `expected_players`.
    pub fn new(expected_players: usize) -> Self {
        Self {
            expected_players,
            ..Self::default()
        }
    }

    /// Returns the outcome once the game has ended.
    pub fn outcome(&self) -> Option<&GameOutcome> {
        self.outcome.as_ref()
    }

    /// Applies one coordinator event.
    pub fn apply(&mut self, event: &CoordinatorEvent) {
        match event {
            CoordinatorEvent::PlayerJoined { player, name, .. } => {
                self.roster.push(RosterEntry {
                    player: *player,
                    name: name.clone(),
                    connected: true,
                });
                self.note(format!("{} joined", name));
            }
            CoordinatorEvent::RoundStarted { round, word } => {
                self.round = *round;
                self.word = Some(word.clone());
                self.remaining = None;
                self.final_seconds = false;
            }
            CoordinatorEvent::Tick { remaining } => self.remaining = Some(*remaining),
            CoordinatorEvent::FinalSeconds => self.final_seconds = true,
            CoordinatorEvent::ClaimRejected { player, words_seen } => {
                self.note(format!(
                    "Rejected early claim from {} after {} words",
                    player, words_seen
                ));
            }
            CoordinatorEvent::PlayerLeft { player, reason } => {
                if let Some(entry) = self.roster.iter_mut().find(|e| e.player == *player) {
                    entry.connected = false;
                }
                self.note(format!("{} left: {}", player, reason));
            }
            CoordinatorEvent::GameOver(outcome) => {
                self.remaining = None;
                self.outcome = Some(outcome.clone());
            }
        }
    }

    fn note(&mut self, line: String) {
        if self.activity.len() == ACTIVITY_LINES {
            self.activity.pop_front();
        }
        self.activity.push_back(line);
    }

    /// The headline above the roster.
    pub fn headline(&self) -> String {
        if let Some(outcome) = &self.outcome {
            return match (outcome.winner_name(), outcome.reason()) {
                (Some(name), _) => format!("{} has won!", name),
                (None, EndReason::DeckExhausted) => "No words left - nobody won".to_string(),
                (None, _) => "Everyone left - nobody won".to_string(),
            };
        }
        match &self.word {
            None => format!(
                "Waiting for players ({}/{})",
                self.roster.len(),
                self.expected_players
            ),
            Some(word) => match self.remaining {
                Some(left) => format!(
                    "Round {}: {}  ({}s left)",
                    self.round,
                    word,
                    left.as_secs_f32().ceil() as u64
                ),
                None => format!("Round {}: {}", self.round, word),
            },
        }
    }

    /// Renders the host screen.
    pub fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(3), // Headline
                Constraint::Min(4),    // Roster
                Constraint::Length(ACTIVITY_LINES as u16 + 2),
            ])
            .split(frame.area());

        let title = Paragraph::new("Buzzword Bingo - Game Master")
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center);
        frame.render_widget(title, chunks[0]);

        let headline_style = if self.outcome.is_some() {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else if self.final_seconds {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Yellow)
        };
        let headline = Paragraph::new(self.headline())
            .style(headline_style)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(headline, chunks[1]);

        let roster: Vec<ListItem> = self
            .roster
            .iter()
            .map(|entry| {
                let (marker, style) = if entry.connected {
                    ("●", Style::default().fg(Color::Green))
                } else {
                    ("○", Style::default().fg(Color::DarkGray))
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{} ", marker), style),
                    Span::raw(format!("{} ({})", entry.name, entry.player)),
                ]))
            })
            .collect();
        let roster =
            List::new(roster).block(Block::default().title("Players").borders(Borders::ALL));
        frame.render_widget(roster, chunks[2]);

        let activity: Vec<ListItem> = self
            .activity
            .iter()
            .map(|line| ListItem::new(line.as_str()))
            .collect();
        let activity =
            List::new(activity).block(Block::default().title("Activity").borders(Borders::ALL));
        frame.render_widget(activity, chunks[3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joined(index: usize, name: &str) -> CoordinatorEvent {
        CoordinatorEvent::PlayerJoined {
            player: PlayerId::new(index),
            name: name.to_string(),
            address: "127.0.0.1:5000".to_string(),
        }
    }

    #[test]
    fn test_headline_tracks_rounds() {
        let mut view = HostView::new(2);
        assert_eq!(view.headline(), "Waiting for players (0/2)");
        view.apply(&joined(0, "Ada"));
        view.apply(&joined(1, "Bo"));
        view.apply(&CoordinatorEvent::RoundStarted {
            round: 3,
            word: "synergy".into(),
        });
        view.apply(&CoordinatorEvent::Tick {
            remaining: Duration::from_millis(9_400),
        });
        assert_eq!(view.headline(), "Round 3: synergy  (10s left)");
    }

    #[test]
    fn test_departure_marks_roster() {
        let mut view = HostView::new(1);
        view.apply(&joined(0, "Ada"));
        view.apply(&CoordinatorEvent::PlayerLeft {
            player: PlayerId::new(0),
            reason: "Connection closed by player".into(),
        });
        assert!(!view.roster[0].connected);
        assert_eq!(view.activity.len(), 2);
    }

    #[test]
    fn test_activity_is_bounded() {
        let mut view = HostView::new(1);
        for round in 0..20 {
            view.apply(&CoordinatorEvent::ClaimRejected {
                player: PlayerId::new(0),
                words_seen: round,
            });
        }
        assert_eq!(view.activity.len(), ACTIVITY_LINES);
    }
}
