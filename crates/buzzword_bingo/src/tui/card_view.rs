//! Player screen: the card grid with cursor highlight and a status line.

use crate::agent::{AgentPhase, PlayerAgent};
use crate::client::Renderer;
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use std::io;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display columns available for a word inside a cell.
pub const CELL_WORD_WIDTH: usize = 19;

/// Cell height including borders.
const CELL_HEIGHT: u16 = 3;

/// Cell width including borders.
const CELL_WIDTH: u16 = CELL_WORD_WIDTH as u16 + 2;

/// Draws a [`PlayerAgent`] onto a terminal.
pub struct CardView<B: Backend> {
    terminal: Terminal<B>,
}

impl<B: Backend> CardView<B> {
    /// Wraps a terminal.
    pub fn new(terminal: Terminal<B>) -> Self {
        Self { terminal }
    }

    /// Returns the terminal, e.g. to restore it.
    pub fn terminal_mut(&mut self) -> &mut Terminal<B> {
        &mut self.terminal
    }
}

impl<B: Backend> Renderer for CardView<B> {
    fn render(&mut self, agent: &PlayerAgent, notice: Option<&str>) -> io::Result<()> {
        self.terminal
            .draw(|frame| draw(frame, agent, notice))
            .map_err(|e| io::Error::other(e.to_string()))?;
        Ok(())
    }
}

/// Renders the card with cursor highlight.
pub fn draw(frame: &mut Frame, agent: &PlayerAgent, notice: Option<&str>) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(CELL_HEIGHT),
            Constraint::Length(4), // Status
        ])
        .split(area);

    let title = Paragraph::new(format!("Buzzword Bingo - {}", agent.name()))
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    draw_grid(frame, chunks[1], agent);

    let mut lines = vec![Line::from(status_text(agent))];
    if let Some(notice) = notice {
        lines.push(Line::from(Span::styled(
            notice.to_string(),
            Style::default().fg(Color::Red),
        )));
    }
    let status = Paragraph::new(lines)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, chunks[2]);
}

fn draw_grid(frame: &mut Frame, area: Rect, agent: &PlayerAgent) {
    let card = agent.card();
    let size = card.size() as u16;
    let grid = center_rect(area, CELL_WIDTH * size, CELL_HEIGHT * size);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CELL_HEIGHT); card.size()])
        .split(grid);

    for (r, row_area) in rows.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Length(CELL_WIDTH); card.size()])
            .split(*row_area);
        for (c, cell_area) in cols.iter().enumerate() {
            draw_cell(frame, *cell_area, agent, r, c);
        }
    }
}

fn draw_cell(frame: &mut Frame, area: Rect, agent: &PlayerAgent, row: usize, col: usize) {
    let Some(cell) = agent.card().cell(row, col) else {
        return;
    };

    let (text, base_style) = if cell.is_marked() {
        (
            "X".to_string(),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )
    } else {
        (truncate(cell.word(), CELL_WORD_WIDTH), Style::default())
    };

    let selected = agent.cursor().row() == row && agent.cursor().col() == col;
    let style = if selected && !agent.phase().is_terminal() {
        base_style.bg(Color::White).fg(Color::Black)
    } else {
        base_style
    };

    let paragraph = Paragraph::new(Line::from(Span::styled(text, style)))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

/// The status line for the agent's phase.
pub fn status_text(agent: &PlayerAgent) -> String {
    match agent.phase() {
        AgentPhase::AwaitingWord => "Waiting for the first word...".to_string(),
        AgentPhase::Playing => match agent.pending_word() {
            Some(word) => format!("Do you have the word {} on your card?", word),
            None => String::new(),
        },
        AgentPhase::Won => format!("{} has won!", agent.name()),
        AgentPhase::Ended => "Game over".to_string(),
    }
}

/// Shortens `word` to at most `width` display columns, ending in `…`.
pub fn truncate(word: &str, width: usize) -> String {
    if word.width() <= width {
        return word.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in word.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(area.width.saturating_sub(width) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vert[1])[1]
}
