pub mod stats_table;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::buffer::{CellState, WINDOW_LINES};
use crate::session::{Phase, Report, SessionController};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

/// Read-only view handed to the terminal: the session for the window and
/// the latest report for the numbers.
pub struct SessionView<'s, 'a> {
    pub session: &'s SessionController<'a>,
    pub report: &'s Report,
}

fn cell_style(state: CellState) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match state {
        CellState::Unknown => bold.add_modifier(Modifier::DIM),
        CellState::Correct => bold.fg(Color::Green),
        CellState::Incorrect => bold.fg(Color::Red),
    }
}

pub fn metrics_text(report: &Report, phase: Phase) -> String {
    let metrics = &report.metrics;
    let mut text = format!(
        "{:.1} wpm  {:.0} cpm  {} errors ({:.2}%)",
        metrics.words_per_minute,
        metrics.chars_per_minute,
        report.incorrect,
        metrics.error_rate * 100.0
    );
    if let Some(started) = report.started_at {
        text.push_str(&format!("  started {}", started.format("%H:%M:%S")));
    }
    match phase {
        Phase::Idle => text.push_str("  (start typing)"),
        Phase::Active => {}
        Phase::Exhausted => text.push_str("  (done, esc to quit)"),
    }
    text
}

impl SessionView<'_, '_> {
    fn window_lines(&self) -> Vec<Line<'static>> {
        let cursor = self.session.cursor();
        let snapshot = self.session.buffer().snapshot();

        (0..WINDOW_LINES)
            .map(|line| {
                let spans: Vec<Span> = snapshot[line]
                    .iter()
                    .enumerate()
                    .map(|(offset, &(glyph, state))| {
                        let mut style = cell_style(state);
                        if cursor == Some((line, offset)) {
                            style = style.add_modifier(Modifier::UNDERLINED);
                        }
                        Span::styled(glyph.to_string(), style)
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

impl Widget for &SessionView<'_, '_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(WINDOW_LINES as u16 + 2),
                Constraint::Length(2),
                Constraint::Min(0),
            ])
            .split(area);

        Paragraph::new(self.window_lines())
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("K-Stats"))
            .render(chunks[0], buf);

        Paragraph::new(metrics_text(self.report, self.session.phase()))
            .style(Style::default().add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        stats_table::table(&self.report.summary).render(chunks[2], buf);
    }
}
