use ratatui::{
    layout::Constraint,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table},
};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

use crate::stats::{Category, CategoryStat, Summary, Transition};

pub const HEADER: [&str; 6] = ["Type", "Min", "Max", "Median", "Mean", "Count"];

const VALUE_COLUMN_WIDTH: u16 = 16;
const COUNT_COLUMN_WIDTH: u16 = 7;

/// Spaces are printed as `_` so exemplars stay readable
pub fn printable(c: char) -> char {
    if c == ' ' {
        '_'
    } else {
        c
    }
}

pub fn format_millis(d: Duration) -> String {
    format!("{} ms", d.as_millis())
}

/// `12 ms (a -> b)` when an exemplar exists, otherwise `12 ms`
pub fn format_extreme(d: Duration, exemplar: Option<&Transition>) -> String {
    match exemplar {
        Some(t) => format!(
            "{} ({} -> {})",
            format_millis(d),
            printable(t.from),
            printable(t.actual)
        ),
        None => format_millis(d),
    }
}

/// Pure presenter for one category row
pub fn row_cells(row: &CategoryStat) -> [String; 6] {
    let stat = &row.stat;
    [
        row.category.label(),
        format_extreme(stat.min, stat.min_transition.as_ref()),
        format_extreme(stat.max, stat.max_transition.as_ref()),
        format_millis(stat.median),
        format_millis(stat.mean),
        stat.count.to_string(),
    ]
}

fn label_width() -> u16 {
    Category::all()
        .iter()
        .map(|c| c.label().width())
        .max()
        .unwrap_or(0) as u16
}

pub fn table(summary: &Summary) -> Table<'static> {
    let header = Row::new(HEADER.iter().map(|h| Cell::from(*h))).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = summary
        .rows()
        .iter()
        .map(|row| {
            let style = if row.stat.count == 0 {
                Style::default().add_modifier(Modifier::DIM)
            } else {
                Style::default()
            };
            Row::new(row_cells(row).map(Cell::from)).style(style)
        })
        .collect();

    Table::new(
        rows,
        [
            Constraint::Length(label_width() + 1),
            Constraint::Length(VALUE_COLUMN_WIDTH),
            Constraint::Length(VALUE_COLUMN_WIDTH),
            Constraint::Length(VALUE_COLUMN_WIDTH / 2),
            Constraint::Length(VALUE_COLUMN_WIDTH / 2),
            Constraint::Length(COUNT_COLUMN_WIDTH),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title("Transitions"))
}
