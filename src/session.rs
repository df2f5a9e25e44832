use crate::buffer::{CellState, CharacterBuffer, WINDOW_LINES};
use crate::finger::FingerMap;
use crate::stats::{StatCollector, Summary};
use crate::words::load_words;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

pub const CHARS_PER_WORD: f64 = 5.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    /// Nothing typed yet
    Idle,
    /// Timing is running
    Active,
    /// Every cell of the word source has been typed
    Exhausted,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionCounters {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub started_at: Option<Instant>,
    pub started_wall: Option<DateTime<Local>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub chars_per_minute: f64,
    pub words_per_minute: f64,
    pub error_rate: f64,
    pub accuracy: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub started_at: Option<DateTime<Local>>,
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub metrics: DerivedMetrics,
    pub summary: Summary,
}

/// Drives a typing session: feeds keypresses to the window and the
/// statistics, and keeps the session counters.
#[derive(Debug, Clone)]
pub struct SessionController<'a> {
    buffer: CharacterBuffer,
    collector: StatCollector<'a>,
    counters: SessionCounters,
    current_index: usize,
}

impl<'a> SessionController<'a> {
    pub fn new(words: Vec<String>, max_line_width: usize, fingers: &'a FingerMap) -> Self {
        Self {
            buffer: CharacterBuffer::new(words, max_line_width),
            collector: StatCollector::new(fingers),
            counters: SessionCounters::default(),
            current_index: 0,
        }
    }

    /// Load the word source and build a session. Nothing is created if the
    /// source cannot be read.
    pub fn from_path(
        path: &Path,
        max_line_width: usize,
        fingers: &'a FingerMap,
    ) -> anyhow::Result<Self> {
        let words = load_words(path)?;
        Ok(Self::new(words, max_line_width, fingers))
    }

    pub fn phase(&self) -> Phase {
        if self.buffer.is_exhausted(self.current_index) {
            Phase::Exhausted
        } else if self.counters.started_at.is_none() {
            Phase::Idle
        } else {
            Phase::Active
        }
    }

    pub fn on_key_press(&mut self, c: char) -> Option<Outcome> {
        self.on_key_press_at(c, Instant::now())
    }

    /// Handle one keypress made at `now`. Returns `None` without touching any
    /// state once the word source is exhausted.
    pub fn on_key_press_at(&mut self, c: char, now: Instant) -> Option<Outcome> {
        let Some(expected) = self.buffer.peek_expected(self.current_index) else {
            tracing::debug!(?c, "keypress after end of word source refused");
            return None;
        };

        if self.counters.started_at.is_none() {
            self.counters.started_at = Some(now);
            self.counters.started_wall = Some(Local::now());
            tracing::info!("session started");
        }

        self.collector.record_at(c, expected, now);

        let outcome = if c == expected {
            self.buffer
                .set_cell_state(self.current_index, CellState::Correct, expected);
            self.counters.correct += 1;
            Outcome::Correct
        } else {
            self.buffer
                .set_cell_state(self.current_index, CellState::Incorrect, c);
            self.counters.incorrect += 1;
            Outcome::Incorrect
        };
        self.counters.total += 1;
        self.current_index += 1;

        self.scroll_if_needed();
        if self.phase() == Phase::Exhausted {
            tracing::info!(
                total = self.counters.total,
                correct = self.counters.correct,
                "word source exhausted"
            );
        }

        Some(outcome)
    }

    /// Keep the cursor out of the bottom line
    fn scroll_if_needed(&mut self) {
        if self.buffer.is_exhausted(self.current_index) {
            return;
        }
        let (line, _) = self.buffer.index_to_line_offset(self.current_index);
        if line == WINDOW_LINES - 1 {
            let dropped = self.buffer.line(0).len();
            self.buffer.shift_window();
            self.current_index -= dropped;
        }
    }

    pub fn derived_metrics(&self) -> DerivedMetrics {
        self.derived_metrics_at(Instant::now())
    }

    pub fn derived_metrics_at(&self, now: Instant) -> DerivedMetrics {
        let SessionCounters {
            total,
            correct,
            incorrect,
            started_at,
            ..
        } = self.counters;

        let elapsed_minutes = started_at
            .map(|start| now.saturating_duration_since(start).as_secs_f64() / 60.0)
            .unwrap_or(0.0);
        let chars_per_minute = if elapsed_minutes > 0.0 {
            correct as f64 / elapsed_minutes
        } else {
            0.0
        };

        let (error_rate, accuracy) = if total > 0 {
            (
                incorrect as f64 / total as f64,
                correct as f64 / total as f64,
            )
        } else {
            (0.0, 0.0)
        };

        DerivedMetrics {
            chars_per_minute,
            words_per_minute: chars_per_minute / CHARS_PER_WORD,
            error_rate,
            accuracy,
        }
    }

    pub fn report(&self) -> Report {
        self.report_at(Instant::now())
    }

    pub fn report_at(&self, now: Instant) -> Report {
        Report {
            started_at: self.counters.started_wall,
            total: self.counters.total,
            correct: self.counters.correct,
            incorrect: self.counters.incorrect,
            metrics: self.derived_metrics_at(now),
            summary: self.collector.summarize(),
        }
    }

    pub fn buffer(&self) -> &CharacterBuffer {
        &self.buffer
    }

    pub fn collector(&self) -> &StatCollector<'a> {
        &self.collector
    }

    pub fn counters(&self) -> &SessionCounters {
        &self.counters
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// `(line, offset)` of the next cell to type, if any
    pub fn cursor(&self) -> Option<(usize, usize)> {
        if self.buffer.is_exhausted(self.current_index) {
            None
        } else {
            Some(self.buffer.index_to_line_offset(self.current_index))
        }
    }
}
