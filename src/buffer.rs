use serde::Serialize;

/// Number of lines visible at once
pub const WINDOW_LINES: usize = 3;

/// Shown instead of a space typed where it did not belong
pub const INCORRECT_SPACE_PLACEHOLDER: char = '_';

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum CellState {
    #[default]
    Unknown,
    Correct,
    Incorrect,
}

/// A single glyph slot in the window
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    expected: char,
    shown: char,
    state: CellState,
}

impl Cell {
    fn new(expected: char) -> Self {
        Self {
            expected,
            shown: expected,
            state: CellState::Unknown,
        }
    }

    pub fn expected(&self) -> char {
        self.expected
    }

    pub fn shown(&self) -> char {
        self.shown
    }

    pub fn state(&self) -> CellState {
        self.state
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Line {
    cells: Vec<Cell>,
}

impl Line {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// The expected text of the line
    pub fn text(&self) -> String {
        self.cells.iter().map(Cell::expected).collect()
    }
}

/// Three-line sliding window over the word stream.
///
/// Cells are addressed by a window-relative index: `0` is the first cell of
/// the top line and the index runs through all three lines. Whenever the top
/// line is dropped by [`CharacterBuffer::shift_window`], any index held by a
/// caller has to be reduced by the dropped line's length to keep pointing at
/// the same cell.
#[derive(Debug, Clone)]
pub struct CharacterBuffer {
    lines: [Line; WINDOW_LINES],
    words: Vec<String>,
    next_word: usize,
    max_line_width: usize,
}

impl CharacterBuffer {
    pub fn new(words: Vec<String>, max_line_width: usize) -> Self {
        let mut buffer = Self {
            lines: Default::default(),
            words,
            next_word: 0,
            max_line_width,
        };

        // each shift pushes one freshly packed line in at the bottom
        for _ in 0..WINDOW_LINES {
            buffer.shift_window();
        }

        buffer
    }

    /// Greedily pack words into one line of at most `max_width` cells.
    ///
    /// A word is admitted when `current + word + 1 <= max_width`; the slot for
    /// the separator is always reserved. Every admitted word is followed by a
    /// space cell except the final word of `words`, which ends the corpus. A
    /// word too long for an empty line is admitted on its own so packing never
    /// stalls.
    ///
    /// Returns the number of words consumed and the produced cells.
    pub fn pack_line(words: &[String], max_width: usize) -> (usize, Vec<Cell>) {
        let mut cells = Vec::new();
        let mut consumed = 0;

        for (idx, word) in words.iter().enumerate() {
            let width = word.chars().count();
            if cells.len() + width + 1 > max_width && consumed > 0 {
                break;
            }

            cells.extend(word.chars().map(Cell::new));
            if idx + 1 < words.len() {
                cells.push(Cell::new(' '));
            }
            consumed += 1;
        }

        (consumed, cells)
    }

    /// Drop the top line, move the others up and pack a new bottom line.
    /// Returns the number of words consumed from the queue.
    pub fn shift_window(&mut self) -> usize {
        let (consumed, cells) =
            Self::pack_line(&self.words[self.next_word..], self.max_line_width);
        self.next_word += consumed;

        self.lines.rotate_left(1);
        self.lines[WINDOW_LINES - 1] = Line { cells };

        tracing::debug!(
            consumed,
            remaining = self.remaining_words(),
            "window shifted"
        );
        consumed
    }

    /// Map a window index to `(line, offset)`.
    ///
    /// Indices at or past [`CharacterBuffer::window_len`] fall back to
    /// `(0, index)`, which does not address a real cell. Check
    /// [`CharacterBuffer::is_exhausted`] before relying on the result.
    pub fn index_to_line_offset(&self, index: usize) -> (usize, usize) {
        let first = self.lines[0].len();
        let second = self.lines[1].len();
        let third = self.lines[2].len();

        if index >= first && index < first + second {
            (1, index - first)
        } else if index >= first + second && index < first + second + third {
            (2, index - first - second)
        } else {
            (0, index)
        }
    }

    pub fn window_len(&self) -> usize {
        self.lines.iter().map(Line::len).sum()
    }

    pub fn is_exhausted(&self, index: usize) -> bool {
        index >= self.window_len()
    }

    fn cell_mut(&mut self, index: usize) -> Option<&mut Cell> {
        if self.is_exhausted(index) {
            return None;
        }
        let (line, offset) = self.index_to_line_offset(index);
        self.lines[line].cells.get_mut(offset)
    }

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        if self.is_exhausted(index) {
            return None;
        }
        let (line, offset) = self.index_to_line_offset(index);
        self.lines[line].cells.get(offset)
    }

    pub fn peek_expected(&self, index: usize) -> Option<char> {
        self.cell(index).map(Cell::expected)
    }

    /// Mark a cell and set the glyph it displays. Indices outside the window
    /// are ignored.
    pub fn set_cell_state(&mut self, index: usize, state: CellState, display: char) {
        if let Some(cell) = self.cell_mut(index) {
            cell.state = state;
            cell.shown = if state == CellState::Incorrect && display == ' ' {
                INCORRECT_SPACE_PLACEHOLDER
            } else {
                display
            };
        }
    }

    pub fn line(&self, line: usize) -> &Line {
        &self.lines[line]
    }

    pub fn remaining_words(&self) -> usize {
        self.words.len() - self.next_word
    }

    pub fn max_line_width(&self) -> usize {
        self.max_line_width
    }

    /// Copy of the window as `(glyph, state)` pairs per line
    pub fn snapshot(&self) -> [Vec<(char, CellState)>; WINDOW_LINES] {
        std::array::from_fn(|line| {
            self.lines[line]
                .cells
                .iter()
                .map(|cell| (cell.shown, cell.state))
                .collect()
        })
    }
}
