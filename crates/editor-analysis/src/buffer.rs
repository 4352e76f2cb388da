//! Line-oriented text buffer.
//!
//! [`Buffer`] models the host editor's document: an ordered list of rows (never empty). Every
//! mutation method performs exactly one change and returns the [`EditEvent`] describing it, in
//! the same vocabulary a browser editor reports on its change channel. [`Buffer::apply_event`]
//! replays such an event onto another buffer (e.g. a background copy).

use crate::delta::{EditError, TextEdit, byte_offset};
use crate::event::{EditEvent, EventError};
use crate::line_ending::normalize_newlines;
use crate::position::{
    Coordinate, PositionError, PositionTranslator, Range, char_len, coordinate_of, offset_of,
    sum_lengths, try_offset_of,
};

fn split_at_column(line: &str, column: usize) -> (&str, &str) {
    line.split_at(byte_offset(line, column))
}

/// An ordered sequence of rows; the document text is the rows joined by `'\n'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    lines: Vec<String>,
}

impl Buffer {
    /// Create a buffer holding a single empty row.
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
        }
    }

    /// Build a buffer from text (newlines are normalized to LF first).
    pub fn from_text(text: &str) -> Self {
        let text = normalize_newlines(text);
        Self {
            lines: text.split('\n').map(str::to_string).collect(),
        }
    }

    /// Build a buffer from rows. An empty iterator yields a single empty row.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self { lines }
    }

    /// All rows.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Text of `row`.
    pub fn line(&self, row: usize) -> Option<&str> {
        self.lines.get(row).map(String::as_str)
    }

    /// Number of rows (at least 1).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Length of `row` in characters (0 for rows past the end).
    pub fn line_len(&self, row: usize) -> usize {
        self.line(row).map(char_len).unwrap_or(0)
    }

    /// Document text (rows joined by `'\n'`).
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Document length in characters.
    pub fn len_chars(&self) -> usize {
        sum_lengths(&self.lines) - 1
    }

    /// Replace the whole content. No event is produced.
    pub fn set_value(&mut self, text: &str) {
        *self = Self::from_text(text);
    }

    /// Position after the last character.
    pub fn end(&self) -> Coordinate {
        let last = self.lines.len() - 1;
        Coordinate::new(last, self.line_len(last))
    }

    /// Clamp `coordinate` to a position that exists in the buffer.
    pub fn clamp(&self, coordinate: Coordinate) -> Coordinate {
        if coordinate.row >= self.lines.len() {
            return self.end();
        }
        Coordinate::new(
            coordinate.row,
            coordinate.column.min(self.line_len(coordinate.row)),
        )
    }

    fn ordered(&self, range: Range) -> (Coordinate, Coordinate) {
        let a = self.clamp(range.start);
        let b = self.clamp(range.end);
        if a <= b { (a, b) } else { (b, a) }
    }

    /// Text covered by `range` (clamped).
    pub fn text_range(&self, range: Range) -> String {
        let (start, end) = self.ordered(range);
        let first = &self.lines[start.row];
        if start.row == end.row {
            let (_, tail) = split_at_column(first, start.column);
            let (mid, _) = split_at_column(tail, end.column - start.column);
            return mid.to_string();
        }

        let mut out = String::new();
        out.push_str(split_at_column(first, start.column).1);
        for line in &self.lines[start.row + 1..end.row] {
            out.push('\n');
            out.push_str(line);
        }
        out.push('\n');
        out.push_str(split_at_column(&self.lines[end.row], end.column).0);
        out
    }

    /// Insert `text` (may contain newlines) at `at`.
    pub fn insert_text(&mut self, at: Coordinate, text: &str) -> EditEvent {
        let at = self.clamp(at);
        let (head, tail) = {
            let (h, t) = split_at_column(&self.lines[at.row], at.column);
            (h.to_string(), t.to_string())
        };

        let segments: Vec<&str> = text.split('\n').collect();
        let end = match segments.as_slice() {
            [single] => {
                self.lines[at.row] = format!("{head}{single}{tail}");
                Coordinate::new(at.row, at.column + char_len(single))
            }
            [first, middle @ .., last] => {
                let mut rows = Vec::with_capacity(segments.len());
                rows.push(format!("{head}{first}"));
                rows.extend(middle.iter().map(|s| s.to_string()));
                rows.push(format!("{last}{tail}"));
                self.lines.splice(at.row..=at.row, rows);
                Coordinate::new(at.row + segments.len() - 1, char_len(last))
            }
            [] => at,
        };

        EditEvent::InsertText {
            range: Range::new(at, end),
            text: text.to_string(),
        }
    }

    /// Convenience alias for [`Buffer::insert_text`].
    pub fn insert(&mut self, at: Coordinate, text: &str) -> EditEvent {
        self.insert_text(at, text)
    }

    /// Insert whole rows before `row`.
    ///
    /// Inserting at or past the row count appends after the last row; that change is reported as
    /// an insert-text event (`"\n" + rows`) since there is no row to insert before. Appending no
    /// rows reports an empty insertion at the end.
    pub fn insert_lines(&mut self, row: usize, lines: Vec<String>) -> EditEvent {
        let lines: Vec<String> = if lines.iter().any(|l| l.contains('\n')) {
            lines
                .join("\n")
                .split('\n')
                .map(str::to_string)
                .collect()
        } else {
            lines
        };

        if row >= self.lines.len() {
            let end = self.end();
            if lines.is_empty() {
                return EditEvent::InsertText {
                    range: Range::point(end),
                    text: String::new(),
                };
            }
            return self.insert_text(end, &format!("\n{}", lines.join("\n")));
        }

        let count = lines.len();
        self.lines.splice(row..row, lines.iter().cloned());
        EditEvent::InsertLines {
            range: Range::from_rows(row, 0, row + count, 0),
            lines,
        }
    }

    /// Remove the text covered by `range` (clamped, either orientation).
    pub fn remove_text(&mut self, range: Range) -> EditEvent {
        let (start, end) = self.ordered(range);
        let removed = self.text_range(Range::new(start, end));

        let head = split_at_column(&self.lines[start.row], start.column)
            .0
            .to_string();
        let tail = split_at_column(&self.lines[end.row], end.column).1;
        let joined = format!("{head}{tail}");
        self.lines.splice(start.row..=end.row, std::iter::once(joined));

        EditEvent::RemoveText {
            range: Range::new(start, end),
            text: removed,
        }
    }

    /// Remove rows `first..=last`.
    ///
    /// Removing the trailing rows cannot be expressed as whole-row removal (the last row has no
    /// terminator), so it is reported as an equivalent remove-text event.
    pub fn remove_lines(&mut self, first: usize, last: usize) -> EditEvent {
        let last = last.min(self.lines.len() - 1);
        let first = first.min(last);

        if last + 1 < self.lines.len() {
            let removed: Vec<String> = self.lines.drain(first..=last).collect();
            return EditEvent::RemoveLines {
                range: Range::from_rows(first, 0, last + 1, 0),
                lines: removed,
            };
        }

        let end = Coordinate::new(last, self.line_len(last));
        if first > 0 {
            let start = Coordinate::new(first - 1, self.line_len(first - 1));
            self.remove_text(Range::new(start, end))
        } else {
            self.remove_text(Range::new(Coordinate::new(0, 0), end))
        }
    }

    /// Replay an event produced by another buffer with the same content.
    ///
    /// The event is checked against this buffer first (positions in range, removed payloads equal
    /// to the current content); on error the buffer is unchanged.
    pub fn apply_event(&mut self, event: &EditEvent) -> Result<(), EventError> {
        match event {
            EditEvent::InsertText { range, text } => {
                try_offset_of(&self.lines, range.start)?;
                if range.start.row >= self.lines.len() {
                    return Err(row_error(range.start.row, self.lines.len()));
                }
                self.insert_text(range.start, text);
            }
            EditEvent::InsertLines { range, lines } => {
                if range.start.row >= self.lines.len() {
                    return Err(row_error(range.start.row, self.lines.len()));
                }
                self.insert_lines(range.start.row, lines.clone());
            }
            EditEvent::RemoveText { range, text } => {
                try_offset_of(&self.lines, range.start)?;
                try_offset_of(&self.lines, range.end)?;
                if range.end.row >= self.lines.len() {
                    return Err(row_error(range.end.row, self.lines.len()));
                }
                if self.text_range(*range) != *text {
                    return Err(EventError::PayloadMismatch);
                }
                self.remove_text(*range);
            }
            EditEvent::RemoveLines { range, lines } => {
                let first = range.start.row;
                let stop = first + lines.len();
                if stop >= self.lines.len() {
                    return Err(row_error(stop, self.lines.len()));
                }
                if self.lines[first..stop] != lines[..] {
                    return Err(EventError::PayloadMismatch);
                }
                self.lines.drain(first..stop);
            }
        }
        Ok(())
    }
}

fn row_error(row: usize, line_count: usize) -> EventError {
    EventError::OutOfRange(PositionError::RowOutOfRange { row, line_count })
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionTranslator for Buffer {
    fn to_offset(&self, coordinate: Coordinate) -> usize {
        offset_of(&self.lines, coordinate)
    }

    fn to_coordinate(&self, offset: usize) -> Coordinate {
        coordinate_of(&self.lines, offset)
    }

    fn apply_edit(&mut self, edit: &TextEdit) -> Result<(), EditError> {
        edit.validate(self.len_chars())?;
        let start = coordinate_of(&self.lines, edit.min_char);
        let end = coordinate_of(&self.lines, edit.lim_char);
        if end > start {
            self.remove_text(Range::new(start, end));
        }
        if !edit.new_text.is_empty() {
            self.insert_text(start, &edit.new_text);
        }
        Ok(())
    }
}
