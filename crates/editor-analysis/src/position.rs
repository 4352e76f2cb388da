//! Coordinate / offset translation.
//!
//! The visual buffer is addressed by zero-based `(row, column)` [`Coordinate`]s while analysis
//! engines address flat source text by character offset. This module converts between the two by
//! linearly scanning the current line content: there is no cached offset table, so a translation
//! can never disagree with the lines it was computed from.
//!
//! Every line is counted as its length plus one newline terminator, so the offset of
//! `(row, column)` is `Σ(len(line) + 1)` over the rows before `row`, plus `column`.
//!
//! Out-of-range input is clamped (see [`offset_of`] / [`coordinate_of`]); the `try_*` variants
//! report a [`PositionError`] instead.

use crate::delta::{EditError, TextEdit};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A zero-based `(row, column)` position in a line-oriented buffer.
///
/// `column` is counted in Unicode scalar values (`char`s). A column equal to the line length
/// denotes the end of the line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Coordinate {
    /// Zero-based row (line index).
    pub row: usize,
    /// Zero-based column (character index within the row).
    pub column: usize,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// A half-open coordinate range (`start..end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Range {
    /// Range start (inclusive).
    pub start: Coordinate,
    /// Range end (exclusive).
    pub end: Coordinate,
}

impl Range {
    /// Create a new range.
    pub fn new(start: Coordinate, end: Coordinate) -> Self {
        Self { start, end }
    }

    /// Create a range from raw row/column values.
    pub fn from_rows(start_row: usize, start_column: usize, end_row: usize, end_column: usize) -> Self {
        Self::new(
            Coordinate::new(start_row, start_column),
            Coordinate::new(end_row, end_column),
        )
    }

    /// Zero-width range at `at`.
    pub fn point(at: Coordinate) -> Self {
        Self::new(at, at)
    }

    /// Returns `true` if start and end are on the same row.
    pub fn is_single_row(&self) -> bool {
        self.start.row == self.end.row
    }

    /// Returns `true` if the range is zero-width.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Errors reported by the strict (`try_*`) translation functions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    /// The row lies past the one-past-the-end row.
    #[error("row {row} out of range (line count {line_count})")]
    RowOutOfRange {
        /// Requested row.
        row: usize,
        /// Number of lines in the buffer.
        line_count: usize,
    },
    /// The column lies past the end of its row.
    #[error("column {column} out of range for row {row} (line length {line_len})")]
    ColumnOutOfRange {
        /// Requested row.
        row: usize,
        /// Requested column.
        column: usize,
        /// Length of the row in characters.
        line_len: usize,
    },
    /// The offset lies past the one-past-the-end offset.
    #[error("offset {offset} out of range (limit {limit})")]
    OffsetOutOfRange {
        /// Requested offset.
        offset: usize,
        /// Largest accepted offset (`sum_lengths` of the buffer).
        limit: usize,
    },
}

/// Conversion between coordinates and offsets for one buffer representation, plus the ability
/// to apply an offset-addressed [`TextEdit`] to that representation.
///
/// Implementations must agree with each other: for the same logical text, every
/// implementation returns the same offset for a coordinate and vice versa.
pub trait PositionTranslator {
    /// Offset of `coordinate`, clamped into the document.
    fn to_offset(&self, coordinate: Coordinate) -> usize;

    /// Coordinate of `offset`, clamped into the document.
    fn to_coordinate(&self, offset: usize) -> Coordinate;

    /// Replace `[edit.min_char, edit.lim_char)` with `edit.new_text`.
    ///
    /// Implementations validate before mutating: on error the text is unchanged.
    fn apply_edit(&mut self, edit: &TextEdit) -> Result<(), EditError>;

    /// Convert an offset span to a coordinate range.
    fn to_range(&self, min_char: usize, lim_char: usize) -> Range {
        Range::new(self.to_coordinate(min_char), self.to_coordinate(lim_char))
    }
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Total size of `lines` when each line is followed by a newline terminator:
/// `Σ(len(line) + 1)`.
pub fn sum_lengths<S: AsRef<str>>(lines: &[S]) -> usize {
    lines.iter().map(|line| char_len(line.as_ref()) + 1).sum()
}

/// Offset of `coordinate` within `lines`.
///
/// Clamping policy:
/// - a column past the end of its row is clamped to the row length;
/// - a row at or past `lines.len()` maps to the one-past-the-end offset (`sum_lengths(lines)`).
pub fn offset_of<S: AsRef<str>>(lines: &[S], coordinate: Coordinate) -> usize {
    let mut offset = 0;
    for (row, line) in lines.iter().enumerate() {
        let len = char_len(line.as_ref());
        if row == coordinate.row {
            if coordinate.column > len {
                tracing::warn!(
                    row,
                    column = coordinate.column,
                    line_len = len,
                    "column past end of line, clamping"
                );
            }
            return offset + coordinate.column.min(len);
        }
        offset += len + 1;
    }

    if coordinate.row > lines.len() || coordinate.column > 0 {
        tracing::warn!(
            row = coordinate.row,
            column = coordinate.column,
            line_count = lines.len(),
            "coordinate past end of buffer, clamping"
        );
    }
    offset
}

/// Coordinate of `offset` within `lines`.
///
/// Offsets inside a row (including the position of its newline terminator) map to that row.
/// Offsets at or past `sum_lengths(lines)` map to `(lines.len(), 0)`, the row one past the last.
pub fn coordinate_of<S: AsRef<str>>(lines: &[S], offset: usize) -> Coordinate {
    let mut count = 0;
    for (row, line) in lines.iter().enumerate() {
        let line_end = count + char_len(line.as_ref()) + 1;
        if offset < line_end {
            return Coordinate::new(row, offset - count);
        }
        count = line_end;
    }

    if offset > count {
        tracing::warn!(offset, limit = count, "offset past end of buffer, clamping");
    }
    Coordinate::new(lines.len(), 0)
}

/// Strict variant of [`offset_of`].
pub fn try_offset_of<S: AsRef<str>>(
    lines: &[S],
    coordinate: Coordinate,
) -> Result<usize, PositionError> {
    if coordinate.row > lines.len() || (coordinate.row == lines.len() && coordinate.column > 0) {
        return Err(PositionError::RowOutOfRange {
            row: coordinate.row,
            line_count: lines.len(),
        });
    }
    if let Some(line) = lines.get(coordinate.row) {
        let line_len = char_len(line.as_ref());
        if coordinate.column > line_len {
            return Err(PositionError::ColumnOutOfRange {
                row: coordinate.row,
                column: coordinate.column,
                line_len,
            });
        }
    }
    Ok(offset_of(lines, coordinate))
}

/// Strict variant of [`coordinate_of`].
pub fn try_coordinate_of<S: AsRef<str>>(
    lines: &[S],
    offset: usize,
) -> Result<Coordinate, PositionError> {
    let limit = sum_lengths(lines);
    if offset > limit {
        return Err(PositionError::OffsetOutOfRange { offset, limit });
    }
    Ok(coordinate_of(lines, offset))
}

/// Offset of a one-based `(line, column)` pair, as reported by compilers.
///
/// Zero is treated like one.
pub fn line_col_to_offset<S: AsRef<str>>(lines: &[S], line: usize, column: usize) -> usize {
    offset_of(
        lines,
        Coordinate::new(line.saturating_sub(1), column.saturating_sub(1)),
    )
}

/// Zero-based `(line, column)` of `offset`.
pub fn offset_to_zero_based_line_col<S: AsRef<str>>(lines: &[S], offset: usize) -> (usize, usize) {
    let coordinate = coordinate_of(lines, offset);
    (coordinate.row, coordinate.column)
}
