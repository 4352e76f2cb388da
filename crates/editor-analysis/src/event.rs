//! Buffer mutation events.
//!
//! A line-oriented editor reports each mutation as one [`EditEvent`]: text inserted or removed
//! inside rows, or whole rows inserted or removed. The JSON shape matches what browser editors
//! emit on their `change` channel:
//!
//! ```json
//! { "action": "insertText", "range": { "start": { "row": 0, "column": 1 },
//!                                      "end":   { "row": 0, "column": 2 } }, "text": "X" }
//! { "action": "removeLines", "range": { ... }, "lines": ["def"] }
//! ```

use crate::delta::TextEdit;
use crate::position::{Coordinate, PositionTranslator, Range, char_len, sum_lengths};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors produced while decoding or replaying an [`EditEvent`].
#[derive(Debug, Error)]
pub enum EventError {
    /// The JSON value is not a well-formed edit event.
    #[error("malformed edit event: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The event range does not fit the buffer it is replayed onto.
    #[error("edit event does not fit buffer: {0}")]
    OutOfRange(#[from] crate::position::PositionError),
    /// The removed payload carried by the event differs from the buffer's content.
    #[error("removed text in edit event does not match buffer content")]
    PayloadMismatch,
}

/// The action tag of an [`EditEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditAction {
    /// Text inserted at a position (may contain newlines).
    InsertText,
    /// Whole rows inserted before a row.
    InsertLines,
    /// Text removed from a range (may span rows).
    RemoveText,
    /// Whole rows removed.
    RemoveLines,
}

/// A single reported buffer mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum EditEvent {
    /// `text` was inserted at `range.start`; `range.end` is the position after the insertion.
    InsertText {
        /// Affected range.
        range: Range,
        /// Inserted text.
        text: String,
    },
    /// `lines` were inserted as whole rows starting at `range.start.row`.
    InsertLines {
        /// Affected range (`(row, 0)..(row + lines.len(), 0)`).
        range: Range,
        /// Inserted rows, without terminators.
        lines: Vec<String>,
    },
    /// `text` (exactly the content of `range`) was removed.
    RemoveText {
        /// Removed range.
        range: Range,
        /// Removed text.
        text: String,
    },
    /// `lines` were removed as whole rows starting at `range.start.row`.
    RemoveLines {
        /// Removed range (`(row, 0)..(row + lines.len(), 0)`).
        range: Range,
        /// Removed rows, without terminators.
        lines: Vec<String>,
    },
}

impl EditEvent {
    /// Decode an event from its JSON shape.
    pub fn from_value(value: &Value) -> Result<Self, EventError> {
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Encode the event to its JSON shape.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// The event's action tag.
    pub fn action(&self) -> EditAction {
        match self {
            Self::InsertText { .. } => EditAction::InsertText,
            Self::InsertLines { .. } => EditAction::InsertLines,
            Self::RemoveText { .. } => EditAction::RemoveText,
            Self::RemoveLines { .. } => EditAction::RemoveLines,
        }
    }

    /// The affected range.
    pub fn range(&self) -> Range {
        match self {
            Self::InsertText { range, .. }
            | Self::InsertLines { range, .. }
            | Self::RemoveText { range, .. }
            | Self::RemoveLines { range, .. } => *range,
        }
    }

    /// Start of the affected range.
    pub fn start(&self) -> Coordinate {
        self.range().start
    }

    /// Returns `true` for insertions.
    pub fn is_insert(&self) -> bool {
        matches!(self, Self::InsertText { .. } | Self::InsertLines { .. })
    }

    /// The equivalent offset-addressed edit.
    ///
    /// `translator` must reflect the buffer *after* the event: only the start position is
    /// translated, and everything before it is unaffected by the mutation.
    pub fn to_text_edit(&self, translator: &impl PositionTranslator) -> TextEdit {
        let start = translator.to_offset(self.start());
        match self {
            Self::InsertText { text, .. } => TextEdit::insert(start, text.clone()),
            Self::InsertLines { lines, .. } => {
                let mut text = String::with_capacity(sum_lengths(lines));
                for line in lines {
                    text.push_str(line);
                    text.push('\n');
                }
                TextEdit::insert(start, text)
            }
            Self::RemoveText { text, .. } => TextEdit::delete(start, start + char_len(text)),
            Self::RemoveLines { lines, .. } => TextEdit::delete(start, start + sum_lengths(lines)),
        }
    }

    /// Number of characters added (positive) or removed (negative) by the event.
    pub fn char_delta(&self) -> isize {
        match self {
            Self::InsertText { text, .. } => char_len(text) as isize,
            Self::InsertLines { lines, .. } => sum_lengths(lines) as isize,
            Self::RemoveText { text, .. } => -(char_len(text) as isize),
            Self::RemoveLines { lines, .. } => -(sum_lengths(lines) as isize),
        }
    }

    /// Number of rows added (positive) or removed (negative) by the event.
    pub fn line_delta(&self) -> isize {
        match self {
            Self::InsertText { text, .. } => text.matches('\n').count() as isize,
            Self::InsertLines { lines, .. } => lines.len() as isize,
            Self::RemoveText { text, .. } => -(text.matches('\n').count() as isize),
            Self::RemoveLines { lines, .. } => -(lines.len() as isize),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_insert_text() {
        let value = json!({
            "action": "insertText",
            "range": { "start": { "row": 0, "column": 1 }, "end": { "row": 0, "column": 2 } },
            "text": "X"
        });
        let event = EditEvent::from_value(&value).unwrap();
        assert_eq!(event.action(), EditAction::InsertText);
        assert_eq!(event.start(), Coordinate::new(0, 1));
        assert_eq!(event.char_delta(), 1);
        assert_eq!(event.to_value(), value);
    }

    #[test]
    fn test_from_value_remove_lines() {
        let value = json!({
            "action": "removeLines",
            "range": { "start": { "row": 1, "column": 0 }, "end": { "row": 3, "column": 0 } },
            "lines": ["def", "g"]
        });
        let event = EditEvent::from_value(&value).unwrap();
        assert_eq!(event.action(), EditAction::RemoveLines);
        assert_eq!(event.line_delta(), -2);
        assert_eq!(event.char_delta(), -6);
    }

    #[test]
    fn test_from_value_rejects_unknown_action() {
        let value = json!({
            "action": "transpose",
            "range": { "start": { "row": 0, "column": 0 }, "end": { "row": 0, "column": 0 } }
        });
        assert!(matches!(
            EditEvent::from_value(&value),
            Err(EventError::Malformed(_))
        ));
    }

    #[test]
    fn test_to_text_edit_remove_lines() {
        let buffer = crate::buffer::Buffer::from_lines(["abc", "ghi"]);
        let event = EditEvent::RemoveLines {
            range: Range::from_rows(1, 0, 2, 0),
            lines: vec!["def".to_string()],
        };
        assert_eq!(event.to_text_edit(&buffer), TextEdit::delete(4, 8));
    }

    #[test]
    fn test_to_text_edit_insert_lines_terminates_each_row() {
        let buffer = crate::buffer::Buffer::from_lines(["foo", "bar", ""]);
        let event = EditEvent::InsertLines {
            range: Range::from_rows(0, 0, 2, 0),
            lines: vec!["foo".to_string(), "bar".to_string()],
        };
        assert_eq!(event.to_text_edit(&buffer), TextEdit::insert(0, "foo\nbar\n"));
    }

    #[test]
    fn test_line_delta_counts_newlines_in_text() {
        let event = EditEvent::RemoveText {
            range: Range::from_rows(0, 2, 2, 0),
            text: "c\nxy\n".to_string(),
        };
        assert_eq!(event.line_delta(), -2);
        assert!(!event.is_insert());
    }
}
