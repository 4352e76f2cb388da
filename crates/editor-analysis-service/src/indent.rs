//! Smart indentation.
//!
//! The engine suggests an indentation width for a row. The row's existing indentation is
//! measured (tab = tab size, space = 1); if it is already deeper than suggested the host's
//! default indent command runs, otherwise the missing width is inserted as spaces at the start of
//! the row and the cursor is moved past it.

use crate::engine::AnalysisEngine;
use crate::error::EngineError;
use editor_analysis::{Buffer, Coordinate};
use editor_analysis_lang::EditorOptions;

/// What the host should do for an indent request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndentAction {
    /// Run the host's ordinary indent command.
    Default,
    /// Insert `text` at `at` and move the cursor to `cursor`.
    Insert {
        /// Insertion point (start of the row).
        at: Coordinate,
        /// Spaces to insert; empty when the row already has the suggested width.
        text: String,
        /// Cursor after the insertion.
        cursor: Coordinate,
    },
}

/// Compute the action for `line` given the engine's suggested width.
pub fn indent_action(
    line: &str,
    cursor: Coordinate,
    smart_indent: usize,
    options: &EditorOptions,
) -> IndentAction {
    let existing = options.measure_indent(line);
    if existing > smart_indent {
        return IndentAction::Default;
    }

    let indent = smart_indent - existing;
    let leading = EditorOptions::leading_whitespace_len(line);
    let column = if cursor.column > leading {
        cursor.column + indent
    } else {
        indent + leading
    };

    IndentAction::Insert {
        at: Coordinate::new(cursor.row, 0),
        text: " ".repeat(indent),
        cursor: Coordinate::new(cursor.row, column),
    }
}

/// Ask `engine` for the suggested width of the cursor row and compute the action.
pub fn smart_indent<E: AnalysisEngine + ?Sized>(
    engine: &E,
    document_id: &str,
    buffer: &Buffer,
    cursor: Coordinate,
    options: &EditorOptions,
) -> Result<IndentAction, EngineError> {
    let cursor = buffer.clamp(cursor);
    let line = buffer.line(cursor.row).unwrap_or_default();
    let width = engine.smart_indent(document_id, cursor.row, options)?;
    Ok(indent_action(line, cursor, width, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deeper_existing_indent_defers_to_default() {
        let options = EditorOptions::default();
        assert_eq!(
            indent_action("\tfoo", Coordinate::new(0, 1), 2, &options),
            IndentAction::Default
        );
    }

    #[test]
    fn test_inserts_missing_width() {
        let options = EditorOptions::default();
        // Cursor inside the text: shifted by the inserted width.
        assert_eq!(
            indent_action("  foo", Coordinate::new(2, 4), 8, &options),
            IndentAction::Insert {
                at: Coordinate::new(2, 0),
                text: " ".repeat(6),
                cursor: Coordinate::new(2, 10),
            }
        );
        // Cursor inside the leading whitespace: placed after the new indentation.
        assert_eq!(
            indent_action("  foo", Coordinate::new(2, 1), 8, &options),
            IndentAction::Insert {
                at: Coordinate::new(2, 0),
                text: " ".repeat(6),
                cursor: Coordinate::new(2, 8),
            }
        );
    }

    #[test]
    fn test_tab_counts_as_tab_size() {
        let options = EditorOptions {
            tab_size: 2,
            ..EditorOptions::default()
        };
        assert_eq!(
            indent_action("\t x", Coordinate::new(0, 3), 4, &options),
            IndentAction::Insert {
                at: Coordinate::new(0, 0),
                text: " ".to_string(),
                cursor: Coordinate::new(0, 4),
            }
        );
    }
}
