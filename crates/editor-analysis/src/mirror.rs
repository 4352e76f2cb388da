//! Rope-backed mirrored document.
//!
//! A [`MirroredDocument`] is the flat-text copy of a buffer that an analysis engine works on.
//! It is only ever changed through offset-addressed [`TextEdit`]s (or a full
//! [`MirroredDocument::update_content`]), and keeps:
//!
//! - a version counter, incremented once per applied edit or content replacement
//! - the [`TextChangeRange`] of every edit since the last full replacement, so incremental
//!   consumers can ask "what changed between version A and version B?"

use crate::delta::{EditError, TextChangeRange, TextEdit};
use crate::position::{Coordinate, PositionTranslator};
use ropey::Rope;

/// A recorded edit: the change range plus the document length after the edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditRecord {
    /// Document length (characters) after the edit.
    pub length: usize,
    /// The change itself.
    pub change: TextChangeRange,
}

/// Flat text mirror of a line buffer, addressed by character offsets.
#[derive(Debug, Clone)]
pub struct MirroredDocument {
    rope: Rope,
    version: u64,
    edit_records: Vec<EditRecord>,
}

impl MirroredDocument {
    /// Create an empty document at version 1.
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// Create a document holding `text`, at version 1.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            version: 1,
            edit_records: Vec::new(),
        }
    }

    /// Current version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Full text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Length in characters.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns `true` if the document holds no text.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Number of lines (`'\n'` count + 1).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Text of `row` without its newline terminator.
    pub fn line_text(&self, row: usize) -> Option<String> {
        if row >= self.rope.len_lines() {
            return None;
        }
        let mut text = self.rope.line(row).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        Some(text)
    }

    /// Text of the character span `min_char..lim_char` (clamped).
    pub fn slice(&self, min_char: usize, lim_char: usize) -> String {
        let len = self.rope.len_chars();
        let end = lim_char.min(len);
        let start = min_char.min(end);
        self.rope.slice(start..end).to_string()
    }

    /// Recorded edits since the last full replacement, oldest first.
    pub fn edit_records(&self) -> &[EditRecord] {
        &self.edit_records
    }

    /// Replace the whole content, discarding edit history.
    pub fn update_content(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
        self.edit_records.clear();
        self.version += 1;
    }

    /// Replace `[edit.min_char, edit.lim_char)` with `edit.new_text`.
    ///
    /// The edit is validated first; on error nothing changes.
    pub fn edit(&mut self, edit: &TextEdit) -> Result<(), EditError> {
        edit.validate(self.rope.len_chars())?;

        if edit.lim_char > edit.min_char {
            self.rope.remove(edit.min_char..edit.lim_char);
        }
        if !edit.new_text.is_empty() {
            self.rope.insert(edit.min_char, &edit.new_text);
        }

        self.edit_records.push(EditRecord {
            length: self.rope.len_chars(),
            change: edit.change_range(),
        });
        self.version += 1;
        Ok(())
    }

    /// The collapsed change between two versions.
    ///
    /// Returns [`TextChangeRange::unchanged`] when `start_version == end_version`, and `None`
    /// when the requested range reaches back past the retained history (e.g. across a full
    /// content replacement) or past the current version.
    pub fn text_change_range_between_versions(
        &self,
        start_version: u64,
        end_version: u64,
    ) -> Option<TextChangeRange> {
        if start_version == end_version {
            return Some(TextChangeRange::unchanged());
        }
        if start_version > end_version || end_version > self.version {
            return None;
        }

        let retained = self.edit_records.len() as u64;
        let oldest = self.version - retained;
        if start_version < oldest {
            return None;
        }

        let first = (start_version - oldest) as usize;
        let last = (end_version - oldest) as usize;
        let changes: Vec<TextChangeRange> = self.edit_records[first..last]
            .iter()
            .map(|record| record.change)
            .collect();
        Some(TextChangeRange::collapse(&changes))
    }
}

impl Default for MirroredDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionTranslator for MirroredDocument {
    fn to_offset(&self, coordinate: Coordinate) -> usize {
        let line_count = self.rope.len_lines();
        if coordinate.row >= line_count {
            // One past the last line: the text plus the last line's virtual terminator.
            return self.rope.len_chars() + 1;
        }

        let line_start = self.rope.line_to_char(coordinate.row);
        let line_len = if coordinate.row + 1 < line_count {
            self.rope.line_to_char(coordinate.row + 1) - line_start - 1
        } else {
            self.rope.len_chars() - line_start
        };
        line_start + coordinate.column.min(line_len)
    }

    fn to_coordinate(&self, offset: usize) -> Coordinate {
        if offset > self.rope.len_chars() {
            return Coordinate::new(self.rope.len_lines(), 0);
        }
        let row = self.rope.char_to_line(offset);
        Coordinate::new(row, offset - self.rope.line_to_char(row))
    }

    fn apply_edit(&mut self, edit: &TextEdit) -> Result<(), EditError> {
        self.edit(edit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::TextSpan;

    #[test]
    fn test_edit_bumps_version_and_records_change() {
        let mut doc = MirroredDocument::from_text("abc\ndef");
        assert_eq!(doc.version(), 1);

        doc.edit(&TextEdit::insert(1, "X")).unwrap();
        assert_eq!(doc.text(), "aXbc\ndef");
        assert_eq!(doc.version(), 2);
        assert_eq!(
            doc.edit_records(),
            &[EditRecord {
                length: 8,
                change: TextChangeRange::new(TextSpan::new(1, 0), 1),
            }]
        );
    }

    #[test]
    fn test_invalid_edit_leaves_document_untouched() {
        let mut doc = MirroredDocument::from_text("abc");
        assert!(doc.edit(&TextEdit::new(1, 9, "zz")).is_err());
        assert_eq!(doc.text(), "abc");
        assert_eq!(doc.version(), 1);
        assert!(doc.edit_records().is_empty());
    }

    #[test]
    fn test_change_range_between_versions() {
        let mut doc = MirroredDocument::from_text("abc");
        doc.edit(&TextEdit::insert(3, "d")).unwrap(); // v2
        doc.edit(&TextEdit::insert(4, "e")).unwrap(); // v3

        let range = doc.text_change_range_between_versions(1, 3).unwrap();
        assert_eq!(range.span, TextSpan::new(3, 0));
        assert_eq!(range.new_length, 2);
        assert!(
            doc.text_change_range_between_versions(3, 3)
                .unwrap()
                .is_unchanged()
        );

        doc.update_content("reset"); // v4, history dropped
        assert_eq!(doc.text_change_range_between_versions(2, 4), None);
        assert!(
            doc.text_change_range_between_versions(4, 4)
                .unwrap()
                .is_unchanged()
        );
    }

    #[test]
    fn test_translation_matches_line_scan() {
        let doc = MirroredDocument::from_text("abc\n\nde");
        let lines = ["abc", "", "de"];
        for offset in 0..=crate::position::sum_lengths(&lines) + 2 {
            assert_eq!(
                doc.to_coordinate(offset),
                crate::position::coordinate_of(&lines, offset),
                "offset {offset}"
            );
        }
        for row in 0..=3 {
            for column in 0..5 {
                let c = Coordinate::new(row, column);
                assert_eq!(doc.to_offset(c), crate::position::offset_of(&lines, c));
            }
        }
    }
}
