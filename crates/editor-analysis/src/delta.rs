//! Offset-addressed text edits and change ranges.
//!
//! Analysis engines consume edits as "replace the span `[min_char, lim_char)` with `new_text`",
//! expressed in **character offsets** (Unicode scalar values). Engines that re-parse
//! incrementally additionally want to know which span changed between two document versions;
//! [`TextChangeRange`] records that per edit and can collapse a run of edits into one range.

use crate::position::char_len;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when an edit does not fit the text it is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// `min_char` is greater than `lim_char`.
    #[error("inverted edit span {min_char}..{lim_char}")]
    InvertedSpan {
        /// Span start.
        min_char: usize,
        /// Span end.
        lim_char: usize,
    },
    /// The span reaches past the end of the text.
    #[error("edit span end {lim_char} past document length {len}")]
    SpanOutOfRange {
        /// Span end.
        lim_char: usize,
        /// Document length in characters.
        len: usize,
    },
    /// Two edits in a batch partially overlap.
    #[error("overlapping edits at {first_lim} / {second_min}")]
    Overlapping {
        /// End of the earlier edit.
        first_lim: usize,
        /// Start of the later edit.
        second_min: usize,
    },
}

/// A `start..start+length` span of character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextSpan {
    /// Start offset (inclusive).
    pub start: usize,
    /// Length in characters.
    pub length: usize,
}

impl TextSpan {
    /// Create a span from a start and a length.
    pub fn new(start: usize, length: usize) -> Self {
        Self { start, length }
    }

    /// Create a span from `start..end` bounds.
    pub fn from_bounds(start: usize, end: usize) -> Self {
        Self {
            start,
            length: end.saturating_sub(start),
        }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> usize {
        self.start + self.length
    }

    /// Returns `true` if `offset` lies in `start..=end`.
    pub fn touches(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end()
    }
}

/// A single offset-addressed replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    /// Start offset of the replaced span (inclusive).
    pub min_char: usize,
    /// End offset of the replaced span (exclusive).
    pub lim_char: usize,
    /// Replacement text (may be empty, may contain newlines).
    pub new_text: String,
}

impl TextEdit {
    /// Create a replacement edit.
    pub fn new(min_char: usize, lim_char: usize, new_text: impl Into<String>) -> Self {
        Self {
            min_char,
            lim_char,
            new_text: new_text.into(),
        }
    }

    /// Insert `text` at `at`.
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self::new(at, at, text)
    }

    /// Delete `min_char..lim_char`.
    pub fn delete(min_char: usize, lim_char: usize) -> Self {
        Self::new(min_char, lim_char, String::new())
    }

    /// The replaced span.
    pub fn span(&self) -> TextSpan {
        TextSpan::from_bounds(self.min_char, self.lim_char)
    }

    /// Length of `new_text` in characters.
    pub fn new_len(&self) -> usize {
        char_len(&self.new_text)
    }

    /// The change range this edit produces.
    pub fn change_range(&self) -> TextChangeRange {
        TextChangeRange::new(self.span(), self.new_len())
    }

    /// Check that the edit fits a document of `len` characters.
    pub fn validate(&self, len: usize) -> Result<(), EditError> {
        if self.min_char > self.lim_char {
            return Err(EditError::InvertedSpan {
                min_char: self.min_char,
                lim_char: self.lim_char,
            });
        }
        if self.lim_char > len {
            return Err(EditError::SpanOutOfRange {
                lim_char: self.lim_char,
                len,
            });
        }
        Ok(())
    }
}

/// "Span `span` of the old text was replaced by `new_length` characters."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChangeRange {
    /// Replaced span in the old text.
    pub span: TextSpan,
    /// Length of the replacement in the new text.
    pub new_length: usize,
}

impl TextChangeRange {
    /// Create a change range.
    pub fn new(span: TextSpan, new_length: usize) -> Self {
        Self { span, new_length }
    }

    /// The "nothing changed" range.
    pub fn unchanged() -> Self {
        Self::new(TextSpan::new(0, 0), 0)
    }

    /// Returns `true` for [`TextChangeRange::unchanged`].
    pub fn is_unchanged(&self) -> bool {
        self.span.length == 0 && self.new_length == 0
    }

    /// The span covered by the replacement in the new text.
    pub fn new_span(&self) -> TextSpan {
        TextSpan::new(self.span.start, self.new_length)
    }

    /// Collapse consecutive change ranges (oldest first) into one range that covers them all.
    ///
    /// The result's span is expressed in the text before the first change, and its new length
    /// in the text after the last change.
    pub fn collapse(changes: &[TextChangeRange]) -> TextChangeRange {
        let Some((first, rest)) = changes.split_first() else {
            return Self::unchanged();
        };

        let mut old_start = first.span.start as isize;
        let mut old_end = first.span.end() as isize;
        let mut new_end = old_start + first.new_length as isize;

        for next in rest {
            let old_start2 = next.span.start as isize;
            let old_end2 = next.span.end() as isize;
            let new_end2 = old_start2 + next.new_length as isize;

            let (old_end1, new_end1) = (old_end, new_end);
            old_start = old_start.min(old_start2);
            old_end = old_end1.max(old_end1 + (old_end2 - new_end1));
            new_end = new_end2.max(new_end2 + (new_end1 - old_end2));
        }

        Self::new(
            TextSpan::from_bounds(old_start as usize, old_end as usize),
            (new_end - old_start) as usize,
        )
    }
}

pub(crate) fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Sort edits by start offset (stable), dropping edits fully contained in an earlier one.
///
/// Partially overlapping edits are rejected.
pub fn normalize_edits(edits: &[TextEdit]) -> Result<Vec<TextEdit>, EditError> {
    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    sorted.sort_by_key(|edit| edit.min_char);

    let mut out: Vec<TextEdit> = Vec::with_capacity(sorted.len());
    for edit in sorted {
        if let Some(last) = out.last() {
            if edit.min_char < last.lim_char {
                if edit.lim_char <= last.lim_char {
                    continue;
                }
                return Err(EditError::Overlapping {
                    first_lim: last.lim_char,
                    second_min: edit.min_char,
                });
            }
        }
        out.push(edit.clone());
    }
    Ok(out)
}

/// Apply a batch of edits (all addressed against the original `text`) and return the result.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> Result<String, EditError> {
    let edits = normalize_edits(edits)?;
    let len = char_len(text);
    for edit in &edits {
        edit.validate(len)?;
    }

    let mut result = text.to_string();
    for edit in edits.iter().rev() {
        let start = byte_offset(&result, edit.min_char);
        let end = byte_offset(&result, edit.lim_char);
        result.replace_range(start..end, &edit.new_text);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_single_and_empty() {
        assert!(TextChangeRange::collapse(&[]).is_unchanged());
        let one = TextEdit::new(2, 4, "xyz").change_range();
        assert_eq!(TextChangeRange::collapse(&[one]), one);
    }

    #[test]
    fn test_collapse_two_typed_characters() {
        // "abc" -> "abXc" -> "abXYc"
        let first = TextEdit::insert(2, "X").change_range();
        let second = TextEdit::insert(3, "Y").change_range();
        let collapsed = TextChangeRange::collapse(&[first, second]);
        assert_eq!(collapsed.span, TextSpan::new(2, 0));
        assert_eq!(collapsed.new_length, 2);
    }

    #[test]
    fn test_collapse_insert_then_delete_elsewhere() {
        // "0123456789": insert "ab" at 1, then delete 6..8 in the new text (old 4..6).
        let first = TextEdit::insert(1, "ab").change_range();
        let second = TextEdit::delete(6, 8).change_range();
        let collapsed = TextChangeRange::collapse(&[first, second]);
        assert_eq!(collapsed.span, TextSpan::from_bounds(1, 6));
        assert_eq!(collapsed.new_length, 5);
    }

    #[test]
    fn test_validate() {
        assert_eq!(TextEdit::delete(0, 3).validate(3), Ok(()));
        assert_eq!(
            TextEdit::delete(0, 4).validate(3),
            Err(EditError::SpanOutOfRange { lim_char: 4, len: 3 })
        );
        assert!(matches!(
            TextEdit::delete(3, 1).validate(5),
            Err(EditError::InvertedSpan { .. })
        ));
    }

    #[test]
    fn test_apply_edits_back_to_front() {
        let edits = vec![
            TextEdit::new(6, 11, "earth"),
            TextEdit::insert(0, ">> "),
            TextEdit::delete(5, 6),
        ];
        assert_eq!(apply_edits("hello world", &edits).unwrap(), ">> helloearth");
    }

    #[test]
    fn test_normalize_drops_contained_and_rejects_partial_overlap() {
        let contained = vec![TextEdit::delete(0, 5), TextEdit::delete(1, 3)];
        assert_eq!(normalize_edits(&contained).unwrap().len(), 1);

        let partial = vec![TextEdit::delete(0, 5), TextEdit::delete(3, 8)];
        assert!(matches!(
            normalize_edits(&partial),
            Err(EditError::Overlapping { .. })
        ));
    }

    #[test]
    fn test_apply_edits_with_multibyte_text() {
        let edits = vec![TextEdit::new(1, 2, "👋")];
        assert_eq!(apply_edits("你好吗", &edits).unwrap(), "你👋吗");
    }
}
